pub mod catalog;
pub mod category;
pub mod entities;
pub mod ports;
pub mod runtime;
pub mod value_objects;

pub use catalog::*;
pub use category::assign_category;
pub use entities::*;
pub use ports::*;
pub use runtime::{parse_runtime, MAX_RUNTIME_DAYS};
pub use value_objects::*;
pub use cronslot_errors::{PlannerError, PlannerResult};
