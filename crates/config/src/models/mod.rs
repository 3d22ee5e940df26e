pub mod app_config;
pub mod logging;
pub mod planner;

pub use app_config::*;
pub use logging::*;
pub use planner::*;
