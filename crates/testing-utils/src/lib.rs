//! # Cronslot Testing Utils
//!
//! 工作区共享的测试工具：任务构建器、内存版任务来源与结果输出端、时间辅助函数。
//!
//! ```toml
//! [dev-dependencies]
//! cronslot-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;
