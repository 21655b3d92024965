//! authz-probe - 权限探测工具
//!
//! 按场景文档中的每个调用方执行一轮客户端操作，输出允许/拒绝报告

mod report;
mod runner;
mod scenario;

pub use report::*;
pub use runner::*;
pub use scenario::*;
