//! fsrbac-bootstrap - 统一启动骨架
//!
//! 配置加载、遥测初始化以及决策引擎装配

mod engine;
mod runtime;

pub use engine::*;
pub use runtime::*;
