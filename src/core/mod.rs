//! 核心功能模块
//!
//! 本模块提供查看器的基础功能，除 `scene` 外都独立于图形 API。
//!
//! # 模块组织
//!
//! - `log`：日志系统，基于 `tracing` 的结构化日志
//! - `config`：配置管理，支持配置文件和命令行参数
//! - `error`：错误处理，定义统一的错误类型
//! - `input`：键盘与滚轮输入到模型变换的映射
//! - `scene`：模型、光源立方体与相机组成的场景

pub mod log;
pub mod config;
pub mod error;
pub mod input;
pub mod scene;

// 重新导出常用类型，方便使用
pub use error::{Result, MeshViewError};
pub use config::Config;
pub use scene::Scene;
