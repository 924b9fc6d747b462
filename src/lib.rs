//! meshview - OBJ 网格导入与查看
//!
//! 本库把 OBJ 文本转换为可直接上传 GPU 的交错三角形缓冲，并提供一个
//! 基于 wgpu 的查看器：四种着色模型、交互式模型变换，以及 CPU/GPU
//! 两条变换路径。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（日志、配置、错误处理、输入、场景）
//! - `math`: 矩阵与向量工具
//! - `geometry`: 记录解析、扇形三角化、交错缓冲构建
//! - `renderer`: 与图形 API 无关的网格生命周期和帧数据
//! - `component`: 相机和点光源
//! - `gfx`: wgpu 后端
//!
//! # 使用示例
//!
//! ```no_run
//! use meshview::geometry::loaders::ObjLoader;
//!
//! let mesh = ObjLoader::load_from_str("\
//! v 0 0 0
//! v 1 0 0
//! v 0 1 0
//! vn 0 0 1
//! f 1//1 2//1 3//1
//! ")?;
//!
//! assert_eq!(mesh.triangle_count(), 1);
//! assert_eq!(mesh.render_scalars().len(), 18);
//! # Ok::<(), meshview::core::MeshViewError>(())
//! ```

pub mod core;
pub mod math;
pub mod geometry;
pub mod renderer;
pub mod component;
pub mod gfx;
