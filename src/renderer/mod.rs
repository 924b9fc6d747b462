//! 渲染器模块
//!
//! 本模块定义网格与图形 API 之间的边界，与具体后端无关：
//!
//! - `device`：顶点缓冲与绘制接口（`GpuDevice`）以及按帧录制接口（`FrameRecorder`）
//! - `mesh`：可渲染网格，管理 load / render / unload 生命周期
//! - `frame`：每帧上下文、管线种类和 uniform 布局
//!
//! 具体的 wgpu 实现位于 `gfx::wgpu`，着色器位于 `renderer/shaders`。

pub mod device;
pub mod frame;
pub mod mesh;

pub use device::{FrameRecorder, GpuDevice, VertexBufferId};
pub use frame::{FrameContext, PipelineKind};
pub use mesh::Mesh;
