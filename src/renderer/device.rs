//! GPU 设备接口
//!
//! 网格资源只通过这个 trait 与图形 API 交互：创建、覆写、销毁顶点缓冲以及发出绘制。
//! wgpu 后端在 `gfx::wgpu` 中实现它，测试使用记录调用的替身设备。

use std::fmt;

use crate::core::error::Result;
use crate::geometry::vertex::VertexLayout;
use crate::math::Matrix4;
use super::frame::{FrameContext, PipelineKind};

/// 设备分配的顶点缓冲句柄
///
/// 句柄只由创建它的设备解释，销毁后不再有效。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexBufferId(pub u64);

impl fmt::Display for VertexBufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vb#{}", self.0)
    }
}

/// 顶点缓冲与绘制接口
///
/// 所有调用都必须发生在拥有图形上下文的线程上。
pub trait GpuDevice {
    /// 分配一个顶点缓冲并写入初始内容
    ///
    /// 设备无法绑定的布局会被拒绝。
    fn create_vertex_buffer(
        &mut self,
        label: &str,
        layout: &VertexLayout,
        contents: &[u8],
    ) -> Result<VertexBufferId>;

    /// 覆写已有缓冲的内容，长度必须与创建时一致
    fn write_vertex_buffer(&mut self, id: VertexBufferId, contents: &[u8]) -> Result<()>;

    /// 从缓冲开头绘制 `vertex_count` 个顶点（三角形列表）
    fn draw(&mut self, id: VertexBufferId, vertex_count: u32) -> Result<()>;

    /// 释放缓冲
    fn destroy_vertex_buffer(&mut self, id: VertexBufferId) -> Result<()>;

    /// 当前仍存活的缓冲数量
    fn live_buffer_count(&self) -> usize;
}

/// 按帧录制绘制的设备
///
/// 每帧先 `begin_frame`，之后每次 `set_object` 选定的管线和模型矩阵
/// 作用于随后的 `draw`，直到下一次 `set_object`。
pub trait FrameRecorder: GpuDevice {
    fn begin_frame(&mut self, frame: &FrameContext);

    fn set_object(&mut self, pipeline: PipelineKind, model: &Matrix4);
}
