/// 交错顶点定义模块
///
/// 渲染缓冲中每个三角形角点占 6 个连续的 f32：3 个位置分量 + 3 个法线分量。

use bytemuck::{Pod, Zeroable};
use crate::math::Vector3;

/// 每个角点的标量数量（位置 3 + 法线 3）
pub const FLOATS_PER_CORNER: usize = 6;

/// 每个三角形的角点数量
pub const CORNERS_PER_TRIANGLE: usize = 3;

/// 交错顶点：位置 + 法线
///
/// # 内存布局
///
/// - position: 12 bytes (3 * f32)，偏移 0
/// - normal: 12 bytes (3 * f32)，偏移 12
/// - **总计**: 24 bytes
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// 顶点位置 (x, y, z)
    pub position: [f32; 3],

    /// 法线向量 (nx, ny, nz)，不要求归一化
    pub normal: [f32; 3],
}

impl MeshVertex {
    /// 交错缓冲的布局描述
    pub const LAYOUT: VertexLayout = VertexLayout {
        stride: std::mem::size_of::<MeshVertex>() as u64,
        attributes: &[
            VertexAttribute { location: 0, offset: 0, components: 3 },
            VertexAttribute { location: 1, offset: 12, components: 3 },
        ],
    };

    #[inline]
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    /// 从 nalgebra 向量创建
    #[inline]
    pub fn from_vectors(position: &Vector3, normal: &Vector3) -> Self {
        Self {
            position: [position.x, position.y, position.z],
            normal: [normal.x, normal.y, normal.z],
        }
    }

    #[inline]
    pub fn position_vector(&self) -> Vector3 {
        Vector3::from(self.position)
    }
}

/// 单个 f32 顶点属性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// 着色器输入位置
    pub location: u32,
    /// 在顶点内的字节偏移
    pub offset: u64,
    /// f32 分量数量
    pub components: u32,
}

/// 交错顶点缓冲的布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    /// 相邻顶点之间的字节跨度
    pub stride: u64,
    pub attributes: &'static [VertexAttribute],
}
