//! 网格资源
//!
//! 持有 CPU 侧的网格数据，并管理它在 GPU 上的顶点缓冲。
//!
//! # 状态
//!
//! ```text
//! Unloaded ──load──▶ Loaded ──unload──▶ Unloaded
//!                     │  ▲
//!                     └──┘ render / load / apply_transform
//! ```
//!
//! `load` 是幂等的：已加载时原地覆写缓冲（大小不变）或释放后重建。

use std::path::Path;

use crate::core::error::{GraphicsError, Result};
use crate::geometry::loaders::load_mesh;
use crate::geometry::{MeshData, MeshVertex};
use crate::math::{Matrix4, Vector3};
use super::device::{GpuDevice, VertexBufferId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MeshState {
    Unloaded,
    Loaded {
        buffer: VertexBufferId,
        byte_len: usize,
    },
}

/// 可渲染的网格
#[derive(Debug)]
pub struct Mesh {
    data: MeshData,
    label: String,
    state: MeshState,
}

impl Mesh {
    pub fn new(data: MeshData) -> Self {
        let label = data.name.clone().unwrap_or_else(|| "mesh".to_string());
        Self {
            data,
            label,
            state: MeshState::Unloaded,
        }
    }

    /// 从文件构建网格，此时还没有 GPU 资源
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(load_mesh(path.as_ref())?))
    }

    #[inline]
    pub fn data(&self) -> &MeshData {
        &self.data
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, MeshState::Loaded { .. })
    }

    /// 范数最大的顶点，用于计算归一化缩放
    #[inline]
    pub fn largest_vertex(&self) -> Vector3 {
        self.data.largest_vertex()
    }

    #[inline]
    pub fn normalization_scale(&self) -> f32 {
        self.data.normalization_scale()
    }

    /// 上传主机变换缓冲
    pub fn load<D: GpuDevice + ?Sized>(&mut self, device: &mut D) -> Result<()> {
        let len = self.data.host_transform_bytes().len();

        match self.state {
            MeshState::Loaded { buffer, byte_len } if byte_len == len => {
                device.write_vertex_buffer(buffer, self.data.host_transform_bytes())?;
                tracing::trace!(mesh = %self.label, %buffer, "vertex buffer rewritten");
            }
            MeshState::Loaded { buffer, .. } => {
                device.destroy_vertex_buffer(buffer)?;
                self.state = MeshState::Unloaded;
                self.create(device)?;
            }
            MeshState::Unloaded => self.create(device)?,
        }

        Ok(())
    }

    fn create<D: GpuDevice + ?Sized>(&mut self, device: &mut D) -> Result<()> {
        let bytes = self.data.host_transform_bytes();
        let buffer = device.create_vertex_buffer(&self.label, &MeshVertex::LAYOUT, bytes)?;

        tracing::debug!(
            mesh = %self.label,
            %buffer,
            bytes = bytes.len(),
            triangles = self.data.triangle_count(),
            "vertex buffer created"
        );

        self.state = MeshState::Loaded {
            buffer,
            byte_len: bytes.len(),
        };
        Ok(())
    }

    /// 绘制全部三角形
    pub fn render<D: GpuDevice + ?Sized>(&self, device: &mut D) -> Result<()> {
        let MeshState::Loaded { buffer, .. } = self.state else {
            return Err(GraphicsError::MeshNotLoaded(self.label.clone()).into());
        };

        let vertex_count = u32::try_from(self.data.corner_count()).map_err(|_| {
            GraphicsError::ResourceCreation(format!(
                "mesh '{}' has too many vertices to draw",
                self.label
            ))
        })?;

        device.draw(buffer, vertex_count)
    }

    /// 释放 GPU 缓冲；未加载时什么也不做
    pub fn unload<D: GpuDevice + ?Sized>(&mut self, device: &mut D) -> Result<()> {
        match self.state {
            MeshState::Loaded { buffer, .. } => {
                device.destroy_vertex_buffer(buffer)?;
                self.state = MeshState::Unloaded;
                tracing::debug!(mesh = %self.label, %buffer, "vertex buffer released");
            }
            MeshState::Unloaded => {
                tracing::debug!(mesh = %self.label, "unload on an unloaded mesh ignored");
            }
        }
        Ok(())
    }

    /// CPU 路径变换：在主机上变换位置后重新上传
    ///
    /// 法线不随之变换。
    pub fn apply_transform<D: GpuDevice + ?Sized>(
        &mut self,
        m: &Matrix4,
        device: &mut D,
    ) -> Result<()> {
        self.data.apply_transform(m);
        self.load(device)
    }
}
