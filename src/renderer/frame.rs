//! 每帧的渲染上下文与 uniform 布局
//!
//! `FrameContext` 汇总一帧内所有绘制共享的数据（相机、光源、物体颜色），
//! `ObjectUniforms` 则是每组绘制各自的模型矩阵。两者都按 WGSL 的
//! uniform 对齐规则布局，直接用 `bytemuck` 写入缓冲。

use bytemuck::{Pod, Zeroable};

use crate::component::{Camera, PointLight};
use crate::core::config::ShadingModel;
use crate::math::Matrix4;

/// 绘制使用的管线
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// 按着色模型照明的物体
    Object(ShadingModel),
    /// 不受光照的光源标记
    Light,
}

impl PipelineKind {
    /// 所有需要创建的管线
    pub const ALL: [PipelineKind; 5] = [
        PipelineKind::Object(ShadingModel::Flat),
        PipelineKind::Object(ShadingModel::Gouraud),
        PipelineKind::Object(ShadingModel::Phong),
        PipelineKind::Object(ShadingModel::Depth),
        PipelineKind::Light,
    ];

    /// WGSL 中的 (顶点, 片元) 入口函数名
    pub fn entry_points(&self) -> (&'static str, &'static str) {
        match self {
            PipelineKind::Object(ShadingModel::Flat) => ("vs_flat", "fs_flat"),
            PipelineKind::Object(ShadingModel::Gouraud) => ("vs_gouraud", "fs_gouraud"),
            PipelineKind::Object(ShadingModel::Phong) => ("vs_phong", "fs_phong"),
            PipelineKind::Object(ShadingModel::Depth) => ("vs_phong", "fs_depth"),
            PipelineKind::Light => ("vs_light", "fs_light"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PipelineKind::Object(model) => model.name(),
            PipelineKind::Light => "light",
        }
    }
}

/// 一帧共享的 uniform（group 0）
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub light_pos: [f32; 4],
    pub view_pos: [f32; 4],
    pub light_color: [f32; 4],
    pub object_color: [f32; 4],
}

/// 每组绘制的 uniform（group 1）
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    /// 模型矩阵的逆转置，用于变换法线
    pub normal_matrix: [[f32; 4]; 4],
}

impl ObjectUniforms {
    pub fn new(model: &Matrix4) -> Self {
        // 不可逆（如缩放为 0）时退回单位矩阵
        let normal = model
            .try_inverse()
            .map(|inv| inv.transpose())
            .unwrap_or_else(Matrix4::identity);

        Self {
            model: (*model).into(),
            normal_matrix: normal.into(),
        }
    }
}

/// 一帧的渲染上下文
#[derive(Debug, Clone)]
pub struct FrameContext {
    pub view: Matrix4,
    pub projection: Matrix4,
    pub light: PointLight,
    pub view_position: [f32; 3],
    pub object_color: [f32; 3],
    pub clear_color: [f32; 4],
}

impl FrameContext {
    pub fn new(camera: &Camera, light: PointLight, object_color: [f32; 3], clear_color: [f32; 4]) -> Self {
        let eye = camera.position();
        Self {
            view: camera.view_matrix(),
            projection: camera.proj_matrix(),
            light,
            view_position: [eye.x, eye.y, eye.z],
            object_color,
            clear_color,
        }
    }

    pub fn uniforms(&self) -> FrameUniforms {
        let p = self.light.position;
        let [lr, lg, lb] = self.light.color;
        let [vx, vy, vz] = self.view_position;
        let [r, g, b] = self.object_color;

        FrameUniforms {
            view: self.view.into(),
            projection: self.projection.into(),
            light_pos: [p.x, p.y, p.z, 1.0],
            view_pos: [vx, vy, vz, 1.0],
            light_color: [lr, lg, lb, 1.0],
            object_color: [r, g, b, 1.0],
        }
    }
}
