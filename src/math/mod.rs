//! 统一的数学库模块
//!
//! 基于 `nalgebra`，提供查看器使用的向量/矩阵别名和矩阵辅助函数。

pub use nalgebra::{Matrix4 as Mat4, Vector3 as Vec3, Vector4 as Vec4};

// 类型别名，使用更简洁的名称
pub type Vector3 = Vec3<f32>;
pub type Vector4 = Vec4<f32>;
pub type Matrix4 = Mat4<f32>;

/// 数学常量
pub mod constants {
    /// 角度转弧度的系数
    pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

    /// 浮点数比较的 epsilon
    pub const EPSILON: f32 = 1e-6;
}

/// 数学工具函数
pub mod utils {
    use super::*;

    /// 角度转弧度
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// 检查两个浮点数是否近似相等
    pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
        (a - b).abs() < epsilon
    }
}

/// 矩阵辅助函数
pub mod matrix {
    use super::*;

    /// 将 OpenGL 风格裁剪空间（z ∈ [-1, 1]）映射到 wgpu 的 z ∈ [0, 1]
    #[rustfmt::skip]
    pub fn opengl_to_wgpu() -> Matrix4 {
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 0.5, 0.5,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// 创建平移矩阵
    pub fn translation(x: f32, y: f32, z: f32) -> Matrix4 {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// 创建均匀缩放矩阵
    pub fn uniform_scaling(factor: f32) -> Matrix4 {
        Matrix4::new_scaling(factor)
    }

    /// 绕任意轴旋转（角度为弧度，轴无需归一化）
    pub fn rotation(axis: &Vector3, angle: f32) -> Matrix4 {
        Matrix4::from_axis_angle(&nalgebra::Unit::new_normalize(*axis), angle)
    }

    /// 创建透视投影矩阵（OpenGL 约定）
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4 {
        Matrix4::new_perspective(aspect, fov_y, near, far)
    }

    /// 计算 `m · (p, 1)` 并丢弃齐次分量 w
    pub fn transform_position(m: &Matrix4, p: &Vector3) -> Vector3 {
        let v = m * Vector4::new(p.x, p.y, p.z, 1.0);
        Vector3::new(v.x, v.y, v.z)
    }
}
