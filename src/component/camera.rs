//! Camera 组件
//!
//! 固定相机：世界沿 z 轴平移 −3 得到视图空间，使用 45° 垂直视场角的透视投影。
//! 投影矩阵已包含到 wgpu 深度范围 [0, 1] 的修正。

use crate::math::{matrix, utils, Matrix4, Vector3};

/// 默认的视图平移（沿 z 轴）
pub const VIEW_OFFSET_Z: f32 = -3.0;

/// Camera 组件
#[derive(Debug, Clone)]
pub struct Camera {
    /// 着色使用的观察位置
    position: Vector3,

    /// 近裁剪面距离
    near_z: f32,

    /// 远裁剪面距离
    far_z: f32,

    /// 宽高比
    aspect: f32,

    /// 垂直视场角（弧度）
    fov_y: f32,

    view_matrix: Matrix4,
    proj_matrix: Matrix4,
}

impl Camera {
    /// 创建查看器的主相机
    ///
    /// # 参数
    /// - `aspect`: 窗口宽高比
    pub fn main_camera(aspect: f32) -> Self {
        let mut camera = Self {
            position: Vector3::new(0.0, 0.0, VIEW_OFFSET_Z),
            near_z: 0.1,
            far_z: 100.0,
            aspect,
            fov_y: utils::deg_to_rad(45.0),
            view_matrix: matrix::translation(0.0, 0.0, VIEW_OFFSET_Z),
            proj_matrix: Matrix4::identity(),
        };
        camera.update_proj_matrix();
        camera
    }

    /// 观察位置，供光照计算使用
    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn near_z(&self) -> f32 {
        self.near_z
    }

    pub fn far_z(&self) -> f32 {
        self.far_z
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// 获取垂直视场角（角度）
    pub fn fov_y_degrees(&self) -> f32 {
        self.fov_y.to_degrees()
    }

    /// 设置宽高比
    ///
    /// 宽或高为 0（窗口最小化）时保持原值。
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let aspect = width as f32 / height as f32;
        if (self.aspect - aspect).abs() > f32::EPSILON {
            self.aspect = aspect;
            self.update_proj_matrix();
        }
    }

    /// 获取视图矩阵
    pub fn view_matrix(&self) -> Matrix4 {
        self.view_matrix
    }

    /// 获取投影矩阵（wgpu 深度约定）
    pub fn proj_matrix(&self) -> Matrix4 {
        self.proj_matrix
    }

    fn update_proj_matrix(&mut self) {
        self.proj_matrix = matrix::opengl_to_wgpu()
            * matrix::perspective(self.fov_y, self.aspect, self.near_z, self.far_z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector4;

    #[test]
    fn test_main_camera() {
        let camera = Camera::main_camera(800.0 / 600.0);
        assert_eq!(camera.position(), Vector3::new(0.0, 0.0, -3.0));
        assert!((camera.fov_y_degrees() - 45.0).abs() < 1e-4);
        assert_eq!(camera.near_z(), 0.1);
        assert_eq!(camera.far_z(), 100.0);
    }

    #[test]
    fn test_origin_lands_inside_depth_range() {
        let camera = Camera::main_camera(1.0);
        let clip = camera.proj_matrix() * camera.view_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let depth = clip.z / clip.w;
        assert!(depth > 0.0 && depth < 1.0);
        assert!((clip.w - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_set_viewport() {
        let mut camera = Camera::main_camera(1.0);
        camera.set_viewport(1920, 1080);
        assert!((camera.aspect() - 16.0 / 9.0).abs() < 1e-6);

        camera.set_viewport(0, 1080);
        assert!((camera.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }
}
