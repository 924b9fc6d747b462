//! 光照组件模块
//!
//! 查看器只使用一个点光源，位置和颜色同时传给着色器和光源立方体。

use crate::math::{matrix, Matrix4, Vector3};

/// 点光源
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vector3,
    pub color: [f32; 3],
}

impl PointLight {
    pub fn new(position: Vector3, color: [f32; 3]) -> Self {
        Self { position, color }
    }

    /// 光源立方体的模型矩阵
    ///
    /// 立方体绘制在 `-position` 处，并按自身的归一化系数缩放。
    pub fn marker_matrix(&self, normalization_scale: f32) -> Matrix4 {
        let p = -self.position;
        matrix::translation(p.x, p.y, p.z) * matrix::uniform_scaling(normalization_scale)
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vector3::new(-1.8, -1.5, -3.0),
            color: [1.0, 1.0, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_is_placed_at_negated_position() {
        let light = PointLight::default();
        let center = matrix::transform_position(&light.marker_matrix(0.5), &Vector3::zeros());
        assert_eq!(center, Vector3::new(1.8, 1.5, 3.0));

        let corner = matrix::transform_position(&light.marker_matrix(0.5), &Vector3::new(1.0, 0.0, 0.0));
        assert!((corner.x - 2.3).abs() < 1e-6);
    }
}
