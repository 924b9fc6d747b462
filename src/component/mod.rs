//! 场景组件模块
//!
//! 查看器场景中除网格以外的对象：固定相机和点光源。

mod camera;
mod light;

pub use camera::Camera;
pub use light::PointLight;
