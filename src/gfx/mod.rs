//! 图形后端模块
//!
//! 本模块封装图形 API 的底层实现。查看器只使用 wgpu，
//! 它在 Vulkan、Metal、DirectX 12、OpenGL 之上提供统一的接口。

pub mod wgpu;
