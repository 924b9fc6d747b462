/// 几何体加载和处理模块
///
/// 把 OBJ 文本转换为可直接上传 GPU 的交错三角形缓冲。
///
/// # 模块结构
///
/// - `vertex`: 交错顶点（位置 + 法线）及其布局
/// - `loaders`: 记录解析器和加载器接口
/// - `triangulate`: 多边形面的扇形三角化
/// - `builder`: 索引解析与交错缓冲构建
/// - `mesh`: CPU 侧网格数据
///
/// # 数据流
///
/// ```text
/// OBJ 文本
///     ↓
/// ObjLoader::parse_records（顶点表、法线表、面记录）
///     ↓
/// triangulate_face（每个面 N−2 个三角形）
///     ↓
/// build_render_buffer（交错渲染缓冲）
///     ↓
/// MeshData（CPU 侧数据）
///     ↓
/// renderer::Mesh（上传到 GPU）
/// ```
///
/// # 使用示例
///
/// ```rust,no_run
/// use meshview::geometry::loaders::load_mesh;
/// use std::path::Path;
///
/// let mesh_data = load_mesh(Path::new("data/prism.obj"))?;
///
/// println!("三角形数: {}", mesh_data.triangle_count());
/// println!("归一化缩放: {}", mesh_data.normalization_scale());
/// # Ok::<(), meshview::core::MeshViewError>(())
/// ```

pub mod vertex;
pub mod triangulate;
pub mod builder;
pub mod mesh;
pub mod loaders;

// 重新导出常用类型
pub use vertex::{MeshVertex, VertexLayout};
pub use triangulate::{FanWalk, TriangleNormalPair};
pub use mesh::MeshData;
