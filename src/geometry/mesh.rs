/// 网格数据结构模块
///
/// CPU 侧的网格数据：解析得到的顶点表和法线表、三角化结果、
/// 交错渲染缓冲，以及供 CPU 变换路径覆写的主机变换缓冲。
/// 不持有任何 GPU 资源。
use super::builder::build_render_buffer;
use super::loaders::obj_loader::ObjRecords;
use super::triangulate::{triangulate_face, TriangleNormalPair};
use super::vertex::{MeshVertex, CORNERS_PER_TRIANGLE};
use crate::core::error::MeshLoadError;
use crate::math::{matrix, Matrix4, Vector3};

/// CPU 侧网格数据
///
/// 表和渲染缓冲在构建后不再改变；只有主机变换缓冲会被
/// [`apply_transform`](Self::apply_transform) 覆写。
#[derive(Debug, Clone)]
pub struct MeshData {
    /// 网格名称（可选），通常取自文件名
    pub name: Option<String>,

    vertices: Vec<Vector3>,
    normals: Vec<Vector3>,
    triangles: Vec<TriangleNormalPair>,
    render_buffer: Vec<MeshVertex>,
    host_buffer: Vec<MeshVertex>,
    largest_vertex: Vector3,
}

impl MeshData {
    /// 由解析结果构建：逐面三角化，再把索引解析为交错缓冲
    pub fn from_records(records: ObjRecords) -> Result<Self, MeshLoadError> {
        let ObjRecords {
            vertices,
            normals,
            faces,
            largest_vertex,
        } = records;

        let triangle_total: usize = faces.iter().map(|f| f.len().saturating_sub(2)).sum();
        let mut triangles = Vec::with_capacity(triangle_total);
        // 每个三角形来自源文件的哪一行，用于报告越界索引
        let mut source_lines = Vec::with_capacity(triangle_total);

        for face in &faces {
            triangulate_face(&face.vertex_indices, &face.normal_indices, &mut triangles).map_err(
                |source| MeshLoadError::Triangulation {
                    line: face.line,
                    source,
                },
            )?;
            source_lines.resize(triangles.len(), face.line);
        }

        let render_buffer = build_render_buffer(&vertices, &normals, &triangles).map_err(|e| {
            MeshLoadError::IndexOutOfRange {
                line: source_lines[e.triangle],
                table: e.table,
                index: e.index as i64,
                len: e.len,
            }
        })?;

        Ok(Self {
            name: None,
            host_buffer: render_buffer.clone(),
            vertices,
            normals,
            triangles,
            render_buffer,
            largest_vertex,
        })
    }

    #[inline]
    pub fn vertices(&self) -> &[Vector3] {
        &self.vertices
    }

    #[inline]
    pub fn normals(&self) -> &[Vector3] {
        &self.normals
    }

    /// 三角形与法线索引对，按三角化顺序排列
    #[inline]
    pub fn triangle_pairs(&self) -> &[TriangleNormalPair] {
        &self.triangles
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// 绘制所需的顶点数（每个三角形 3 个角点）
    #[inline]
    pub fn corner_count(&self) -> usize {
        self.triangles.len() * CORNERS_PER_TRIANGLE
    }

    /// 未变换的交错渲染缓冲
    #[inline]
    pub fn render_buffer(&self) -> &[MeshVertex] {
        &self.render_buffer
    }

    /// 渲染缓冲的标量视图 `[x, y, z, nx, ny, nz, ...]`
    pub fn render_scalars(&self) -> &[f32] {
        bytemuck::cast_slice(&self.render_buffer)
    }

    /// 主机变换缓冲，GPU 上传使用的就是它
    #[inline]
    pub fn host_transform_buffer(&self) -> &[MeshVertex] {
        &self.host_buffer
    }

    pub fn host_transform_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.host_buffer)
    }

    /// 范数最大的顶点
    #[inline]
    pub fn largest_vertex(&self) -> Vector3 {
        self.largest_vertex
    }

    /// 归一化缩放系数 `1 / |largest_vertex|`
    ///
    /// 最大顶点位于原点时（所有顶点都在原点）返回 1.0。
    pub fn normalization_scale(&self) -> f32 {
        let norm = self.largest_vertex.norm();
        if norm > 0.0 {
            1.0 / norm
        } else {
            1.0
        }
    }

    /// CPU 变换：主机缓冲中的每个位置写为 `m · (p, 1)`（丢弃 w）
    ///
    /// 始终以原始渲染缓冲为输入，多次调用不会累积。
    /// 法线按原样复制，不做逆转置修正。
    pub fn apply_transform(&mut self, m: &Matrix4) {
        for (dst, src) in self.host_buffer.iter_mut().zip(&self.render_buffer) {
            let p = matrix::transform_position(m, &src.position_vector());
            dst.position = [p.x, p.y, p.z];
            dst.normal = src.normal;
        }
    }
}
