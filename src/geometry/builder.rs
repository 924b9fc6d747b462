/// 交错渲染缓冲构建
///
/// 对每个三角形的每个角点，查表得到位置和法线，按三角形顺序写成
/// `[x, y, z, nx, ny, nz]`。
use crate::core::error::TableKind;
use crate::geometry::triangulate::TriangleNormalPair;
use crate::geometry::vertex::{MeshVertex, CORNERS_PER_TRIANGLE};
use crate::math::Vector3;

/// 三角形引用了表外的条目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnresolvedIndex {
    /// 出错三角形在三角形序列中的下标
    pub triangle: usize,
    pub table: TableKind,
    pub index: usize,
    pub len: usize,
}

fn lookup(
    table: &[Vector3],
    kind: TableKind,
    index: usize,
    triangle: usize,
) -> Result<&Vector3, UnresolvedIndex> {
    table.get(index).ok_or(UnresolvedIndex {
        triangle,
        table: kind,
        index,
        len: table.len(),
    })
}

/// 生成交错渲染缓冲
///
/// 输出长度恰好为 `3 × pairs.len()` 个顶点。
pub fn build_render_buffer(
    vertices: &[Vector3],
    normals: &[Vector3],
    pairs: &[TriangleNormalPair],
) -> Result<Vec<MeshVertex>, UnresolvedIndex> {
    let mut buffer = Vec::with_capacity(pairs.len() * CORNERS_PER_TRIANGLE);

    for (triangle, pair) in pairs.iter().enumerate() {
        for corner in 0..CORNERS_PER_TRIANGLE {
            let position = lookup(vertices, TableKind::Vertex, pair.triangle[corner], triangle)?;
            let normal = lookup(normals, TableKind::Normal, pair.normals[corner], triangle)?;
            buffer.push(MeshVertex::from_vectors(position, normal));
        }
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(triangle: [usize; 3], normals: [usize; 3]) -> TriangleNormalPair {
        TriangleNormalPair { triangle, normals }
    }

    #[test]
    fn test_interleaves_in_triangle_order() {
        let vertices = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        let normals = vec![Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, -1.0)];

        let buffer =
            build_render_buffer(&vertices, &normals, &[pair([2, 1, 0], [1, 0, 1])]).unwrap();

        // 每个角点：位置 xyz，法线 xyz
        #[rustfmt::skip]
        let expected: [f32; 18] = [
            0.0, 1.0, 0.0,  0.0, 0.0, -1.0,
            1.0, 0.0, 0.0,  0.0, 0.0,  1.0,
            0.0, 0.0, 0.0,  0.0, 0.0, -1.0,
        ];

        let floats: &[f32] = bytemuck::cast_slice(&buffer);
        assert_eq!(floats, &expected);
    }

    #[test]
    fn test_empty_pairs_give_empty_buffer() {
        let buffer = build_render_buffer(&[Vector3::zeros()], &[], &[]).unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_reports_out_of_range_normal() {
        let vertices = vec![Vector3::zeros(); 3];
        let normals = vec![Vector3::z(); 1];
        let pairs = [pair([0, 1, 2], [0, 0, 0]), pair([0, 1, 2], [0, 4, 0])];

        assert_eq!(
            build_render_buffer(&vertices, &normals, &pairs),
            Err(UnresolvedIndex {
                triangle: 1,
                table: TableKind::Normal,
                index: 4,
                len: 1,
            })
        );
    }
}
