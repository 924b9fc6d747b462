/// 多边形三角化模块
///
/// 把一个凸多边形面拆分为 N−2 个三角形。拆分按"两端交替"的扇形遍历进行：
///
/// 1. 第一个三角形取位置 (0, 1, 2)
/// 2. 之后每一步以上一个三角形的 (z, x) 作为前两个角点
/// 3. 第三个角点交替取低端（3, 4, ...）和高端（N−1, N−2, ...）的下一个位置，
///    从高端开始
///
/// 例如五边形得到 (0,1,2)、(2,0,4)、(4,2,3)。
/// 遍历在多边形的"位置"上进行，位置随后映射到面的顶点索引和法线索引。
/// 偶数步生成的三角形绕序与原多边形相反，渲染管线因此不做背面剔除。
use crate::core::error::TriangulationError;

/// 一个三角形的顶点索引及其对应的法线索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriangleNormalPair {
    pub triangle: [usize; 3],
    pub normals: [usize; 3],
}

/// 交替取端的方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parity {
    /// 下一步从高端取
    High,
    /// 下一步从低端取
    Low,
}

impl Parity {
    fn flip(self) -> Self {
        match self {
            Parity::High => Parity::Low,
            Parity::Low => Parity::High,
        }
    }
}

/// 扇形遍历状态机
///
/// 作为迭代器产出多边形内位置构成的三元组，共 `len - 2` 个。
#[derive(Debug, Clone)]
pub struct FanWalk {
    len: usize,
    prev: Option<[usize; 3]>,
    /// 低端下一个未使用的位置
    next_low: usize,
    /// 高端下一个未使用的位置
    next_high: usize,
    parity: Parity,
    remaining: usize,
}

impl FanWalk {
    pub fn new(len: usize) -> Result<Self, TriangulationError> {
        if len < 3 {
            return Err(TriangulationError::TooFewVertices(len));
        }

        Ok(Self {
            len,
            prev: None,
            next_low: 3,
            next_high: len - 1,
            parity: Parity::High,
            remaining: len - 2,
        })
    }

    /// 多边形顶点数
    #[inline]
    pub fn polygon_len(&self) -> usize {
        self.len
    }

    /// 从上一个三角形推出下一个三角形
    fn fan_step(&mut self, prev: [usize; 3]) -> [usize; 3] {
        let position = match self.parity {
            Parity::High => self.next_high,
            Parity::Low => {
                let p = self.next_low;
                self.next_low += 1;
                self.next_high -= 1;
                p
            }
        };
        self.parity = self.parity.flip();

        [prev[2], prev[0], position]
    }
}

impl Iterator for FanWalk {
    type Item = [usize; 3];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let triangle = match self.prev {
            None => [0, 1, 2],
            Some(prev) => self.fan_step(prev),
        };
        self.prev = Some(triangle);
        Some(triangle)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for FanWalk {}

/// 三角化一个面，把结果追加到 `out`
///
/// `vertex_indices` 与 `normal_indices` 按位置一一对应。
/// 出错时 `out` 保持调用前的长度。
pub fn triangulate_face(
    vertex_indices: &[usize],
    normal_indices: &[usize],
    out: &mut Vec<TriangleNormalPair>,
) -> Result<(), TriangulationError> {
    if vertex_indices.len() != normal_indices.len() {
        return Err(TriangulationError::LengthMismatch {
            vertices: vertex_indices.len(),
            normals: normal_indices.len(),
        });
    }

    let walk = FanWalk::new(vertex_indices.len())?;
    let len = walk.polygon_len();
    let start = out.len();
    out.reserve(walk.len());

    for positions in walk {
        if let Some(&position) = positions.iter().find(|&&p| p >= len) {
            out.truncate(start);
            return Err(TriangulationError::PositionOutOfRange { position, len });
        }

        out.push(TriangleNormalPair {
            triangle: positions.map(|p| vertex_indices[p]),
            normals: positions.map(|p| normal_indices[p]),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use std::collections::HashSet;

    fn walk(len: usize) -> Vec<[usize; 3]> {
        FanWalk::new(len).unwrap().collect()
    }

    #[test]
    fn test_triangle_is_passthrough() {
        assert_eq!(walk(3), vec![[0, 1, 2]]);
    }

    #[test]
    fn test_quad() {
        let mut out = Vec::new();
        triangulate_face(&[0, 1, 2, 3], &[0, 0, 0, 0], &mut out).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].triangle, [0, 1, 2]);
        assert_eq!(out[1].triangle, [2, 0, 3]);
    }

    #[test]
    fn test_pentagon_and_hexagon() {
        assert_eq!(walk(5), vec![[0, 1, 2], [2, 0, 4], [4, 2, 3]]);
        assert_eq!(walk(6), vec![[0, 1, 2], [2, 0, 5], [5, 2, 3], [3, 5, 4]]);
    }

    #[test]
    fn test_positions_map_to_face_indices() {
        let mut out = Vec::new();
        triangulate_face(&[10, 11, 12, 13], &[20, 21, 22, 23], &mut out).unwrap();

        assert_eq!(
            out[1],
            TriangleNormalPair {
                triangle: [12, 10, 13],
                normals: [22, 20, 23],
            }
        );
    }

    #[test]
    fn test_appends_after_existing_pairs() {
        let mut out = Vec::new();
        triangulate_face(&[0, 1, 2], &[0, 1, 2], &mut out).unwrap();
        triangulate_face(&[3, 4, 5, 6], &[3, 4, 5, 6], &mut out).unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].triangle, [0, 1, 2]);
        assert_eq!(out[1].triangle, [3, 4, 5]);
    }

    #[test]
    fn test_rejects_degenerate_polygon() {
        let mut out = Vec::new();
        assert_eq!(
            triangulate_face(&[0, 1], &[0, 1], &mut out),
            Err(TriangulationError::TooFewVertices(2))
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let mut out = Vec::new();
        assert_eq!(
            triangulate_face(&[0, 1, 2], &[0, 1], &mut out),
            Err(TriangulationError::LengthMismatch { vertices: 3, normals: 2 })
        );
    }

    #[quickcheck]
    fn prop_triangle_count(n: u8) -> bool {
        let len = n as usize % 64 + 3;
        let mut out = Vec::new();
        let indices: Vec<usize> = (0..len).collect();
        triangulate_face(&indices, &indices, &mut out).is_ok() && out.len() == len - 2
    }

    #[quickcheck]
    fn prop_every_position_used_and_in_range(n: u8) -> bool {
        let len = n as usize % 64 + 3;
        let mut seen = HashSet::new();
        for tri in walk(len) {
            if tri.iter().any(|&p| p >= len) {
                return false;
            }
            seen.extend(tri);
        }
        seen.len() == len
    }

    #[quickcheck]
    fn prop_triangles_are_non_degenerate(n: u8) -> bool {
        let len = n as usize % 64 + 3;
        walk(len)
            .iter()
            .all(|t| t[0] != t[1] && t[1] != t[2] && t[0] != t[2])
    }

    /// 对凸多边形，三角形面积（取绝对值）之和等于多边形面积
    #[quickcheck]
    fn prop_covers_regular_polygon(n: u8) -> bool {
        let len = n as usize % 32 + 3;
        let corner = |i: usize| {
            let angle = std::f64::consts::TAU * i as f64 / len as f64;
            (angle.cos(), angle.sin())
        };
        let area = |t: [usize; 3]| {
            let (a, b, c) = (corner(t[0]), corner(t[1]), corner(t[2]));
            ((b.0 - a.0) * (c.1 - a.1) - (c.0 - a.0) * (b.1 - a.1)).abs() / 2.0
        };

        let polygon = len as f64 / 2.0 * (std::f64::consts::TAU / len as f64).sin();
        let covered: f64 = walk(len).into_iter().map(area).sum();
        (covered - polygon).abs() < 1e-9
    }
}
