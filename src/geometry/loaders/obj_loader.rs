/// OBJ 文件加载器
///
/// 逐行读取 Wavefront OBJ 文本，按前两个字符对每行分类：
///
/// - `v ` 顶点位置，取前三个浮点数
/// - `vn` 顶点法线，取前三个浮点数
/// - `f ` 面，每个记号为 `v//vn` 或 `v/vt/vn`，纹理坐标索引被忽略
///
/// 其他行（注释、纹理坐标、分组、材质等）直接跳过。
/// 任何格式错误的记号都会中止加载，不做部分恢复。
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till1},
    character::complete::{i64 as signed_index, space0, space1},
    combinator::{all_consuming, value},
    multi::separated_list0,
    number::complete::float,
    sequence::preceded,
    IResult,
};
use std::path::Path;

use super::MeshLoader;
use crate::core::error::{FormatError, MeshLoadError, Result, TableKind};
use crate::geometry::mesh::MeshData;
use crate::math::Vector3;

/// 单行记录的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordKind {
    Vertex,
    Normal,
    Face,
}

/// 一个多边形面：有序的（顶点索引，法线索引）对，索引已转换为 0 起始
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceRecord {
    /// 源文件中的行号（1 起始）
    pub line: usize,
    pub vertex_indices: Vec<usize>,
    pub normal_indices: Vec<usize>,
}

impl FaceRecord {
    #[inline]
    pub fn len(&self) -> usize {
        self.vertex_indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertex_indices.is_empty()
    }
}

/// 记录解析的结果：顶点表、法线表和面列表
#[derive(Debug, Clone)]
pub struct ObjRecords {
    pub vertices: Vec<Vector3>,
    pub normals: Vec<Vector3>,
    pub faces: Vec<FaceRecord>,
    /// 欧几里得范数最大的顶点（相同范数时取最先出现的）
    pub largest_vertex: Vector3,
}

/// OBJ 格式加载器
///
/// ```rust,no_run
/// use meshview::geometry::loaders::{MeshLoader, ObjLoader};
/// use std::path::Path;
///
/// let mesh = ObjLoader::load_from_file(Path::new("data/cube.obj"))?;
/// println!("{} 个三角形", mesh.triangle_count());
/// # Ok::<(), meshview::core::MeshViewError>(())
/// ```
pub struct ObjLoader;

impl ObjLoader {
    /// 解析 OBJ 源文本，得到顶点表、法线表和面记录
    ///
    /// 面索引只做 1 起始到 0 起始的转换和正数检查；
    /// 上界检查在几何构建阶段完成，因此面可以引用文件中后出现的记录。
    pub fn parse_records(source: &str) -> std::result::Result<ObjRecords, MeshLoadError> {
        if source.trim().is_empty() {
            return Err(MeshLoadError::EmptySource);
        }

        let mut vertices = Vec::new();
        let mut normals = Vec::new();
        let mut faces = Vec::new();
        let mut largest: Option<(Vector3, f32)> = None;

        for (idx, line) in source.lines().enumerate() {
            let line_no = idx + 1;
            let format_err = |kind| MeshLoadError::Format { line: line_no, kind };

            let (rest, kind) = match record_kind(line) {
                Ok(parsed) => parsed,
                Err(_) => {
                    tracing::trace!(line = line_no, "skipping unsupported record");
                    continue;
                }
            };

            match kind {
                RecordKind::Vertex => {
                    let vertex = parse_vector3(rest).map_err(format_err)?;
                    let norm = vertex.norm();
                    if largest.map_or(true, |(_, best)| norm > best) {
                        largest = Some((vertex, norm));
                    }
                    vertices.push(vertex);
                }
                RecordKind::Normal => {
                    normals.push(parse_vector3(rest).map_err(format_err)?);
                }
                RecordKind::Face => {
                    faces.push(parse_face(rest, line_no, vertices.len(), normals.len())?);
                }
            }
        }

        let (largest_vertex, _) = largest.ok_or(MeshLoadError::NoVertices)?;

        tracing::debug!(
            vertices = vertices.len(),
            normals = normals.len(),
            faces = faces.len(),
            "OBJ records parsed"
        );

        Ok(ObjRecords {
            vertices,
            normals,
            faces,
            largest_vertex,
        })
    }

    /// 从文本构建完整的网格数据
    pub fn load_from_str(source: &str) -> Result<MeshData> {
        let records = Self::parse_records(source)?;
        Ok(MeshData::from_records(records)?)
    }
}

impl MeshLoader for ObjLoader {
    fn load_from_file(path: &Path) -> Result<MeshData> {
        let source = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => MeshLoadError::FileNotFound(path.to_path_buf()),
            _ => MeshLoadError::Unreadable {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let mut mesh = Self::load_from_str(&source)?;
        mesh.name = path.file_stem().and_then(|s| s.to_str()).map(str::to_string);

        tracing::info!(
            path = %path.display(),
            vertices = mesh.vertices().len(),
            normals = mesh.normals().len(),
            triangles = mesh.triangle_count(),
            "成功加载 OBJ 文件"
        );

        Ok(mesh)
    }

    fn load_from_memory(data: &[u8]) -> Result<MeshData> {
        let source = std::str::from_utf8(data).map_err(MeshLoadError::from)?;
        Self::load_from_str(source)
    }

    fn supported_extensions() -> &'static [&'static str] {
        &["obj"]
    }
}

fn record_kind(line: &str) -> IResult<&str, RecordKind> {
    alt((
        value(RecordKind::Vertex, tag("v ")),
        value(RecordKind::Normal, tag("vn")),
        value(RecordKind::Face, tag("f ")),
    ))(line)
}

/// 以空白分隔的记号列表
fn tokens(input: &str) -> IResult<&str, Vec<&str>> {
    preceded(
        space0,
        separated_list0(space1, take_till1(|c: char| c.is_ascii_whitespace())),
    )(input)
}

fn split_tokens(input: &str) -> Vec<&str> {
    tokens(input).map(|(_, list)| list).unwrap_or_default()
}

/// 有限浮点数；`nan`、`inf` 等记号按格式错误处理
fn parse_number(token: &str) -> std::result::Result<f32, FormatError> {
    let parsed: IResult<&str, f32> = all_consuming(float)(token);
    parsed
        .ok()
        .map(|(_, n)| n)
        .filter(|n| n.is_finite())
        .ok_or_else(|| FormatError::MalformedNumber {
            token: token.to_string(),
        })
}

/// 取前三个数值分量，忽略其后的字段（如可选的 w）
fn parse_vector3(input: &str) -> std::result::Result<Vector3, FormatError> {
    let fields = split_tokens(input);
    if fields.len() < 3 {
        return Err(FormatError::MissingComponents { found: fields.len() });
    }

    Ok(Vector3::new(
        parse_number(fields[0])?,
        parse_number(fields[1])?,
        parse_number(fields[2])?,
    ))
}

fn parse_index(field: &str, token: &str) -> std::result::Result<i64, FormatError> {
    let parsed: IResult<&str, i64> = all_consuming(signed_index)(field);
    parsed.map(|(_, n)| n).map_err(|_| FormatError::MalformedIndex {
        token: token.to_string(),
    })
}

/// 把 1 起始的源索引转换为 0 起始；非正数视为越界
fn to_zero_based(
    raw: i64,
    line: usize,
    table: TableKind,
    seen: usize,
) -> std::result::Result<usize, MeshLoadError> {
    raw.checked_sub(1)
        .and_then(|i| usize::try_from(i).ok())
        .ok_or(MeshLoadError::IndexOutOfRange {
            line,
            table,
            index: raw.saturating_sub(1),
            len: seen,
        })
}

fn parse_face(
    input: &str,
    line: usize,
    vertices_seen: usize,
    normals_seen: usize,
) -> std::result::Result<FaceRecord, MeshLoadError> {
    let format_err = |kind| MeshLoadError::Format { line, kind };

    let fields = split_tokens(input);
    if fields.len() < 3 {
        return Err(format_err(FormatError::TooFewFaceVertices { found: fields.len() }));
    }

    let mut vertex_indices = Vec::with_capacity(fields.len());
    let mut normal_indices = Vec::with_capacity(fields.len());

    for token in fields {
        let mut parts = token.split('/');

        let vertex_field = parts.next().filter(|f| !f.is_empty()).ok_or_else(|| {
            format_err(FormatError::MissingVertexIndex { token: token.to_string() })
        })?;
        // 第二个字段是纹理坐标索引，不使用
        let normal_field = parts.nth(1).filter(|f| !f.is_empty()).ok_or_else(|| {
            format_err(FormatError::MissingNormalIndex { token: token.to_string() })
        })?;

        let vertex = parse_index(vertex_field, token).map_err(format_err)?;
        let normal = parse_index(normal_field, token).map_err(format_err)?;

        vertex_indices.push(to_zero_based(vertex, line, TableKind::Vertex, vertices_seen)?);
        normal_indices.push(to_zero_based(normal, line, TableKind::Normal, normals_seen)?);
    }

    Ok(FaceRecord {
        line,
        vertex_indices,
        normal_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const QUAD: &str = "\
# unit quad
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vt 0.5 0.5
vn 0.0 0.0 1.0
f 1//1 2//1 3//1 4//1
";

    #[test]
    fn test_supported_extensions() {
        assert_eq!(ObjLoader::supported_extensions(), &["obj"]);
    }

    #[test]
    fn test_parse_tables_and_faces() {
        let records = ObjLoader::parse_records(QUAD).unwrap();

        assert_eq!(records.vertices.len(), 4);
        assert_eq!(records.normals, vec![Vector3::new(0.0, 0.0, 1.0)]);
        assert_eq!(records.faces.len(), 1);

        let face = &records.faces[0];
        assert_eq!(face.line, 8);
        assert_eq!(face.vertex_indices, vec![0, 1, 2, 3]);
        assert_eq!(face.normal_indices, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_texture_index_is_ignored() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvn 0 0 -1\nf 1/7/2 2/8/2 3/9/1\n";
        let records = ObjLoader::parse_records(src).unwrap();

        assert_eq!(records.faces[0].vertex_indices, vec![0, 1, 2]);
        assert_eq!(records.faces[0].normal_indices, vec![1, 1, 0]);
    }

    #[test]
    fn test_vertex_extra_fields_ignored() {
        let records = ObjLoader::parse_records("v 1 2 3 1.0\n").unwrap();
        assert_eq!(records.vertices[0], Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_largest_vertex_is_first_maximum() {
        let src = "v 1 0 0\nv 0 -3 0\nv 3 0 0\nv 0.5 0.5 0.5\n";
        let records = ObjLoader::parse_records(src).unwrap();
        assert_eq!(records.largest_vertex, Vector3::new(0.0, -3.0, 0.0));
    }

    #[test]
    fn test_unsupported_records_are_skipped() {
        let src = "o shark\ng body\ns off\nusemtl skin\nv 1 1 1\n\n#v 9 9 9\n";
        let records = ObjLoader::parse_records(src).unwrap();
        assert_eq!(records.vertices.len(), 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let src = "v 0 0 0\r\nv 1 0 0\r\nv 0 1 0\r\nvn 0 0 1\r\nf 1//1 2//1 3//1\r\n";
        let records = ObjLoader::parse_records(src).unwrap();
        assert_eq!(records.faces[0].normal_indices, vec![0, 0, 0]);
    }

    #[test]
    fn test_empty_source_rejected() {
        assert!(matches!(
            ObjLoader::parse_records(""),
            Err(MeshLoadError::EmptySource)
        ));
        assert!(matches!(
            ObjLoader::parse_records("  \n\n"),
            Err(MeshLoadError::EmptySource)
        ));
    }

    #[test]
    fn test_source_without_vertices_rejected() {
        assert!(matches!(
            ObjLoader::parse_records("# nothing here\nvn 0 0 1\n"),
            Err(MeshLoadError::NoVertices)
        ));
    }

    #[test]
    fn test_short_vertex_rejected() {
        let err = ObjLoader::parse_records("v 1.0 2.0\n").unwrap_err();
        assert!(matches!(
            err,
            MeshLoadError::Format {
                line: 1,
                kind: FormatError::MissingComponents { found: 2 }
            }
        ));
    }

    #[test]
    fn test_malformed_number_rejected() {
        let err = ObjLoader::parse_records("v 0 0 0\nvn 0 abc 1\n").unwrap_err();
        assert!(matches!(
            err,
            MeshLoadError::Format {
                line: 2,
                kind: FormatError::MalformedNumber { .. }
            }
        ));
    }

    #[test]
    fn test_two_token_face_rejected() {
        let err = ObjLoader::parse_records("v 0 0 0\nv 1 0 0\nvn 0 0 1\nf 1//1 2//1\n").unwrap_err();
        assert!(matches!(
            err,
            MeshLoadError::Format {
                line: 4,
                kind: FormatError::TooFewFaceVertices { found: 2 }
            }
        ));
    }

    #[test]
    fn test_face_without_normal_rejected() {
        let err = ObjLoader::parse_records("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(
            err,
            MeshLoadError::Format {
                kind: FormatError::MissingNormalIndex { .. },
                ..
            }
        ));

        let err = ObjLoader::parse_records("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/1 2/2 3/3\n").unwrap_err();
        assert!(matches!(
            err,
            MeshLoadError::Format {
                kind: FormatError::MissingNormalIndex { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_index_rejected() {
        let err = ObjLoader::parse_records("v 0 0 0\nvn 0 0 1\nf 1//1 x//1 1//1\n").unwrap_err();
        assert!(matches!(
            err,
            MeshLoadError::Format {
                kind: FormatError::MalformedIndex { .. },
                ..
            }
        ));

        let err = ObjLoader::parse_records("v 0 0 0\nvn 0 0 1\nf /1/1 1//1 1//1\n").unwrap_err();
        assert!(matches!(
            err,
            MeshLoadError::Format {
                kind: FormatError::MissingVertexIndex { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_non_positive_index_rejected() {
        let err = ObjLoader::parse_records("v 0 0 0\nvn 0 0 1\nf 0//1 1//1 1//1\n").unwrap_err();
        assert!(matches!(
            err,
            MeshLoadError::IndexOutOfRange {
                line: 3,
                table: TableKind::Vertex,
                index: -1,
                ..
            }
        ));

        let err = ObjLoader::parse_records("v 0 0 0\nvn 0 0 1\nf 1//-1 1//1 1//1\n").unwrap_err();
        assert!(matches!(
            err,
            MeshLoadError::IndexOutOfRange {
                table: TableKind::Normal,
                ..
            }
        ));
    }

    #[test]
    fn test_most_negative_index_rejected() {
        let err = ObjLoader::parse_records(
            "v 0 0 0\nvn 0 0 1\nf -9223372036854775808//1 1//1 1//1\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MeshLoadError::IndexOutOfRange {
                line: 3,
                table: TableKind::Vertex,
                index: i64::MIN,
                ..
            }
        ));
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        let sources = [
            "v nan 0 0\nv 5 0 0\n",
            "v 0 inf 0\n",
            "v 1 0 0\nvn inf 0 0\n",
            "v 0 0 -infinity\n",
        ];
        for source in sources {
            let err = ObjLoader::parse_records(source).unwrap_err();
            assert!(
                matches!(
                    err,
                    MeshLoadError::Format {
                        kind: FormatError::MalformedNumber { .. },
                        ..
                    }
                ),
                "{:?} accepted",
                source
            );
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ObjLoader::load_from_file(Path::new("nonexistent.obj"));
        assert!(matches!(
            result,
            Err(crate::core::MeshViewError::MeshLoading(MeshLoadError::FileNotFound(_)))
        ));
    }

    #[test]
    fn test_load_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = ObjLoader::load_from_file(file.path());
        assert!(matches!(
            result,
            Err(crate::core::MeshViewError::MeshLoading(MeshLoadError::EmptySource))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
        file.write_all(QUAD.as_bytes()).unwrap();

        let mesh = ObjLoader::load_from_file(file.path()).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.name.is_some());
    }

    #[test]
    fn test_load_from_memory() {
        let mesh = ObjLoader::load_from_memory(QUAD.as_bytes()).unwrap();
        assert_eq!(mesh.triangle_count(), 2);

        assert!(ObjLoader::load_from_memory(&[0xff, 0xfe, 0x00]).is_err());
    }
}
