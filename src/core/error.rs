//! 错误处理模块
//!
//! 定义了 meshview 中使用的统一错误类型，使用 `thiserror` 提供友好的错误消息。
//!
//! # 错误分类
//!
//! - 资源错误：源文件缺失、不可读或为空（`MeshLoadError::FileNotFound` 等）
//! - 格式错误：数字或索引记号无效、面少于 3 个顶点（`MeshLoadError::Format`）
//! - 索引越界：面引用了表外的顶点或法线（`MeshLoadError::IndexOutOfRange`）
//! - 前置条件违例：例如在 `load` 之前调用 `render`（`GraphicsError::MeshNotLoaded`）
//!
//! 所有错误对所在的构建或 GPU 资源操作都是终止性的，不存在重试。

use std::fmt;
use std::path::PathBuf;

/// 统一的 Result 类型
pub type Result<T> = std::result::Result<T, MeshViewError>;

/// meshview 的顶层错误类型
#[derive(Debug, thiserror::Error)]
pub enum MeshViewError {
    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 图形 API 错误
    #[error("Graphics error: {0}")]
    Graphics(#[from] GraphicsError),

    /// 网格加载错误
    #[error("Mesh loading error: {0}")]
    MeshLoading(#[from] MeshLoadError),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 初始化错误
    #[error("Initialization error: {0}")]
    Initialization(String),
}

/// 配置相关的错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 配置文件未找到
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    /// 配置文件解析失败
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// 配置值无效
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 图形 API 相关的错误
#[derive(Debug, thiserror::Error)]
pub enum GraphicsError {
    /// 设备创建失败
    #[error("Device creation failed: {0}")]
    DeviceCreation(String),

    /// 交换链错误
    #[error("Swapchain error: {0}")]
    SwapchainError(String),

    /// 资源创建失败
    #[error("Resource creation failed: {0}")]
    ResourceCreation(String),

    /// 引用了不存在（或已释放）的顶点缓冲
    #[error("Unknown vertex buffer: {0}")]
    UnknownBuffer(u64),

    /// 在 `load` 之前调用了需要 GPU 资源的操作
    #[error("Mesh '{0}' has no GPU resources; call load() first")]
    MeshNotLoaded(String),
}

/// 面索引所引用的表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Vertex,
    Normal,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Vertex => write!(f, "vertex"),
            TableKind::Normal => write!(f, "normal"),
        }
    }
}

/// 单条记录的格式错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    /// 坐标分量不足三个
    #[error("expected 3 numeric components, found {found}")]
    MissingComponents { found: usize },

    /// 数字记号无法解析
    #[error("malformed number '{token}'")]
    MalformedNumber { token: String },

    /// 面记号缺少顶点索引
    #[error("face token '{token}' has no vertex index")]
    MissingVertexIndex { token: String },

    /// 面记号缺少法线索引
    #[error("face token '{token}' has no normal index")]
    MissingNormalIndex { token: String },

    /// 索引记号无法解析为整数
    #[error("malformed index in face token '{token}'")]
    MalformedIndex { token: String },

    /// 面的顶点数少于 3
    #[error("face has {found} vertices, at least 3 are required")]
    TooFewFaceVertices { found: usize },
}

/// 三角化过程中的前置条件违例
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriangulationError {
    /// 多边形顶点数少于 3
    #[error("polygon has {0} vertices, at least 3 are required")]
    TooFewVertices(usize),

    /// 顶点索引列表与法线索引列表长度不一致
    #[error("vertex index list has {vertices} entries but normal index list has {normals}")]
    LengthMismatch { vertices: usize, normals: usize },

    /// 扇形遍历产生了多边形范围之外的位置
    #[error("fan walk produced position {position} outside polygon of {len} vertices")]
    PositionOutOfRange { position: usize, len: usize },
}

/// 网格加载相关的错误
#[derive(Debug, thiserror::Error)]
pub enum MeshLoadError {
    /// 文件不存在
    #[error("Mesh file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// 文件无法读取
    #[error("Failed to read mesh file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 不支持的文件格式
    #[error("Unsupported mesh format: {0}")]
    UnsupportedFormat(String),

    /// 源内容为空
    #[error("Mesh source is empty")]
    EmptySource,

    /// 内存中的源不是有效的 UTF-8
    #[error("Mesh source is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// 记录格式错误
    #[error("line {line}: {kind}")]
    Format { line: usize, kind: FormatError },

    /// 源中没有任何顶点记录
    #[error("Mesh source contains no vertex records")]
    NoVertices,

    /// 面索引越界
    #[error("line {line}: {table} index {index} out of range (table has {len} entries)")]
    IndexOutOfRange {
        line: usize,
        table: TableKind,
        index: i64,
        len: usize,
    },

    /// 三角化前置条件违例
    #[error("line {line}: {source}")]
    Triangulation {
        line: usize,
        #[source]
        source: TriangulationError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_message_carries_line() {
        let err = MeshLoadError::Format {
            line: 7,
            kind: FormatError::TooFewFaceVertices { found: 2 },
        };
        assert_eq!(
            err.to_string(),
            "line 7: face has 2 vertices, at least 3 are required"
        );
    }

    #[test]
    fn test_index_range_message() {
        let err = MeshLoadError::IndexOutOfRange {
            line: 3,
            table: TableKind::Normal,
            index: 9,
            len: 4,
        };
        assert!(err.to_string().contains("normal index 9"));
    }

    #[test]
    fn test_conversion_into_top_level() {
        let err: MeshViewError = MeshLoadError::EmptySource.into();
        assert!(matches!(err, MeshViewError::MeshLoading(MeshLoadError::EmptySource)));
    }
}
