//! 配置管理模块
//!
//! 提供查看器配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [window]
//! width = 800
//! height = 600
//! title = "meshview"
//!
//! [graphics]
//! vsync = true
//! shading = "phong"       # flat, gouraud, phong, depth
//! transform_mode = "gpu"  # gpu 或 cpu
//!
//! [model]
//! path = "data/prism.obj"
//! light_cube = "data/cube.obj"
//!
//! [controls]
//! rotation_strength = 0.02
//!
//! [logging]
//! level = "info"          # trace, debug, info, warn, error
//! file_output = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, Result};

/// 查看器配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 窗口配置
    #[serde(default)]
    pub window: WindowConfig,

    /// 图形配置
    #[serde(default)]
    pub graphics: GraphicsConfig,

    /// 模型配置
    #[serde(default)]
    pub model: ModelConfig,

    /// 变换控制配置
    #[serde(default)]
    pub controls: ControlsConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 窗口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_resizable")]
    pub resizable: bool,
}

/// 图形配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsConfig {
    /// 垂直同步
    #[serde(default = "default_vsync")]
    pub vsync: bool,

    /// 着色模型
    #[serde(default)]
    pub shading: ShadingModel,

    /// 模型变换在 CPU 还是 GPU 上计算
    #[serde(default)]
    pub transform_mode: TransformMode,

    /// 清屏颜色 (RGBA)
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],
}

/// 着色模型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadingModel {
    Flat,
    Gouraud,
    #[default]
    Phong,
    /// 深度可视化
    Depth,
}

/// 模型变换的计算位置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformMode {
    /// 模型矩阵作为 uniform 上传，由顶点着色器变换
    #[default]
    Gpu,
    /// 每帧在 CPU 上变换顶点位置并重新上传
    Cpu,
}

/// 模型配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// OBJ 源文件路径
    #[serde(default = "default_model_path")]
    pub path: String,

    /// 光源立方体的 OBJ 路径
    #[serde(default = "default_light_cube")]
    pub light_cube: String,

    /// 物体颜色 (RGB)
    #[serde(default = "default_object_color")]
    pub object_color: [f32; 3],
}

/// 变换控制的初始强度
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsConfig {
    /// 每帧旋转角度（度）
    #[serde(default = "default_rotation_strength")]
    pub rotation_strength: f32,

    /// 每帧平移距离
    #[serde(default = "default_translation_strength")]
    pub translation_strength: f32,

    /// 每帧缩放增量
    #[serde(default = "default_scale_strength")]
    pub scale_strength: f32,

    /// 加速/减速按键的倍率
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f32,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    #[serde(default = "default_file_output")]
    pub file_output: bool,

    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// 提示输入中选择默认模型的关键字
pub const DEFAULT_MODEL_KEYWORD: &str = "DEFAULT";

// 默认值函数
fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }
fn default_title() -> String { "meshview".to_string() }
fn default_resizable() -> bool { true }
fn default_vsync() -> bool { true }
fn default_clear_color() -> [f32; 4] { [0.2, 0.2, 0.3, 1.0] }
fn default_model_path() -> String { "data/prism.obj".to_string() }
fn default_light_cube() -> String { "data/cube.obj".to_string() }
fn default_object_color() -> [f32; 3] { [1.0, 0.5, 0.5] }
fn default_rotation_strength() -> f32 { 0.02 }
fn default_translation_strength() -> f32 { 0.0001 }
fn default_scale_strength() -> f32 { 0.00025 }
fn default_speed_multiplier() -> f32 { 1.5 }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "meshview.log".to_string() }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
            resizable: default_resizable(),
        }
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            vsync: default_vsync(),
            shading: ShadingModel::default(),
            transform_mode: TransformMode::default(),
            clear_color: default_clear_color(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            light_cube: default_light_cube(),
            object_color: default_object_color(),
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            rotation_strength: default_rotation_strength(),
            translation_strength: default_translation_strength(),
            scale_strength: default_scale_strength(),
            speed_multiplier: default_speed_multiplier(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// ```no_run
    /// use meshview::core::Config;
    ///
    /// let config = Config::from_file("config.toml")?;
    /// # Ok::<(), meshview::core::MeshViewError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在或无效则使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 从命令行参数覆盖配置
    ///
    /// 支持的参数：
    /// - `--model <path>`: OBJ 文件（`DEFAULT` 选择默认模型，缺少扩展名时补全 `.obj`）
    /// - `--shading <flat|gouraud|phong|depth>`: 着色模型
    /// - `--cpu`: 在 CPU 上计算模型变换
    /// - `--width <value>` / `--height <value>`: 窗口尺寸
    pub fn apply_args<I>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        if args.iter().any(|a| a == "--cpu") {
            self.graphics.transform_mode = TransformMode::Cpu;
        }

        if let Some(model) = flag_value(&args, "--model") {
            self.model.path = resolve_model_path(model);
        }

        if let Some(shading) = flag_value(&args, "--shading") {
            self.graphics.shading = shading.parse()?;
        }

        if let Some(width) = flag_value(&args, "--width").and_then(|w| w.parse().ok()) {
            self.window.width = width;
        }

        if let Some(height) = flag_value(&args, "--height").and_then(|h| h.parse().ok()) {
            self.window.height = height;
        }

        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window.width/height".to_string(),
                reason: "Window dimensions must be greater than 0".to_string(),
            }.into());
        }

        let strengths = [
            ("controls.rotation_strength", self.controls.rotation_strength),
            ("controls.translation_strength", self.controls.translation_strength),
            ("controls.scale_strength", self.controls.scale_strength),
        ];
        for (field, value) in strengths {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("must be a positive finite number, got {}", value),
                }.into());
            }
        }

        if !(self.controls.speed_multiplier > 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "controls.speed_multiplier".to_string(),
                reason: "must be greater than 1".to_string(),
            }.into());
        }

        Ok(())
    }
}

impl std::str::FromStr for ShadingModel {
    type Err = ConfigError;

    /// 接受名称或查看器提示中的编号（1-4）
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "flat" => Ok(ShadingModel::Flat),
            "2" | "gouraud" => Ok(ShadingModel::Gouraud),
            "3" | "phong" => Ok(ShadingModel::Phong),
            "4" | "depth" => Ok(ShadingModel::Depth),
            other => Err(ConfigError::InvalidValue {
                field: "graphics.shading".to_string(),
                reason: format!("unknown shading model '{}'", other),
            }),
        }
    }
}

impl ShadingModel {
    /// 获取着色模型名称
    pub fn name(&self) -> &'static str {
        match self {
            ShadingModel::Flat => "flat",
            ShadingModel::Gouraud => "gouraud",
            ShadingModel::Phong => "phong",
            ShadingModel::Depth => "depth",
        }
    }
}

impl TransformMode {
    /// 在 CPU 和 GPU 之间切换
    pub fn toggled(self) -> Self {
        match self {
            TransformMode::Gpu => TransformMode::Cpu,
            TransformMode::Cpu => TransformMode::Gpu,
        }
    }
}

/// 解析模型路径
///
/// `DEFAULT` 映射到默认模型；没有 `.obj` 的名称会补全扩展名。
pub fn resolve_model_path(input: &str) -> String {
    if input == DEFAULT_MODEL_KEYWORD {
        return default_model_path();
    }
    if input.contains(".obj") {
        input.to_string()
    } else {
        format!("{}.obj", input)
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|idx| args.get(idx + 1))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.graphics.shading, ShadingModel::Phong);
        assert_eq!(config.graphics.transform_mode, TransformMode::Gpu);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.window.width = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.controls.speed_multiplier = 1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.controls.scale_strength = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        config
            .apply_args(["meshview", "--model", "teapot", "--shading", "2", "--cpu", "--width", "1024"])
            .unwrap();

        assert_eq!(config.model.path, "teapot.obj");
        assert_eq!(config.graphics.shading, ShadingModel::Gouraud);
        assert_eq!(config.graphics.transform_mode, TransformMode::Cpu);
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 600);
    }

    #[test]
    fn test_apply_args_rejects_unknown_shading() {
        let mut config = Config::default();
        assert!(config.apply_args(["--shading", "toon"]).is_err());
    }

    #[test]
    fn test_resolve_model_path() {
        assert_eq!(resolve_model_path("DEFAULT"), "data/prism.obj");
        assert_eq!(resolve_model_path("data/cube"), "data/cube.obj");
        assert_eq!(resolve_model_path("data/cube.obj"), "data/cube.obj");
    }

    #[test]
    fn test_default_models_ship_with_repository() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let model = ModelConfig::default();

        for path in [resolve_model_path(DEFAULT_MODEL_KEYWORD), model.path, model.light_cube] {
            let mesh = crate::geometry::loaders::load_mesh(&root.join(&path))
                .unwrap_or_else(|e| panic!("{}: {}", path, e));
            assert!(mesh.triangle_count() > 0);
        }
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [graphics]
            shading = "depth"

            [model]
            path = "data/bunny.obj"
            "#,
        )
        .unwrap();

        assert_eq!(config.graphics.shading, ShadingModel::Depth);
        assert_eq!(config.model.path, "data/bunny.obj");
        assert_eq!(config.model.light_cube, "data/cube.obj");
        assert_eq!(config.window.title, "meshview");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.graphics.shading = ShadingModel::Flat;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.graphics.shading, ShadingModel::Flat);
        assert!(Config::from_file(dir.path().join("missing.toml")).is_err());
    }
}
