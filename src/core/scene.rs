//! 场景模块
//!
//! 场景持有被查看的模型、光源立方体以及驱动它们的相机、光源和变换控制，
//! 并按当前的变换模式把一帧录制到任意 [`FrameRecorder`] 上。
//!
//! 每帧的绘制顺序：
//!
//! ```text
//! begin_frame
//!   set_object(Object(着色模型), 模型矩阵或单位矩阵) → 模型
//!   set_object(Light, 光源标记矩阵)                  → 光源立方体
//! ```

use tracing::{debug, info};

use crate::component::{Camera, PointLight};
use crate::core::config::{Config, ShadingModel, TransformMode};
use crate::core::error::Result;
use crate::core::input::TransformControls;
use crate::math::Matrix4;
use crate::renderer::device::{FrameRecorder, GpuDevice};
use crate::renderer::frame::{FrameContext, PipelineKind};
use crate::renderer::mesh::Mesh;

/// 可渲染的场景
#[derive(Debug)]
pub struct Scene {
    model: Mesh,
    light_cube: Mesh,
    controls: TransformControls,
    camera: Camera,
    light: PointLight,
    shading: ShadingModel,
    object_color: [f32; 3],
    clear_color: [f32; 4],
    /// 模型缓冲当前是否保存着 CPU 变换后的位置
    cpu_transformed: bool,
}

impl Scene {
    /// 根据配置组装场景，此时还不占用 GPU 资源
    pub fn new(config: &Config, model: Mesh, light_cube: Mesh, aspect: f32) -> Self {
        let controls = TransformControls::new(
            &config.controls,
            config.graphics.shading,
            config.graphics.transform_mode,
            model.normalization_scale(),
        );

        Self {
            model,
            light_cube,
            controls,
            camera: Camera::main_camera(aspect),
            light: PointLight::default(),
            shading: config.graphics.shading,
            object_color: config.model.object_color,
            clear_color: config.graphics.clear_color,
            cpu_transformed: false,
        }
    }

    pub fn model(&self) -> &Mesh {
        &self.model
    }

    pub fn light_cube(&self) -> &Mesh {
        &self.light_cube
    }

    pub fn controls(&self) -> &TransformControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut TransformControls {
        &mut self.controls
    }

    pub fn shading(&self) -> ShadingModel {
        self.shading
    }

    /// 窗口尺寸变化时更新投影
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    /// 上传模型和光源立方体
    pub fn load<D: GpuDevice + ?Sized>(&mut self, device: &mut D) -> Result<()> {
        self.model.load(device)?;
        self.light_cube.load(device)?;

        info!(
            model = self.model.label(),
            triangles = self.model.data().triangle_count(),
            shading = self.shading.name(),
            "Scene loaded"
        );
        Ok(())
    }

    /// 释放两个网格的 GPU 资源
    pub fn unload<D: GpuDevice + ?Sized>(&mut self, device: &mut D) -> Result<()> {
        self.model.unload(device)?;
        self.light_cube.unload(device)?;
        Ok(())
    }

    /// 录制一帧
    ///
    /// GPU 模式下模型矩阵作为 uniform 上传；CPU 模式下先在主机上变换顶点
    /// 再重新上传，uniform 使用单位矩阵。从 CPU 模式切回时把缓冲恢复为
    /// 未变换的位置。
    pub fn render<R: FrameRecorder + ?Sized>(&mut self, recorder: &mut R) -> Result<()> {
        recorder.begin_frame(&FrameContext::new(
            &self.camera,
            self.light,
            self.object_color,
            self.clear_color,
        ));

        let model_matrix = self.controls.model_matrix();
        let uniform_model = match self.controls.mode() {
            TransformMode::Cpu => {
                self.model.apply_transform(&model_matrix, recorder)?;
                self.cpu_transformed = true;
                Matrix4::identity()
            }
            TransformMode::Gpu => {
                if self.cpu_transformed {
                    debug!("Restoring untransformed vertex buffer");
                    self.model.apply_transform(&Matrix4::identity(), recorder)?;
                    self.cpu_transformed = false;
                }
                model_matrix
            }
        };

        recorder.set_object(PipelineKind::Object(self.shading), &uniform_model);
        self.model.render(recorder)?;

        let marker = self
            .light
            .marker_matrix(self.light_cube.normalization_scale());
        recorder.set_object(PipelineKind::Light, &marker);
        self.light_cube.render(recorder)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::MeshViewError;
    use crate::core::input::ControlAction;
    use crate::geometry::loaders::ObjLoader;
    use crate::geometry::MeshVertex;
    use crate::renderer::device::recording::RecordingDevice;

    const TRIANGLE: &str = "\
v 0 0 0
v 2 0 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1
";

    const CUBE_CORNER: &str = "\
v 1 1 1
v -1 1 1
v -1 -1 1
v 1 -1 1
vn 0 0 1
f 1//1 2//1 3//1 4//1
";

    fn scene(mode: TransformMode) -> Scene {
        let mut config = Config::default();
        config.graphics.transform_mode = mode;
        let model = Mesh::new(ObjLoader::load_from_str(TRIANGLE).unwrap());
        let cube = Mesh::new(ObjLoader::load_from_str(CUBE_CORNER).unwrap());
        Scene::new(&config, model, cube, 4.0 / 3.0)
    }

    fn positions(device: &RecordingDevice, scene: &Scene) -> Vec<[f32; 3]> {
        let id = device.draws[0].0;
        let bytes = device.contents(id).unwrap();
        bytemuck::pod_collect_to_vec::<u8, MeshVertex>(bytes)
            .iter()
            .map(|v| v.position)
            .take(scene.model().data().corner_count())
            .collect()
    }

    #[test]
    fn test_render_before_load_fails() {
        let mut device = RecordingDevice::new();
        let mut scene = scene(TransformMode::Gpu);

        let err = scene.render(&mut device).unwrap_err();
        assert!(matches!(err, MeshViewError::Graphics(_)));
    }

    #[test]
    fn test_gpu_mode_uploads_model_matrix() {
        let mut device = RecordingDevice::new();
        let mut scene = scene(TransformMode::Gpu);
        scene.load(&mut device).unwrap();
        scene.render(&mut device).unwrap();

        assert_eq!(device.frames, 1);
        assert_eq!(device.objects.len(), 2);
        let (pipeline, model) = device.objects[0];
        assert_eq!(pipeline, PipelineKind::Object(scene.shading()));
        assert_eq!(model, scene.controls().model_matrix());
        assert_eq!(device.objects[1].0, PipelineKind::Light);

        // 模型 3 个角点，光源立方体一个四边形 6 个角点
        assert_eq!(device.draws.iter().map(|d| d.1).collect::<Vec<_>>(), vec![3, 6]);
        assert_eq!(device.writes, 0);
    }

    #[test]
    fn test_cpu_mode_transforms_on_host() {
        let mut device = RecordingDevice::new();
        let mut scene = scene(TransformMode::Cpu);
        scene.load(&mut device).unwrap();
        scene.render(&mut device).unwrap();

        assert_eq!(device.objects[0].1, Matrix4::identity());
        assert_eq!(device.writes, 1);

        // 最大顶点 (2,0,0) 被归一化缩放到单位长度
        let scaled = positions(&device, &scene);
        assert!((scaled[1][0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_switching_back_to_gpu_restores_buffer() {
        let mut device = RecordingDevice::new();
        let mut scene = scene(TransformMode::Cpu);
        scene.load(&mut device).unwrap();
        scene.render(&mut device).unwrap();

        scene.controls_mut().apply(ControlAction::ToggleTransformMode);
        device.draws.clear();
        scene.render(&mut device).unwrap();

        assert_eq!(device.writes, 2);
        assert_eq!(positions(&device, &scene)[1], [2.0, 0.0, 0.0]);

        // 之后的 GPU 帧不再改写缓冲
        device.draws.clear();
        scene.render(&mut device).unwrap();
        assert_eq!(device.writes, 2);
    }

    #[test]
    fn test_light_marker_uses_cube_scale() {
        let mut device = RecordingDevice::new();
        let mut scene = scene(TransformMode::Gpu);
        scene.load(&mut device).unwrap();
        scene.render(&mut device).unwrap();

        let expected = PointLight::default().marker_matrix(scene.light_cube().normalization_scale());
        assert_eq!(device.objects[1].1, expected);
    }

    #[test]
    fn test_unload_releases_everything() {
        let mut device = RecordingDevice::new();
        let mut scene = scene(TransformMode::Gpu);
        scene.load(&mut device).unwrap();
        assert_eq!(device.live_buffer_count(), 2);

        scene.unload(&mut device).unwrap();
        assert_eq!(device.live_buffer_count(), 0);
    }
}
