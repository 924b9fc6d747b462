//! wgpu 渲染器实现
//!
//! 本模块实现了基于 wgpu 的渲染器，包括：
//! - 每种着色模型一条渲染管线，外加光源管线
//! - 顶点缓冲管理（实现 `GpuDevice`）
//! - 每帧的 uniform 写入与单个渲染通道提交
//!
//! 一帧的调用顺序：
//!
//! ```text
//! begin_frame → (set_object → Mesh::render)* → end_frame
//! ```

use std::collections::HashMap;
use tracing::{debug, info};
use wgpu::util::DeviceExt;

use crate::core::Config;
use crate::core::error::{Result, GraphicsError};
use crate::geometry::vertex::{MeshVertex, VertexLayout};
use crate::gfx::wgpu::backend::WgpuBackend;
use crate::math::Matrix4;
use crate::renderer::device::{FrameRecorder, GpuDevice, VertexBufferId};
use crate::renderer::frame::{FrameContext, FrameUniforms, ObjectUniforms, PipelineKind};
use crate::{engine_info, engine_warn};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// 设备端的顶点缓冲
struct GpuVertexBuffer {
    buffer: wgpu::Buffer,
    size: u64,
}

/// 一组绘制的模型 uniform
struct ObjectSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// 录制到当前帧的绘制
#[derive(Debug, Clone, Copy)]
struct PendingDraw {
    pipeline: PipelineKind,
    slot: usize,
    buffer: VertexBufferId,
    vertex_count: u32,
}

/// 把交错布局转换为 wgpu 的顶点属性
fn vertex_attributes(layout: &VertexLayout) -> Result<Vec<wgpu::VertexAttribute>> {
    layout
        .attributes
        .iter()
        .map(|attr| {
            let format = match attr.components {
                1 => wgpu::VertexFormat::Float32,
                2 => wgpu::VertexFormat::Float32x2,
                3 => wgpu::VertexFormat::Float32x3,
                4 => wgpu::VertexFormat::Float32x4,
                n => {
                    return Err(GraphicsError::ResourceCreation(format!(
                        "attribute at location {} has {} components",
                        attr.location, n
                    ))
                    .into())
                }
            };
            Ok(wgpu::VertexAttribute {
                format,
                offset: attr.offset,
                shader_location: attr.location,
            })
        })
        .collect()
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// wgpu 渲染器
pub struct Renderer {
    gfx: WgpuBackend,

    pipelines: HashMap<PipelineKind, wgpu::RenderPipeline>,
    vertex_layout: VertexLayout,
    depth_view: wgpu::TextureView,

    frame_uniforms: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    object_slots: Vec<ObjectSlot>,
    slots_used: usize,
    current_object: Option<(PipelineKind, usize)>,

    buffers: HashMap<VertexBufferId, GpuVertexBuffer>,
    next_buffer_id: u64,
    pending: Vec<PendingDraw>,
    clear_color: wgpu::Color,
}

impl Renderer {
    /// 创建新的 wgpu 渲染器
    pub fn new(event_loop: &winit::event_loop::EventLoop<()>, config: &Config) -> Result<Self> {
        info!("Creating wgpu renderer");

        // 1. 创建 wgpu 后端
        let gfx = WgpuBackend::new(event_loop, config)?;

        // 2. 加载着色器模块
        debug!("Loading shaders");
        let shader_module = gfx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Viewer Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../renderer/shaders/shader.wgsl").into()),
        });

        // 3. 创建 uniform 缓冲与绑定组
        debug!("Creating uniform buffers");
        let frame_layout = uniform_layout(&gfx.device, "Frame Uniform Layout");
        let object_layout = uniform_layout(&gfx.device, "Object Uniform Layout");

        let frame_uniforms = gfx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_bind_group = gfx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniforms.as_entire_binding(),
            }],
        });

        let pipeline_layout = gfx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &object_layout],
            push_constant_ranges: &[],
        });

        // 4. 创建深度纹理
        let (width, height) = gfx.surface_size();
        let depth_view = create_depth_view(&gfx.device, width, height);

        // 5. 创建渲染管线
        let vertex_layout = MeshVertex::LAYOUT;
        let attributes = vertex_attributes(&vertex_layout)?;

        let mut pipelines = HashMap::new();
        for kind in PipelineKind::ALL {
            debug!(pipeline = kind.label(), "Creating render pipeline");
            let (vs_entry, fs_entry) = kind.entry_points();

            let pipeline = gfx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(kind.label()),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader_module,
                    entry_point: vs_entry,
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: vertex_layout.stride,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &attributes,
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader_module,
                    entry_point: fs_entry,
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gfx.surface_config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // 扇形三角化产生的三角形绕序交替，不能剔除背面
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            });
            pipelines.insert(kind, pipeline);
        }

        let [r, g, b, a] = config.graphics.clear_color;
        engine_info!("wgpu renderer created with {} pipelines", pipelines.len());

        Ok(Self {
            gfx,
            pipelines,
            vertex_layout,
            depth_view,
            frame_uniforms,
            frame_bind_group,
            object_layout,
            object_slots: Vec::new(),
            slots_used: 0,
            current_object: None,
            buffers: HashMap::new(),
            next_buffer_id: 0,
            pending: Vec::new(),
            clear_color: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: a as f64,
            },
        })
    }

    /// 获取窗口引用
    pub fn window(&self) -> &winit::window::Window {
        self.gfx.window()
    }

    /// 提交本帧录制的全部绘制并呈现
    ///
    /// 表面丢失或过期时重新配置并跳过本帧。
    pub fn end_frame(&mut self) -> Result<()> {
        let output = match self.gfx.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                engine_warn!("Surface lost or outdated, reconfiguring");
                let (width, height) = self.gfx.surface_size();
                self.gfx.reconfigure_surface(width, height);
                self.pending.clear();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                engine_warn!("Timed out acquiring the next frame");
                self.pending.clear();
                return Ok(());
            }
            Err(e) => {
                return Err(GraphicsError::SwapchainError(format!(
                    "Failed to acquire next image: {}",
                    e
                ))
                .into())
            }
        };

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.gfx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

            for draw in &self.pending {
                let (Some(pipeline), Some(buffer), Some(slot)) = (
                    self.pipelines.get(&draw.pipeline),
                    self.buffers.get(&draw.buffer),
                    self.object_slots.get(draw.slot),
                ) else {
                    // 缓冲在录制后被销毁
                    continue;
                };
                if draw.vertex_count == 0 {
                    continue;
                }

                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(1, &slot.bind_group, &[]);
                render_pass.set_vertex_buffer(0, buffer.buffer.slice(..));
                render_pass.draw(0..draw.vertex_count, 0..1);
            }
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        self.pending.clear();

        Ok(())
    }

    /// 处理窗口大小调整
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            debug!("Resizing to {}x{}", width, height);
            self.gfx.reconfigure_surface(width, height);
            self.depth_view = create_depth_view(&self.gfx.device, width, height);
        }
    }
}

impl FrameRecorder for Renderer {
    /// 开始一帧：写入共享 uniform，清空上一帧录制的绘制
    fn begin_frame(&mut self, frame: &FrameContext) {
        self.pending.clear();
        self.slots_used = 0;
        self.current_object = None;

        let [r, g, b, a] = frame.clear_color;
        self.clear_color = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        };

        self.gfx.queue.write_buffer(
            &self.frame_uniforms,
            0,
            bytemuck::bytes_of(&frame.uniforms()),
        );
    }

    /// 为随后的绘制选择管线和模型矩阵
    fn set_object(&mut self, pipeline: PipelineKind, model: &Matrix4) {
        let slot = self.slots_used;
        if slot == self.object_slots.len() {
            let buffer = self.gfx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Object Uniform Buffer"),
                size: std::mem::size_of::<ObjectUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = self.gfx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Object Bind Group"),
                layout: &self.object_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            self.object_slots.push(ObjectSlot { buffer, bind_group });
        }

        self.gfx.queue.write_buffer(
            &self.object_slots[slot].buffer,
            0,
            bytemuck::bytes_of(&ObjectUniforms::new(model)),
        );
        self.slots_used += 1;
        self.current_object = Some((pipeline, slot));
    }
}

impl GpuDevice for Renderer {
    fn create_vertex_buffer(
        &mut self,
        label: &str,
        layout: &VertexLayout,
        contents: &[u8],
    ) -> Result<VertexBufferId> {
        if *layout != self.vertex_layout {
            return Err(GraphicsError::ResourceCreation(format!(
                "vertex layout for '{}' does not match the render pipelines",
                label
            ))
            .into());
        }

        let buffer = self.gfx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        self.next_buffer_id += 1;
        let id = VertexBufferId(self.next_buffer_id);
        self.buffers.insert(
            id,
            GpuVertexBuffer {
                buffer,
                size: contents.len() as u64,
            },
        );

        debug!(%id, label, bytes = contents.len(), "GPU vertex buffer created");
        Ok(id)
    }

    fn write_vertex_buffer(&mut self, id: VertexBufferId, contents: &[u8]) -> Result<()> {
        let target = self
            .buffers
            .get(&id)
            .ok_or(GraphicsError::UnknownBuffer(id.0))?;

        if target.size != contents.len() as u64 {
            return Err(GraphicsError::ResourceCreation(format!(
                "write of {} bytes into {} ({} bytes)",
                contents.len(),
                id,
                target.size
            ))
            .into());
        }

        if !contents.is_empty() {
            self.gfx.queue.write_buffer(&target.buffer, 0, contents);
        }
        Ok(())
    }

    fn draw(&mut self, id: VertexBufferId, vertex_count: u32) -> Result<()> {
        if !self.buffers.contains_key(&id) {
            return Err(GraphicsError::UnknownBuffer(id.0).into());
        }

        let (pipeline, slot) = self.current_object.ok_or_else(|| {
            GraphicsError::ResourceCreation(format!("draw of {} before set_object", id))
        })?;

        self.pending.push(PendingDraw {
            pipeline,
            slot,
            buffer: id,
            vertex_count,
        });
        Ok(())
    }

    fn destroy_vertex_buffer(&mut self, id: VertexBufferId) -> Result<()> {
        let removed = self
            .buffers
            .remove(&id)
            .ok_or(GraphicsError::UnknownBuffer(id.0))?;
        removed.buffer.destroy();
        debug!(%id, "GPU vertex buffer destroyed");
        Ok(())
    }

    fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }
}
