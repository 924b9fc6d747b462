//! meshview - OBJ 网格查看器
//!
//! 加载一个 OBJ 模型，扇形三角化后在窗口中以选定的着色模型渲染，
//! 并允许用键盘和滚轮交互式地变换模型。
//!
//! # 使用方法
//!
//! ```bash
//! # 使用配置文件中的模型
//! cargo run
//!
//! # 指定模型与着色模型，在 CPU 上计算变换
//! cargo run -- --model data/cube --shading phong --cpu
//! ```
//!
//! # 按键
//!
//! - `A`/`D` 滚转，`Q`/`E` 偏航，`W`/`S` 俯仰
//! - 方向键平移，`O`/`I` 缩放，滚轮缩放
//! - `=`/`-` 加快/减慢变换速度
//! - `T` 在 CPU/GPU 变换之间切换
//! - `Esc` 退出

use anyhow::Context;
use tracing::{debug, error, info};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};

use meshview::core::input::InputSystem;
use meshview::core::{log, Config, Scene};
use meshview::gfx::wgpu::Renderer;
use meshview::renderer::Mesh;
use meshview::{engine_error, engine_info};

/// 应用程序入口点
///
/// # 初始化流程
///
/// 1. 加载配置文件（config.toml），应用命令行参数并校验
/// 2. 初始化日志系统
/// 3. 加载模型与光源立方体
/// 4. 创建事件循环、窗口和渲染器
/// 5. 上传网格并启动主循环
fn main() -> anyhow::Result<()> {
    // 1. 配置
    let mut config = Config::from_file_or_default("config.toml");
    config.apply_args(std::env::args().skip(1))?;
    config.validate()?;

    // 2. 日志
    let log_file = if config.logging.file_output {
        Some(config.logging.log_file.as_str())
    } else {
        None
    };
    log::init_logger(config.logging.level, config.logging.file_output, log_file);
    info!(version = env!("CARGO_PKG_VERSION"), "meshview starting");
    info!(
        model = %config.model.path,
        shading = config.graphics.shading.name(),
        mode = ?config.graphics.transform_mode,
        "Viewer configuration"
    );

    // 3. 网格
    let model = Mesh::from_file(&config.model.path)
        .with_context(|| format!("failed to load model '{}'", config.model.path))?;
    let light_cube = Mesh::from_file(&config.model.light_cube)
        .with_context(|| format!("failed to load light cube '{}'", config.model.light_cube))?;

    // 4. 窗口与渲染器
    let event_loop = EventLoop::new()?;
    let mut renderer = Renderer::new(&event_loop, &config)?;

    let size = renderer.window().inner_size();
    let aspect = size.width.max(1) as f32 / size.height.max(1) as f32;
    let mut scene = Scene::new(&config, model, light_cube, aspect);
    let mut input = InputSystem::new();

    // 5. 主循环
    scene.load(&mut renderer)?;
    engine_info!("Entering main loop");

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                info!("Shutting down");
                if let Err(e) = scene.unload(&mut renderer) {
                    error!("Failed to release meshes: {}", e);
                }
                elwt.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if let Some(action) = input.on_keyboard_input(code, state) {
                    scene.controls_mut().apply(action);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                scene.controls_mut().scroll(InputSystem::scroll_amount(&delta));
            }
            WindowEvent::Resized(size) => {
                debug!("Window resized to {}x{}", size.width, size.height);
                renderer.resize(size.width, size.height);
                scene.set_viewport(size.width, size.height);
            }
            WindowEvent::Focused(false) => input.reset(),
            WindowEvent::RedrawRequested => {
                input.update(scene.controls_mut());

                let frame = scene
                    .render(&mut renderer)
                    .and_then(|_| renderer.end_frame());
                if let Err(e) = frame {
                    engine_error!("Render error: {}", e);
                    elwt.exit();
                }
            }
            _ => {}
        },
        Event::AboutToWait => renderer.window().request_redraw(),
        _ => {}
    })?;

    Ok(())
}
