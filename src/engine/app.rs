//! Window, GL context and frame loop shared by the demo binaries.
//!
//! A binary constructs [`AppOptions`], hands [`run`] a factory for its [`Demo`]
//! and returns whatever `run` returns. The loop calls, per redraw:
//! UI build, [`Demo::frame`], UI paint, buffer swap.

use crate::engine::error::{ DemoError, Result };
use crate::engine::gui::UIManager;
use crate::engine::settings::WindowSettings;
use crate::engine::utils::input_utils::InputState;
use glutin::config::{ ConfigTemplateBuilder, GlConfig };
use glutin::context::{ ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version };
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{ Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface };
use glutin_winit::DisplayBuilder;
use glow::HasContext;
use log::{ error, info, warn };
use raw_window_handle::HasWindowHandle;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ ElementState, WindowEvent };
use winit::event_loop::{ ActiveEventLoop, EventLoop };
use winit::keyboard::PhysicalKey;
use winit::window::{ Window, WindowId };

/// `RUST_LOG` overrides the default `info` filter.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub title: String,
    pub window: WindowSettings,
    /// Request a core-profile 3.3 context; otherwise the profile is left to the driver.
    pub core_profile: bool,
    /// Show the FPS window.
    pub show_stats: bool,
}

impl AppOptions {
    pub fn new(title: impl Into<String>, window: WindowSettings) -> Self {
        Self {
            title: title.into(),
            window,
            core_profile: true,
            show_stats: false,
        }
    }
}

/// What a demo sees each frame.
pub struct FrameInput<'a> {
    pub input: &'a InputState,
    /// Seconds since startup.
    pub time: f32,
    pub delta_time: f32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAction {
    Continue,
    Exit,
}

pub trait Demo {
    /// Update and draw one frame into the window framebuffer.
    fn frame(&mut self, frame: &FrameInput) -> FrameAction;

    /// Add panels to the overlay. Runs before `frame`.
    fn ui(&mut self, _ctx: &egui::Context) {}

    /// Release GPU resources; the context is still current.
    fn destroy(&mut self);
}

type DemoFactory<D> = Box<dyn FnOnce(Arc<glow::Context>, PhysicalSize<u32>) -> Result<D>>;

struct GlWindow {
    window: Window,
    context: PossiblyCurrentContext,
    surface: Surface<WindowSurface>,
}

struct App<D: Demo> {
    options: AppOptions,
    factory: Option<DemoFactory<D>>,
    gl_window: Option<GlWindow>,
    ui: Option<UIManager>,
    demo: Option<D>,
    input: InputState,
    start_time: Instant,
    last_frame_time: Instant,
    error: Option<DemoError>,
}

fn non_zero(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

/// Presses the overlay took are dropped; releases always reach the input state.
fn forward_key(consumed_by_ui: bool, state: ElementState) -> bool {
    !consumed_by_ui || state == ElementState::Released
}

impl<D: Demo> App<D> {
    fn create_window(&self, event_loop: &ActiveEventLoop) -> Result<(GlWindow, Arc<glow::Context>)> {
        let attributes = Window::default_attributes()
            .with_title(self.options.title.clone())
            .with_inner_size(PhysicalSize::new(self.options.window.width, self.options.window.height));

        let template = ConfigTemplateBuilder::new().with_depth_size(24);
        let display_builder = DisplayBuilder::new().with_window_attributes(Some(attributes.clone()));
        let (window, gl_config) = display_builder
            .build(event_loop, template, |configs| {
                // glutin only calls the picker with at least one config
                configs
                    .reduce(|best, config| if config.num_samples() > best.num_samples() { config } else { best })
                    .expect("no GL config offered")
            })
            .map_err(|e| DemoError::Window(format!("Failed to create GL display: {}", e)))?;

        let window = match window {
            Some(window) => window,
            None =>
                glutin_winit
                    ::finalize_window(event_loop, attributes, &gl_config)
                    .map_err(|e| DemoError::Window(format!("Failed to create window: {}", e)))?,
        };
        let raw_handle = window
            .window_handle()
            .map_err(|e| DemoError::Window(e.to_string()))?
            .as_raw();

        let display = gl_config.display();
        let mut context_builder = ContextAttributesBuilder::new().with_context_api(
            ContextApi::OpenGl(Some(Version::new(3, 3)))
        );
        if self.options.core_profile {
            info!("Requesting a core profile context");
            context_builder = context_builder.with_profile(GlProfile::Core);
        }
        let context_attributes = context_builder.build(Some(raw_handle));
        let not_current = unsafe { display.create_context(&gl_config, &context_attributes) }.map_err(|e|
            DemoError::Window(format!("Failed to create GL context: {}", e))
        )?;

        let size = window.inner_size();
        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>
            ::new()
            .build(raw_handle, non_zero(size.width), non_zero(size.height));
        let surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes) }.map_err(|e|
            DemoError::Window(format!("Failed to create window surface: {}", e))
        )?;
        let context = not_current
            .make_current(&surface)
            .map_err(|e| DemoError::Window(format!("Failed to make context current: {}", e)))?;

        let interval = if self.options.window.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, interval) {
            warn!("Could not set swap interval: {}", e);
        }

        let gl = unsafe { glow::Context::from_loader_function_cstr(|s| display.get_proc_address(s)) };
        info!("OpenGL {:?}", gl.version());

        Ok((GlWindow { window, context, surface }, Arc::new(gl)))
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let (gl_window, gl) = self.create_window(event_loop)?;
        let size = gl_window.window.inner_size();
        let ui = UIManager::new(event_loop, gl.clone(), self.options.show_stats);
        let factory = self.factory
            .take()
            .ok_or_else(|| DemoError::Window("demo already started".to_string()))?;
        let demo = factory(gl, size)?;

        let now = Instant::now();
        self.start_time = now;
        self.last_frame_time = now;
        gl_window.window.request_redraw();

        self.gl_window = Some(gl_window);
        self.ui = Some(ui);
        self.demo = Some(demo);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gl_window), Some(ui), Some(demo)) = (&self.gl_window, &mut self.ui, &mut self.demo) else {
            return;
        };

        let now = Instant::now();
        let delta_time = (now - self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        ui.run(&gl_window.window, delta_time, |ctx| demo.ui(ctx));
        self.input.ui_wants_pointer = ui.wants_pointer();

        let size = gl_window.window.inner_size();
        let frame = FrameInput {
            input: &self.input,
            time: (now - self.start_time).as_secs_f32(),
            delta_time,
            width: size.width,
            height: size.height,
        };
        let action = demo.frame(&frame);
        ui.paint(&gl_window.window);

        if let Err(e) = gl_window.surface.swap_buffers(&gl_window.context) {
            error!("Failed to swap buffers: {}", e);
        }
        self.input.end_frame();

        match action {
            FrameAction::Continue => gl_window.window.request_redraw(),
            FrameAction::Exit => event_loop.exit(),
        }
    }
}

impl<D: Demo> ApplicationHandler for App<D> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gl_window.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let consumed = match (&self.gl_window, &mut self.ui) {
            (Some(gl_window), Some(ui)) => ui.handle_event(&gl_window.window, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(gl_window) = &self.gl_window {
                    gl_window.surface.resize(&gl_window.context, non_zero(size.width), non_zero(size.height));
                    gl_window.window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if forward_key(consumed, event.state) {
                        self.input.receive_key(code, event.state);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.receive_mouse_button(button, state);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.receive_cursor(position.x, position.y);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.input.receive_scroll(delta);
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(demo) = &mut self.demo {
            demo.destroy();
        }
        if let Some(ui) = &mut self.ui {
            ui.destroy();
        }
        info!("Shutting down");
    }
}

/// Open the window, build the demo with `create` once the context is current,
/// and run until the window closes or the demo asks to exit.
pub fn run<D, F>(options: AppOptions, create: F) -> Result<()>
    where D: Demo + 'static, F: FnOnce(Arc<glow::Context>, PhysicalSize<u32>) -> Result<D> + 'static
{
    let event_loop = EventLoop::new()?;
    let now = Instant::now();
    let mut app = App {
        options,
        factory: Some(Box::new(create) as DemoFactory<D>),
        gl_window: None,
        ui: None,
        demo: None,
        input: InputState::new(),
        start_time: now,
        last_frame_time: now,
        error: None,
    };

    event_loop.run_app(&mut app)?;
    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::KeyCode;

    #[test]
    fn overlay_presses_are_dropped() {
        assert!(!forward_key(true, ElementState::Pressed));
        assert!(forward_key(false, ElementState::Pressed));
    }

    #[test]
    fn releases_reach_input_even_when_overlay_consumed_them() {
        assert!(forward_key(true, ElementState::Released));

        // hold W, the overlay takes focus, W is released
        let mut input = InputState::new();
        input.receive_key(KeyCode::KeyW, ElementState::Pressed);
        if forward_key(true, ElementState::Released) {
            input.receive_key(KeyCode::KeyW, ElementState::Released);
        }
        assert!(!input.is_key_down(KeyCode::KeyW));
    }
}
