use egui_glow::EguiGlow;
use std::sync::Arc;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

/// Rolling frame-rate estimate over the last 60 frames.
#[derive(Debug, Default)]
pub struct FpsCounter {
    frame_times: Vec<f32>,
    fps: f32,
}

impl FpsCounter {
    pub fn push(&mut self, frame_time: f32) {
        self.frame_times.push(frame_time);
        if self.frame_times.len() > 60 {
            self.frame_times.remove(0);
        }
        let average = self.frame_times.iter().sum::<f32>() / (self.frame_times.len() as f32);
        self.fps = if average > 0.0 { 1.0 / average } else { 0.0 };
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// egui overlay drawn on top of each frame.
pub struct UIManager {
    egui: EguiGlow,
    fps: FpsCounter,
    show_stats: bool,
}

impl UIManager {
    pub fn new(event_loop: &ActiveEventLoop, gl: Arc<glow::Context>, show_stats: bool) -> Self {
        let egui = EguiGlow::new(event_loop, gl, None, None, true);
        log::info!("UI overlay initialized");
        Self {
            egui,
            fps: FpsCounter::default(),
            show_stats,
        }
    }

    /// Feed a window event to egui; returns true when egui consumed it.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.egui.on_window_event(window, event).consumed
    }

    pub fn wants_pointer(&self) -> bool {
        self.egui.egui_ctx.wants_pointer_input() || self.egui.egui_ctx.is_pointer_over_area()
    }

    /// Build this frame's UI. `build` adds the demo's own panels.
    pub fn run(&mut self, window: &Window, frame_time: f32, mut build: impl FnMut(&egui::Context)) {
        self.fps.push(frame_time);
        let fps = self.fps.fps();
        let show_stats = self.show_stats;
        self.egui.run(window, |ctx| {
            if show_stats {
                egui::Window
                    ::new("Debug Info")
                    .default_pos(egui::pos2(10.0, 10.0))
                    .resizable(false)
                    .collapsible(false)
                    .show(ctx, |ui| {
                        ui.label(format!("FPS: {:.1}", fps));
                    });
            }
            build(ctx);
        });
    }

    pub fn paint(&mut self, window: &Window) {
        self.egui.paint(window);
    }

    pub fn destroy(&mut self) {
        self.egui.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_averages_recent_frames() {
        let mut counter = FpsCounter::default();
        counter.push(0.02);
        counter.push(0.02);
        assert!((counter.fps() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn fps_window_keeps_sixty_samples() {
        let mut counter = FpsCounter::default();
        for _ in 0..100 {
            counter.push(1.0);
        }
        for _ in 0..60 {
            counter.push(0.5);
        }
        assert!((counter.fps() - 2.0).abs() < 1e-3);
        assert_eq!(counter.frame_times.len(), 60);
    }

    #[test]
    fn zero_frame_time_reports_zero() {
        let mut counter = FpsCounter::default();
        counter.push(0.0);
        assert_eq!(counter.fps(), 0.0);
    }
}
