use glow::HasContext;

/// One stage of a frame. `C` is whatever the passes share: GL handle,
/// resources and per-frame uniforms.
pub trait RenderPass<C> {
    /// Bind targets and set GL state for this pass
    fn setup(&mut self, ctx: &mut C, width: u32, height: u32);

    fn render(&mut self, ctx: &mut C, width: u32, height: u32);

    /// Restore state touched in `setup`
    fn cleanup(&mut self, ctx: &mut C);

    fn name(&self) -> &'static str;
}

/// Runs registered passes in insertion order.
pub struct RenderPassManager<C> {
    passes: Vec<Box<dyn RenderPass<C>>>,
}

impl<C> RenderPassManager<C> {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    pub fn add_pass(&mut self, pass: Box<dyn RenderPass<C>>) {
        self.passes.push(pass);
    }

    /// setup → render → cleanup for each pass, one pass after the other.
    pub fn execute_passes(&mut self, ctx: &mut C, width: u32, height: u32) {
        for pass in &mut self.passes {
            log::debug!("Render pass {}", pass.name());
            pass.setup(ctx, width, height);
            pass.render(ctx, width, height);
            pass.cleanup(ctx);
        }
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes
            .iter()
            .map(|pass| pass.name())
            .collect()
    }
}

impl<C> Default for RenderPassManager<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// OpenGL state snapshot for restoration
#[derive(Debug, Clone)]
pub struct OpenGLState {
    pub viewport: [i32; 4],
    pub depth_test_enabled: bool,
    pub blend_enabled: bool,
    pub cull_face_enabled: bool,
    pub clip_distance_enabled: bool,
    pub active_texture: i32,
}

impl OpenGLState {
    pub fn capture(gl: &glow::Context) -> Self {
        unsafe {
            let mut viewport = [0i32; 4];
            gl.get_parameter_i32_slice(glow::VIEWPORT, &mut viewport);

            Self {
                viewport,
                depth_test_enabled: gl.is_enabled(glow::DEPTH_TEST),
                blend_enabled: gl.is_enabled(glow::BLEND),
                cull_face_enabled: gl.is_enabled(glow::CULL_FACE),
                clip_distance_enabled: gl.is_enabled(glow::CLIP_DISTANCE0),
                active_texture: gl.get_parameter_i32(glow::ACTIVE_TEXTURE),
            }
        }
    }

    pub fn restore(&self, gl: &glow::Context) {
        unsafe {
            gl.viewport(self.viewport[0], self.viewport[1], self.viewport[2], self.viewport[3]);
            set_capability(gl, glow::DEPTH_TEST, self.depth_test_enabled);
            set_capability(gl, glow::BLEND, self.blend_enabled);
            set_capability(gl, glow::CULL_FACE, self.cull_face_enabled);
            set_capability(gl, glow::CLIP_DISTANCE0, self.clip_distance_enabled);
            gl.active_texture(self.active_texture as u32);
        }
    }
}

pub fn set_capability(gl: &glow::Context, capability: u32, enabled: bool) {
    unsafe {
        if enabled {
            gl.enable(capability);
        } else {
            gl.disable(capability);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recording(&'static str);

    impl RenderPass<Vec<String>> for Recording {
        fn setup(&mut self, log: &mut Vec<String>, width: u32, height: u32) {
            log.push(format!("{} setup {}x{}", self.0, width, height));
        }

        fn render(&mut self, log: &mut Vec<String>, _width: u32, _height: u32) {
            log.push(format!("{} render", self.0));
        }

        fn cleanup(&mut self, log: &mut Vec<String>) {
            log.push(format!("{} cleanup", self.0));
        }

        fn name(&self) -> &'static str {
            self.0
        }
    }

    #[test]
    fn passes_run_in_insertion_order() {
        let mut manager = RenderPassManager::new();
        manager.add_pass(Box::new(Recording("Reflection")));
        manager.add_pass(Box::new(Recording("Main")));

        let mut log = Vec::new();
        manager.execute_passes(&mut log, 8, 6);
        assert_eq!(log, vec![
            "Reflection setup 8x6",
            "Reflection render",
            "Reflection cleanup",
            "Main setup 8x6",
            "Main render",
            "Main cleanup",
        ]);
    }

    #[test]
    fn names_follow_registration() {
        let mut manager: RenderPassManager<Vec<String>> = RenderPassManager::default();
        assert_eq!(manager.pass_count(), 0);
        manager.add_pass(Box::new(Recording("ShadowDepth")));
        manager.add_pass(Box::new(Recording("Main")));
        assert_eq!(manager.pass_names(), vec!["ShadowDepth", "Main"]);
    }
}
