use super::lights::{ DEFAULT_CLIP_PLANE, REFLECTION_CLIP_PLANE, REFRACTION_CLIP_PLANE };
use super::water::{ WaterFramebuffers, SAMPLER_UNITS };
use super::SceneContext;
use crate::engine::rendering::framebuffer::Framebuffer;
use crate::engine::rendering::render_pass_manager::{ OpenGLState, RenderPass, RenderPassManager };
use glow::HasContext;

/// Background of every color target; set at load so the first capture uses it too.
pub const CLEAR_COLOR: [f32; 4] = [0.1, 0.1, 0.1, 1.0];

/// The scene frame: two water captures, the shadow map, then the window.
pub fn scene_passes() -> RenderPassManager<SceneContext> {
    let mut manager = RenderPassManager::new();
    manager.add_pass(Box::new(ReflectionPass::default()));
    manager.add_pass(Box::new(RefractionPass::default()));
    manager.add_pass(Box::new(ShadowDepthPass::default()));
    manager.add_pass(Box::new(MainPass));
    manager
}

/// Everything above the water, seen from below the surface.
#[derive(Default)]
pub struct ReflectionPass {
    saved_state: Option<OpenGLState>,
    window: (u32, u32),
}

impl RenderPass<SceneContext> for ReflectionPass {
    fn setup(&mut self, ctx: &mut SceneContext, width: u32, height: u32) {
        let gl = &ctx.gl;
        self.window = (width, height);
        self.saved_state = Some(OpenGLState::capture(gl));
        ctx.water.bind_reflection(gl);
        unsafe {
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
            gl.enable(glow::CLIP_DISTANCE0);
            gl.enable(glow::DEPTH_TEST);
        }
    }

    fn render(&mut self, ctx: &mut SceneContext, _width: u32, _height: u32) {
        let view = ctx.camera.mirrored(0.0).view_matrix();
        ctx.draw_world(view, REFLECTION_CLIP_PLANE, None);
    }

    fn cleanup(&mut self, ctx: &mut SceneContext) {
        WaterFramebuffers::unbind(&ctx.gl, self.window.0, self.window.1);
        restore_state(ctx, self.saved_state.take());
    }

    fn name(&self) -> &'static str {
        "Reflection"
    }
}

/// Everything below the water line.
#[derive(Default)]
pub struct RefractionPass {
    saved_state: Option<OpenGLState>,
    window: (u32, u32),
}

impl RenderPass<SceneContext> for RefractionPass {
    fn setup(&mut self, ctx: &mut SceneContext, width: u32, height: u32) {
        let gl = &ctx.gl;
        self.window = (width, height);
        self.saved_state = Some(OpenGLState::capture(gl));
        ctx.water.bind_refraction(gl);
        unsafe {
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
            gl.enable(glow::CLIP_DISTANCE0);
            gl.enable(glow::DEPTH_TEST);
        }
    }

    fn render(&mut self, ctx: &mut SceneContext, _width: u32, _height: u32) {
        let view = ctx.frame.view;
        ctx.draw_world(view, REFRACTION_CLIP_PLANE, None);
    }

    fn cleanup(&mut self, ctx: &mut SceneContext) {
        WaterFramebuffers::unbind(&ctx.gl, self.window.0, self.window.1);
        restore_state(ctx, self.saved_state.take());
    }

    fn name(&self) -> &'static str {
        "Refraction"
    }
}

/// Depth from the global light into the shadow map.
#[derive(Default)]
pub struct ShadowDepthPass {
    saved_state: Option<OpenGLState>,
    window: (u32, u32),
}

impl RenderPass<SceneContext> for ShadowDepthPass {
    fn setup(&mut self, ctx: &mut SceneContext, width: u32, height: u32) {
        let gl = &ctx.gl;
        self.window = (width, height);
        unsafe { gl.disable(glow::CLIP_DISTANCE0) }
        self.saved_state = Some(OpenGLState::capture(gl));
        ctx.shadow.bind(gl);
        unsafe {
            gl.clear(glow::DEPTH_BUFFER_BIT);
            gl.cull_face(glow::FRONT);
        }
    }

    fn render(&mut self, ctx: &mut SceneContext, _width: u32, _height: u32) {
        let view = ctx.frame.view;
        ctx.draw_world(view, DEFAULT_CLIP_PLANE, Some(&ctx.shaders.depth));
    }

    fn cleanup(&mut self, ctx: &mut SceneContext) {
        unsafe { ctx.gl.cull_face(glow::BACK) }
        Framebuffer::unbind(&ctx.gl, self.window.0, self.window.1);
        restore_state(ctx, self.saved_state.take());
    }

    fn name(&self) -> &'static str {
        "ShadowDepth"
    }
}

/// The visible frame: world, light marker, then the blended water surface.
pub struct MainPass;

impl RenderPass<SceneContext> for MainPass {
    fn setup(&mut self, ctx: &mut SceneContext, width: u32, height: u32) {
        let gl = &ctx.gl;
        unsafe {
            gl.viewport(0, 0, width as i32, height as i32);
            let [red, green, blue, alpha] = CLEAR_COLOR;
            gl.clear_color(red, green, blue, alpha);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
            gl.enable(glow::DEPTH_TEST);
        }
    }

    fn render(&mut self, ctx: &mut SceneContext, _width: u32, _height: u32) {
        let view = ctx.frame.view;
        ctx.draw_world(view, DEFAULT_CLIP_PLANE, None);
        ctx.draw_light_marker();

        let gl = &ctx.gl;
        ctx.water.bind_textures(gl);
        unsafe {
            gl.enable(glow::BLEND);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }
        let shader = &ctx.shaders.water;
        shader.use_program(gl);
        ctx.frame.apply(gl, shader, ctx.water_matrix, view, DEFAULT_CLIP_PLANE);
        ctx.light.apply(gl, shader);
        for (name, unit) in SAMPLER_UNITS {
            shader.set_uniform(gl, name, unit as i32);
        }
        ctx.water_mesh.draw(gl, shader, true);
    }

    fn cleanup(&mut self, ctx: &mut SceneContext) {
        unsafe {
            ctx.gl.disable(glow::BLEND);
            ctx.gl.bind_vertex_array(None);
            ctx.gl.use_program(None);
        }
    }

    fn name(&self) -> &'static str {
        "Main"
    }
}

/// Capabilities and viewport as they were before the pass.
fn restore_state(ctx: &SceneContext, saved_state: Option<OpenGLState>) {
    if let Some(state) = saved_state {
        state.restore(&ctx.gl);
    }
}
