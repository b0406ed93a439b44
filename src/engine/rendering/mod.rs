pub mod framebuffer;
pub mod render_pass_manager;

pub use framebuffer::{ Attachments, Framebuffer };
pub use render_pass_manager::{ RenderPass, RenderPassManager };
