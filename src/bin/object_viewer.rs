use anyhow::Context;
use harbor_gl::demos::object_viewer::{ ViewerDemo, ViewerSettings };
use harbor_gl::engine::app::{ self, AppOptions };
use harbor_gl::engine::settings::load_named;

fn main() -> anyhow::Result<()> {
    app::init_logging();
    let settings: ViewerSettings = load_named("object_viewer").context("loading viewer settings")?;
    let options = AppOptions::new("Object Viewer", settings.window.clone());
    app::run(options, move |gl, _size| ViewerDemo::new(gl, &settings)).context("running object viewer")
}
