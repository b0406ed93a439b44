use anyhow::Context;
use harbor_gl::demos::scene::{ SceneDemo, SceneSettings };
use harbor_gl::engine::app::{ self, AppOptions };
use harbor_gl::engine::settings::load_named;

fn main() -> anyhow::Result<()> {
    app::init_logging();
    let settings: SceneSettings = load_named("scene").context("loading scene settings")?;

    let mut options = AppOptions::new("Scene", settings.window.clone());
    // any extra argument leaves the profile to the driver
    options.core_profile = std::env::args().count() < 2;
    options.show_stats = true;

    app::run(options, move |gl, _size| SceneDemo::new(gl, &settings)).context("running scene")
}
