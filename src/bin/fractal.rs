use anyhow::Context;
use harbor_gl::demos::fractal::{ FractalDemo, FractalSettings };
use harbor_gl::engine::app::{ self, AppOptions };
use harbor_gl::engine::settings::load_named;

fn main() -> anyhow::Result<()> {
    app::init_logging();
    let settings: FractalSettings = load_named("fractal").context("loading fractal settings")?;
    let options = AppOptions::new("Fractal", settings.window.clone());
    app::run(options, move |gl, _size| FractalDemo::new(gl, &settings)).context("running fractal")
}
