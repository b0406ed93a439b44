use crate::engine::error::{ DemoError, Result };
use glam::{ Mat2, Mat3, Mat4, Vec2, Vec3, Vec4 };
use glow::HasContext;
use log::{ debug, info };
use std::path::{ Path, PathBuf };

/// Paths of the two stages that make up the shader named by `base`
/// (`<base>_vertex.glsl`, `<base>_fragment.glsl`).
pub fn stage_paths(base: impl AsRef<Path>) -> (PathBuf, PathBuf) {
    let base = base.as_ref().to_string_lossy();
    (
        PathBuf::from(format!("{}_vertex.glsl", base)),
        PathBuf::from(format!("{}_fragment.glsl", base)),
    )
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| DemoError::ShaderRead {
        path: path.to_path_buf(),
        source,
    })
}

fn compile_shader(
    gl: &glow::Context,
    shader_type: u32,
    source: &str,
    path: &Path
) -> Result<glow::Shader> {
    let stage = if shader_type == glow::VERTEX_SHADER { "vertex" } else { "fragment" };
    unsafe {
        let shader = gl.create_shader(shader_type).map_err(DemoError::gl("shader"))?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(DemoError::ShaderCompile {
                stage,
                path: path.to_path_buf(),
                log,
            });
        }
        Ok(shader)
    }
}

/// Compile and link a program from in-memory sources.
pub fn link_program(
    gl: &glow::Context,
    name: &str,
    vertex: (&str, &Path),
    fragment: (&str, &Path)
) -> Result<glow::Program> {
    let vs = compile_shader(gl, glow::VERTEX_SHADER, vertex.0, vertex.1)?;
    let fs = match compile_shader(gl, glow::FRAGMENT_SHADER, fragment.0, fragment.1) {
        Ok(fs) => fs,
        Err(e) => {
            unsafe { gl.delete_shader(vs) };
            return Err(e);
        }
    };

    unsafe {
        let program = gl.create_program().map_err(DemoError::gl("program"))?;
        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);
        gl.detach_shader(program, vs);
        gl.detach_shader(program, fs);
        gl.delete_shader(vs);
        gl.delete_shader(fs);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(DemoError::ShaderLink { name: name.to_string(), log });
        }
        Ok(program)
    }
}

/// A value that can be uploaded to a named uniform of the bound program.
pub trait UniformValue {
    fn apply(&self, gl: &glow::Context, location: &glow::UniformLocation);
}

impl UniformValue for i32 {
    fn apply(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_i32(Some(location), *self) }
    }
}

impl UniformValue for bool {
    fn apply(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_i32(Some(location), *self as i32) }
    }
}

impl UniformValue for f32 {
    fn apply(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_f32(Some(location), *self) }
    }
}

impl UniformValue for Vec2 {
    fn apply(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_2_f32(Some(location), self.x, self.y) }
    }
}

impl UniformValue for Vec3 {
    fn apply(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_3_f32_slice(Some(location), &self.to_array()) }
    }
}

impl UniformValue for Vec4 {
    fn apply(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_4_f32_slice(Some(location), &self.to_array()) }
    }
}

impl UniformValue for Mat2 {
    fn apply(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_matrix_2_f32_slice(Some(location), false, &self.to_cols_array()) }
    }
}

impl UniformValue for Mat3 {
    fn apply(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_matrix_3_f32_slice(Some(location), false, &self.to_cols_array()) }
    }
}

impl UniformValue for Mat4 {
    fn apply(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_matrix_4_f32_slice(Some(location), false, &self.to_cols_array()) }
    }
}

/// A vertex + fragment program loaded from disk, reloadable at runtime.
pub struct ShaderProgram {
    name: String,
    program: glow::Program,
    vertex_path: PathBuf,
    fragment_path: PathBuf,
}

impl ShaderProgram {
    /// Load `<base>_vertex.glsl` and `<base>_fragment.glsl`.
    pub fn load(gl: &glow::Context, base: impl AsRef<Path>) -> Result<Self> {
        let base = base.as_ref();
        let (vertex_path, fragment_path) = stage_paths(base);
        let name = base
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| base.display().to_string());
        let program = Self::build(gl, &name, &vertex_path, &fragment_path)?;
        info!("Loaded shader program {}", name);
        Ok(Self { name, program, vertex_path, fragment_path })
    }

    fn build(gl: &glow::Context, name: &str, vertex_path: &Path, fragment_path: &Path) -> Result<glow::Program> {
        let vertex_source = read_source(vertex_path)?;
        let fragment_source = read_source(fragment_path)?;
        link_program(gl, name, (&vertex_source, vertex_path), (&fragment_source, fragment_path))
    }

    /// Rebuild from the same files. On failure the current program stays in use.
    pub fn reload(&mut self, gl: &glow::Context) -> Result<()> {
        let program = Self::build(gl, &self.name, &self.vertex_path, &self.fragment_path)?;
        unsafe { gl.delete_program(self.program) };
        self.program = program;
        info!("Reloaded shader program {}", self.name);
        Ok(())
    }

    pub fn use_program(&self, gl: &glow::Context) {
        unsafe { gl.use_program(Some(self.program)) }
    }

    /// Set a uniform on this program. The program must be bound; names the
    /// linker optimised away are ignored.
    pub fn set_uniform<V: UniformValue>(&self, gl: &glow::Context, name: &str, value: V) {
        match unsafe { gl.get_uniform_location(self.program, name) } {
            Some(location) => value.apply(gl, &location),
            None => debug!("Uniform {} not active in {}", name, self.name),
        }
    }

    pub fn destroy(&self, gl: &glow::Context) {
        unsafe { gl.delete_program(self.program) }
    }
}

/// Reload each program, logging failures; returns how many reloads succeeded.
pub fn reload_all(gl: &glow::Context, programs: &mut [&mut ShaderProgram]) -> usize {
    let mut reloaded = 0;
    for program in programs.iter_mut() {
        match program.reload(gl) {
            Ok(()) => {
                reloaded += 1;
            }
            Err(e) => log::error!("{}", e),
        }
    }
    reloaded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_paths_append_suffixes() {
        let (vertex, fragment) = stage_paths("assets/shaders/terrain");
        assert_eq!(vertex, PathBuf::from("assets/shaders/terrain_vertex.glsl"));
        assert_eq!(fragment, PathBuf::from("assets/shaders/terrain_fragment.glsl"));
    }

    #[test]
    fn missing_source_is_a_read_error() {
        let error = read_source(Path::new("does/not/exist_vertex.glsl")).unwrap_err();
        assert!(matches!(error, DemoError::ShaderRead { .. }));
        assert!(error.to_string().contains("exist_vertex.glsl"));
    }
}
