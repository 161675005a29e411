use std::ffi::CStr;
use std::path::{Path, PathBuf};

/// 两个着色器都以 `main` 作为入口函数。
pub const ENTRY_POINT: &CStr = c"main";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

impl ShaderStage {
    pub fn file_name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "VertexShader.hlsl",
            ShaderStage::Pixel => "PixelShader.hlsl",
        }
    }

    /// Shader model 5.0 profile.
    pub fn target(self) -> &'static CStr {
        match self {
            ShaderStage::Vertex => c"vs_5_0",
            ShaderStage::Pixel => c"ps_5_0",
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShaderSource {
    pub path: PathBuf,
    pub stage: ShaderStage,
}

impl ShaderSource {
    pub fn new(dir: &Path, stage: ShaderStage) -> Self {
        ShaderSource {
            path: dir.join(stage.file_name()),
            stage,
        }
    }
}

/// 优先使用可执行文件旁边的 `shaders` 目录，找不到时退回到 crate 自带的目录。
pub fn default_shader_dir() -> PathBuf {
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("shaders")));
    match beside_exe {
        Some(dir) if dir.is_dir() => dir,
        _ => Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_resolve_inside_the_directory() {
        let source = ShaderSource::new(Path::new("shaders"), ShaderStage::Pixel);
        assert_eq!(source.path, Path::new("shaders").join("PixelShader.hlsl"));
        assert_eq!(source.stage.target(), c"ps_5_0");
    }

    #[test]
    fn crate_ships_both_shaders() {
        let dir = default_shader_dir();
        assert!(ShaderSource::new(&dir, ShaderStage::Vertex).path.is_file());
        assert!(ShaderSource::new(&dir, ShaderStage::Pixel).path.is_file());
    }
}
