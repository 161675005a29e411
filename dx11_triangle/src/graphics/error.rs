use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// DXGI_ERROR_DEVICE_REMOVED
pub const DEVICE_REMOVED: i32 = 0x887A_0005_u32 as i32;
/// DXGI_ERROR_DEVICE_HUNG
pub const DEVICE_HUNG: i32 = 0x887A_0006_u32 as i32;
/// DXGI_ERROR_DEVICE_RESET
pub const DEVICE_RESET: i32 = 0x887A_0007_u32 as i32;
/// DXGI_ERROR_DRIVER_INTERNAL_ERROR
pub const DRIVER_INTERNAL_ERROR: i32 = 0x887A_0020_u32 as i32;
/// E_FAIL
pub const E_FAIL: i32 = 0x8000_4005_u32 as i32;

/// 图形 API 层面的失败：某个调用返回了失败的 HRESULT，或着色器无法编译。
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{call} failed with HRESULT {code:#010x}")]
    Call { call: &'static str, code: i32 },

    #[error("shader source {} not found", path.display())]
    MissingShader { path: PathBuf },

    #[error("failed to compile {}: {message}", path.display())]
    ShaderCompile { path: PathBuf, message: String },

    #[error("vertex layout mismatch at `{semantic}`: {reason}")]
    InvalidLayout { semantic: String, reason: String },
}

impl BackendError {
    /// 设备被移除、挂起、重置或驱动内部出错，调用方需要重新创建全部资源。
    pub fn is_device_lost(&self) -> bool {
        matches!(
            self,
            BackendError::Call { code, .. }
                if matches!(*code, DEVICE_REMOVED | DEVICE_HUNG | DEVICE_RESET | DRIVER_INTERNAL_ERROR)
        )
    }
}

#[cfg(windows)]
impl BackendError {
    pub fn hresult(call: &'static str) -> impl FnOnce(windows::core::Error) -> BackendError {
        move |error| BackendError::Call {
            call,
            code: error.code().0,
        }
    }
}

/// Which part of the one-time setup failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SetupStage {
    DeviceAndSwapChain,
    RenderTarget,
    VertexShader,
    PixelShader,
    InputLayout,
    VertexBuffer,
}

impl fmt::Display for SetupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SetupStage::DeviceAndSwapChain => "device and swap chain creation",
            SetupStage::RenderTarget => "render target creation",
            SetupStage::VertexShader => "vertex shader creation",
            SetupStage::PixelShader => "pixel shader creation",
            SetupStage::InputLayout => "input layout creation",
            SetupStage::VertexBuffer => "vertex buffer creation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("window client area {width}x{height} is not drawable")]
    InvalidSize { width: u32, height: u32 },

    #[error("graphics context is already initialized")]
    AlreadyInitialized,

    #[error("graphics context is not initialized")]
    NotInitialized,

    #[error("{stage} failed")]
    Setup {
        stage: SetupStage,
        #[source]
        source: BackendError,
    },

    #[error("present failed (device lost: {device_lost})")]
    Present {
        device_lost: bool,
        #[source]
        source: BackendError,
    },

    #[error("window setup failed")]
    Window(#[source] BackendError),
}

impl Error {
    pub(crate) fn setup(stage: SetupStage) -> impl FnOnce(BackendError) -> Error {
        move |source| Error::Setup { stage, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_removed_counts_as_lost() {
        let removed = BackendError::Call {
            call: "Present",
            code: DEVICE_REMOVED,
        };
        let failed = BackendError::Call {
            call: "Present",
            code: E_FAIL,
        };
        assert!(removed.is_device_lost());
        assert!(!failed.is_device_lost());

        for code in [DEVICE_HUNG, DEVICE_RESET, DRIVER_INTERNAL_ERROR] {
            let lost = BackendError::Call {
                call: "Present",
                code,
            };
            assert!(lost.is_device_lost(), "{code:#010x}");
        }
    }

    #[test]
    fn messages_name_the_call_and_stage() {
        let error = Error::Setup {
            stage: SetupStage::VertexBuffer,
            source: BackendError::Call {
                call: "CreateBuffer",
                code: E_FAIL,
            },
        };
        assert_eq!(error.to_string(), "vertex buffer creation failed");
        let source = std::error::Error::source(&error).map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("CreateBuffer failed with HRESULT 0x80004005")
        );
    }
}
