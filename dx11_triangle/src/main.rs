use std::process::ExitCode;

use dx11_triangle::{init_logging, SampleCommandLine};

#[cfg(windows)]
fn report(error: &dyn std::error::Error) {
    log::error!("{error}");
    let mut source = error.source();
    while let Some(cause) = source {
        log::error!("  caused by: {cause}");
        source = cause.source();
    }
}

#[cfg(windows)]
fn main() -> ExitCode {
    use dx11_triangle::graphics::default_shader_dir;
    use dx11_triangle::{dx_sample, D3D11Backend, TriangleApp};

    init_logging();
    let command_line = SampleCommandLine::from_env();
    let backend = D3D11Backend::new(&command_line);
    let sample = TriangleApp::new(backend, default_shader_dir(), command_line.use_warp_device);

    match dx_sample::init_sample(sample) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&error);
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(windows))]
fn main() -> ExitCode {
    init_logging();
    let command_line = SampleCommandLine::from_env();
    log::debug!("{command_line:?}");
    log::error!("Direct3D 11 is only available on Windows");
    ExitCode::FAILURE
}
