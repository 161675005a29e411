pub mod app;
pub mod command_line;
pub mod graphics;
pub mod helpers;

#[cfg(windows)]
pub mod bindings;
#[cfg(windows)]
pub mod dx_sample;

pub use app::*;
#[cfg(windows)]
pub use bindings::*;
pub use command_line::*;
pub use graphics::{Error, GraphicsContext};
pub use helpers::*;
