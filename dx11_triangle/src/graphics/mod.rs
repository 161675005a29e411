mod backend;
mod context;
pub mod error;
mod shader;
pub mod vertex;

#[cfg(test)]
pub mod tracking;

pub use backend::*;
pub use context::{GraphicsContext, State, CLEAR_COLOR};
pub use error::{BackendError, Error, SetupStage};
pub use shader::*;
pub use vertex::{AttributeFormat, Vertex, VertexAttribute};
