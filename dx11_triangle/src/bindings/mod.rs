pub mod adapter;
pub mod d3d11;

pub use d3d11::D3D11Backend;
