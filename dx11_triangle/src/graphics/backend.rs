use super::{BackendError, ShaderSource, VertexAttribute};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Rational {
    pub numerator: u32,
    pub denominator: u32,
}

/// 交换链的描述。后台缓冲区格式固定为 R8G8B8A8_UNORM，单重采样。
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SwapChainDesc {
    pub width: u32,
    pub height: u32,
    pub buffer_count: u32,
    pub refresh_rate: Rational,
    pub windowed: bool,
}

impl SwapChainDesc {
    pub fn for_window(width: u32, height: u32) -> Self {
        SwapChainDesc {
            width,
            height,
            buffer_count: 1,
            refresh_rate: Rational {
                numerator: 60,
                denominator: 1,
            },
            windowed: true,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// 覆盖整个窗口客户区的视口
    pub fn full(width: u32, height: u32) -> Self {
        Viewport {
            top_left_x: 0.0,
            top_left_y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// The graphics API the [`GraphicsContext`](super::GraphicsContext) drives.
///
/// Every associated handle type releases its GPU object when dropped, so the
/// context owns them as plain values and never releases anything by hand.
pub trait Backend {
    type Window: Copy;
    type Device;
    type Context;
    type SwapChain;
    type RenderTargetView;
    type VertexShader;
    type PixelShader;
    type InputLayout;
    type Buffer;
    /// Compiled shader blob. Only lives for the duration of initialization.
    type Bytecode;

    fn create_device_and_swap_chain(
        &self,
        window: Self::Window,
        desc: &SwapChainDesc,
    ) -> Result<(Self::Device, Self::Context, Self::SwapChain), BackendError>;

    /// Creates a view over back buffer 0. The back buffer reference itself is
    /// dropped before returning.
    fn create_render_target_view(
        &self,
        device: &Self::Device,
        swap_chain: &Self::SwapChain,
    ) -> Result<Self::RenderTargetView, BackendError>;

    fn set_render_target(
        &self,
        context: &Self::Context,
        view: &Self::RenderTargetView,
        viewport: &Viewport,
    );

    fn compile_shader(&self, source: &ShaderSource) -> Result<Self::Bytecode, BackendError>;

    fn create_vertex_shader(
        &self,
        device: &Self::Device,
        bytecode: &Self::Bytecode,
    ) -> Result<Self::VertexShader, BackendError>;

    fn create_pixel_shader(
        &self,
        device: &Self::Device,
        bytecode: &Self::Bytecode,
    ) -> Result<Self::PixelShader, BackendError>;

    fn create_input_layout<const N: usize>(
        &self,
        device: &Self::Device,
        attributes: &[VertexAttribute; N],
        vertex_bytecode: &Self::Bytecode,
    ) -> Result<Self::InputLayout, BackendError>;

    fn set_pipeline(
        &self,
        context: &Self::Context,
        layout: &Self::InputLayout,
        vertex_shader: &Self::VertexShader,
        pixel_shader: &Self::PixelShader,
    );

    /// Creates an immutable vertex buffer initialised with `contents`.
    fn create_vertex_buffer(
        &self,
        device: &Self::Device,
        contents: &[u8],
    ) -> Result<Self::Buffer, BackendError>;

    /// Binds `buffer` at slot 0 with offset 0 and selects triangle-list topology.
    fn set_vertex_buffer(&self, context: &Self::Context, buffer: &Self::Buffer, stride: u32);

    fn clear(&self, context: &Self::Context, view: &Self::RenderTargetView, color: [f32; 4]);

    fn draw(&self, context: &Self::Context, vertex_count: u32, start_vertex: u32);

    fn present(&self, swap_chain: &Self::SwapChain, sync_interval: u32) -> Result<(), BackendError>;
}
