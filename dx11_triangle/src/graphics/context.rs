use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use super::vertex::{validate_layout, Vertex, TRIANGLE};
use super::{Backend, BackendError, Error, SetupStage, ShaderSource, ShaderStage, SwapChainDesc, Viewport};

pub const CLEAR_COLOR: [f32; 4] = [1.0, 0.522, 0.349, 0.961];

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum State {
    Uninitialized,
    /// initialize 中途失败，部分资源仍由上下文持有，等待 shutdown 释放。
    Failed,
    Ready,
}

/// GPU 对象按释放顺序声明：结构体析构时字段按声明顺序依次 drop，
/// 正好是创建顺序的逆序。
struct Resources<B: Backend> {
    vertex_buffer: Option<B::Buffer>,
    input_layout: Option<B::InputLayout>,
    pixel_shader: Option<B::PixelShader>,
    vertex_shader: Option<B::VertexShader>,
    render_target_view: Option<B::RenderTargetView>,
    swap_chain: Option<B::SwapChain>,
    context: Option<B::Context>,
    device: Option<B::Device>,
}

impl<B: Backend> Resources<B> {
    fn empty() -> Self {
        Resources {
            vertex_buffer: None,
            input_layout: None,
            pixel_shader: None,
            vertex_shader: None,
            render_target_view: None,
            swap_chain: None,
            context: None,
            device: None,
        }
    }

    fn live_count(&self) -> usize {
        [
            self.vertex_buffer.is_some(),
            self.input_layout.is_some(),
            self.pixel_shader.is_some(),
            self.vertex_shader.is_some(),
            self.render_target_view.is_some(),
            self.swap_chain.is_some(),
            self.context.is_some(),
            self.device.is_some(),
        ]
        .into_iter()
        .filter(|live| *live)
        .count()
    }
}

/// Brings a window's swap chain into a drawable state, draws the triangle
/// once per [`render_frame`](Self::render_frame) and releases everything on
/// [`shutdown`](Self::shutdown) or drop.
///
/// The context is tied to the thread that owns the window's message pump and
/// is neither `Send` nor `Sync`.
pub struct GraphicsContext<B: Backend> {
    backend: B,
    shader_dir: PathBuf,
    resources: Resources<B>,
    state: State,
    _single_thread: PhantomData<*const ()>,
}

impl<B: Backend> GraphicsContext<B> {
    pub fn new(backend: B, shader_dir: impl Into<PathBuf>) -> Self {
        GraphicsContext {
            backend,
            shader_dir: shader_dir.into(),
            resources: Resources::empty(),
            state: State::Uninitialized,
            _single_thread: PhantomData,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn shader_dir(&self) -> &Path {
        &self.shader_dir
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Number of GPU objects currently owned (at most eight).
    pub fn live_objects(&self) -> usize {
        self.resources.live_count()
    }

    /// 设备与交换链、渲染目标视图、视口、着色器与输入布局、顶点缓冲区，依次创建。
    ///
    /// 任一步失败都会立即返回 [`Error::Setup`]，之前创建的对象留在上下文中，
    /// 由 [`shutdown`](Self::shutdown) 统一释放。
    pub fn initialize(&mut self, window: B::Window, width: u32, height: u32) -> Result<(), Error> {
        match self.state {
            State::Ready => return Err(Error::AlreadyInitialized),
            State::Failed => {
                log::warn!("releasing resources left by a failed initialization");
                self.shutdown();
            }
            State::Uninitialized => {}
        }
        if width == 0 || height == 0 {
            return Err(Error::InvalidSize { width, height });
        }

        self.state = State::Failed;
        self.create_resources(window, width, height)?;
        self.state = State::Ready;
        log::info!("graphics context ready at {width}x{height}");
        Ok(())
    }

    fn create_resources(&mut self, window: B::Window, width: u32, height: u32) -> Result<(), Error> {
        let backend = &self.backend;
        let res = &mut self.resources;

        log::debug!("creating device and swap chain");
        let (device, context, swap_chain) = backend
            .create_device_and_swap_chain(window, &SwapChainDesc::for_window(width, height))
            .map_err(Error::setup(SetupStage::DeviceAndSwapChain))?;
        let device = &*res.device.insert(device);
        let context = &*res.context.insert(context);
        let swap_chain = &*res.swap_chain.insert(swap_chain);

        log::debug!("creating render target view");
        let view = backend
            .create_render_target_view(device, swap_chain)
            .map_err(Error::setup(SetupStage::RenderTarget))?;
        let view = &*res.render_target_view.insert(view);
        backend.set_render_target(context, view, &Viewport::full(width, height));

        log::debug!("compiling shaders from {}", self.shader_dir.display());
        let vs_bytecode = compile(backend, &self.shader_dir, ShaderStage::Vertex)
            .map_err(Error::setup(SetupStage::VertexShader))?;
        let vertex_shader = backend
            .create_vertex_shader(device, &vs_bytecode)
            .map_err(Error::setup(SetupStage::VertexShader))?;
        let vertex_shader = &*res.vertex_shader.insert(vertex_shader);

        let ps_bytecode = compile(backend, &self.shader_dir, ShaderStage::Pixel)
            .map_err(Error::setup(SetupStage::PixelShader))?;
        let pixel_shader = backend
            .create_pixel_shader(device, &ps_bytecode)
            .map_err(Error::setup(SetupStage::PixelShader))?;
        let pixel_shader = &*res.pixel_shader.insert(pixel_shader);

        validate_layout(&Vertex::ATTRIBUTES, Vertex::STRIDE)
            .map_err(Error::setup(SetupStage::InputLayout))?;
        let layout = backend
            .create_input_layout(device, &Vertex::ATTRIBUTES, &vs_bytecode)
            .map_err(Error::setup(SetupStage::InputLayout))?;
        let layout = &*res.input_layout.insert(layout);
        backend.set_pipeline(context, layout, vertex_shader, pixel_shader);

        log::debug!("uploading {} vertices", TRIANGLE.len());
        let buffer = backend
            .create_vertex_buffer(device, bytemuck::cast_slice(&TRIANGLE))
            .map_err(Error::setup(SetupStage::VertexBuffer))?;
        let buffer = &*res.vertex_buffer.insert(buffer);
        backend.set_vertex_buffer(context, buffer, Vertex::STRIDE);

        Ok(())
    }

    /// 清屏、绘制三个顶点，然后以同步间隔 0 呈现（不等待垂直同步）。
    pub fn render_frame(&mut self) -> Result<(), Error> {
        if self.state != State::Ready {
            return Err(Error::NotInitialized);
        }
        let res = &self.resources;
        let (Some(context), Some(view), Some(swap_chain)) =
            (&res.context, &res.render_target_view, &res.swap_chain)
        else {
            return Err(Error::NotInitialized);
        };

        self.backend.clear(context, view, CLEAR_COLOR);
        self.backend.draw(context, TRIANGLE.len() as u32, 0);
        self.backend
            .present(swap_chain, 0)
            .map_err(|source| Error::Present {
                device_lost: source.is_device_lost(),
                source,
            })
    }

    /// Releases every owned GPU object, newest first. Safe to call any number
    /// of times and from any state.
    pub fn shutdown(&mut self) {
        let resources = std::mem::replace(&mut self.resources, Resources::empty());
        let live = resources.live_count();
        drop(resources);
        if live > 0 {
            log::debug!("released {live} GPU objects");
        }
        self.state = State::Uninitialized;
    }
}

impl<B: Backend> Drop for GraphicsContext<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn compile<B: Backend>(backend: &B, dir: &Path, stage: ShaderStage) -> Result<B::Bytecode, BackendError> {
    let source = ShaderSource::new(dir, stage);
    if !source.path.is_file() {
        return Err(BackendError::MissingShader { path: source.path });
    }
    backend.compile_shader(&source).inspect_err(|error| {
        if let BackendError::ShaderCompile { message, .. } = error {
            log::error!("{}:\n{message}", source.path.display());
        }
    })
}
