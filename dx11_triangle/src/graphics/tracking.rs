//! Resource-tracking test double for [`Backend`].
//!
//! Every handle it hands out is a [`Tracked`] value that records its own
//! release when dropped, so tests can assert release order, double releases
//! and leaks without a GPU.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{
    Backend, BackendError, ShaderSource, ShaderStage, SwapChainDesc, VertexAttribute, Viewport,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Kind {
    Device,
    Context,
    SwapChain,
    BackBuffer,
    RenderTargetView,
    VertexShader,
    PixelShader,
    InputLayout,
    Buffer,
}

impl Kind {
    fn call(self) -> &'static str {
        match self {
            Kind::Device | Kind::Context | Kind::SwapChain => "D3D11CreateDeviceAndSwapChain",
            Kind::BackBuffer => "IDXGISwapChain::GetBuffer",
            Kind::RenderTargetView => "CreateRenderTargetView",
            Kind::VertexShader => "CreateVertexShader",
            Kind::PixelShader => "CreatePixelShader",
            Kind::InputLayout => "CreateInputLayout",
            Kind::Buffer => "CreateBuffer",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Created(Kind),
    Released(Kind),
    SwapChain { window: u32, desc: SwapChainDesc },
    SetRenderTarget(Viewport),
    Compiled(ShaderStage),
    Layout(Vec<VertexAttribute>),
    SetPipeline,
    SetVertexBuffer { stride: u32 },
    Clear([f32; 4]),
    Draw { vertex_count: u32, start_vertex: u32 },
    Present { sync_interval: u32 },
}

#[derive(Debug, Default)]
struct Ledger {
    events: Vec<Event>,
    live: HashMap<Kind, usize>,
    created: usize,
    released: usize,
    failures: HashMap<Kind, i32>,
    present_failure: Option<i32>,
    uploaded: Option<Vec<u8>>,
}

impl Ledger {
    fn release(&mut self, kind: Kind) {
        let count = self.live.entry(kind).or_default();
        assert!(*count > 0, "{kind:?} released more often than created");
        *count -= 1;
        self.released += 1;
        self.events.push(Event::Released(kind));
    }
}

/// A handle owned by the code under test.
#[derive(Debug)]
pub struct Tracked {
    kind: Kind,
    ledger: Rc<RefCell<Ledger>>,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.ledger.borrow_mut().release(self.kind);
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrackingBackend {
    ledger: Rc<RefCell<Ledger>>,
}

impl TrackingBackend {
    /// Makes every later creation of `kind` fail with `code`.
    pub fn fail_on(&self, kind: Kind, code: i32) {
        self.ledger.borrow_mut().failures.insert(kind, code);
    }

    pub fn fail_present(&self, code: i32) {
        self.ledger.borrow_mut().present_failure = Some(code);
    }

    pub fn clear_failures(&self) {
        let mut ledger = self.ledger.borrow_mut();
        ledger.failures.clear();
        ledger.present_failure = None;
    }

    pub fn events(&self) -> Vec<Event> {
        self.ledger.borrow().events.clone()
    }

    /// Handles created and not yet released.
    pub fn live(&self) -> usize {
        self.ledger.borrow().live.values().sum()
    }

    pub fn is_live(&self, kind: Kind) -> bool {
        self.ledger.borrow().live.get(&kind).is_some_and(|count| *count > 0)
    }

    pub fn created(&self) -> usize {
        self.ledger.borrow().created
    }

    pub fn released(&self) -> usize {
        self.ledger.borrow().released
    }

    /// Bytes passed to the most recent vertex buffer creation.
    pub fn uploaded(&self) -> Option<Vec<u8>> {
        self.ledger.borrow().uploaded.clone()
    }

    fn record(&self, event: Event) {
        self.ledger.borrow_mut().events.push(event);
    }

    fn check(&self, kind: Kind) -> Result<(), BackendError> {
        match self.ledger.borrow().failures.get(&kind) {
            Some(&code) => Err(BackendError::Call {
                call: kind.call(),
                code,
            }),
            None => Ok(()),
        }
    }

    fn create(&self, kind: Kind) -> Result<Tracked, BackendError> {
        self.check(kind)?;
        let mut ledger = self.ledger.borrow_mut();
        *ledger.live.entry(kind).or_default() += 1;
        ledger.created += 1;
        ledger.events.push(Event::Created(kind));
        Ok(Tracked {
            kind,
            ledger: Rc::clone(&self.ledger),
        })
    }
}

impl Backend for TrackingBackend {
    type Window = u32;
    type Device = Tracked;
    type Context = Tracked;
    type SwapChain = Tracked;
    type RenderTargetView = Tracked;
    type VertexShader = Tracked;
    type PixelShader = Tracked;
    type InputLayout = Tracked;
    type Buffer = Tracked;
    type Bytecode = Vec<u8>;

    fn create_device_and_swap_chain(
        &self,
        window: u32,
        desc: &SwapChainDesc,
    ) -> Result<(Tracked, Tracked, Tracked), BackendError> {
        self.check(Kind::Device)?;
        self.check(Kind::Context)?;
        self.check(Kind::SwapChain)?;
        self.record(Event::SwapChain {
            window,
            desc: *desc,
        });
        Ok((
            self.create(Kind::Device)?,
            self.create(Kind::Context)?,
            self.create(Kind::SwapChain)?,
        ))
    }

    fn create_render_target_view(
        &self,
        _device: &Tracked,
        _swap_chain: &Tracked,
    ) -> Result<Tracked, BackendError> {
        let _back_buffer = self.create(Kind::BackBuffer)?;
        self.create(Kind::RenderTargetView)
    }

    fn set_render_target(&self, _context: &Tracked, _view: &Tracked, viewport: &Viewport) {
        self.record(Event::SetRenderTarget(*viewport));
    }

    /// Accepts any source that defines a `main(` function.
    fn compile_shader(&self, source: &ShaderSource) -> Result<Vec<u8>, BackendError> {
        let text = std::fs::read_to_string(&source.path).map_err(|error| {
            BackendError::ShaderCompile {
                path: source.path.clone(),
                message: error.to_string(),
            }
        })?;
        if !text.contains("main(") {
            return Err(BackendError::ShaderCompile {
                path: source.path.clone(),
                message: "error X3501: 'main': entrypoint not found".to_owned(),
            });
        }
        self.record(Event::Compiled(source.stage));
        Ok(text.into_bytes())
    }

    fn create_vertex_shader(&self, _device: &Tracked, _bytecode: &Vec<u8>) -> Result<Tracked, BackendError> {
        self.create(Kind::VertexShader)
    }

    fn create_pixel_shader(&self, _device: &Tracked, _bytecode: &Vec<u8>) -> Result<Tracked, BackendError> {
        self.create(Kind::PixelShader)
    }

    fn create_input_layout<const N: usize>(
        &self,
        _device: &Tracked,
        attributes: &[VertexAttribute; N],
        _vertex_bytecode: &Vec<u8>,
    ) -> Result<Tracked, BackendError> {
        let layout = self.create(Kind::InputLayout)?;
        self.record(Event::Layout(attributes.to_vec()));
        Ok(layout)
    }

    fn set_pipeline(&self, _context: &Tracked, _layout: &Tracked, _vs: &Tracked, _ps: &Tracked) {
        self.record(Event::SetPipeline);
    }

    fn create_vertex_buffer(&self, _device: &Tracked, contents: &[u8]) -> Result<Tracked, BackendError> {
        let buffer = self.create(Kind::Buffer)?;
        self.ledger.borrow_mut().uploaded = Some(contents.to_vec());
        Ok(buffer)
    }

    fn set_vertex_buffer(&self, _context: &Tracked, _buffer: &Tracked, stride: u32) {
        self.record(Event::SetVertexBuffer { stride });
    }

    fn clear(&self, _context: &Tracked, _view: &Tracked, color: [f32; 4]) {
        self.record(Event::Clear(color));
    }

    fn draw(&self, _context: &Tracked, vertex_count: u32, start_vertex: u32) {
        self.record(Event::Draw {
            vertex_count,
            start_vertex,
        });
    }

    fn present(&self, _swap_chain: &Tracked, sync_interval: u32) -> Result<(), BackendError> {
        self.record(Event::Present { sync_interval });
        match self.ledger.borrow().present_failure {
            Some(code) => Err(BackendError::Call {
                call: "IDXGISwapChain::Present",
                code,
            }),
            None => Ok(()),
        }
    }
}
