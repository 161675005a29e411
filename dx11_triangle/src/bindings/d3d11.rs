use std::ffi::c_void;

use windows::core::{HSTRING, PCSTR};
use windows::Win32::Foundation::{E_POINTER, HMODULE, HWND};
use windows::Win32::Graphics::Direct3D::Fxc::*;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;

use crate::adapter;
use crate::graphics::{
    AttributeFormat, Backend, BackendError, ShaderSource, SwapChainDesc, VertexAttribute,
    Viewport, ENTRY_POINT,
};
use crate::SampleCommandLine;

const BACK_BUFFER_FORMAT: DXGI_FORMAT = DXGI_FORMAT_R8G8B8A8_UNORM;

/// Direct3D 11 实现。COM 接口在 drop 时自动 Release，因此这里直接把接口本身当作句柄交出去。
pub struct D3D11Backend {
    driver_type: D3D_DRIVER_TYPE,
}

impl D3D11Backend {
    pub fn new(command_line: &SampleCommandLine) -> Self {
        // 通过命令行来控制使用硬件驱动，还是 WARP 软件光栅化器。
        let driver_type = if command_line.use_warp_device {
            D3D_DRIVER_TYPE_WARP
        } else {
            D3D_DRIVER_TYPE_HARDWARE
        };
        D3D11Backend { driver_type }
    }
}

/// 输出参数在调用成功后理应有值，没有则视为空指针错误。
fn created<T>(call: &'static str, out: Option<T>) -> Result<T, BackendError> {
    out.ok_or(BackendError::Call {
        call,
        code: E_POINTER.0,
    })
}

fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
    unsafe { std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize()) }
}

fn dxgi_format(format: AttributeFormat) -> DXGI_FORMAT {
    match format {
        AttributeFormat::Float32x3 => DXGI_FORMAT_R32G32B32_FLOAT,
        AttributeFormat::Float32x4 => DXGI_FORMAT_R32G32B32A32_FLOAT,
    }
}

impl Backend for D3D11Backend {
    type Window = HWND;
    type Device = ID3D11Device;
    type Context = ID3D11DeviceContext;
    type SwapChain = IDXGISwapChain;
    type RenderTargetView = ID3D11RenderTargetView;
    type VertexShader = ID3D11VertexShader;
    type PixelShader = ID3D11PixelShader;
    type InputLayout = ID3D11InputLayout;
    type Buffer = ID3D11Buffer;
    type Bytecode = ID3DBlob;

    fn create_device_and_swap_chain(
        &self,
        window: HWND,
        desc: &SwapChainDesc,
    ) -> Result<(ID3D11Device, ID3D11DeviceContext, IDXGISwapChain), BackendError> {
        let swap_chain_desc = DXGI_SWAP_CHAIN_DESC {
            BufferDesc: DXGI_MODE_DESC {
                Width: desc.width,
                Height: desc.height,
                RefreshRate: DXGI_RATIONAL {
                    Numerator: desc.refresh_rate.numerator,
                    Denominator: desc.refresh_rate.denominator,
                },
                Format: BACK_BUFFER_FORMAT,
                ..Default::default()
            },
            // 对于单次采样来说，我们要将采样数量指定为 1，质量级别指定为 0。
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            // 由于我们要将数据渲染至后台缓冲区（即用它作为渲染目标），因此将此参数指定为 DXGI_USAGE_RENDER_TARGET_OUTPUT。
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            BufferCount: desc.buffer_count,
            OutputWindow: window,
            Windowed: desc.windowed.into(),
            SwapEffect: DXGI_SWAP_EFFECT_DISCARD,
            Flags: DXGI_SWAP_CHAIN_FLAG_ALLOW_MODE_SWITCH.0 as u32,
        };

        let mut swap_chain = None;
        let mut device = None;
        let mut context = None;
        unsafe {
            D3D11CreateDeviceAndSwapChain(
                None, // 使用默认适配器
                self.driver_type,
                HMODULE::default(),
                D3D11_CREATE_DEVICE_FLAG::default(),
                None, // 由运行时选择可用的最高功能级别
                D3D11_SDK_VERSION,
                Some(&swap_chain_desc),
                Some(&mut swap_chain),
                Some(&mut device),
                None,
                Some(&mut context),
            )
        }
        .map_err(BackendError::hresult("D3D11CreateDeviceAndSwapChain"))?;

        let device = created("D3D11CreateDeviceAndSwapChain", device)?;
        let context = created("D3D11CreateDeviceAndSwapChain", context)?;
        let swap_chain = created("D3D11CreateDeviceAndSwapChain", swap_chain)?;

        match adapter::device_adapter(&device) {
            Ok(desc) => log::info!("adapter: {:?}", desc),
            Err(error) => log::warn!("could not query the device's adapter: {error}"),
        }
        Ok((device, context, swap_chain))
    }

    fn create_render_target_view(
        &self,
        device: &ID3D11Device,
        swap_chain: &IDXGISwapChain,
    ) -> Result<ID3D11RenderTargetView, BackendError> {
        // 资源不能与渲染流水线中的阶段直接绑定，所以我们必须先为后台缓冲区创建渲染目标视图。
        let back_buffer: ID3D11Texture2D = unsafe { swap_chain.GetBuffer(0) }
            .map_err(BackendError::hresult("IDXGISwapChain::GetBuffer"))?;

        let mut view = None;
        unsafe { device.CreateRenderTargetView(&back_buffer, None, Some(&mut view)) }
            .map_err(BackendError::hresult("CreateRenderTargetView"))?;
        created("CreateRenderTargetView", view)
    }

    fn set_render_target(
        &self,
        context: &ID3D11DeviceContext,
        view: &ID3D11RenderTargetView,
        viewport: &Viewport,
    ) {
        let viewport = D3D11_VIEWPORT {
            TopLeftX: viewport.top_left_x,
            TopLeftY: viewport.top_left_y,
            Width: viewport.width,
            Height: viewport.height,
            MinDepth: viewport.min_depth,
            MaxDepth: viewport.max_depth,
        };
        unsafe {
            context.OMSetRenderTargets(Some(&[Some(view.clone())]), None);
            context.RSSetViewports(Some(&[viewport]));
        }
    }

    fn compile_shader(&self, source: &ShaderSource) -> Result<ID3DBlob, BackendError> {
        let compile_flags = if cfg!(debug_assertions) {
            D3DCOMPILE_DEBUG | D3DCOMPILE_SKIP_OPTIMIZATION
        } else {
            0
        };
        let path = HSTRING::from(source.path.as_os_str());

        let mut code = None;
        let mut errors = None;
        let compiled = unsafe {
            D3DCompileFromFile(
                &path,
                None,
                None,
                PCSTR(ENTRY_POINT.as_ptr().cast()),
                PCSTR(source.stage.target().as_ptr().cast()),
                compile_flags,
                0,
                &mut code,
                Some(&mut errors),
            )
        };

        if let Err(error) = compiled {
            // 编译器的诊断信息在 errors blob 中，没有时退回到 HRESULT 的描述。
            let message = match errors {
                Some(blob) => String::from_utf8_lossy(blob_bytes(&blob))
                    .trim_end_matches('\0')
                    .trim()
                    .to_owned(),
                None => error.message().to_string(),
            };
            return Err(BackendError::ShaderCompile {
                path: source.path.clone(),
                message,
            });
        }
        created("D3DCompileFromFile", code)
    }

    fn create_vertex_shader(
        &self,
        device: &ID3D11Device,
        bytecode: &ID3DBlob,
    ) -> Result<ID3D11VertexShader, BackendError> {
        let mut shader = None;
        unsafe { device.CreateVertexShader(blob_bytes(bytecode), None, Some(&mut shader)) }
            .map_err(BackendError::hresult("CreateVertexShader"))?;
        created("CreateVertexShader", shader)
    }

    fn create_pixel_shader(
        &self,
        device: &ID3D11Device,
        bytecode: &ID3DBlob,
    ) -> Result<ID3D11PixelShader, BackendError> {
        let mut shader = None;
        unsafe { device.CreatePixelShader(blob_bytes(bytecode), None, Some(&mut shader)) }
            .map_err(BackendError::hresult("CreatePixelShader"))?;
        created("CreatePixelShader", shader)
    }

    fn create_input_layout<const N: usize>(
        &self,
        device: &ID3D11Device,
        attributes: &[VertexAttribute; N],
        vertex_bytecode: &ID3DBlob,
    ) -> Result<ID3D11InputLayout, BackendError> {
        // 输入布局描述由顶点结构体的属性表逐项生成，语义名指向 'static 的 C 字符串。
        let input_element_descs: [D3D11_INPUT_ELEMENT_DESC; N] = array_init::array_init(|i| {
            let attribute = &attributes[i];
            D3D11_INPUT_ELEMENT_DESC {
                SemanticName: PCSTR(attribute.semantic.as_ptr().cast()),
                SemanticIndex: 0,
                Format: dxgi_format(attribute.format),
                InputSlot: 0,
                AlignedByteOffset: attribute.offset,
                InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                InstanceDataStepRate: 0,
            }
        });

        let mut layout = None;
        unsafe {
            device.CreateInputLayout(
                &input_element_descs,
                blob_bytes(vertex_bytecode),
                Some(&mut layout),
            )
        }
        .map_err(BackendError::hresult("CreateInputLayout"))?;
        created("CreateInputLayout", layout)
    }

    fn set_pipeline(
        &self,
        context: &ID3D11DeviceContext,
        layout: &ID3D11InputLayout,
        vertex_shader: &ID3D11VertexShader,
        pixel_shader: &ID3D11PixelShader,
    ) {
        unsafe {
            context.IASetInputLayout(layout);
            context.VSSetShader(vertex_shader, None);
            context.PSSetShader(pixel_shader, None);
        }
    }

    fn create_vertex_buffer(
        &self,
        device: &ID3D11Device,
        contents: &[u8],
    ) -> Result<ID3D11Buffer, BackendError> {
        // 三角形数据不会再变，用 IMMUTABLE 让驱动把它放在只供 GPU 读取的显存里。
        let desc = D3D11_BUFFER_DESC {
            ByteWidth: contents.len() as u32,
            Usage: D3D11_USAGE_IMMUTABLE,
            BindFlags: D3D11_BIND_VERTEX_BUFFER,
            ..Default::default()
        };
        let init_data = D3D11_SUBRESOURCE_DATA {
            pSysMem: contents.as_ptr() as *const c_void,
            ..Default::default()
        };

        let mut buffer = None;
        unsafe { device.CreateBuffer(&desc, Some(&init_data), Some(&mut buffer)) }
            .map_err(BackendError::hresult("CreateBuffer"))?;
        created("CreateBuffer", buffer)
    }

    fn set_vertex_buffer(&self, context: &ID3D11DeviceContext, buffer: &ID3D11Buffer, stride: u32) {
        let offset = 0;
        unsafe {
            context.IASetVertexBuffers(0, 1, Some(&Some(buffer.clone())), Some(&stride), Some(&offset));
            context.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
        }
    }

    fn clear(&self, context: &ID3D11DeviceContext, view: &ID3D11RenderTargetView, color: [f32; 4]) {
        unsafe { context.ClearRenderTargetView(view, color.as_ptr()) };
    }

    fn draw(&self, context: &ID3D11DeviceContext, vertex_count: u32, start_vertex: u32) {
        unsafe { context.Draw(vertex_count, start_vertex) };
    }

    fn present(&self, swap_chain: &IDXGISwapChain, sync_interval: u32) -> Result<(), BackendError> {
        unsafe { swap_chain.Present(sync_interval, 0) }
            .ok()
            .map_err(BackendError::hresult("IDXGISwapChain::Present"))
    }
}
