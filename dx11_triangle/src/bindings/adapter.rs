use crate::{wstrlens, MemoryDbgHelper};
use windows::core::{ComInterface, Result};
use windows::Win32::Foundation::LUID;
use windows::Win32::Graphics::Direct3D11::ID3D11Device;
use windows::Win32::Graphics::Dxgi::{IDXGIDevice, DXGI_ADAPTER_DESC};

pub struct AdapterDesc {
    pub description: String,
    pub vendor_id: u32,
    pub device_id: u32,
    pub revision: u32,
    pub dedicated_video_memory: usize,
    pub shared_system_memory: usize,
    pub adapter_luid: LUID,
}

impl From<DXGI_ADAPTER_DESC> for AdapterDesc {
    fn from(desc: DXGI_ADAPTER_DESC) -> AdapterDesc {
        let len = wstrlens(&desc.Description);
        AdapterDesc {
            description: String::from_utf16_lossy(&desc.Description[..len]),
            vendor_id: desc.VendorId,
            device_id: desc.DeviceId,
            revision: desc.Revision,
            dedicated_video_memory: desc.DedicatedVideoMemory,
            shared_system_memory: desc.SharedSystemMemory,
            adapter_luid: desc.AdapterLuid,
        }
    }
}

impl std::fmt::Debug for AdapterDesc {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.debug_struct("AdapterDesc")
            .field("description", &self.description)
            .field("vendor_id", &format_args!("{:#06x}", self.vendor_id))
            .field("device_id", &format_args!("{:#06x}", self.device_id))
            .field("revision", &self.revision)
            .field(
                "dedicated_video_memory",
                &MemoryDbgHelper(self.dedicated_video_memory as u64),
            )
            .field(
                "shared_system_memory",
                &MemoryDbgHelper(self.shared_system_memory as u64),
            )
            .field("adapter_luid", &self.adapter_luid)
            .finish()
    }
}

/// 设备由哪块显示适配器创建：D3D11 设备可以转换为 IDXGIDevice，再取出其适配器。
pub fn device_adapter(device: &ID3D11Device) -> Result<AdapterDesc> {
    let dxgi_device: IDXGIDevice = device.cast()?;
    let adapter = unsafe { dxgi_device.GetAdapter()? };
    let mut desc = DXGI_ADAPTER_DESC::default();
    unsafe { adapter.GetDesc(&mut desc)? };
    Ok(desc.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use windows::Win32::Foundation::HMODULE;
    use windows::Win32::Graphics::Direct3D::D3D_DRIVER_TYPE_WARP;
    use windows::Win32::Graphics::Direct3D11::{
        D3D11CreateDevice, D3D11_CREATE_DEVICE_FLAG, D3D11_SDK_VERSION,
    };

    #[test]
    fn warp_device_reports_its_adapter() {
        let mut device = None;
        unsafe {
            D3D11CreateDevice(
                None,
                D3D_DRIVER_TYPE_WARP,
                HMODULE::default(),
                D3D11_CREATE_DEVICE_FLAG::default(),
                None,
                D3D11_SDK_VERSION,
                Some(&mut device),
                None,
                None,
            )
        }
        .unwrap();

        let desc = device_adapter(&device.unwrap()).unwrap();
        assert!(!desc.description.is_empty());
        assert!(format!("{desc:?}").contains("dedicated_video_memory"));
    }
}
