mod triangle;

pub use triangle::TriangleApp;

use crate::graphics::Error;

/// Escape 键的虚拟键码
pub const VK_ESCAPE: u8 = 0x1B;

/// What the window host should do after a key press.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyAction {
    None,
    /// 弹出确认框，用户选择“是”后销毁窗口。
    ConfirmExit,
}

/// 窗口宿主驱动的示例程序。宿主负责创建窗口与消息循环，示例只关心渲染。
pub trait Sample {
    type Window: Copy;

    fn title(&self) -> String {
        "DXSample".into()
    }

    /// 期望的客户区大小
    fn window_size(&self) -> (u32, u32) {
        (800, 600)
    }

    fn bind_to_window(&mut self, window: Self::Window, width: u32, height: u32) -> Result<(), Error>;

    /// Called on every idle pass of the message loop.
    fn render(&mut self) -> Result<(), Error>;

    fn on_key_down(&mut self, _key: u8) -> KeyAction {
        KeyAction::None
    }

    /// Called while the window is being destroyed, before it is gone.
    fn on_destroy(&mut self) {}
}
