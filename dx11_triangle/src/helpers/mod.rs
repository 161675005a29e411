mod logging;
mod memory_dbg_helper;

pub use logging::init_logging;
pub use memory_dbg_helper::MemoryDbgHelper;

/// 以 0 结尾的宽字符串的长度（不含结尾的 0）。
pub fn wstrlens(wide: &[u16]) -> usize {
    wide.iter().position(|&c| c == 0).unwrap_or(wide.len())
}
