// from https://github.com/Connicpu/dxgi-rs/blob/master/src/helpers/mod.rs
/// 以 B/KB/MB... 打印字节数，用于显卡显存等调试输出。
pub struct MemoryDbgHelper(pub u64);

impl std::fmt::Debug for MemoryDbgHelper {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        static LEVELS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB", "EB"];

        let mut amount = self.0 as f64;
        let mut level = 0;
        while amount >= 1024.0 && level + 1 < LEVELS.len() {
            level += 1;
            amount /= 1024.0;
        }

        match (level, amount) {
            (0, _) => write!(fmt, "{:.0}{}", amount, LEVELS[level]),
            (_, a) if a < 10.0 => write!(fmt, "{:.2}{}", amount, LEVELS[level]),
            (_, a) if a < 100.0 => write!(fmt, "{:.1}{}", amount, LEVELS[level]),
            _ => write!(fmt, "{:.0}{}", amount, LEVELS[level]),
        }
    }
}

#[test]
fn memory_dbg_helper() {
    let shown = |bytes: u64| format!("{:?}", MemoryDbgHelper(bytes));
    assert_eq!(shown(0), "0B");
    assert_eq!(shown(1000), "1000B");
    assert_eq!(shown(1536), "1.50KB");
    assert_eq!(shown(4 * 1024u64.pow(3)), "4.00GB");
    assert_eq!(shown(24 * 1024u64.pow(3)), "24.0GB");
    assert_eq!(shown(512 * 1024u64.pow(2)), "512MB");
    assert_eq!(shown(u64::MAX), "16.0EB");
}
