#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SampleCommandLine {
    /// WARP 意为 Windows Advanced Rasterization Platform（Windows 高级光栅化平台），
    /// 即用软件光栅化器代替硬件驱动创建设备。
    pub use_warp_device: bool,
}

impl SampleCommandLine {
    pub fn from_env() -> Self {
        Self::parse(std::env::args().skip(1))
    }

    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut command_line = SampleCommandLine::default();
        for arg in args {
            let arg = arg.as_ref();
            if arg.eq_ignore_ascii_case("-warp") || arg.eq_ignore_ascii_case("/warp") {
                command_line.use_warp_device = true;
            } else {
                log::warn!("ignoring unknown argument `{arg}`");
            }
        }
        command_line
    }
}
