use std::sync::Once;

static INIT: Once = Once::new();

/// 初始化全局日志。`RUST_LOG` 可覆盖默认的 info 级别，重复调用会被忽略。
pub fn init_logging() {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        match std::env::var("RUST_LOG") {
            Ok(filter) => builder.parse_filters(&filter),
            Err(_) => builder.filter_level(log::LevelFilter::Info),
        };
        builder.init();
        log::debug!("logging initialized");
    });
}
