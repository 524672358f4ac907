// 日志初始化（fern）

use chrono::Local;
use log::LevelFilter;

pub fn init(level: LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        // 依赖库只保留警告
        .level_for("hyper", LevelFilter::Warn)
        .level_for("tower_http", LevelFilter::Warn)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}
