// logging.rs
// 基于 log 门面的最简 stderr 日志后端，由入口程序按配置的级别安装。
use crate::error::{Error, Result};
use log::{LevelFilter, Log, Metadata, Record};
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{}.{:03} {:<5} {}] {}",
            now.as_secs(),
            now.subsec_millis(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// 解析日志级别字符串
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    level
        .parse::<LevelFilter>()
        .map_err(|_| Error::ConfigError(format!("未知的日志级别: {}", level)))
}

/// 安装日志后端并设置级别；重复调用只更新级别
pub fn init(level: &str) -> Result<()> {
    let filter = parse_level(level)?;
    // 已安装过时 set_logger 返回错误，忽略即可
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(filter);
    Ok(())
}
