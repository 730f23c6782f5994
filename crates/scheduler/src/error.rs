// error.rs
// 定义调度器通用的错误类型（参数错误、任务失败、超时、取消、配置等）和Result类型。
use std::fmt;
use std::io;
use std::time::Duration;

/// 调度器通用错误类型
#[derive(Debug)]
pub enum Error {
    /// IO错误
    Io(io::Error),
    /// JSON解析错误
    Json(serde_json::Error),
    /// 非法参数：负的挂起时长、空任务列表、格式错误的任务描述等
    InvalidArgument(String),
    /// 任务在某一步执行中出错
    TaskFailure { label: String, message: String },
    /// 整体等待超时
    Timeout(Duration),
    /// 调度被取消
    Cancelled(String),
    /// 配置错误
    ConfigError(String),
}

/// 通用结果类型
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// 构造任务失败错误
    pub fn task_failure(label: impl Into<String>, message: impl Into<String>) -> Self {
        Error::TaskFailure {
            label: label.into(),
            message: message.into(),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO错误: {}", e),
            Error::Json(e) => write!(f, "JSON错误: {}", e),
            Error::InvalidArgument(msg) => write!(f, "非法参数: {}", msg),
            Error::TaskFailure { label, message } => {
                write!(f, "任务 {} 执行失败: {}", label, message)
            }
            Error::Timeout(limit) => write!(f, "等待超时: {:.3}s 内任务未全部完成", limit.as_secs_f64()),
            Error::Cancelled(msg) => write!(f, "调度已取消: {}", msg),
            Error::ConfigError(msg) => write!(f, "配置错误: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}
