// config.rs
// 运行器全局配置：步长挂起时长、整体超时、失败策略、默认任务列表和日志级别。
use crate::error::{Error, Result};
use crate::suspend::SuspendDuration;
use crate::task::TaskSpec;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// 有任务失败时调度器的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// 等待所有任务结束后返回第一个失败，其余错误丢弃
    #[default]
    WaitAll,
    /// 第一个失败立即取消其余任务
    FailFast,
}

/// 运行器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// 每一步的挂起时长（秒）
    pub step_delay_secs: f64,
    /// 整体等待超时（秒），None 表示不限
    pub timeout_secs: Option<f64>,
    /// 失败策略
    pub failure_policy: FailurePolicy,
    /// 为 true 时空任务列表视为非法参数
    pub require_tasks: bool,
    /// 入口程序默认运行的任务
    pub tasks: Vec<TaskSpec>,
    /// 日志级别：off/error/warn/info/debug/trace
    pub log_level: String,
}

impl Default for RunnerConfig {
    /// 默认配置：每步挂起2秒，不超时，等待全部任务，运行 A=3 与 B=4
    fn default() -> Self {
        Self {
            step_delay_secs: 2.0,
            timeout_secs: None,
            failure_policy: FailurePolicy::WaitAll,
            require_tasks: false,
            tasks: vec![TaskSpec::new("A", 3), TaskSpec::new("B", 4)],
            log_level: "info".to_string(),
        }
    }
}

impl RunnerConfig {
    /// 从 JSON 文件读取配置，缺省字段取默认值
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ConfigError(format!("配置文件 {} 不存在", path.display())));
        }
        let mut file = File::open(path)
            .map_err(|e| Error::ConfigError(format!("打开 {} 失败: {}", path.display(), e)))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let config: RunnerConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// 写出为格式化的 JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 校验各字段
    pub fn validate(&self) -> Result<()> {
        self.step_delay()?;
        self.timeout()?;
        crate::logging::parse_level(&self.log_level)?;
        if let Some(task) = self.tasks.iter().find(|t| t.label.trim().is_empty()) {
            return Err(Error::ConfigError(format!("任务标签不能为空 (参数 {})", task.param)));
        }
        Ok(())
    }

    /// 每步挂起时长
    pub fn step_delay(&self) -> Result<SuspendDuration> {
        SuspendDuration::from_secs_f64(self.step_delay_secs)
    }

    /// 整体超时
    pub fn timeout(&self) -> Result<Option<Duration>> {
        match self.timeout_secs {
            None => Ok(None),
            Some(secs) if secs.is_finite() && secs > 0.0 => Duration::try_from_secs_f64(secs)
                .map(Some)
                .map_err(|e| Error::InvalidArgument(format!("超时时间 {} 无法表示: {}", secs, e))),
            Some(secs) => Err(Error::InvalidArgument(format!("超时时间必须为正数，实际为 {}", secs))),
        }
    }
}
