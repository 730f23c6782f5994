// suspend.rs
// 挂起原语：在挂起点让出执行权，定时器到期后恢复，不阻塞其他就绪任务。
use crate::error::{Error, Result};
use crate::observer::{Observer, TaskEvent};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;

/// 经过校验的挂起时长（非负、有限）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SuspendDuration(Duration);

impl SuspendDuration {
    pub const ZERO: SuspendDuration = SuspendDuration(Duration::ZERO);

    /// 从秒数构造，负数、NaN 和无穷大都会被拒绝
    pub fn from_secs_f64(secs: f64) -> Result<Self> {
        if !secs.is_finite() {
            return Err(Error::InvalidArgument(format!("挂起时长必须是有限值，实际为 {}", secs)));
        }
        if secs < 0.0 {
            return Err(Error::InvalidArgument(format!("挂起时长不能为负数，实际为 {}", secs)));
        }
        Duration::try_from_secs_f64(secs)
            .map(SuspendDuration)
            .map_err(|e| Error::InvalidArgument(format!("挂起时长 {} 无法表示: {}", secs, e)))
    }

    pub fn from_millis(millis: u64) -> Self {
        SuspendDuration(Duration::from_millis(millis))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Duration> for SuspendDuration {
    fn from(d: Duration) -> Self {
        SuspendDuration(d)
    }
}

/// 一次挂起点穿越的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspendRecord {
    /// 进入挂起时的墙钟时间
    pub at: SystemTime,
    /// 声明的挂起时长
    pub requested: Duration,
    /// 实际挂起了多久，不小于 requested
    pub resumed_after: Duration,
}

/// 挂起当前任务至少 `duration`。
///
/// 进入挂起时先上报带时间戳的 `Suspended` 事件。时长为零时仍然让出一次执行权。
pub async fn suspend(duration: SuspendDuration, label: &str, observer: &dyn Observer) -> Result<SuspendRecord> {
    let at = SystemTime::now();
    observer.on_event(&TaskEvent::Suspended {
        label: label.to_string(),
        at,
    });
    log::trace!("任务 {} 挂起 {:?}", label, duration.as_duration());

    let started = Instant::now();
    if duration.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(duration.as_duration()).await;
    }

    Ok(SuspendRecord {
        at,
        requested: duration.as_duration(),
        resumed_after: started.elapsed(),
    })
}

/// 以秒数挂起，先校验时长
pub async fn suspend_secs(secs: f64, label: &str, observer: &dyn Observer) -> Result<SuspendRecord> {
    let duration = SuspendDuration::from_secs_f64(secs)?;
    suspend(duration, label, observer).await
}

/// 将墙钟时间格式化为 Unix 秒数（微秒精度）
pub fn format_timestamp(at: SystemTime) -> String {
    let since_epoch = at.duration_since(UNIX_EPOCH).unwrap_or_default();
    format!("{}.{:06}", since_epoch.as_secs(), since_epoch.subsec_micros())
}
