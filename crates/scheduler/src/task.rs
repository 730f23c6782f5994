// task.rs
// 任务描述、状态、执行上下文与执行报告。
use crate::error::{Error, Result};
use crate::observer::{Observer, TaskEvent};
use crate::suspend::{suspend, SuspendDuration, SuspendRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// 任务描述：标签 + 单个整数参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// 人类可读的任务标签
    pub label: String,
    /// 任务输入参数
    pub param: u32,
}

impl TaskSpec {
    pub fn new(label: impl Into<String>, param: u32) -> Self {
        Self {
            label: label.into(),
            param,
        }
    }
}

impl fmt::Display for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.label, self.param)
    }
}

/// 解析命令行形式的任务描述，如 `A=3`
impl FromStr for TaskSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (label, param) = s
            .split_once('=')
            .ok_or_else(|| Error::InvalidArgument(format!("任务描述 '{}' 应为 LABEL=N 格式", s)))?;
        let label = label.trim();
        if label.is_empty() {
            return Err(Error::InvalidArgument(format!("任务描述 '{}' 缺少标签", s)));
        }
        let param = param
            .trim()
            .parse::<u32>()
            .map_err(|e| Error::InvalidArgument(format!("任务 {} 的参数无效: {}", label, e)))?;
        Ok(Self::new(label, param))
    }
}

/// 任务状态枚举，描述任务的生命周期
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// 等待执行
    Pending,
    /// 正在执行
    Running,
    /// 已完成
    Completed,
    /// 执行失败，包含失败原因
    Failed(String),
    /// 被取消（超时、显式取消或快速失败）
    Cancelled,
}

impl TaskStatus {
    /// 是否已到达终止状态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed(_) | TaskStatus::Cancelled
        )
    }
}

/// 任务体成功结束时交回调度器的结果
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub result: u128,
    pub suspensions: Vec<SuspendRecord>,
}

/// 单个任务的执行报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    /// 任务唯一ID
    pub task_id: Uuid,
    pub label: String,
    pub param: u32,
    /// 当前任务状态
    pub status: TaskStatus,
    /// 计算结果，仅在Completed时有值
    pub result: Option<u128>,
    /// 挂起点穿越次数
    pub crossings: usize,
    pub suspensions: Vec<SuspendRecord>,
    /// 任务自身耗时，未结束时为 None
    pub elapsed: Option<Duration>,
}

impl TaskReport {
    pub fn pending(task_id: Uuid, spec: &TaskSpec) -> Self {
        Self {
            task_id,
            label: spec.label.clone(),
            param: spec.param,
            status: TaskStatus::Pending,
            result: None,
            crossings: 0,
            suspensions: Vec::new(),
            elapsed: None,
        }
    }

    pub(crate) fn complete(&mut self, outcome: TaskOutcome, elapsed: Duration) {
        self.status = TaskStatus::Completed;
        self.result = Some(outcome.result);
        self.crossings = outcome.suspensions.len();
        self.suspensions = outcome.suspensions;
        self.elapsed = Some(elapsed);
    }

    pub(crate) fn fail(&mut self, message: String, elapsed: Duration) {
        self.status = TaskStatus::Failed(message);
        self.elapsed = Some(elapsed);
    }
}

/// 任务执行上下文：任务体只能通过它挂起和上报进度
pub struct TaskContext {
    task_id: Uuid,
    spec: TaskSpec,
    step_delay: SuspendDuration,
    observer: Arc<dyn Observer>,
    suspensions: Vec<SuspendRecord>,
}

impl TaskContext {
    pub fn new(task_id: Uuid, spec: TaskSpec, step_delay: SuspendDuration, observer: Arc<dyn Observer>) -> Self {
        Self {
            task_id,
            spec,
            step_delay,
            observer,
            suspensions: Vec::new(),
        }
    }

    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    pub fn label(&self) -> &str {
        &self.spec.label
    }

    pub fn param(&self) -> u32 {
        self.spec.param
    }

    /// 已穿越的挂起点数量
    pub fn crossings(&self) -> usize {
        self.suspensions.len()
    }

    /// 上报正在计算的步骤
    pub fn step(&self, step: u32) {
        self.observer.on_event(&TaskEvent::Step {
            label: self.spec.label.clone(),
            step,
        });
    }

    /// 按配置的步长挂起
    pub async fn suspend(&mut self) -> Result<&SuspendRecord> {
        let delay = self.step_delay;
        self.suspend_for(delay).await
    }

    /// 按指定时长挂起，记录挂起点
    pub async fn suspend_for(&mut self, duration: SuspendDuration) -> Result<&SuspendRecord> {
        let record = suspend(duration, &self.spec.label, self.observer.as_ref()).await?;
        self.suspensions.push(record);
        Ok(&self.suspensions[self.suspensions.len() - 1])
    }

    /// 上报最终结果并结束任务
    pub fn finish(self, result: u128) -> TaskOutcome {
        self.observer.on_event(&TaskEvent::Finished {
            label: self.spec.label.clone(),
            param: self.spec.param,
            result,
        });
        TaskOutcome {
            result,
            suspensions: self.suspensions,
        }
    }
}
