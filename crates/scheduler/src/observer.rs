// observer.rs
// 任务进度事件及其观察者：标准输出打印，或在测试中记录下来。
use crate::suspend::format_timestamp;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

/// 任务执行过程中产生的可观察事件
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    /// 开始计算某一步
    Step { label: String, step: u32 },
    /// 进入挂起点
    Suspended { label: String, at: SystemTime },
    /// 计算完成
    Finished { label: String, param: u32, result: u128 },
}

impl TaskEvent {
    pub fn label(&self) -> &str {
        match self {
            TaskEvent::Step { label, .. }
            | TaskEvent::Suspended { label, .. }
            | TaskEvent::Finished { label, .. } => label,
        }
    }
}

/// 事件的标准输出格式
impl fmt::Display for TaskEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskEvent::Step { label, step } => {
                write!(f, "Task: {}: Compute factorial for: {}", label, step)
            }
            TaskEvent::Suspended { at, .. } => write!(f, "SLEEP {}", format_timestamp(*at)),
            TaskEvent::Finished { label, param, result } => {
                writeln!(f, "Task {}: factorial({}) is {}", label, param, result)
            }
        }
    }
}

/// 任务事件观察者
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &TaskEvent);
}

/// 将事件逐行打印到标准输出
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutObserver;

impl Observer for StdoutObserver {
    fn on_event(&self, event: &TaskEvent) {
        println!("{}", event);
    }
}

/// 丢弃所有事件
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl Observer for SilentObserver {
    fn on_event(&self, _event: &TaskEvent) {}
}

/// 按发生顺序记录事件，供测试断言交错顺序
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<TaskEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 事件快照
    pub fn events(&self) -> Vec<TaskEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// 按标准输出格式渲染的行
    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(|e| e.to_string()).collect()
    }

    /// 某个任务上报的步骤序列
    pub fn steps_of(&self, label: &str) -> Vec<u32> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                TaskEvent::Step { label: l, step } if l == label => Some(*step),
                _ => None,
            })
            .collect()
    }

    /// 某个任务的挂起次数
    pub fn suspensions_of(&self, label: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, TaskEvent::Suspended { label: l, .. } if l == label))
            .count()
    }

    /// 事件中各任务标签的出现顺序（含重复）
    pub fn label_sequence(&self) -> Vec<String> {
        self.events().iter().map(|e| e.label().to_string()).collect()
    }
}

impl Observer for RecordingObserver {
    fn on_event(&self, event: &TaskEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_event_lines() {
        let step = TaskEvent::Step {
            label: "A".to_string(),
            step: 2,
        };
        assert_eq!(step.to_string(), "Task: A: Compute factorial for: 2");

        let sleep = TaskEvent::Suspended {
            label: "A".to_string(),
            at: UNIX_EPOCH + Duration::from_micros(1_500_000),
        };
        assert_eq!(sleep.to_string(), "SLEEP 1.500000");

        let done = TaskEvent::Finished {
            label: "B".to_string(),
            param: 4,
            result: 24,
        };
        assert_eq!(done.to_string(), "Task B: factorial(4) is 24\n");
    }

    #[test]
    fn test_recording_observer_filters_by_label() {
        let observer = RecordingObserver::new();
        observer.on_event(&TaskEvent::Step { label: "A".to_string(), step: 2 });
        observer.on_event(&TaskEvent::Step { label: "B".to_string(), step: 2 });
        observer.on_event(&TaskEvent::Suspended { label: "A".to_string(), at: UNIX_EPOCH });
        observer.on_event(&TaskEvent::Step { label: "A".to_string(), step: 3 });

        assert_eq!(observer.steps_of("A"), vec![2, 3]);
        assert_eq!(observer.steps_of("B"), vec![2]);
        assert_eq!(observer.suspensions_of("A"), 1);
        assert_eq!(observer.suspensions_of("B"), 0);
        assert_eq!(observer.label_sequence(), vec!["A", "B", "A", "A"]);
        assert_eq!(observer.lines()[0], "Task: A: Compute factorial for: 2");
        assert_eq!(observer.lines()[2], "SLEEP 0.000000");
    }
}
