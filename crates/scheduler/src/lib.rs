// lib.rs
// 协作式调度器模块入口，声明并导出各子模块。
pub mod args;
pub mod config;
pub mod error;
pub mod factorial;
pub mod logging;
pub mod observer;
pub mod report;
pub mod runner;
pub mod suspend;
pub mod task;

pub use config::{FailurePolicy, RunnerConfig};
pub use error::{Error, Result};
pub use observer::{Observer, RecordingObserver, StdoutObserver, TaskEvent};
pub use report::RunReport;
pub use runner::{CancelHandle, TaskRunner};
pub use suspend::{SuspendDuration, SuspendRecord};
pub use task::{TaskContext, TaskOutcome, TaskReport, TaskSpec, TaskStatus};
