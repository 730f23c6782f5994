// runner.rs
// 协作式任务运行器：同时启动一批任务，等待全部到达终止状态后汇报总耗时。
use crate::config::{FailurePolicy, RunnerConfig};
use crate::error::{Error, Result};
use crate::factorial::factorial;
use crate::observer::{Observer, StdoutObserver};
use crate::report::RunReport;
use crate::task::{TaskContext, TaskOutcome, TaskReport, TaskSpec, TaskStatus};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{Id, JoinError, JoinSet};
use tokio::time::Instant;
use uuid::Uuid;

type Joined = std::result::Result<(Id, (Result<TaskOutcome>, Duration)), JoinError>;

/// 某个任务结束时的结局
enum Settled {
    Completed,
    Failed(Error),
    Cancelled,
}

/// 取消句柄，可在运行期间从其他任务中取消整批任务
#[derive(Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// 取消：所有未结束的任务停止推进并标记为 Cancelled
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// 协作式任务运行器
pub struct TaskRunner {
    /// 运行器配置
    pub config: RunnerConfig,
    observer: Arc<dyn Observer>,
    /// 已提交但尚未启动的任务
    queue: Arc<Mutex<VecDeque<TaskSpec>>>,
    cancel_tx: Arc<watch::Sender<bool>>,
    last_report: Mutex<Option<RunReport>>,
}

impl TaskRunner {
    /// 创建新的运行器实例
    pub fn new(config: RunnerConfig, observer: Arc<dyn Observer>) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            config,
            observer,
            queue: Arc::new(Mutex::new(VecDeque::new())),
            cancel_tx: Arc::new(cancel_tx),
            last_report: Mutex::new(None),
        }
    }

    /// 进度打印到标准输出的运行器
    pub fn with_stdout(config: RunnerConfig) -> Self {
        Self::new(config, Arc::new(StdoutObserver))
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: self.cancel_tx.clone(),
        }
    }

    /// 提交一个任务，等待 `run_pending` 时一起启动
    pub fn submit_task(&self, spec: TaskSpec) {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.push_back(spec);
    }

    pub fn pending_count(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// 最近一次运行的报告，失败、超时或取消时也会保留
    pub fn last_report(&self) -> Option<RunReport> {
        self.last_report
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 启动所有已提交的任务
    pub async fn run_pending(&self) -> Result<RunReport> {
        let specs: Vec<TaskSpec> = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        self.run(specs).await
    }

    /// 用阶乘任务体运行一批任务
    pub async fn run(&self, specs: Vec<TaskSpec>) -> Result<RunReport> {
        self.run_with(specs, factorial).await
    }

    /// 在新建的单线程运行时上运行一批阶乘任务，阻塞直到全部结束
    pub fn block_on(&self, specs: Vec<TaskSpec>) -> Result<RunReport> {
        self.block_on_with(specs, factorial)
    }

    /// 在新建的单线程运行时上用任意任务体运行一批任务
    pub fn block_on_with<F, Fut>(&self, specs: Vec<TaskSpec>, body: F) -> Result<RunReport>
    where
        F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<TaskOutcome>> + Send + 'static,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        runtime.block_on(self.run_with(specs, body))
    }

    /// 用任意任务体运行一批任务。
    ///
    /// 所有任务同时启动，只在各自的挂起点让出执行权。`WaitAll` 策略下等待全部任务
    /// 结束后返回第一个失败；`FailFast` 策略下第一个失败会取消其余任务。超时或
    /// 取消时，未结束的任务被中止并标记为 `Cancelled`。
    ///
    /// 超时或取消之前已有任务失败时，返回的是该失败，而不是 `Timeout`/`Cancelled`。
    /// 运行器一旦被取消，之后的每次运行（包括空任务列表）都直接返回 `Cancelled`。
    pub async fn run_with<F, Fut>(&self, specs: Vec<TaskSpec>, body: F) -> Result<RunReport>
    where
        F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<TaskOutcome>> + Send + 'static,
    {
        let step_delay = self.config.step_delay()?;
        let timeout = self.config.timeout()?;

        if *self.cancel_tx.borrow() {
            log::warn!("运行器已取消，拒绝启动 {} 个任务", specs.len());
            return Err(Error::Cancelled("运行器已取消".to_string()));
        }

        if specs.is_empty() {
            if self.config.require_tasks {
                return Err(Error::InvalidArgument("任务列表为空，至少需要一个任务".to_string()));
            }
            log::info!("任务列表为空，直接返回");
            let report = RunReport::empty();
            self.store_report(&report);
            return Ok(report);
        }

        log::info!("启动 {} 个任务: {:?}", specs.len(), specs.iter().map(|s| s.to_string()).collect::<Vec<_>>());

        let mut cancel_rx = self.cancel_tx.subscribe();
        let start = Instant::now();
        let body = Arc::new(body);
        let mut set: JoinSet<(Result<TaskOutcome>, Duration)> = JoinSet::new();
        let mut in_flight: HashMap<Id, usize> = HashMap::new();
        let mut reports: Vec<TaskReport> = Vec::with_capacity(specs.len());

        for (idx, spec) in specs.into_iter().enumerate() {
            let task_id = Uuid::new_v4();
            let mut report = TaskReport::pending(task_id, &spec);
            let ctx = TaskContext::new(task_id, spec, step_delay, self.observer.clone());
            let body = body.clone();
            let handle = set.spawn(async move {
                let started = Instant::now();
                let outcome = (*body)(ctx).await;
                (outcome, started.elapsed())
            });
            report.status = TaskStatus::Running;
            in_flight.insert(handle.id(), idx);
            reports.push(report);
        }

        // 无法表示的截止时间视为没有超时
        let deadline = timeout.and_then(|t| start.checked_add(t));
        let expired = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(expired);

        let mut settle_order = Vec::new();
        let mut first_failure: Option<Error> = None;
        let mut interrupted: Option<Error> = None;

        loop {
            tokio::select! {
                biased;
                joined = set.join_next_with_id() => {
                    let Some(joined) = joined else { break };
                    let Some((idx, settled)) = Self::settle(joined, start, &mut in_flight, &mut reports) else {
                        continue;
                    };
                    settle_order.push(reports[idx].label.clone());
                    if let Settled::Failed(err) = settled {
                        if first_failure.is_none() {
                            log::error!("{}", err);
                            first_failure = Some(err);
                            if self.config.failure_policy == FailurePolicy::FailFast {
                                log::warn!("快速失败：取消其余 {} 个任务", in_flight.len());
                                Self::abort_remaining(&mut set, start, &mut in_flight, &mut reports, &mut settle_order).await;
                                break;
                            }
                        } else {
                            log::warn!("丢弃后续失败: {}", err);
                        }
                    }
                }
                _ = &mut expired => {
                    let limit = timeout.unwrap_or_default();
                    log::warn!("等待超时 ({:?})，中止 {} 个未完成任务", limit, in_flight.len());
                    Self::abort_remaining(&mut set, start, &mut in_flight, &mut reports, &mut settle_order).await;
                    interrupted = Some(Error::Timeout(limit));
                    break;
                }
                changed = cancel_rx.wait_for(|cancelled| *cancelled) => {
                    drop(changed);
                    log::warn!("收到取消请求，中止 {} 个未完成任务", in_flight.len());
                    let remaining = in_flight.len();
                    Self::abort_remaining(&mut set, start, &mut in_flight, &mut reports, &mut settle_order).await;
                    interrupted = Some(Error::Cancelled(format!("{} 个任务未完成", remaining)));
                    break;
                }
            }
        }

        let report = RunReport {
            tasks: reports,
            settle_order,
            elapsed: start.elapsed(),
        };
        self.store_report(&report);

        if let Some(err) = first_failure.or(interrupted) {
            return Err(err);
        }
        log::info!("全部 {} 个任务完成，总耗时 {:.3}s", report.tasks.len(), report.elapsed.as_secs_f64());
        Ok(report)
    }

    /// 把一个结束的任务记入报告，返回其下标和结局
    fn settle(
        joined: Joined,
        start: Instant,
        in_flight: &mut HashMap<Id, usize>,
        reports: &mut [TaskReport],
    ) -> Option<(usize, Settled)> {
        let (id, outcome) = match joined {
            Ok((id, outcome)) => (id, Ok(outcome)),
            Err(err) => (err.id(), Err(err)),
        };
        let idx = in_flight.remove(&id)?;
        let report = &mut reports[idx];

        let settled = match outcome {
            Ok((Ok(outcome), elapsed)) => {
                log::debug!("任务 {} 完成，结果 {}", report.label, outcome.result);
                report.complete(outcome, elapsed);
                Settled::Completed
            }
            Ok((Err(err), elapsed)) => {
                let err = match err {
                    Error::TaskFailure { .. } => err,
                    other => Error::task_failure(&report.label, other.to_string()),
                };
                report.fail(err.to_string(), elapsed);
                Settled::Failed(err)
            }
            Err(join_err) if join_err.is_panic() => {
                // panic 时任务内部的计时丢失，用批次开始时间代替
                let err = Error::task_failure(&report.label, "任务体发生 panic");
                report.fail(err.to_string(), start.elapsed());
                Settled::Failed(err)
            }
            Err(_) => {
                report.status = TaskStatus::Cancelled;
                Settled::Cancelled
            }
        };
        Some((idx, settled))
    }

    /// 中止所有未结束的任务并等待它们退出
    async fn abort_remaining(
        set: &mut JoinSet<(Result<TaskOutcome>, Duration)>,
        start: Instant,
        in_flight: &mut HashMap<Id, usize>,
        reports: &mut [TaskReport],
        settle_order: &mut Vec<String>,
    ) {
        set.abort_all();
        while let Some(joined) = set.join_next_with_id().await {
            if let Some((idx, _)) = Self::settle(joined, start, in_flight, reports) {
                settle_order.push(reports[idx].label.clone());
            }
        }
        for (_, idx) in in_flight.drain() {
            reports[idx].status = TaskStatus::Cancelled;
        }
    }

    fn store_report(&self, report: &RunReport) {
        *self.last_report.lock().unwrap_or_else(PoisonError::into_inner) = Some(report.clone());
    }
}
