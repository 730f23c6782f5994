use scheduler::{RunnerConfig, TaskRunner, TaskSpec};
use std::time::Instant;

/// 同时运行多个任务，总耗时取决于最长的任务而不是所有任务之和
fn main() -> scheduler::Result<()> {
    let config = RunnerConfig {
        step_delay_secs: 0.2,
        tasks: (2..10).map(|n| TaskSpec::new(format!("T{}", n), n)).collect(),
        ..RunnerConfig::default()
    };
    let specs = config.tasks.clone();
    let runner = TaskRunner::with_stdout(config);

    let start = Instant::now();
    let report = runner.block_on(specs)?;

    let sequential: f64 = report.tasks.iter().map(|t| t.crossings as f64 * 0.2).sum();
    println!("总耗时: {:.3}s (顺序执行约需 {:.1}s)", start.elapsed().as_secs_f64(), sequential);
    report.print_table();
    Ok(())
}
