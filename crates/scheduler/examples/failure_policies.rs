use scheduler::factorial::factorial;
use scheduler::{Error, FailurePolicy, RunnerConfig, TaskContext, TaskRunner, TaskSpec};

/// 对比两种失败策略：等待全部结束后报告 vs. 快速失败
fn main() {
    let specs = vec![
        TaskSpec::new("A", 3),
        TaskSpec::new("flaky", 2),
        TaskSpec::new("B", 6),
        // 35! 超出 u128，第 35 步溢出失败
        TaskSpec::new("overflow", 36),
    ];

    for policy in [FailurePolicy::WaitAll, FailurePolicy::FailFast] {
        println!("\n=== 失败策略: {:?} ===", policy);
        let config = RunnerConfig {
            step_delay_secs: 0.05,
            failure_policy: policy,
            ..RunnerConfig::default()
        };
        let runner = TaskRunner::with_stdout(config);

        let result = runner.block_on_with(specs.clone(), |mut ctx: TaskContext| async move {
            if ctx.label() == "flaky" {
                ctx.suspend().await?;
                return Err(Error::task_failure("flaky", "第一步之后出错"));
            }
            factorial(ctx).await
        });

        match result {
            Ok(report) => println!("意外成功，总耗时 {:?}", report.elapsed),
            Err(e) => println!("运行失败: {}", e),
        }
        if let Some(report) = runner.last_report() {
            report.print_table();
        }
    }
}
