// main.rs
// 入口程序：同时运行一批阶乘任务（默认 A=3 与 B=4），全部结束后打印总耗时。
use anyhow::{Context, Result};
use clap::Parser;
use scheduler::observer::SilentObserver;
use scheduler::{logging, FailurePolicy, RunReport, RunnerConfig, TaskRunner, TaskSpec};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "cooperative-tasks")]
#[command(version = "0.1.0")]
#[command(about = "Run factorial tasks concurrently on a single-threaded cooperative scheduler", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Task to run as LABEL=N, repeatable; replaces the configured task list
    #[arg(long = "task", value_name = "LABEL=N")]
    tasks: Vec<TaskSpec>,

    /// Suspension per factorial step (second)
    #[arg(long)]
    delay_secs: Option<f64>,

    /// Overall timeout for the whole batch (second)
    #[arg(long)]
    timeout_secs: Option<f64>,

    /// Cancel the remaining tasks on the first failure
    #[arg(long, default_value_t = false)]
    fail_fast: bool,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,

    /// Suppress per-step progress lines
    #[arg(long, short, default_value_t = false)]
    quiet: bool,

    /// Print a summary table after the total time
    #[arg(long, default_value_t = false)]
    summary: bool,

    /// Print the run report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

/// 合并配置文件与命令行参数，命令行优先
fn build_config(cli: &Cli) -> Result<RunnerConfig> {
    let mut config = match &cli.config {
        Some(path) => RunnerConfig::from_file(path)
            .with_context(|| format!("加载配置文件 {} 失败", path.display()))?,
        None => RunnerConfig::default(),
    };
    if !cli.tasks.is_empty() {
        config.tasks = cli.tasks.clone();
    }
    if let Some(delay) = cli.delay_secs {
        config.step_delay_secs = delay;
    }
    if let Some(timeout) = cli.timeout_secs {
        config.timeout_secs = Some(timeout);
    }
    if cli.fail_fast {
        config.failure_policy = FailurePolicy::FailFast;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.validate().context("配置无效")?;
    Ok(config)
}

/// 输出运行结果；运行失败时不打印总耗时，直接返回错误
fn write_outcome<W: Write>(out: &mut W, outcome: scheduler::Result<RunReport>, cli: &Cli) -> Result<()> {
    let report = outcome.context("任务运行失败")?;

    writeln!(out, "Total time: {}", report.elapsed.as_secs_f64())?;
    if cli.summary {
        report.to_table().print(out)?;
    }
    if cli.json {
        writeln!(out, "{}", report.to_json()?)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    logging::init(&config.log_level)?;
    log::debug!("运行配置: {:?}", config);

    let specs = config.tasks.clone();
    let runner = if cli.quiet {
        TaskRunner::new(config, Arc::new(SilentObserver))
    } else {
        TaskRunner::with_stdout(config)
    };
    let outcome = runner.block_on(specs);

    let stdout = io::stdout();
    write_outcome(&mut stdout.lock(), outcome, &cli)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_run_a_and_b() {
        let cli = Cli::try_parse_from(["cooperative-tasks"]).unwrap();
        let config = build_config(&cli).unwrap();
        assert_eq!(config.tasks, vec![TaskSpec::new("A", 3), TaskSpec::new("B", 4)]);
        assert_eq!(config.step_delay_secs, 2.0);
        assert_eq!(config.failure_policy, FailurePolicy::WaitAll);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runner.json");
        std::fs::write(
            &path,
            r#"{"step_delay_secs": 1.0, "log_level": "debug", "tasks": [{"label": "X", "param": 2}]}"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "cooperative-tasks",
            "--config",
            path.to_str().unwrap(),
            "--task",
            "C=5",
            "--task",
            "D=1",
            "--delay-secs",
            "0.1",
            "--fail-fast",
        ])
        .unwrap();
        let config = build_config(&cli).unwrap();

        assert_eq!(config.tasks, vec![TaskSpec::new("C", 5), TaskSpec::new("D", 1)]);
        assert_eq!(config.step_delay_secs, 0.1);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_malformed_task_is_rejected_by_parser() {
        assert!(Cli::try_parse_from(["cooperative-tasks", "--task", "A"]).is_err());
        assert!(Cli::try_parse_from(["cooperative-tasks", "--task", "A=x"]).is_err());
    }

    #[test]
    fn test_failed_run_skips_total_time() {
        let cli = Cli::try_parse_from(["cooperative-tasks", "--summary"]).unwrap();
        let mut out = Vec::new();
        let outcome = Err(scheduler::Error::task_failure("big", "乘积溢出"));

        assert!(write_outcome(&mut out, outcome, &cli).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_successful_run_prints_total_time_first() {
        let cli = Cli::try_parse_from(["cooperative-tasks", "--json"]).unwrap();
        let mut out = Vec::new();
        let report = RunReport {
            elapsed: std::time::Duration::from_millis(6000),
            ..RunReport::empty()
        };

        write_outcome(&mut out, Ok(report), &cli).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Total time: 6\n"), "{}", text);
        assert!(text.contains("\"settle_order\""));
    }

    #[test]
    fn test_negative_delay_is_rejected() {
        let cli = Cli::try_parse_from(["cooperative-tasks", "--delay-secs=-1"]).unwrap();
        assert!(build_config(&cli).is_err());
    }
}
