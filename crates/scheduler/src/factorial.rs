// factorial.rs
// 示例任务体：逐步累乘计算阶乘，每一步乘法之前穿越一次挂起点。
use crate::error::{Error, Result};
use crate::task::{TaskContext, TaskOutcome};

/// 不挂起地计算 n!，超出 u128 范围时返回错误
pub fn factorial_value(n: u32) -> Result<u128> {
    (2..=n).try_fold(1u128, |acc, i| {
        acc.checked_mul(i as u128)
            .ok_or_else(|| Error::InvalidArgument(format!("{}! 超出 u128 范围", n)))
    })
}

/// 协作式阶乘任务。
///
/// 对 2..=n 的每个 i：上报步骤、挂起、再乘上 i。n < 2 时不挂起，直接得到 1。
/// 乘法溢出时以 `TaskFailure` 结束。
pub async fn factorial(mut ctx: TaskContext) -> Result<TaskOutcome> {
    let n = ctx.param();
    let mut f: u128 = 1;
    for i in 2..=n {
        ctx.step(i);
        ctx.suspend().await?;
        f = f.checked_mul(i as u128).ok_or_else(|| {
            Error::task_failure(ctx.label(), format!("计算 factorial({}) 时在第 {} 步溢出", n, i))
        })?;
        log::debug!("任务 {} 完成第 {} 步，当前乘积 {}", ctx.label(), i, f);
    }
    Ok(ctx.finish(f))
}
