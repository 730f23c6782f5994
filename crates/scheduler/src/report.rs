// report.rs
// 汇总一批任务的执行结果：各任务报告、结束顺序与总耗时，支持表格和JSON输出。
use crate::error::Result;
use crate::task::{TaskReport, TaskStatus};
use prettytable::{cell, row, Table};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 一次批量运行的报告
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// 按启动顺序排列的任务报告
    pub tasks: Vec<TaskReport>,
    /// 按结束顺序排列的任务标签
    pub settle_order: Vec<String>,
    /// 整批任务的墙钟耗时
    pub elapsed: Duration,
}

impl RunReport {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// 按标签查找任务报告
    pub fn task(&self, label: &str) -> Option<&TaskReport> {
        self.tasks.iter().find(|t| t.label == label)
    }

    /// 按标签查找计算结果
    pub fn result_of(&self, label: &str) -> Option<u128> {
        self.task(label).and_then(|t| t.result)
    }

    /// 所有任务的挂起次数之和
    pub fn total_crossings(&self) -> usize {
        self.tasks.iter().map(|t| t.crossings).sum()
    }

    /// 处于指定状态的任务数
    pub fn count_status(&self, status: &TaskStatus) -> usize {
        self.tasks.iter().filter(|t| &t.status == status).count()
    }

    /// 所有任务是否都已到达终止状态
    pub fn all_terminal(&self) -> bool {
        self.tasks.iter().all(|t| t.status.is_terminal())
    }

    /// 构造任务表格
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["序号", "任务ID", "标签", "参数", "状态", "结果", "挂起次数", "耗时(s)"]);

        for (i, task) in self.tasks.iter().enumerate() {
            table.add_row(row![
                i + 1,
                task.task_id,
                &task.label,
                task.param,
                format!("{:?}", task.status),
                task.result.map(|r| r.to_string()).unwrap_or("-".to_string()),
                task.crossings,
                task.elapsed
                    .map(|d| format!("{:.3}", d.as_secs_f64()))
                    .unwrap_or("-".to_string())
            ]);
        }
        table
    }

    /// 表格化打印任务列表
    pub fn print_table(&self) {
        self.to_table().printstd();
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskOutcome, TaskSpec};
    use uuid::Uuid;

    fn sample() -> RunReport {
        let mut a = TaskReport::pending(Uuid::new_v4(), &TaskSpec::new("A", 3));
        a.complete(
            TaskOutcome {
                result: 6,
                suspensions: Vec::new(),
            },
            Duration::from_secs(4),
        );
        let mut b = TaskReport::pending(Uuid::new_v4(), &TaskSpec::new("B", 4));
        b.status = TaskStatus::Cancelled;

        RunReport {
            tasks: vec![a, b],
            settle_order: vec!["A".to_string(), "B".to_string()],
            elapsed: Duration::from_secs(4),
        }
    }

    #[test]
    fn test_lookup_and_counts() {
        let report = sample();
        assert_eq!(report.result_of("A"), Some(6));
        assert_eq!(report.result_of("B"), None);
        assert_eq!(report.result_of("C"), None);
        assert_eq!(report.count_status(&TaskStatus::Completed), 1);
        assert_eq!(report.count_status(&TaskStatus::Cancelled), 1);
        assert!(report.all_terminal());
        assert!(RunReport::empty().is_empty());
    }

    #[test]
    fn test_table_has_header_and_one_row_per_task() {
        let table = sample().to_table();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_json_output() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tasks"][0]["label"], "A");
        assert_eq!(value["tasks"][1]["status"], "Cancelled");
        assert_eq!(value["settle_order"][1], "B");
    }
}
