// ==========================================
// 案卷数据导入系统 - 案卷条目 Repository Trait
// ==========================================
// 职责: 定义案卷条目 / 计费条目数据访问接口
// 红线: Repository 不含业务规则，只执行导入计划
// ==========================================

use crate::domain::case_file::{BillingEntry, CaseFileEntry};
use crate::importer::import_planner::ImportPlan;
use crate::repository::error::RepositoryResult;
use serde::Serialize;

/// 一次提交的落库统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub entries_added: usize,
    pub billing_entries_added: usize,
    pub entry_ids: Vec<i64>, // 按源行顺序
}

// ==========================================
// CaseFileRepository Trait
// ==========================================
// 实现者: SqliteCaseFileRepository（使用 rusqlite）
pub trait CaseFileRepository {
    /// 存储表 case_file_entries 的实际列集合
    fn entry_columns(&self) -> RepositoryResult<Vec<String>>;

    /// 在单个事务内执行导入计划
    ///
    /// # 返回
    /// - Ok(CommitSummary): 全部写入并提交
    /// - Err: 任一行失败，整个事务回滚，不留任何行
    fn commit_plan(&mut self, plan: &ImportPlan) -> RepositoryResult<CommitSummary>;

    /// 查询案卷的全部条目（按 date, entry_id 排序）
    fn list_entries(&self, case_id: i64) -> RepositoryResult<Vec<CaseFileEntry>>;

    /// 查询案卷的全部计费条目（按 billing_id 排序）
    fn list_billing_entries(&self, case_id: i64) -> RepositoryResult<Vec<BillingEntry>>;
}
