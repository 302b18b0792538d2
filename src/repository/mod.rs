// ==========================================
// 案卷数据导入系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有取值使用参数化,防止 SQL 注入
// ==========================================

pub mod case_file_repo;
pub mod case_file_repo_impl;
pub mod error;

// 重导出核心仓储
pub use case_file_repo::{CaseFileRepository, CommitSummary};
pub use case_file_repo_impl::{table_columns, SqliteCaseFileRepository};
pub use error::{RepositoryError, RepositoryResult};
