// ==========================================
// 案卷数据导入系统 - 领域层
// ==========================================
// 职责: 实体、封闭枚举、表格与校验报告
// ==========================================

pub mod case_file;
pub mod table;
pub mod types;
pub mod validation;

// 重导出核心类型
pub use case_file::{
    BillingEntry, CaseFileEntry, ImportOutcome, MappedRow, StoredValue, CASE_ID_COLUMN,
};
pub use table::{CellValue, Table};
pub use types::{
    BillingCategory, BillingVocabulary, ClientClassification, CpcsBillingCategory, EntryType,
};
pub use validation::{
    BillingCategoryError, DateIssue, InvalidTypeRow, SampleErrors, ValidationReport,
};
