// ==========================================
// 案卷数据导入系统 - 导入层
// ==========================================
// 职责: 外部表格文件 → 校验 → 映射 → 单事务落库
// 支持: Excel (.xlsx/.xls/.xlsm), TAB 分隔文本 (.csv)
// ==========================================

// 模块声明
pub mod case_file_importer;
pub mod derivation;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod import_planner;
pub mod importer_trait;
pub mod schema_validator;

// 重导出核心类型
pub use case_file_importer::CaseFileImporter;
pub use derivation::{billing_category_from_cell, split_billing_category};
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, ExcelParser, SourceFormat, UniversalFileParser};
pub use import_planner::{plan_import, BillingIntent, EntryIntent, ImportPlan};
pub use schema_validator::SchemaValidator;

// 重导出 Trait 接口
pub use importer_trait::{FileParser, RowMapper, TableValidator};
