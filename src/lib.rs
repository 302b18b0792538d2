// ==========================================
// 案卷数据导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 表格案卷数据的校验与事务化导入
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/结构检查）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BillingCategory, ClientClassification, CpcsBillingCategory, EntryType};

// 领域实体
pub use domain::{
    BillingEntry, CaseFileEntry, CellValue, ImportOutcome, Table, ValidationReport,
};

// 导入器
pub use importer::{CaseFileImporter, ImportError, ImportResult};

// 配置
pub use config::ImportConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "案卷数据导入系统";
