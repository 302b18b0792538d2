// ==========================================
// 案卷数据导入系统 - 配置层
// ==========================================
// 职责: 导入配置（数据库路径 / 客户分类）
// 来源: 环境变量 → 命令行参数覆写
// ==========================================

pub mod import_config;

// 重导出核心配置
pub use import_config::{default_db_path, ImportConfig, ENV_CLIENT_CLASSIFICATION, ENV_DB_PATH};
