// ==========================================
// 案卷数据导入系统 - 导入配置
// ==========================================
// 环境变量:
// - CASE_FILE_DB_PATH: 数据库路径
// - CASE_FILE_CLIENT_CLASSIFICATION: general | cpcs（默认 general）
// 说明: 客户分类是显式的操作员输入，不从数据推断
// ==========================================

use crate::domain::types::ClientClassification;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ENV_DB_PATH: &str = "CASE_FILE_DB_PATH";
pub const ENV_CLIENT_CLASSIFICATION: &str = "CASE_FILE_CLIENT_CLASSIFICATION";

const DB_DIR_NAME: &str = "case-file-importer";
const DB_FILE_NAME: &str = "case_files.db";

/// 默认数据库路径（只计算路径，不创建目录）
///
/// 优先级: 环境变量 > 用户数据目录 > 当前目录
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var(ENV_DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let path = match dirs::data_dir() {
        Some(data_dir) => data_dir.join(DB_DIR_NAME).join(DB_FILE_NAME),
        None => PathBuf::from(".").join(DB_FILE_NAME),
    };

    path.to_string_lossy().into_owned()
}

/// 解析客户分类；无法识别时告警并回退到 general
fn classification_from(raw: Option<String>) -> ClientClassification {
    match raw {
        None => ClientClassification::default(),
        Some(value) if value.trim().is_empty() => ClientClassification::default(),
        Some(value) => ClientClassification::parse(&value).unwrap_or_else(|| {
            warn!(value = %value, "无法识别的客户分类，使用 general");
            ClientClassification::default()
        }),
    }
}

// ==========================================
// ImportConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportConfig {
    pub db_path: String,
    pub client_classification: ClientClassification,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            client_classification: ClientClassification::default(),
        }
    }
}

impl ImportConfig {
    pub fn new(db_path: impl Into<String>, client_classification: ClientClassification) -> Self {
        Self {
            db_path: db_path.into(),
            client_classification,
        }
    }

    /// 从环境变量加载
    pub fn from_env() -> Self {
        Self {
            db_path: default_db_path(),
            client_classification: classification_from(
                std::env::var(ENV_CLIENT_CLASSIFICATION).ok(),
            ),
        }
    }

    pub fn with_db_path(mut self, db_path: impl Into<String>) -> Self {
        self.db_path = db_path.into();
        self
    }

    pub fn with_classification(mut self, classification: ClientClassification) -> Self {
        self.client_classification = classification;
        self
    }

    /// 确保数据库文件所在目录存在（仅在写库前调用）
    pub fn ensure_db_dir(&self) -> std::io::Result<()> {
        match Path::new(&self.db_path).parent() {
            Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
                info!(dir = %dir.display(), "创建数据库目录");
                std::fs::create_dir_all(dir)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_path() {
        let path = default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_ensure_db_dir_creates_missing_parent() {
        let temp = tempfile::TempDir::new().unwrap();
        let nested = temp.path().join("data").join("nested");
        let db_path = nested.join("case_files.db");
        let config = ImportConfig::new(
            db_path.to_string_lossy().into_owned(),
            ClientClassification::General,
        );

        assert!(!nested.exists());
        config.ensure_db_dir().unwrap();
        assert!(nested.is_dir());
        // 只建目录，不建数据库文件
        assert!(!db_path.exists());

        // 已存在时幂等
        config.ensure_db_dir().unwrap();
    }

    #[test]
    fn test_ensure_db_dir_accepts_bare_file_name() {
        let config = ImportConfig::new("case_files.db", ClientClassification::General);
        config.ensure_db_dir().unwrap();
    }

    #[test]
    fn test_classification_fallback() {
        assert_eq!(classification_from(None), ClientClassification::General);
        assert_eq!(
            classification_from(Some("  ".into())),
            ClientClassification::General
        );
        assert_eq!(
            classification_from(Some("CPCS".into())),
            ClientClassification::Cpcs
        );
        assert_eq!(
            classification_from(Some("unknown".into())),
            ClientClassification::General
        );
    }

    #[test]
    fn test_builders_override() {
        let config = ImportConfig::new("a.db", ClientClassification::General)
            .with_db_path("b.db")
            .with_classification(ClientClassification::Cpcs);

        assert_eq!(config.db_path, "b.db");
        assert_eq!(config.client_classification, ClientClassification::Cpcs);
    }
}
