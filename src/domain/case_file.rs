// ==========================================
// 案卷数据导入系统 - 案卷条目与计费条目
// ==========================================
// 职责: 映射后行 / 落库值 / 回读实体 / 导入结果
// 生命周期: Entry 与 Billing Entry 在同一事务内创建与回滚
// ==========================================

use crate::domain::table::CellValue;
use crate::domain::types::EntryType;
use crate::domain::validation::ValidationReport;
use serde::{Deserialize, Serialize};

/// case_id 列名（由映射器附加到每一行）
pub const CASE_ID_COLUMN: &str = "case_id";

// ==========================================
// MappedRow - 映射后的待落库行
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    pub source_row: usize,               // 原始文件行号（含表头偏移）
    pub case_id: i64,                    // 调用方指定的案卷 ID
    pub fields: Vec<(String, CellValue)>, // 存储列名 → 值（保持源列顺序）
}

impl MappedRow {
    /// 按存储列名取值；不存在时返回 Empty
    pub fn get(&self, column: &str) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
            .unwrap_or(&EMPTY)
    }

    /// 行内全部列名（含 case_id，位于末尾）
    pub fn column_names(&self) -> Vec<&str> {
        self.fields
            .iter()
            .map(|(name, _)| name.as_str())
            .chain(std::iter::once(CASE_ID_COLUMN))
            .collect()
    }

    pub fn entry_type(&self) -> Option<EntryType> {
        self.get("type").as_text().and_then(EntryType::from_tag)
    }

    pub fn is_billing(&self) -> bool {
        matches!(self.entry_type(), Some(EntryType::Billing))
    }
}

// ==========================================
// StoredValue - 落库值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

// ==========================================
// CaseFileEntry - case_file_entries 回读实体
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseFileEntry {
    pub entry_id: i64,
    pub case_id: i64,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub date: Option<String>,
    pub title: Option<String>,
    pub from_party: Option<String>,
    pub to_party: Option<String>,
    pub cc_party: Option<String>,
    pub content: Option<String>,
    pub attachments: Option<String>,
    pub synopsis: Option<String>,
    pub comments: Option<String>,
    pub billing_start: Option<String>,
    pub billing_stop: Option<String>,
    pub billing_hrs: Option<f64>,
}

// ==========================================
// BillingEntry - billing_entries 回读实体
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingEntry {
    pub billing_id: i64,
    pub case_id: i64,
    pub entry_id: i64,
    pub billing_category: Option<String>,
    pub billing_start: Option<String>,
    pub billing_stop: Option<String>,
    pub billing_hours: Option<f64>,
    pub billing_description: Option<String>,
}

// ==========================================
// ImportOutcome - 导入结果（调用方契约）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub success: bool,
    pub message: String,
    pub batch_id: String,
    pub entries_added: usize,
    pub billing_entries_added: usize,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
}

impl ImportOutcome {
    pub fn succeeded(batch_id: String, entries_added: usize, billing_entries_added: usize) -> Self {
        Self {
            success: true,
            message: format!("Successfully imported {} entries", entries_added),
            batch_id,
            entries_added,
            billing_entries_added,
            errors: Vec::new(),
            validation: None,
        }
    }

    pub fn validation_failed(batch_id: String, report: ValidationReport) -> Self {
        Self {
            success: false,
            message: "Data validation failed".to_string(),
            batch_id,
            entries_added: 0,
            billing_entries_added: 0,
            errors: vec![report.summary()],
            validation: Some(report),
        }
    }

    /// 失败结果：已“添加”的计数一律清零
    pub fn failed(batch_id: String, error: String) -> Self {
        Self {
            success: false,
            message: format!("Error importing data: {}", error),
            batch_id,
            entries_added: 0,
            billing_entries_added: 0,
            errors: vec![error],
            validation: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: Vec<(&str, CellValue)>) -> MappedRow {
        MappedRow {
            source_row: 2,
            case_id: 7,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    #[test]
    fn test_mapped_row_lookup() {
        let r = row(vec![
            ("type", CellValue::Text("billing-type".into())),
            ("title", CellValue::Text("Work: Travel Time".into())),
        ]);
        assert!(r.is_billing());
        assert_eq!(r.entry_type(), Some(EntryType::Billing));
        assert!(r.get("content").is_empty());
        assert_eq!(r.column_names(), vec!["type", "title", "case_id"]);
    }

    #[test]
    fn test_failed_outcome_reports_zero_counts() {
        let outcome = ImportOutcome::failed("b1".into(), "boom".into());
        assert!(!outcome.success);
        assert_eq!(outcome.entries_added, 0);
        assert_eq!(outcome.billing_entries_added, 0);
        assert_eq!(outcome.errors, vec!["boom".to_string()]);
    }
}
