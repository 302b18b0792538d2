// ==========================================
// 案卷数据导入系统 - 导入计划生成（纯函数）
// ==========================================
// 输入: 映射后行 + case_id + 存储表实际列集合
// 输出: 写入意图列表（条目行 + 可选计费行），不接触数据库
// 规则:
//   1. 按存储表列集合投影（丢弃存储不认识的列）
//   2. 保持源行顺序
//   3. billing-type 行派生一条计费意图，entry_id 由落库适配器回填
// ==========================================

use crate::domain::case_file::{MappedRow, StoredValue, CASE_ID_COLUMN};
use crate::domain::table::{format_storage_timestamp, CellValue};
use crate::importer::derivation::billing_category_from_cell;
use serde::Serialize;

/// 计费条目写入意图（entry_id 待回填）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingIntent {
    pub case_id: i64,
    pub billing_category: String,
    pub billing_start: StoredValue,
    pub billing_stop: StoredValue,
    pub billing_hours: StoredValue,
    pub billing_description: StoredValue,
}

/// 案卷条目写入意图
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryIntent {
    pub source_row: usize,
    pub values: Vec<StoredValue>, // 与 ImportPlan::entry_columns 一一对应
    pub billing: Option<BillingIntent>,
}

/// 一次导入的完整写入计划
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportPlan {
    pub case_id: i64,
    pub entry_columns: Vec<String>,
    pub entries: Vec<EntryIntent>,
}

impl ImportPlan {
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn billing_count(&self) -> usize {
        self.entries.iter().filter(|e| e.billing.is_some()).count()
    }
}

/// 按数值落库的存储列；其余列一律按文本落库
pub const NUMERIC_COLUMNS: [&str; 1] = ["billing_hrs"];

/// 单元格 → 落库值
///
/// # 规则
/// - 时间戳格式化为 `YYYY-MM-DD HH:MM:SS`
/// - 数值列可解析为有限数值时落 REAL，否则保留原文
/// - 文本列中的数值按展示文本落库（整数不带 `.0`）
pub fn to_stored_value(column: &str, value: &CellValue) -> StoredValue {
    match value {
        CellValue::Empty => StoredValue::Null,
        CellValue::Timestamp(dt) => StoredValue::Text(format_storage_timestamp(dt)),
        _ if NUMERIC_COLUMNS.contains(&column) => value
            .as_f64()
            .map(StoredValue::Real)
            .unwrap_or_else(|| StoredValue::Text(value.display_text())),
        CellValue::Number(_) => StoredValue::Text(value.display_text()),
        CellValue::Text(s) => StoredValue::Text(s.clone()),
    }
}

/// 投影列：映射行列名中存储表认识的部分（保持顺序，去重）
pub fn project_columns(rows: &[MappedRow], store_columns: &[String]) -> Vec<String> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    let mut projected: Vec<String> = Vec::new();
    for name in first.column_names() {
        if store_columns.iter().any(|c| c == name) && !projected.iter().any(|c| c == name) {
            projected.push(name.to_string());
        }
    }
    projected
}

/// 为 billing-type 行派生计费意图；其它行返回 None
pub fn derive_billing_intent(row: &MappedRow, case_id: i64) -> Option<BillingIntent> {
    if !row.is_billing() {
        return None;
    }

    Some(BillingIntent {
        case_id,
        billing_category: billing_category_from_cell(row.get("title")),
        billing_start: to_stored_value("billing_start", row.get("billing_start")),
        billing_stop: to_stored_value("billing_stop", row.get("billing_stop")),
        billing_hours: to_stored_value("billing_hrs", row.get("billing_hrs")),
        billing_description: to_stored_value("content", row.get("content")),
    })
}

/// 生成导入计划
pub fn plan_import(rows: &[MappedRow], case_id: i64, store_columns: &[String]) -> ImportPlan {
    let entry_columns = project_columns(rows, store_columns);

    let entries = rows
        .iter()
        .map(|row| EntryIntent {
            source_row: row.source_row,
            values: entry_columns
                .iter()
                .map(|col| {
                    if col == CASE_ID_COLUMN {
                        StoredValue::Integer(row.case_id)
                    } else {
                        to_stored_value(col, row.get(col))
                    }
                })
                .collect(),
            billing: derive_billing_intent(row, case_id),
        })
        .collect();

    ImportPlan {
        case_id,
        entry_columns,
        entries,
    }
}
