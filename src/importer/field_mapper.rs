// ==========================================
// 案卷数据导入系统 - 字段映射器实现
// ==========================================
// 职责: 源列名 → 存储列名 + 时间列归一 + 附加 case_id
// 说明: 尽力转换，不可解析的时间值置空；正确性由校验器负责
// ==========================================

use crate::domain::case_file::MappedRow;
use crate::domain::table::{CellValue, Table};
use crate::importer::importer_trait::RowMapper;
use tracing::debug;

/// 源列名 → 存储列名（未列出的列名保持不变）
pub const COLUMN_RENAMES: [(&str, &str); 6] = [
    ("from", "from_party"),
    ("to", "to_party"),
    ("cc", "cc_party"),
    ("billing-start", "billing_start"),
    ("billing-stop", "billing_stop"),
    ("billing-hrs", "billing_hrs"),
];

/// 需要归一为时间戳的存储列
pub const TIMESTAMP_COLUMNS: [&str; 3] = ["date", "billing_start", "billing_stop"];

/// 存储列名
pub fn storage_column_name(source: &str) -> &str {
    COLUMN_RENAMES
        .iter()
        .find(|(from, _)| *from == source)
        .map(|(_, to)| *to)
        .unwrap_or(source)
}

pub struct FieldMapper;

impl FieldMapper {
    /// 单元格归一：时间列 → Timestamp 或 Empty，其它列原样
    fn normalize(column: &str, value: &CellValue) -> CellValue {
        if TIMESTAMP_COLUMNS.contains(&column) {
            value
                .coerce_timestamp()
                .map(CellValue::Timestamp)
                .unwrap_or(CellValue::Empty)
        } else {
            value.clone()
        }
    }
}

impl RowMapper for FieldMapper {
    fn map_rows(&self, table: &Table, case_id: i64) -> Vec<MappedRow> {
        let columns: Vec<&str> = table
            .columns()
            .iter()
            .map(|c| storage_column_name(c))
            .collect();

        let rows: Vec<MappedRow> = table
            .rows()
            .iter()
            .enumerate()
            .map(|(idx, cells)| MappedRow {
                source_row: idx + 2,
                case_id,
                fields: columns
                    .iter()
                    .zip(cells.iter())
                    .map(|(col, value)| (col.to_string(), Self::normalize(col, value)))
                    .collect(),
            })
            .collect();

        debug!(rows = rows.len(), case_id = case_id, "字段映射完成");
        rows
    }
}
