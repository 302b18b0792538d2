// ==========================================
// 案卷数据导入系统 - 表格数据结构
// ==========================================
// 职责: 加载后的内存表格（有序列名 + 有序行 + 类型化单元格）
// 红线: 所有转换函数纯函数且全域定义，失败返回 None/Err，不 panic
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 源文件日期格式：`month/day/year hour:minute AM|PM`
pub const SOURCE_DATETIME_FORMAT: &str = "%m/%d/%Y %I:%M %p";

/// 落库时间戳格式：`YYYY-MM-DD HH:MM:SS`
pub const STORAGE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// 宽松解析可接受的日期时间格式（源格式优先）
const LENIENT_DATETIME_FORMATS: &[&str] = &[
    SOURCE_DATETIME_FORMAT,
    STORAGE_TIMESTAMP_FORMAT,
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

// 宽松解析可接受的纯日期格式（时间取 00:00:00）
const LENIENT_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

// ==========================================
// CellValue - 单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Timestamp(NaiveDateTime),
    Empty,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    /// 由原始文本构造：空白 → Empty
    pub fn from_text(raw: &str) -> CellValue {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 数值读取：Number 直接返回，Text 尝试解析；NaN / inf 视为不可解析
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        n.filter(|n| n.is_finite())
    }

    /// 展示文本（Empty 为空串）
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Timestamp(dt) => format_storage_timestamp(dt),
            CellValue::Empty => String::new(),
        }
    }

    /// 尽力转换为时间戳；不可解析或为空时返回 None
    pub fn coerce_timestamp(&self) -> Option<NaiveDateTime> {
        self.try_coerce_timestamp().ok().flatten()
    }

    /// 转换为时间戳，保留失败原因
    ///
    /// # 返回
    /// - Ok(None): 单元格为空
    /// - Ok(Some(dt)): 转换成功（已是时间戳则原样返回）
    /// - Err(msg): 不可解析
    pub fn try_coerce_timestamp(&self) -> Result<Option<NaiveDateTime>, String> {
        match self {
            CellValue::Empty => Ok(None),
            CellValue::Timestamp(dt) => Ok(Some(*dt)),
            CellValue::Text(s) => parse_lenient_datetime(s).map(Some),
            CellValue::Number(n) => parse_lenient_datetime(&format_number(*n)).map(Some),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => f.write_str("NA"),
            other => f.write_str(&other.display_text()),
        }
    }
}

/// 整数值不带小数位
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// 严格按源格式解析（`MM/DD/YYYY hh:mm AM/PM`）
pub fn parse_source_datetime(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw.trim(), SOURCE_DATETIME_FORMAT)
}

/// 宽松解析：依次尝试已知日期时间格式，再尝试纯日期格式
pub fn parse_lenient_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    let value = raw.trim();
    for fmt in LENIENT_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(dt);
        }
    }
    for fmt in LENIENT_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt);
            }
        }
    }
    Err(format!("无法解析为日期时间: '{}'", value))
}

pub fn format_storage_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(STORAGE_TIMESTAMP_FORMAT).to_string()
}

// ==========================================
// Table - 内存表格
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// 创建表格；短行以 Empty 补齐，长行截断到列数
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// 读取单元格；列不存在或越界时返回 Empty
    pub fn cell(&self, row: usize, column: &str) -> &CellValue {
        match (self.rows.get(row), self.column_index(column)) {
            (Some(r), Some(idx)) => r.get(idx).unwrap_or(&EMPTY_CELL),
            _ => &EMPTY_CELL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_source_format_parse() {
        assert_eq!(
            parse_source_datetime("03/15/2024 09:30 AM").unwrap(),
            dt(2024, 3, 15, 9, 30)
        );
        assert_eq!(
            parse_source_datetime("3/5/2024 1:05 PM").unwrap(),
            dt(2024, 3, 5, 13, 5)
        );
        assert!(parse_source_datetime("2024-03-15 09:30:00").is_err());
        assert!(parse_source_datetime("13/45/2024 09:30 AM").is_err());
    }

    #[test]
    fn test_lenient_parse() {
        assert_eq!(
            parse_lenient_datetime("2024-03-15 10:00:00").unwrap(),
            dt(2024, 3, 15, 10, 0)
        );
        assert_eq!(
            parse_lenient_datetime("2024-03-15").unwrap(),
            dt(2024, 3, 15, 0, 0)
        );
        assert_eq!(
            parse_lenient_datetime("03/15/2024 09:00 AM").unwrap(),
            dt(2024, 3, 15, 9, 0)
        );
        assert!(parse_lenient_datetime("yesterday").is_err());
    }

    #[test]
    fn test_coercion_is_total() {
        assert_eq!(CellValue::Empty.coerce_timestamp(), None);
        assert_eq!(CellValue::Text("n/a".into()).coerce_timestamp(), None);
        assert_eq!(CellValue::Number(1.5).coerce_timestamp(), None);
        let ts = dt(2024, 1, 2, 3, 4);
        assert_eq!(CellValue::Timestamp(ts).coerce_timestamp(), Some(ts));
        assert_eq!(CellValue::Empty.try_coerce_timestamp(), Ok(None));
        assert!(CellValue::Text("bad".into()).try_coerce_timestamp().is_err());
    }

    #[test]
    fn test_from_text_keeps_numeric_looking_text() {
        assert_eq!(CellValue::from_text("  "), CellValue::Empty);
        assert_eq!(CellValue::from_text(" 007 "), CellValue::Text("007".into()));
        assert_eq!(
            CellValue::from_text(" email-type "),
            CellValue::Text("email-type".into())
        );
    }

    #[test]
    fn test_as_f64_rejects_non_finite() {
        assert_eq!(CellValue::Text(" 1.5 ".into()).as_f64(), Some(1.5));
        assert_eq!(CellValue::Number(2.0).as_f64(), Some(2.0));
        assert_eq!(CellValue::Text("NaN".into()).as_f64(), None);
        assert_eq!(CellValue::Text("inf".into()).as_f64(), None);
        assert_eq!(CellValue::Text("-infinity".into()).as_f64(), None);
        assert_eq!(CellValue::Number(f64::NAN).as_f64(), None);
        assert_eq!(CellValue::Number(f64::INFINITY).as_f64(), None);
        assert_eq!(CellValue::Empty.as_f64(), None);
    }

    #[test]
    fn test_display_text() {
        assert_eq!(CellValue::Number(2.0).display_text(), "2");
        assert_eq!(CellValue::Number(0.25).display_text(), "0.25");
        assert_eq!(
            CellValue::Timestamp(dt(2024, 3, 15, 9, 0)).display_text(),
            "2024-03-15 09:00:00"
        );
        assert_eq!(CellValue::Empty.to_string(), "NA");
    }

    #[test]
    fn test_table_pads_rows_and_missing_cells_are_empty() {
        let table = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec![CellValue::Text("x".into())]],
        );
        assert_eq!(table.rows()[0].len(), 2);
        assert_eq!(table.cell(0, "a"), &CellValue::Text("x".into()));
        assert!(table.cell(0, "b").is_empty());
        assert!(table.cell(0, "zzz").is_empty());
        assert!(table.cell(9, "a").is_empty());
    }
}
