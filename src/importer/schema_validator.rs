// ==========================================
// 案卷数据导入系统 - 表格结构与内容校验器
// ==========================================
// 检查顺序（每类穷举收集，不在首个错误处停止）:
//   1. 必填列存在（缺列则短路，跳过后续检查）
//   2. 条目类型枚举
//   3. 计费类别（仅 billing-type 行）
//   4. 日期格式 + 计费起止顺序 + 计费时长一致性
// 输出: ValidationReport，不存在“部分有效”
// ==========================================

use crate::domain::table::{parse_source_datetime, CellValue, Table};
use crate::domain::types::{BillingVocabulary, ClientClassification, EntryType};
use crate::domain::validation::{
    BillingCategoryError, DateIssue, InvalidTypeRow, ValidationReport,
};
use crate::importer::derivation::billing_category_from_cell;
use crate::importer::importer_trait::TableValidator;
use chrono::NaiveDateTime;
use tracing::{debug, info};

/// 必填列（源文件列名）
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "type",
    "date",
    "title",
    "from",
    "to",
    "cc",
    "content",
    "attachments",
    "synopsis",
    "comments",
];

/// 可选计费列
pub const BILLING_COLUMNS: [&str; 3] = ["billing-start", "billing-stop", "billing-hrs"];

/// 计费时长容差（小时）：0.01 小时 = 36 秒
pub const DURATION_TOLERANCE_HOURS: f64 = 0.01;

// 数据行下标 → 原始文件行号（1-based + 表头行）
const HEADER_ROW_OFFSET: usize = 2;

fn source_row(idx: usize) -> usize {
    idx + HEADER_ROW_OFFSET
}

fn is_billing_row(table: &Table, idx: usize) -> bool {
    table
        .cell(idx, "type")
        .as_text()
        .and_then(EntryType::from_tag)
        .is_some_and(|t| t.is_billing())
}

// ==========================================
// SchemaValidator
// ==========================================
pub struct SchemaValidator {
    classification: ClientClassification,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new(ClientClassification::default())
    }
}

impl SchemaValidator {
    pub fn new(classification: ClientClassification) -> Self {
        Self { classification }
    }

    pub fn vocabulary(&self) -> BillingVocabulary {
        self.classification.vocabulary()
    }

    /// 检查 1: 必填列
    pub fn check_required_columns(&self, table: &Table) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|col| !table.has_column(col))
            .map(|col| col.to_string())
            .collect()
    }

    /// 检查 2: 条目类型必须非空且属于 7 个标签之一
    pub fn check_entry_types(&self, table: &Table) -> Vec<InvalidTypeRow> {
        (0..table.row_count())
            .filter_map(|idx| {
                let cell = table.cell(idx, "type");
                let valid = cell.as_text().and_then(EntryType::from_tag).is_some();
                (!valid).then(|| InvalidTypeRow {
                    row: source_row(idx),
                    value: cell.to_string(),
                })
            })
            .collect()
    }

    /// 检查 3: billing-type 行的计费类别必须属于生效词表
    pub fn check_billing_categories(&self, table: &Table) -> Vec<BillingCategoryError> {
        let vocabulary = self.vocabulary();

        (0..table.row_count())
            .filter(|&idx| is_billing_row(table, idx))
            .filter_map(|idx| {
                let category = billing_category_from_cell(table.cell(idx, "title"));
                (!vocabulary.contains(&category)).then(|| BillingCategoryError {
                    row: source_row(idx),
                    category,
                    allowed_categories: vocabulary.allowed_description(),
                })
            })
            .collect()
    }

    /// 检查 4: 日期格式与计费时间一致性
    pub fn check_dates(&self, table: &Table) -> Vec<DateIssue> {
        let mut issues = Vec::new();

        for idx in 0..table.row_count() {
            let row = source_row(idx);

            // 日期：已是时间戳或为空则跳过格式检查
            match table.cell(idx, "date") {
                CellValue::Empty | CellValue::Timestamp(_) => {}
                other => {
                    let raw = other.display_text();
                    if let Err(e) = parse_source_datetime(&raw) {
                        issues.push(DateIssue::DateFormat {
                            row,
                            date: raw,
                            error: e.to_string(),
                        });
                    }
                }
            }

            if is_billing_row(table, idx) {
                check_billing_times(table, idx, &mut issues);
            }
        }

        issues
    }
}

/// 计费起止顺序 + 时长一致性
fn check_billing_times(table: &Table, idx: usize, issues: &mut Vec<DateIssue>) {
    let row = source_row(idx);
    let start_cell = table.cell(idx, "billing-start");
    let stop_cell = table.cell(idx, "billing-stop");

    if start_cell.is_empty() || stop_cell.is_empty() {
        return;
    }

    let start = coerce_billing_time(row, "billing-start", start_cell, issues);
    let stop = coerce_billing_time(row, "billing-stop", stop_cell, issues);
    let (Some(start), Some(stop)) = (start, stop) else {
        return;
    };

    // 开始时间必须严格早于结束时间
    if start >= stop {
        issues.push(DateIssue::BillingSequence {
            row,
            start: start_cell.display_text(),
            stop: stop_cell.display_text(),
        });
    }

    let hrs_cell = table.cell(idx, "billing-hrs");
    if hrs_cell.is_empty() {
        return;
    }

    match hrs_cell.as_f64() {
        Some(provided) => {
            let calculated = duration_hours(start, stop);
            if (calculated - provided).abs() > DURATION_TOLERANCE_HOURS {
                issues.push(DateIssue::BillingDuration {
                    row,
                    calculated,
                    provided,
                });
            }
        }
        None => issues.push(DateIssue::BillingValue {
            row,
            field: "billing-hrs".to_string(),
            value: hrs_cell.display_text(),
            error: "无法解析为数值".to_string(),
        }),
    }
}

fn coerce_billing_time(
    row: usize,
    field: &str,
    cell: &CellValue,
    issues: &mut Vec<DateIssue>,
) -> Option<NaiveDateTime> {
    match cell.try_coerce_timestamp() {
        Ok(dt) => dt,
        Err(error) => {
            issues.push(DateIssue::BillingValue {
                row,
                field: field.to_string(),
                value: cell.display_text(),
                error,
            });
            None
        }
    }
}

/// (stop - start) 秒数折算小时
pub fn duration_hours(start: NaiveDateTime, stop: NaiveDateTime) -> f64 {
    (stop - start).num_milliseconds() as f64 / 3_600_000.0
}

impl TableValidator for SchemaValidator {
    fn validate(&self, table: &Table) -> ValidationReport {
        let missing = self.check_required_columns(table);
        if !missing.is_empty() {
            info!(missing = ?missing, "缺少必填列，跳过后续校验");
            return ValidationReport::missing_columns(missing);
        }

        let invalid_types = self.check_entry_types(table);
        debug!(count = invalid_types.len(), "条目类型校验完成");

        let category_errors = self.check_billing_categories(table);
        debug!(
            count = category_errors.len(),
            vocabulary = ?self.vocabulary(),
            "计费类别校验完成"
        );

        let date_errors = self.check_dates(table);
        debug!(count = date_errors.len(), "日期/时长校验完成");

        let report =
            ValidationReport::assemble(Vec::new(), invalid_types, category_errors, date_errors);
        info!(
            rows = table.row_count(),
            valid = report.valid,
            errors = report.error_count(),
            "表格校验完成"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn header() -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .chain(BILLING_COLUMNS.iter())
            .map(|s| s.to_string())
            .collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::from_text(s)
    }

    /// 构造一行：type, date, title, billing-start, billing-stop, billing-hrs
    fn row(
        entry_type: &str,
        date: &str,
        title: &str,
        start: &str,
        stop: &str,
        hrs: CellValue,
    ) -> Vec<CellValue> {
        vec![
            text(entry_type),
            text(date),
            text(title),
            text("alice"),
            text("bob"),
            CellValue::Empty,
            text("body"),
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Empty,
            text(start),
            text(stop),
            hrs,
        ]
    }

    fn table(rows: Vec<Vec<CellValue>>) -> Table {
        Table::new(header(), rows)
    }

    #[test]
    fn test_valid_table_passes() {
        let t = table(vec![
            row("email-type", "03/15/2024 09:00 AM", "Hi", "", "", CellValue::Empty),
            row(
                "billing-type",
                "03/15/2024 09:00 AM",
                "Client Meeting: Client Meeting",
                "03/15/2024 09:00 AM",
                "03/15/2024 10:30 AM",
                CellValue::Number(1.5),
            ),
        ]);

        let report = SchemaValidator::default().validate(&t);
        assert!(report.valid, "{:?}", report);
        assert_eq!(report.error_count(), 0);
    }

    #[test]
    fn test_missing_columns_short_circuit() {
        let t = Table::new(
            vec!["type".into(), "date".into()],
            vec![vec![text("bogus"), text("not a date")]],
        );

        let report = SchemaValidator::default().validate(&t);

        assert!(!report.valid);
        assert_eq!(report.missing_columns.len(), 8);
        assert!(report.missing_columns.contains(&"from".to_string()));
        // 短路：其它检查未执行
        assert!(report.invalid_types.is_empty());
        assert!(report.date_format_errors.is_empty());
    }

    #[test]
    fn test_invalid_types_collected_with_source_rows() {
        let t = table(vec![
            row("email-type", "", "a", "", "", CellValue::Empty),
            row("memo-type", "", "b", "", "", CellValue::Empty),
            row("", "", "c", "", "", CellValue::Empty),
        ]);

        let errors = SchemaValidator::default().check_entry_types(&t);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].row, 3);
        assert_eq!(errors[0].value, "memo-type");
        assert_eq!(errors[1].row, 4);
        assert_eq!(errors[1].value, "NA");
    }

    #[test]
    fn test_billing_category_checks() {
        let t = table(vec![
            row("billing-type", "", "Work: Travel Time", "", "", CellValue::Empty),
            row("billing-type", "", "Work: Napping", "", "", CellValue::Empty),
            row("billing-type", "", "Legal Research", "", "", CellValue::Empty),
            row("billing-type", "", "Nonsense", "", "", CellValue::Empty),
            // 非计费行不检查类别
            row("email-type", "", "Anything: at all", "", "", CellValue::Empty),
        ]);

        let errors = SchemaValidator::default().check_billing_categories(&t);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].row, 3);
        assert_eq!(errors[0].category, "Napping");
        assert_eq!(errors[1].row, 5);
        assert_eq!(errors[1].category, "Nonsense");
    }

    #[test]
    fn test_cpcs_vocabulary_is_threaded_explicitly() {
        let t = table(vec![row(
            "billing-type",
            "",
            "Calls: Phone Calls",
            "",
            "",
            CellValue::Empty,
        )]);

        let general = SchemaValidator::new(ClientClassification::General);
        let cpcs = SchemaValidator::new(ClientClassification::Cpcs);

        assert_eq!(general.check_billing_categories(&t).len(), 1);
        assert!(cpcs.check_billing_categories(&t).is_empty());
    }

    #[test]
    fn test_date_format_error() {
        let t = table(vec![
            row("email-type", "2024-03-15", "a", "", "", CellValue::Empty),
            row("email-type", "03/15/2024 09:00 AM", "b", "", "", CellValue::Empty),
        ]);

        let issues = SchemaValidator::default().check_dates(&t);

        assert_eq!(issues.len(), 1);
        match &issues[0] {
            DateIssue::DateFormat { row, date, .. } => {
                assert_eq!(*row, 2);
                assert_eq!(date, "2024-03-15");
            }
            other => panic!("unexpected issue: {:?}", other),
        }
    }

    #[test]
    fn test_timestamp_date_passes_through() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut r = row("email-type", "", "a", "", "", CellValue::Empty);
        r[1] = CellValue::Timestamp(ts);

        assert!(SchemaValidator::default().check_dates(&table(vec![r])).is_empty());
    }

    #[test]
    fn test_billing_sequence_requires_start_before_stop() {
        let t = table(vec![
            row(
                "billing-type",
                "",
                "x: Hearing",
                "03/15/2024 10:00 AM",
                "03/15/2024 09:00 AM",
                CellValue::Empty,
            ),
            row(
                "billing-type",
                "",
                "x: Hearing",
                "03/15/2024 10:00 AM",
                "03/15/2024 10:00 AM",
                CellValue::Empty,
            ),
        ]);

        let issues = SchemaValidator::default().check_dates(&t);

        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.kind() == "billing_sequence"));
    }

    #[test]
    fn test_billing_duration_mismatch_rejected() {
        // 09:00 → 10:00，填写 0.5 小时
        let t = table(vec![row(
            "billing-type",
            "",
            "x: Hearing",
            "03/15/2024 09:00 AM",
            "03/15/2024 10:00 AM",
            CellValue::Number(0.5),
        )]);

        let issues = SchemaValidator::default().check_dates(&t);

        assert_eq!(issues.len(), 1);
        match &issues[0] {
            DateIssue::BillingDuration {
                calculated,
                provided,
                ..
            } => {
                assert!((calculated - 1.0).abs() < 1e-9);
                assert!((provided - 0.5).abs() < 1e-9);
            }
            other => panic!("unexpected issue: {:?}", other),
        }
    }

    #[test]
    fn test_billing_duration_within_tolerance() {
        // 1 小时 vs 1.005 小时（18 秒差）
        let t = table(vec![row(
            "billing-type",
            "",
            "x: Hearing",
            "2024-03-15 09:00:00",
            "2024-03-15 10:00:00",
            CellValue::Number(1.005),
        )]);

        assert!(SchemaValidator::default().check_dates(&t).is_empty());
    }

    #[test]
    fn test_billing_checks_skip_non_billing_rows() {
        let t = table(vec![row(
            "meeting-type",
            "",
            "a",
            "03/15/2024 10:00 AM",
            "03/15/2024 09:00 AM",
            CellValue::Number(9.0),
        )]);

        assert!(SchemaValidator::default().check_dates(&t).is_empty());
    }

    #[test]
    fn test_unparseable_billing_values_recorded() {
        let t = table(vec![
            row(
                "billing-type",
                "",
                "x: Hearing",
                "soon",
                "03/15/2024 10:00 AM",
                CellValue::Empty,
            ),
            row(
                "billing-type",
                "",
                "x: Hearing",
                "03/15/2024 09:00 AM",
                "03/15/2024 10:00 AM",
                text("one hour"),
            ),
        ]);

        let issues = SchemaValidator::default().check_dates(&t);

        assert_eq!(issues.len(), 2);
        assert!(matches!(
            &issues[0],
            DateIssue::BillingValue { row: 2, field, .. } if field == "billing-start"
        ));
        assert!(matches!(
            &issues[1],
            DateIssue::BillingValue { row: 3, field, .. } if field == "billing-hrs"
        ));
    }

    #[test]
    fn test_non_finite_billing_hours_rejected() {
        let t = table(vec![
            row(
                "billing-type",
                "03/15/2024 09:00 AM",
                "x: Travel Time",
                "03/15/2024 09:00 AM",
                "03/15/2024 10:00 AM",
                text("NaN"),
            ),
            row(
                "billing-type",
                "03/15/2024 09:00 AM",
                "x: Travel Time",
                "03/15/2024 09:00 AM",
                "03/15/2024 10:00 AM",
                text("inf"),
            ),
        ]);

        let report = SchemaValidator::default().validate(&t);

        assert!(!report.valid);
        assert_eq!(report.date_format_errors.len(), 2);
        assert!(matches!(
            &report.date_format_errors[0],
            DateIssue::BillingValue { row: 2, field, value, .. }
                if field == "billing-hrs" && value == "NaN"
        ));
        assert!(matches!(
            &report.date_format_errors[1],
            DateIssue::BillingValue { row: 3, field, .. } if field == "billing-hrs"
        ));
    }

    #[test]
    fn test_empty_date_still_checks_billing() {
        let t = table(vec![row(
            "billing-type",
            "",
            "x: Hearing",
            "03/15/2024 10:00 AM",
            "03/15/2024 09:00 AM",
            CellValue::Empty,
        )]);

        let issues = SchemaValidator::default().check_dates(&t);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind(), "billing_sequence");
    }

    #[test]
    fn test_validation_is_idempotent() {
        let t = table(vec![
            row("memo-type", "bad", "a", "", "", CellValue::Empty),
            row(
                "billing-type",
                "03/15/2024 09:00 AM",
                "x: Unknown",
                "03/15/2024 09:00 AM",
                "03/15/2024 10:00 AM",
                CellValue::Number(3.0),
            ),
        ]);
        let validator = SchemaValidator::default();

        let first = validator.validate(&t);
        let second = validator.validate(&t);

        assert!(!first.valid);
        assert_eq!(first, second);
        assert_eq!(first.invalid_types.len(), 1);
        assert_eq!(first.billing_category_errors.len(), 1);
        assert_eq!(first.date_format_errors.len(), 2);
    }

    #[test]
    fn test_duration_hours() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let stop = start + chrono::Duration::minutes(90);
        assert!((duration_hours(start, stop) - 1.5).abs() < 1e-12);
    }
}
