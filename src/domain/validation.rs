// ==========================================
// 案卷数据导入系统 - 校验报告
// ==========================================
// 职责: 每次导入尝试生成一份，不落库
// 行号: 1-based 且包含表头行偏移（数据第 1 行 → 行号 2）
// ==========================================

use serde::{Deserialize, Serialize};

/// 每类错误展示样本上限
pub const SAMPLE_LIMIT: usize = 5;

/// 非法条目类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidTypeRow {
    pub row: usize,
    #[serde(rename = "type")]
    pub value: String, // 空值记为 "NA"
}

/// 非法计费类别
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingCategoryError {
    pub row: usize,
    pub category: String,
    pub allowed_categories: String,
}

// ==========================================
// DateIssue - 日期/时长类错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum DateIssue {
    /// `date` 不符合源格式
    DateFormat {
        row: usize,
        date: String,
        error: String,
    },
    /// 计费字段无法转换（billing-start / billing-stop / billing-hrs）
    BillingValue {
        row: usize,
        field: String,
        value: String,
        error: String,
    },
    /// 开始时间不早于结束时间
    BillingSequence {
        row: usize,
        start: String,
        stop: String,
    },
    /// 计算时长与填写工时不一致（容差 0.01 小时）
    BillingDuration {
        row: usize,
        calculated: f64,
        provided: f64,
    },
}

impl DateIssue {
    pub fn kind(&self) -> &'static str {
        match self {
            DateIssue::DateFormat { .. } => "date_format",
            DateIssue::BillingValue { .. } => "billing_value",
            DateIssue::BillingSequence { .. } => "billing_sequence",
            DateIssue::BillingDuration { .. } => "billing_duration",
        }
    }
}

/// 各类错误的前 N 条样本
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleErrors {
    pub invalid_types: Vec<InvalidTypeRow>,
    pub date_format_errors: Vec<DateIssue>,
    pub billing_category_errors: Vec<BillingCategoryError>,
}

// ==========================================
// ValidationReport - 校验报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub missing_columns: Vec<String>,
    pub invalid_types: Vec<InvalidTypeRow>,
    pub billing_category_errors: Vec<BillingCategoryError>,
    pub date_format_errors: Vec<DateIssue>,
    pub sample_errors: SampleErrors,
}

impl ValidationReport {
    /// 缺列报告（后续检查全部跳过）
    pub fn missing_columns(missing: Vec<String>) -> Self {
        Self::assemble(missing, Vec::new(), Vec::new(), Vec::new())
    }

    /// 汇总各类错误；`valid` 仅在全部为空时为 true
    pub fn assemble(
        missing_columns: Vec<String>,
        invalid_types: Vec<InvalidTypeRow>,
        billing_category_errors: Vec<BillingCategoryError>,
        date_format_errors: Vec<DateIssue>,
    ) -> Self {
        let valid = missing_columns.is_empty()
            && invalid_types.is_empty()
            && billing_category_errors.is_empty()
            && date_format_errors.is_empty();

        let sample_errors = SampleErrors {
            invalid_types: invalid_types.iter().take(SAMPLE_LIMIT).cloned().collect(),
            date_format_errors: date_format_errors
                .iter()
                .take(SAMPLE_LIMIT)
                .cloned()
                .collect(),
            billing_category_errors: billing_category_errors
                .iter()
                .take(SAMPLE_LIMIT)
                .cloned()
                .collect(),
        };

        Self {
            valid,
            missing_columns,
            invalid_types,
            billing_category_errors,
            date_format_errors,
            sample_errors,
        }
    }

    pub fn error_count(&self) -> usize {
        self.missing_columns.len()
            + self.invalid_types.len()
            + self.billing_category_errors.len()
            + self.date_format_errors.len()
    }

    /// 单行摘要（日志/错误消息使用）
    pub fn summary(&self) -> String {
        if self.valid {
            return "校验通过".to_string();
        }
        format!(
            "校验失败: 缺列 {}，类型错误 {}，计费类别错误 {}，日期错误 {}",
            self.missing_columns.len(),
            self.invalid_types.len(),
            self.billing_category_errors.len(),
            self.date_format_errors.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_capped_at_five() {
        let invalid: Vec<_> = (0..8)
            .map(|i| InvalidTypeRow {
                row: i + 2,
                value: "memo".into(),
            })
            .collect();
        let report = ValidationReport::assemble(Vec::new(), invalid, Vec::new(), Vec::new());

        assert!(!report.valid);
        assert_eq!(report.invalid_types.len(), 8);
        assert_eq!(report.sample_errors.invalid_types.len(), SAMPLE_LIMIT);
        assert_eq!(report.sample_errors.invalid_types[0].row, 2);
        assert_eq!(report.error_count(), 8);
    }

    #[test]
    fn test_empty_report_is_valid() {
        let report = ValidationReport::assemble(Vec::new(), Vec::new(), Vec::new(), Vec::new());
        assert!(report.valid);
        assert_eq!(report.summary(), "校验通过");
    }

    #[test]
    fn test_date_issue_serializes_with_issue_tag() {
        let issue = DateIssue::BillingSequence {
            row: 3,
            start: "2024-03-15 10:00:00".into(),
            stop: "2024-03-15 09:00:00".into(),
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["issue"], "billing_sequence");
        assert_eq!(json["row"], 3);
        assert_eq!(issue.kind(), "billing_sequence");
    }
}
