// ==========================================
// 案卷数据导入系统 - 计费字段派生
// ==========================================
// 职责: billing_category 拆分规则（校验与导入共用同一实现）
// ==========================================

use crate::domain::table::CellValue;

/// 从标题中拆出计费类别
///
/// # 规则
/// - 按第一个冒号拆分，取冒号之后的部分并 trim
/// - 无冒号时整个标题即为类别（原样返回，不 trim）
///
/// # 示例
/// - "Client Meeting: Client Meeting" → "Client Meeting"
/// - "Travel Time" → "Travel Time"
pub fn split_billing_category(title: &str) -> &str {
    match title.split_once(':') {
        Some((_, category)) => category.trim(),
        None => title,
    }
}

/// 从标题单元格派生计费类别（空单元格 → 空类别）
pub fn billing_category_from_cell(title: &CellValue) -> String {
    match title {
        CellValue::Text(s) => split_billing_category(s).to_string(),
        CellValue::Empty => String::new(),
        other => split_billing_category(&other.display_text()).to_string(),
    }
}
