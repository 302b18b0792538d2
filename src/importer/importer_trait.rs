// ==========================================
// 案卷数据导入系统 - 导入组件 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// ==========================================

use crate::domain::case_file::MappedRow;
use crate::domain::table::Table;
use crate::domain::validation::ValidationReport;
use crate::importer::error::ImportResult;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件加载（阶段 0）
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为内存表格
    ///
    /// # 返回
    /// - Ok(Table): 表头 + 数据行（完全空白的行已跳过）
    /// - Err: 文件不存在、格式不支持、解析失败
    fn parse_to_table(&self, file_path: &Path) -> ImportResult<Table>;
}

// ==========================================
// TableValidator Trait
// ==========================================
// 用途: 结构与内容校验（阶段 1，闸门）
// 实现者: SchemaValidator
pub trait TableValidator: Send + Sync {
    /// 校验表格，生成完整报告；同一表格重复校验结果一致
    fn validate(&self, table: &Table) -> ValidationReport;
}

// ==========================================
// RowMapper Trait
// ==========================================
// 用途: 列名映射 + 时间戳归一（阶段 2）
// 实现者: FieldMapper
pub trait RowMapper: Send + Sync {
    /// 将已校验表格映射为待落库行
    ///
    /// # 说明
    /// - 尽力转换：不可解析的时间值置空，不报错
    fn map_rows(&self, table: &Table, case_id: i64) -> Vec<MappedRow>;
}
