// ==========================================
// 案卷数据导入系统 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: Excel (.xlsx/.xls/.xlsm) / 制表符分隔文本 (.csv)
// 注意: .csv 文件的分隔符是 TAB，不是逗号
// ==========================================

use crate::domain::table::{parse_lenient_datetime, CellValue, Table};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use calamine::{open_workbook, Data, DataType, Reader, Sheets, Xls, Xlsx};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

// ==========================================
// SourceFormat - 按扩展名识别格式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Spreadsheet,
    TabDelimited,
}

impl SourceFormat {
    /// 识别文件格式（扩展名大小写不敏感）
    ///
    /// # 返回
    /// - Err(UnsupportedFormat): 其它扩展名，不读取文件
    pub fn detect(path: &Path) -> ImportResult<SourceFormat> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "xlsx" | "xls" | "xlsm" => Ok(SourceFormat::Spreadsheet),
            "csv" => Ok(SourceFormat::TabDelimited),
            _ => Err(ImportError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

// ==========================================
// CSV Parser 实现（TAB 分隔）
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_table(&self, file_path: &Path) -> ImportResult<Table> {
        let path = file_path;

        // 检查扩展名
        if SourceFormat::detect(path)? != SourceFormat::TabDelimited {
            return Err(ImportError::UnsupportedFormat(path.display().to_string()));
        }

        // 检查文件存在
        ensure_exists(path)?;

        // 打开文件
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 读取表头
        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if columns.iter().all(|c| c.is_empty()) {
            return Err(ImportError::EmptySource(path.display().to_string()));
        }

        // 读取所有行
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: Vec<CellValue> = record.iter().map(CellValue::from_text).collect();

            // 跳过完全空白的行
            if row.iter().all(CellValue::is_empty) {
                continue;
            }

            rows.push(row);
        }

        debug!(columns = columns.len(), rows = rows.len(), "TAB 分隔文件解析完成");
        Ok(Table::new(columns, rows))
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_table(&self, file_path: &Path) -> ImportResult<Table> {
        let path = file_path;

        // 检查扩展名
        if SourceFormat::detect(path)? != SourceFormat::Spreadsheet {
            return Err(ImportError::UnsupportedFormat(path.display().to_string()));
        }

        // 检查文件存在
        ensure_exists(path)?;

        // 打开 Excel 文件（按小写扩展名选择读取器）
        let mut workbook = open_spreadsheet(path)?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut sheet_rows = range.rows();
        let header_row = sheet_rows
            .next()
            .ok_or_else(|| ImportError::EmptySource(path.display().to_string()))?;

        let columns: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        // 读取数据行
        let mut rows = Vec::new();
        for data_row in sheet_rows {
            let row: Vec<CellValue> = data_row.iter().map(convert_cell).collect();

            // 跳过完全空白的行
            if row.iter().all(CellValue::is_empty) {
                continue;
            }

            rows.push(row);
        }

        debug!(
            sheet = %sheet_name,
            columns = columns.len(),
            rows = rows.len(),
            "Excel 工作表解析完成"
        );
        Ok(Table::new(columns, rows))
    }
}

fn open_spreadsheet(path: &Path) -> ImportResult<Sheets<BufReader<File>>> {
    let is_legacy = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xls"));

    let workbook = if is_legacy {
        Sheets::Xls(
            open_workbook::<Xls<_>, _>(path)
                .map_err(|e| ImportError::ExcelParseError(e.to_string()))?,
        )
    } else {
        Sheets::Xlsx(
            open_workbook::<Xlsx<_>, _>(path)
                .map_err(|e| ImportError::ExcelParseError(e.to_string()))?,
        )
    };
    Ok(workbook)
}

/// calamine 单元格 → CellValue
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from_text(s),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) => CellValue::Timestamp(dt),
            None => cell
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or(CellValue::Empty),
        },
        Data::DateTimeIso(s) => match parse_lenient_datetime(s) {
            Ok(dt) => CellValue::Timestamp(dt),
            Err(_) => CellValue::from_text(s),
        },
        Data::DurationIso(s) => CellValue::from_text(s),
        Data::Error(e) => CellValue::Text(format!("{:?}", e)),
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_table(&self, file_path: &Path) -> ImportResult<Table> {
        match SourceFormat::detect(file_path)? {
            SourceFormat::TabDelimited => CsvParser.parse_to_table(file_path),
            SourceFormat::Spreadsheet => ExcelParser.parse_to_table(file_path),
        }
    }
}
