// ==========================================
// 案卷数据导入系统 - 导入编排器
// ==========================================
// 流程:
//   0. 识别格式（不支持的扩展名直接拒绝，不打开数据库）
//   1. 加载表格
//   2. 校验（闸门：不通过则不落库）
//   3. 打开连接，读取存储列集合
//   4. 映射 + 生成导入计划（纯函数）
//   5. 单事务执行计划（失败整体回滚）
// ==========================================

use crate::config::ImportConfig;
use crate::domain::case_file::ImportOutcome;
use crate::domain::table::Table;
use crate::domain::validation::ValidationReport;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{SourceFormat, UniversalFileParser};
use crate::importer::import_planner::plan_import;
use crate::importer::importer_trait::{FileParser, RowMapper, TableValidator};
use crate::importer::schema_validator::SchemaValidator;
use crate::repository::case_file_repo::{CaseFileRepository, CommitSummary};
use crate::repository::case_file_repo_impl::SqliteCaseFileRepository;
use crate::repository::error::RepositoryError;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// CaseFileImporter - 案卷数据导入器
// ==========================================
pub struct CaseFileImporter {
    // 导入配置（数据库路径 / 客户分类）
    config: ImportConfig,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    validator: Box<dyn TableValidator>,
    row_mapper: Box<dyn RowMapper>,
}

impl CaseFileImporter {
    /// 使用默认组件创建导入器
    pub fn new(config: ImportConfig) -> Self {
        let validator = SchemaValidator::new(config.client_classification);
        Self::with_components(
            config,
            Box::new(UniversalFileParser),
            Box::new(validator),
            Box::new(FieldMapper),
        )
    }

    /// 使用自定义组件创建导入器
    pub fn with_components(
        config: ImportConfig,
        file_parser: Box<dyn FileParser>,
        validator: Box<dyn TableValidator>,
        row_mapper: Box<dyn RowMapper>,
    ) -> Self {
        Self {
            config,
            file_parser,
            validator,
            row_mapper,
        }
    }

    /// 加载文件（先识别格式，再读取）
    pub fn load(&self, file_path: &Path) -> ImportResult<Table> {
        let format = SourceFormat::detect(file_path)?;
        debug!(file = %file_path.display(), format = ?format, "识别文件格式");

        let table = self.file_parser.parse_to_table(file_path)?;
        info!(
            rows = table.row_count(),
            columns = table.columns().len(),
            "文件加载完成"
        );
        Ok(table)
    }

    /// 校验内存表格（不落库）
    pub fn validate(&self, table: &Table) -> ValidationReport {
        self.validator.validate(table)
    }

    /// 加载并校验文件（不落库）
    pub fn validate_file(&self, file_path: &Path) -> ImportResult<ValidationReport> {
        let table = self.load(file_path)?;
        Ok(self.validate(&table))
    }

    /// 导入文件，返回类型化错误
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 全部行已提交
    /// - Err(UnsupportedFormat): 扩展名不支持（未打开数据库）
    /// - Err(ValidationFailure): 校验未通过（未打开数据库）
    /// - Err(ImportFailure): 落库失败（整批回滚）
    pub fn try_import(&self, file_path: &Path, case_id: i64) -> ImportResult<ImportOutcome> {
        let batch_id = Uuid::new_v4().to_string();
        let summary = self.run_import(&batch_id, file_path, case_id)?;
        Ok(ImportOutcome::succeeded(
            batch_id,
            summary.entries_added,
            summary.billing_entries_added,
        ))
    }

    /// 导入文件，返回结构化结果（调用方契约）
    pub fn import_file(&self, file_path: &Path, case_id: i64) -> ImportOutcome {
        let batch_id = Uuid::new_v4().to_string();

        match self.run_import(&batch_id, file_path, case_id) {
            Ok(summary) => ImportOutcome::succeeded(
                batch_id,
                summary.entries_added,
                summary.billing_entries_added,
            ),
            Err(ImportError::ValidationFailure(report)) => {
                ImportOutcome::validation_failed(batch_id, *report)
            }
            Err(e) => ImportOutcome::failed(batch_id, e.to_string()),
        }
    }

    #[instrument(skip(self, batch_id, file_path), fields(batch_id = %batch_id, file = %file_path.display()))]
    fn run_import(
        &self,
        batch_id: &str,
        file_path: &Path,
        case_id: i64,
    ) -> ImportResult<CommitSummary> {
        let start_time = Instant::now();
        info!(case_id = case_id, "开始导入案卷数据");

        // === 步骤 1: 加载 ===
        let table = self.load(file_path).map_err(|e| {
            error!(error = %e, "文件加载失败");
            e
        })?;

        // === 步骤 2: 校验 ===
        let report = self.validate(&table);
        if !report.valid {
            warn!(errors = report.error_count(), summary = %report.summary(), "校验未通过，放弃导入");
            return Err(ImportError::ValidationFailure(Box::new(report)));
        }

        // === 步骤 3: 打开连接 ===
        self.config.ensure_db_dir().map_err(|e| {
            error!(db_path = %self.config.db_path, error = %e, "数据库目录创建失败");
            ImportError::DatabaseConnectionError(e.to_string())
        })?;
        let mut repo = SqliteCaseFileRepository::new(&self.config.db_path).map_err(|e| {
            error!(db_path = %self.config.db_path, error = %e, "数据库连接失败");
            match e {
                RepositoryError::DatabaseConnectionError(msg) => {
                    ImportError::DatabaseConnectionError(msg)
                }
                other => ImportError::ImportFailure(other.to_string()),
            }
        })?;
        let store_columns = repo
            .entry_columns()
            .map_err(|e| ImportError::ImportFailure(e.to_string()))?;

        // === 步骤 4: 映射 + 计划 ===
        let rows = self.row_mapper.map_rows(&table, case_id);
        let plan = plan_import(&rows, case_id, &store_columns);
        debug!(
            entries = plan.entry_count(),
            billing = plan.billing_count(),
            columns = plan.entry_columns.len(),
            "导入计划生成完成"
        );

        // === 步骤 5: 单事务落库 ===
        let summary = repo.commit_plan(&plan).map_err(|e| {
            error!(error = %e, "导入事务失败，已回滚");
            ImportError::ImportFailure(e.to_string())
        })?;

        info!(
            entries_added = summary.entries_added,
            billing_entries_added = summary.billing_entries_added,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "案卷数据导入完成"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{initialize_schema, open_sqlite_connection};
    use crate::domain::types::ClientClassification;
    use std::io::Write;
    use tempfile::{Builder, TempDir};

    const HEADER: &str = "type\tdate\ttitle\tfrom\tto\tcc\tcontent\tattachments\tsynopsis\tcomments\tbilling-start\tbilling-stop\tbilling-hrs";

    fn setup_db(dir: &TempDir) -> String {
        let path = dir.path().join("case.db").to_string_lossy().into_owned();
        let conn = open_sqlite_connection(&path).unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO clients (client_id, client_name) VALUES (1, 'Acme');
             INSERT INTO case_files (case_id, client_id, case_name) VALUES (5, 1, 'Acme v. Doe');",
        )
        .unwrap();
        path
    }

    fn write_tsv(dir: &TempDir, lines: &[&str]) -> std::path::PathBuf {
        let mut file = Builder::new().suffix(".csv").tempfile_in(dir.path()).unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        let (_, path) = file.keep().unwrap();
        path
    }

    fn importer(db_path: &str) -> CaseFileImporter {
        CaseFileImporter::new(ImportConfig::new(db_path, ClientClassification::General))
    }

    #[test]
    fn test_import_file_success() {
        let dir = TempDir::new().unwrap();
        let db_path = setup_db(&dir);
        let file = write_tsv(
            &dir,
            &[
                "email-type\t03/15/2024 08:00 AM\tRe: hello\ta\tb\t\tbody\t\t\t\t\t\t",
                "billing-type\t03/15/2024 09:00 AM\tWork: Travel Time\t\t\t\tdrive\t\t\t\t03/15/2024 09:00 AM\t03/15/2024 10:30 AM\t1.5",
            ],
        );

        let outcome = importer(&db_path).import_file(&file, 5);

        assert!(outcome.success, "{:?}", outcome);
        assert_eq!(outcome.entries_added, 2);
        assert_eq!(outcome.billing_entries_added, 1);
        assert_eq!(outcome.message, "Successfully imported 2 entries");
        assert!(!outcome.batch_id.is_empty());
    }

    #[test]
    fn test_validation_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let db_path = setup_db(&dir);
        let file = write_tsv(&dir, &["fax-type\t\t\t\t\t\t\t\t\t\t\t\t"]);

        let imp = importer(&db_path);
        let result = imp.try_import(&file, 5);
        match result {
            Err(ImportError::ValidationFailure(report)) => {
                assert!(!report.valid);
                assert_eq!(report.invalid_types.len(), 1);
            }
            other => panic!("unexpected: {:?}", other),
        }

        let outcome = imp.import_file(&file, 5);
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Data validation failed");
        assert!(outcome.validation.is_some());

        let conn = open_sqlite_connection(&db_path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM case_file_entries", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_unsupported_format_does_not_open_database() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("never.db").to_string_lossy().into_owned();
        let mut file = Builder::new().suffix(".txt").tempfile_in(dir.path()).unwrap();
        writeln!(file, "{}", HEADER).unwrap();

        let result = importer(&db_path).try_import(file.path(), 5);

        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
        assert!(!Path::new(&db_path).exists());
    }

    #[test]
    fn test_unknown_case_fails_with_zero_counts() {
        let dir = TempDir::new().unwrap();
        let db_path = setup_db(&dir);
        let file = write_tsv(&dir, &["doc-type\t\tMemo\t\t\t\t\t\t\t\t\t\t"]);

        let outcome = importer(&db_path).import_file(&file, 404);

        assert!(!outcome.success);
        assert_eq!(outcome.entries_added, 0);
        assert_eq!(outcome.billing_entries_added, 0);
        assert!(outcome.message.starts_with("Error importing data: "));
    }
}
