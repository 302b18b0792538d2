// ==========================================
// 案卷数据导入系统 - 案卷条目 Repository 实现
// ==========================================
// 职责: 基于 rusqlite 执行导入计划（单事务，失败整体回滚）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::case_file::{BillingEntry, CaseFileEntry, StoredValue};
use crate::importer::import_planner::{BillingIntent, ImportPlan};
use crate::repository::case_file_repo::{CaseFileRepository, CommitSummary};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, Row, ToSql, Transaction};
use tracing::{debug, warn};

const ENTRY_TABLE: &str = "case_file_entries";

impl ToSql for StoredValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            StoredValue::Null => ToSqlOutput::Owned(Value::Null),
            StoredValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            StoredValue::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            StoredValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// 读取任意存储类型为文本（数字列也可能落在 TEXT 字段中）
fn column_text(row: &Row, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    })
}

/// 读取数值列（文本形式的数字也接受）
fn column_real(row: &Row, idx: usize) -> rusqlite::Result<Option<f64>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(f) => Some(f),
        ValueRef::Text(t) => std::str::from_utf8(t)
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok()),
        ValueRef::Null | ValueRef::Blob(_) => None,
    })
}

/// 读取 PRAGMA table_info 列名
pub fn table_columns(conn: &Connection, table: &str) -> RepositoryResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(RepositoryError::SchemaError {
            table: table.to_string(),
            message: "表不存在".to_string(),
        });
    }
    Ok(columns)
}

/// 构建条目插入语句（列名来自存储表自身，带引号防止关键字冲突）
fn build_entry_insert(columns: &[String]) -> String {
    if columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", ENTRY_TABLE);
    }

    let names: Vec<String> = columns.iter().map(|c| format!("\"{}\"", c)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        ENTRY_TABLE,
        names.join(", "),
        placeholders.join(", ")
    )
}

// ==========================================
// SqliteCaseFileRepository
// ==========================================
pub struct SqliteCaseFileRepository {
    conn: Connection,
}

impl SqliteCaseFileRepository {
    /// 打开数据库并创建 Repository
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// 使用已有连接创建 Repository
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn insert_billing_tx(
        tx: &Transaction,
        entry_id: i64,
        billing: &BillingIntent,
    ) -> RepositoryResult<()> {
        tx.execute(
            r#"
            INSERT INTO billing_entries (
                case_id, entry_id, billing_category, billing_start,
                billing_stop, billing_hours, billing_description
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                billing.case_id,
                entry_id,
                billing.billing_category,
                billing.billing_start,
                billing.billing_stop,
                billing.billing_hours,
                billing.billing_description,
            ],
        )?;
        Ok(())
    }

    fn commit_plan_tx(tx: &Transaction, plan: &ImportPlan) -> RepositoryResult<CommitSummary> {
        let mut summary = CommitSummary::default();
        let mut stmt = tx.prepare(&build_entry_insert(&plan.entry_columns))?;

        for entry in &plan.entries {
            stmt.execute(params_from_iter(entry.values.iter()))
                .map_err(|e| {
                    warn!(source_row = entry.source_row, error = %e, "条目写入失败");
                    RepositoryError::from(e)
                })?;
            let entry_id = tx.last_insert_rowid();
            summary.entry_ids.push(entry_id);
            summary.entries_added += 1;

            if let Some(billing) = &entry.billing {
                Self::insert_billing_tx(tx, entry_id, billing).map_err(|e| {
                    warn!(source_row = entry.source_row, error = %e, "计费条目写入失败");
                    e
                })?;
                summary.billing_entries_added += 1;
            }
        }

        Ok(summary)
    }
}

impl CaseFileRepository for SqliteCaseFileRepository {
    fn entry_columns(&self) -> RepositoryResult<Vec<String>> {
        table_columns(&self.conn, ENTRY_TABLE)
    }

    fn commit_plan(&mut self, plan: &ImportPlan) -> RepositoryResult<CommitSummary> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        match Self::commit_plan_tx(&tx, plan) {
            Ok(summary) => {
                tx.commit()
                    .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
                debug!(
                    case_id = plan.case_id,
                    entries = summary.entries_added,
                    billing = summary.billing_entries_added,
                    "导入事务已提交"
                );
                Ok(summary)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "事务回滚失败");
                }
                Err(e)
            }
        }
    }

    fn list_entries(&self, case_id: i64) -> RepositoryResult<Vec<CaseFileEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT entry_id, case_id, type, date, title, from_party, to_party,
                   cc_party, content, attachments, synopsis, comments,
                   billing_start, billing_stop, billing_hrs
            FROM case_file_entries
            WHERE case_id = ?1
            ORDER BY date, entry_id
            "#,
        )?;

        let entries = stmt
            .query_map(params![case_id], |row| {
                Ok(CaseFileEntry {
                    entry_id: row.get(0)?,
                    case_id: row.get(1)?,
                    entry_type: column_text(row, 2)?.unwrap_or_default(),
                    date: column_text(row, 3)?,
                    title: column_text(row, 4)?,
                    from_party: column_text(row, 5)?,
                    to_party: column_text(row, 6)?,
                    cc_party: column_text(row, 7)?,
                    content: column_text(row, 8)?,
                    attachments: column_text(row, 9)?,
                    synopsis: column_text(row, 10)?,
                    comments: column_text(row, 11)?,
                    billing_start: column_text(row, 12)?,
                    billing_stop: column_text(row, 13)?,
                    billing_hrs: column_real(row, 14)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn list_billing_entries(&self, case_id: i64) -> RepositoryResult<Vec<BillingEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT billing_id, case_id, entry_id, billing_category, billing_start,
                   billing_stop, billing_hours, billing_description
            FROM billing_entries
            WHERE case_id = ?1
            ORDER BY billing_id
            "#,
        )?;

        let entries = stmt
            .query_map(params![case_id], |row| {
                Ok(BillingEntry {
                    billing_id: row.get(0)?,
                    case_id: row.get(1)?,
                    entry_id: row.get(2)?,
                    billing_category: column_text(row, 3)?,
                    billing_start: column_text(row, 4)?,
                    billing_stop: column_text(row, 5)?,
                    billing_hours: column_real(row, 6)?,
                    billing_description: column_text(row, 7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
