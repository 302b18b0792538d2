// ==========================================
// 案卷数据导入系统 - SQLite 连接初始化与结构检查
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 / busy_timeout）
// - 提供固定建库脚本的执行入口
// - 提供只读的结构健康检查（不做自动迁移）
// ==========================================

use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 固定建库脚本
pub const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");

/// 期望的表结构（表名 → 列集合）
pub const EXPECTED_SCHEMA: [(&str, &[&str]); 4] = [
    ("clients", &["client_id", "client_name", "contact_info"]),
    (
        "case_files",
        &["case_id", "client_id", "case_name", "case_status"],
    ),
    (
        "case_file_entries",
        &[
            "entry_id",
            "case_id",
            "type",
            "date",
            "title",
            "from_party",
            "to_party",
            "cc_party",
            "content",
            "attachments",
            "synopsis",
            "comments",
            "billing_start",
            "billing_stop",
            "billing_hrs",
        ],
    ),
    (
        "billing_entries",
        &[
            "billing_id",
            "case_id",
            "entry_id",
            "billing_category",
            "billing_start",
            "billing_stop",
            "billing_hours",
            "billing_description",
        ],
    ),
];

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 执行固定建库脚本（可重复执行）
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    debug!("建库脚本执行完成");
    Ok(())
}

// ==========================================
// 结构健康检查
// ==========================================

/// 单表结构差异
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaDiscrepancy {
    pub table: String,
    pub missing_columns: Vec<String>,
    pub extra_columns: Vec<String>,
}

/// 健康检查结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaHealth {
    pub database_exists: bool,
    pub can_connect: bool,
    pub schema_exists: bool,
    pub schema_valid: bool,
    pub tables: Vec<String>,
    pub discrepancies: Vec<SchemaDiscrepancy>,
    pub error: Option<String>,
}

fn list_user_tables(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name != 'sqlite_sequence' ORDER BY name",
    )?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tables)
}

fn live_columns(conn: &Connection, table: &str) -> rusqlite::Result<BTreeSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<BTreeSet<_>, _>>()?;
    Ok(columns)
}

fn inspect_schema(conn: &Connection, health: &mut SchemaHealth) -> rusqlite::Result<()> {
    health.tables = list_user_tables(conn)?;
    health.schema_exists = EXPECTED_SCHEMA
        .iter()
        .all(|(table, _)| health.tables.iter().any(|t| t == table));

    for (table, expected) in EXPECTED_SCHEMA.iter() {
        if !health.tables.iter().any(|t| t == table) {
            continue;
        }

        let live = live_columns(conn, table)?;
        let expected: BTreeSet<String> = expected.iter().map(|c| c.to_string()).collect();

        let missing: Vec<String> = expected.difference(&live).cloned().collect();
        let extra: Vec<String> = live.difference(&expected).cloned().collect();

        if !missing.is_empty() || !extra.is_empty() {
            health.discrepancies.push(SchemaDiscrepancy {
                table: table.to_string(),
                missing_columns: missing,
                extra_columns: extra,
            });
        }
    }

    health.schema_valid = health.schema_exists && health.discrepancies.is_empty();
    Ok(())
}

/// 检查数据库结构健康状况
///
/// # 说明
/// - 数据库文件不存在时不打开连接（避免创建空库）
/// - 以只读方式打开，不修改数据库
pub fn check_schema_health(db_path: &str) -> SchemaHealth {
    let mut health = SchemaHealth::default();

    if !Path::new(db_path).exists() {
        health.error = Some(format!("数据库文件不存在: {}", db_path));
        return health;
    }
    health.database_exists = true;

    let conn = match Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY) {
        Ok(conn) => conn,
        Err(e) => {
            warn!(db_path = %db_path, error = %e, "健康检查无法连接数据库");
            health.error = Some(e.to_string());
            return health;
        }
    };
    health.can_connect = true;

    if let Err(e) = inspect_schema(&conn, &mut health) {
        warn!(db_path = %db_path, error = %e, "健康检查读取结构失败");
        health.error = Some(e.to_string());
        health.schema_valid = false;
    }

    debug!(
        schema_exists = health.schema_exists,
        schema_valid = health.schema_valid,
        discrepancies = health.discrepancies.len(),
        "健康检查完成"
    );
    health
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn db_in(dir: &TempDir) -> String {
        dir.path().join("case_files.db").to_string_lossy().into_owned()
    }

    #[test]
    fn test_initialize_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();

        let tables = list_user_tables(&conn).unwrap();
        assert_eq!(
            tables,
            vec!["billing_entries", "case_file_entries", "case_files", "clients"]
        );
    }

    #[test]
    fn test_health_missing_database() {
        let dir = TempDir::new().unwrap();
        let path = db_in(&dir);

        let health = check_schema_health(&path);

        assert!(!health.database_exists);
        assert!(!health.can_connect);
        assert!(!health.schema_exists);
        assert!(!health.schema_valid);
        // 不应创建数据库文件
        assert!(!Path::new(&path).exists());
    }

    #[test]
    fn test_health_valid_schema() {
        let dir = TempDir::new().unwrap();
        let path = db_in(&dir);
        let conn = open_sqlite_connection(&path).unwrap();
        initialize_schema(&conn).unwrap();
        drop(conn);

        let health = check_schema_health(&path);

        assert!(health.database_exists);
        assert!(health.can_connect);
        assert!(health.schema_exists);
        assert!(health.schema_valid);
        assert!(health.discrepancies.is_empty());
        assert!(health.error.is_none());
    }

    #[test]
    fn test_health_reports_column_discrepancies() {
        let dir = TempDir::new().unwrap();
        let path = db_in(&dir);
        let conn = open_sqlite_connection(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE clients (client_id INTEGER PRIMARY KEY, client_name TEXT, contact_info TEXT);
            CREATE TABLE case_files (case_id INTEGER PRIMARY KEY, client_id INTEGER, case_name TEXT, case_status TEXT);
            CREATE TABLE case_file_entries (entry_id INTEGER PRIMARY KEY, case_id INTEGER, type TEXT, note TEXT);
            CREATE TABLE billing_entries (billing_id INTEGER PRIMARY KEY, case_id INTEGER, entry_id INTEGER,
                billing_category TEXT, billing_start TEXT, billing_stop TEXT, billing_hours REAL,
                billing_description TEXT);
            "#,
        )
        .unwrap();
        drop(conn);

        let health = check_schema_health(&path);

        assert!(health.schema_exists);
        assert!(!health.schema_valid);
        assert_eq!(health.discrepancies.len(), 1);

        let d = &health.discrepancies[0];
        assert_eq!(d.table, "case_file_entries");
        assert_eq!(d.extra_columns, vec!["note"]);
        assert_eq!(d.missing_columns.len(), 12);
        assert_eq!(d.missing_columns[0], "attachments");
    }

    #[test]
    fn test_health_missing_tables() {
        let dir = TempDir::new().unwrap();
        let path = db_in(&dir);
        let conn = open_sqlite_connection(&path).unwrap();
        conn.execute_batch("CREATE TABLE clients (client_id INTEGER PRIMARY KEY, client_name TEXT, contact_info TEXT);")
            .unwrap();
        drop(conn);

        let health = check_schema_health(&path);

        assert!(health.can_connect);
        assert!(!health.schema_exists);
        assert!(!health.schema_valid);
        assert_eq!(health.tables, vec!["clients"]);
    }
}
