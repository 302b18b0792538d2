// ==========================================
// 案卷数据导入系统 - 命令行入口
// ==========================================
// 用法:
//   case-file-importer validate <file> [--client general|cpcs]
//   case-file-importer import <file> <case_id> [--db <path>] [--client general|cpcs]
//   case-file-importer check-db [--db <path>]
//   case-file-importer init-db [--db <path>]
// 输出: stdout 打印 JSON 结果；日志写 stderr
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use case_file_importer::config::ImportConfig;
use case_file_importer::db::{check_schema_health, initialize_schema, open_sqlite_connection};
use case_file_importer::domain::types::ClientClassification;
use case_file_importer::importer::CaseFileImporter;
use case_file_importer::logging;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "用法:
  case-file-importer validate <file> [--client general|cpcs]
  case-file-importer import <file> <case_id> [--db <path>] [--client general|cpcs]
  case-file-importer check-db [--db <path>]
  case-file-importer init-db [--db <path>]";

/// 解析后的命令行参数
struct CliArgs {
    command: String,
    positional: Vec<String>,
    config: ImportConfig,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut args = args.into_iter();
    let command = args.next().ok_or_else(|| anyhow!("缺少子命令\n{}", USAGE))?;

    let mut config = ImportConfig::from_env();
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let path = args.next().context("--db 需要路径参数")?;
                config = config.with_db_path(path);
            }
            "--client" => {
                let raw = args.next().context("--client 需要取值 general|cpcs")?;
                let classification = ClientClassification::parse(&raw)
                    .ok_or_else(|| anyhow!("无法识别的客户分类: {}", raw))?;
                config = config.with_classification(classification);
            }
            flag if flag.starts_with("--") => bail!("未知参数: {}\n{}", flag, USAGE),
            _ => positional.push(arg),
        }
    }

    Ok(CliArgs {
        command,
        positional,
        config,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn positional_path(cli: &CliArgs) -> Result<PathBuf> {
    cli.positional
        .first()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("缺少文件路径\n{}", USAGE))
}

fn run(cli: CliArgs) -> Result<bool> {
    tracing::debug!(command = %cli.command, db_path = %cli.config.db_path, "执行命令");

    match cli.command.as_str() {
        "validate" => {
            let path = positional_path(&cli)?;
            let importer = CaseFileImporter::new(cli.config);
            let report = importer.validate_file(&path)?;
            print_json(&report)?;
            Ok(report.valid)
        }
        "import" => {
            let path = positional_path(&cli)?;
            let case_id: i64 = cli
                .positional
                .get(1)
                .ok_or_else(|| anyhow!("缺少 case_id\n{}", USAGE))?
                .trim()
                .parse()
                .context("case_id 必须为整数")?;

            let importer = CaseFileImporter::new(cli.config);
            let outcome = importer.import_file(&path, case_id);
            print_json(&outcome)?;
            Ok(outcome.success)
        }
        "check-db" => {
            let health = check_schema_health(&cli.config.db_path);
            print_json(&health)?;
            Ok(health.schema_valid)
        }
        "init-db" => {
            cli.config
                .ensure_db_dir()
                .with_context(|| format!("无法创建数据库目录: {}", cli.config.db_path))?;
            let conn = open_sqlite_connection(&cli.config.db_path)
                .with_context(|| format!("无法打开数据库: {}", cli.config.db_path))?;
            initialize_schema(&conn).context("建库脚本执行失败")?;
            drop(conn);

            let health = check_schema_health(&cli.config.db_path);
            print_json(&health)?;
            Ok(health.schema_valid)
        }
        other => bail!("未知子命令: {}\n{}", other, USAGE),
    }
}

fn main() -> ExitCode {
    logging::init();

    tracing::info!(version = case_file_importer::VERSION, "{}", case_file_importer::APP_NAME);

    let result = parse_args(std::env::args().skip(1)).and_then(run);
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "命令执行失败");
            eprintln!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_import_args() {
        let cli = parse_args(args(&[
            "import", "data.csv", "12", "--db", "x.db", "--client", "CPCS",
        ]))
        .unwrap();

        assert_eq!(cli.command, "import");
        assert_eq!(cli.positional, vec!["data.csv", "12"]);
        assert_eq!(cli.config.db_path, "x.db");
        assert_eq!(cli.config.client_classification, ClientClassification::Cpcs);
    }

    #[test]
    fn test_parse_rejects_bad_flags() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["import", "--db"])).is_err());
        assert!(parse_args(args(&["validate", "a.csv", "--client", "vip"])).is_err());
        assert!(parse_args(args(&["validate", "a.csv", "--verbose"])).is_err());
    }
}
