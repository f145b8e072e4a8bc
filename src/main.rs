// ==========================================
// 快递报表导入系统 - 命令行入口
// ==========================================
// 用法:
//   courier-ingest [--db <path>] <file>...
//
// 逐个导入文件到 SQLite，并输出每个文件的导入提示
// ==========================================

use anyhow::{bail, Context};
use courier_ingest::db::default_db_path;
use courier_ingest::{
    logging, ConfigManager, ReportImportRepositoryImpl, ReportImporter, ReportImporterImpl,
    SummaryLevel,
};
use std::path::PathBuf;

const USAGE: &str = "usage: courier-ingest [--db <path>] <file>...";

struct CliArgs {
    db_path: String,
    files: Vec<PathBuf>,
}

fn parse_args() -> anyhow::Result<CliArgs> {
    let mut db_path = None;
    let mut files = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let value = args.next().context("--db requires a path")?;
                db_path = Some(value);
            }
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            _ => files.push(PathBuf::from(arg)),
        }
    }

    if files.is_empty() {
        bail!("no input files\n{}", USAGE);
    }

    Ok(CliArgs {
        db_path: db_path.unwrap_or_else(default_db_path),
        files,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args = parse_args()?;
    tracing::info!(
        version = courier_ingest::VERSION,
        db_path = %args.db_path,
        files = args.files.len(),
        "快递报表导入启动"
    );

    let repo = ReportImportRepositoryImpl::new(&args.db_path)
        .with_context(|| format!("failed to open database {}", args.db_path))?;
    let config = ConfigManager::from_connection(repo.connection())
        .context("failed to initialize config store")?;
    let importer = ReportImporterImpl::new(repo, config);

    let report = importer.import_files(&args.files).await;

    for outcome in &report.outcomes {
        let marker = match outcome.summary.level {
            SummaryLevel::Success => "OK  ",
            SummaryLevel::Warning => "WARN",
            SummaryLevel::Error => "FAIL",
        };
        println!("[{}] {}", marker, outcome.summary.message);
        for highlight in &outcome.summary.highlights {
            println!("       - {}", highlight);
        }
    }

    println!(
        "{} file(s) imported, {} failed: {} records, {} errors, {} warnings",
        report.succeeded(),
        report.failed(),
        report.total_records(),
        report.total_errors(),
        report.total_warnings()
    );

    if report.succeeded() == 0 {
        bail!("no files were imported");
    }
    Ok(())
}
