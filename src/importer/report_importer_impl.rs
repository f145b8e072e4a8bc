// ==========================================
// 快递报表导入系统 - 报表导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 读取 → 解析工作表 → 解析核心 → 落库 → 导入日志 → 用户提示
// ==========================================

use crate::config::IngestConfigReader;
use crate::domain::import::{BatchImportReport, FileImportOutcome, ImportLog, ParseResult};
use crate::domain::types::{FileType, ImportStatus};
use crate::domain::ParsedRecords;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::report_importer_trait::ReportImporter;
use crate::importer::report_parser::ReportParser;
use crate::repository::ReportImportRepository;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ReportImporterImpl - 报表导入器实现
// ==========================================
pub struct ReportImporterImpl<R, C>
where
    R: ReportImportRepository,
    C: IngestConfigReader,
{
    // 数据访问层
    import_repo: R,

    // 配置读取器
    config: C,

    // 文件解析
    file_parser: UniversalFileParser,
}

impl<R, C> ReportImporterImpl<R, C>
where
    R: ReportImportRepository,
    C: IngestConfigReader,
{
    /// 创建新的 ReportImporter 实例
    ///
    /// # 参数
    /// - import_repo: 导入数据仓储
    /// - config: 配置读取器
    pub fn new(import_repo: R, config: C) -> Self {
        Self {
            import_repo,
            config,
            file_parser: UniversalFileParser,
        }
    }

    pub fn repository(&self) -> &R {
        &self.import_repo
    }

    /// 工作表解析（文件级失败转为单条错误的结果）
    fn parse_file(&self, parser: &ReportParser, file_name: &str, bytes: Vec<u8>) -> ParseResult {
        match self.file_parser.parse_bytes(file_name, bytes) {
            Ok(sheet) => {
                debug!(
                    headers = sheet.headers.len(),
                    rows = sheet.rows.len(),
                    "工作表读取完成"
                );
                parser.parse_sheet(&sheet)
            }
            Err(e) => {
                warn!(file = %file_name, error = %e, "文件读取失败");
                ParseResult::failed(FileType::Unknown, 0, e.user_message())
            }
        }
    }

    /// 落库（失败结果不写记录）
    async fn persist(&self, batch_id: &str, result: &ParseResult) -> ImportResult<usize> {
        if result.is_failed() {
            return Ok(0);
        }

        let persisted = match &result.records {
            ParsedRecords::Delivery(records) => {
                self.import_repo
                    .insert_delivery_records(batch_id, records)
                    .await?
            }
            ParsedRecords::Pickup(summaries) => {
                let raws = result.raw_records.as_deref().unwrap_or(&[]);
                self.import_repo
                    .insert_pickup_records(batch_id, raws, summaries)
                    .await?
            }
        };
        Ok(persisted)
    }

    /// 完整导入流程（文件内容已读入内存）
    async fn run_import(
        &self,
        file_name: &str,
        bytes: ImportResult<Vec<u8>>,
    ) -> ImportResult<FileImportOutcome> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, file = %file_name, "开始导入报表");

        let config = self.config.load_ingest_config().await?;
        let preview_limit = config.surfaced_issue_limit;
        let parser = ReportParser::new(config);

        // === 步骤 1: 导入日志（processing）===
        let mut log = ImportLog {
            batch_id: batch_id.clone(),
            filename: file_name.to_string(),
            file_type: FileType::Unknown,
            records_count: 0,
            records_imported: 0,
            records_failed: 0,
            status: ImportStatus::Processing,
            errors: Vec::new(),
            imported_at: Utc::now(),
            completed_at: None,
            duration_ms: None,
        };
        self.import_repo.create_import_log(&log).await?;

        // === 步骤 2: 解析 ===
        let result = match bytes {
            Ok(bytes) => self.parse_file(&parser, file_name, bytes),
            Err(e) => {
                warn!(file = %file_name, error = %e, "文件读取失败");
                ParseResult::failed(FileType::Unknown, 0, e.user_message())
            }
        };

        // === 步骤 3: 落库 ===
        let persisted = match self.persist(&batch_id, &result).await {
            Ok(count) => count,
            Err(e) => {
                error!(batch_id = %batch_id, error = %e, "记录落库失败");
                log.status = ImportStatus::Failed;
                log.completed_at = Some(Utc::now());
                log.duration_ms = Some(start_time.elapsed().as_millis() as i64);
                if let Err(update_err) = self.import_repo.update_import_log(&log).await {
                    warn!(error = %update_err, "导入日志更新失败");
                }
                return Err(e);
            }
        };

        // === 步骤 4: 导入日志（completed / failed）===
        log.file_type = result.file_type;
        log.records_count = result.stats.total;
        log.records_imported = persisted;
        log.records_failed = result.stats.errors_count;
        log.status = if result.is_failed() {
            ImportStatus::Failed
        } else {
            ImportStatus::Completed
        };
        log.errors = result
            .errors
            .iter()
            .chain(result.warnings.iter())
            .cloned()
            .collect();
        log.completed_at = Some(Utc::now());
        log.duration_ms = Some(start_time.elapsed().as_millis() as i64);
        self.import_repo.update_import_log(&log).await?;

        let summary = result.summary(file_name, preview_limit);
        info!(
            batch_id = %batch_id,
            file_type = %result.file_type,
            total = result.stats.total,
            processed = result.stats.processed,
            persisted,
            errors = result.stats.errors_count,
            warnings = result.stats.warnings_count,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "报表导入完成"
        );

        Ok(FileImportOutcome {
            batch_id: Some(batch_id),
            file_name: file_name.to_string(),
            result,
            persisted,
            summary,
        })
    }
}

fn display_name(file_path: &Path) -> String {
    file_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.to_string_lossy().to_string())
}

#[async_trait::async_trait]
impl<R, C> ReportImporter for ReportImporterImpl<R, C>
where
    R: ReportImportRepository + Send + Sync,
    C: IngestConfigReader + Send + Sync,
{
    #[instrument(skip(self, file_path), fields(file = %file_path.display()))]
    async fn import_file(&self, file_path: &Path) -> ImportResult<FileImportOutcome> {
        let file_name = display_name(file_path);
        let bytes: ImportResult<Vec<u8>> = tokio::fs::read(file_path).await.map_err(Into::into);
        self.run_import(&file_name, bytes).await
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn import_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ImportResult<FileImportOutcome> {
        self.run_import(file_name, Ok(bytes)).await
    }

    async fn import_files(&self, file_paths: &[PathBuf]) -> BatchImportReport {
        info!(count = file_paths.len(), "开始批量导入文件");
        let mut report = BatchImportReport::default();

        for path in file_paths {
            let outcome = match self.import_file(path).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(file = %path.display(), error = %e, "文件导入失败");
                    let file_name = display_name(path);
                    let result = ParseResult::failed(FileType::Unknown, 0, e.user_message());
                    let summary = result.summary(&file_name, 1);
                    FileImportOutcome {
                        batch_id: None,
                        file_name,
                        result,
                        persisted: 0,
                        summary,
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            records = report.total_records(),
            errors = report.total_errors(),
            warnings = report.total_warnings(),
            "批量导入完成"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IngestConfig;
    use crate::repository::{DateRange, ReportImportRepositoryImpl};
    use rusqlite::Connection;
    use std::sync::{Arc, Mutex};

    fn importer() -> ReportImporterImpl<ReportImportRepositoryImpl, IngestConfig> {
        let conn = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        let repo = ReportImportRepositoryImpl::from_connection(conn).unwrap();
        ReportImporterImpl::new(repo, IngestConfig::default())
    }

    const DELIVERY_CSV: &str = "Дата;ПІБ кур'єра;Кількість відомостей;Завантажено посилок;Доставлено посилок\n\
        15.01.2025;Іванов;3;100;90\n\
        15.01.2025;Петренко;2;100;120\n";

    #[tokio::test]
    async fn test_import_bytes_persists_delivery_records() {
        let importer = importer();
        let outcome = importer
            .import_bytes("report.csv", DELIVERY_CSV.as_bytes().to_vec())
            .await
            .unwrap();

        assert_eq!(outcome.result.file_type, FileType::DeliveryReport);
        assert_eq!(outcome.persisted, 2);
        assert_eq!(outcome.result.warnings.len(), 1);

        let repo = importer.repository();
        assert_eq!(repo.count_delivery_records().await.unwrap(), 2);
        let log = repo
            .get_import_log(outcome.batch_id.as_deref().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(log.status, ImportStatus::Completed);
        assert_eq!(log.records_imported, 2);
        assert_eq!(log.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_logged_as_failed() {
        let importer = importer();
        let outcome = importer
            .import_bytes("notes.txt", b"hello".to_vec())
            .await
            .unwrap();

        assert!(outcome.result.is_failed());
        assert_eq!(outcome.persisted, 0);
        let log = importer
            .repository()
            .get_import_log(outcome.batch_id.as_deref().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(log.status, ImportStatus::Failed);
        assert!(importer
            .repository()
            .list_delivery_records(DateRange::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_does_not_abort_batch() {
        let importer = importer();
        let report = importer
            .import_files(&[PathBuf::from("/nonexistent/report.xlsx")])
            .await;

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.outcomes[0].file_name, "report.xlsx");
    }
}
