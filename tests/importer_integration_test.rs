// ==========================================
// ReportImporter 集成测试
// ==========================================
// 测试目标: 文件 → 解析 → 落库 → 导入日志 → 看板 的完整流程
// ==========================================

mod helpers;

use courier_ingest::analytics::{DashboardContext, DashboardService};
use courier_ingest::config::{config_keys, ConfigManager, IngestConfig};
use courier_ingest::domain::{FileType, ImportStatus, SummaryLevel};
use courier_ingest::importer::{ReportImporter, ReportImporterImpl};
use courier_ingest::logging;
use courier_ingest::repository::{DateRange, ReportImportRepository, ReportImportRepositoryImpl};
use helpers::mock_config::MockConfig;
use tempfile::TempDir;
use test_helpers::{create_test_db, insert_test_config, write_csv};

const DELIVERY_LINES: [&str; 5] = [
    "№;Дата;ПІБ кур'єра;Підрозділ;Кількість відомостей;Кількість адрес;Завантажено посилок;Доставлено посилок",
    "1;15.01.2025;Іванов Петро;Київ-1;3;40;100;96",
    "2;15.01.2025;Петренко Олег;Київ-2;2;35;100;120",
    "3;16.01.2025;Іванов Петро;Київ-1;3;42;90;88",
    "ВСЬОГО;;;;8;117;290;304",
];

const PICKUP_LINES: [&str; 4] = [
    "Номер документу PickUp;Дата виконання документу PickUp;Номер Shipment;Кількість місць;Загальна фактична вага відправлення;Вартість доставки;Статус PickUp;ПІБ кур'єра;Країна отримувача",
    "PU-1;15.01.2025;SH-1;1;2,5;150 UAH;Done;Іванов Петро;PL",
    "PU-1;15.01.2025;SH-2;2;3,3;;Cancelled;Іванов Петро;PL",
    "PU-2;15.01.2025;SH-3;1;4,5;200;Закрито;Іванов Петро;DE",
];

fn create_test_importer(db_path: &str) -> ReportImporterImpl<ReportImportRepositoryImpl, ConfigManager> {
    let repo = ReportImportRepositoryImpl::new(db_path).expect("Failed to create repository");
    let config = ConfigManager::new(db_path).expect("Failed to create ConfigManager");
    ReportImporterImpl::new(repo, config)
}

#[tokio::test]
async fn test_import_delivery_csv() {
    logging::init_test();

    let (_db_file, db_path) = create_test_db().expect("Failed to create test db");
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "delivery.csv", &DELIVERY_LINES).unwrap();
    let importer = create_test_importer(&db_path);

    let outcome = importer.import_file(&path).await.expect("import should succeed");

    assert_eq!(outcome.file_name, "delivery.csv");
    assert_eq!(outcome.result.file_type, FileType::DeliveryReport);
    assert_eq!(outcome.result.stats.total, 4);
    assert_eq!(outcome.result.stats.processed, 3);
    assert_eq!(outcome.persisted, 3);
    assert!(outcome.result.errors.is_empty(), "errors: {:?}", outcome.result.errors);
    assert_eq!(outcome.result.warnings.len(), 1);
    assert_eq!(outcome.summary.level, SummaryLevel::Warning);
    assert_eq!(outcome.summary.highlights.len(), 1);

    let repo = importer.repository();
    let records = repo.list_delivery_records(DateRange::default()).await.unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].department.as_deref(), Some("Київ-1"));

    let logs = repo.list_recent_import_logs(10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, ImportStatus::Completed);
    assert_eq!(logs[0].file_type, FileType::DeliveryReport);
    assert_eq!(logs[0].records_count, 4);
    assert_eq!(logs[0].records_imported, 3);
    assert!(logs[0].duration_ms.is_some());
}

#[tokio::test]
async fn test_import_pickup_csv_persists_raw_and_summaries() {
    logging::init_test();

    let (_db_file, db_path) = create_test_db().expect("Failed to create test db");
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "pickups.csv", &PICKUP_LINES).unwrap();
    let importer = create_test_importer(&db_path);

    let outcome = importer.import_file(&path).await.unwrap();

    assert_eq!(outcome.result.file_type, FileType::PickupTransactions);
    assert_eq!(outcome.persisted, 1);
    let group = &outcome.result.records.as_pickup().unwrap()[0];
    assert_eq!(group.total_pickups, 3);
    assert_eq!(group.total_pieces, 4);
    assert_eq!(group.success_count, 2);
    assert!((group.total_weight - 10.3).abs() < 1e-9);
    assert!((group.total_cost - 350.0).abs() < 1e-9);

    let repo = importer.repository();
    assert_eq!(repo.count_pickup_records().await.unwrap(), 3);
    let summaries = repo.list_pickup_summaries(DateRange::default()).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].courier_name, "Іванов Петро");
}

#[tokio::test]
async fn test_batch_import_continues_after_failures() {
    logging::init_test();

    let (_db_file, db_path) = create_test_db().expect("Failed to create test db");
    let dir = TempDir::new().unwrap();
    let delivery = write_csv(&dir, "delivery.csv", &DELIVERY_LINES).unwrap();
    let unknown = write_csv(&dir, "unknown.csv", &["Name;Value", "a;1"]).unwrap();
    let empty = write_csv(&dir, "empty.csv", &["Дата;ПІБ кур'єра"]).unwrap();
    let missing = dir.path().join("missing.xlsx");
    let pickups = write_csv(&dir, "pickups.csv", &PICKUP_LINES).unwrap();

    let importer = create_test_importer(&db_path);
    let report = importer
        .import_files(&[delivery, unknown, empty, missing, pickups])
        .await;

    assert_eq!(report.outcomes.len(), 5);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 3);
    for failed in report.outcomes.iter().filter(|o| o.result.is_failed()) {
        assert_eq!(failed.result.errors.len(), 1, "{}", failed.file_name);
        assert_eq!(failed.summary.level, SummaryLevel::Error);
        assert_eq!(failed.persisted, 0);
    }
    let missing_outcome = &report.outcomes[3];
    assert!(
        missing_outcome.result.errors[0].message.starts_with("File not found"),
        "{}",
        missing_outcome.result.errors[0].message
    );

    let logs = importer.repository().list_recent_import_logs(10).await.unwrap();
    assert_eq!(logs.len(), 5);
    assert_eq!(
        logs.iter().filter(|l| l.status == ImportStatus::Failed).count(),
        3
    );
}

#[tokio::test]
async fn test_config_overrides_from_database() {
    let (_db_file, db_path) = create_test_db().expect("Failed to create test db");
    insert_test_config(
        &db_path,
        &[
            (config_keys::SUCCESS_STATUSES, "cancelled"),
            (config_keys::SURFACED_ISSUE_LIMIT, "0"),
        ],
    )
    .unwrap();

    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "pickups.csv", &PICKUP_LINES).unwrap();
    let importer = create_test_importer(&db_path);
    let outcome = importer.import_file(&path).await.unwrap();

    let group = &outcome.result.records.as_pickup().unwrap()[0];
    assert_eq!(group.success_count, 1);
    assert!(outcome.summary.highlights.is_empty());
}

#[tokio::test]
async fn test_import_with_mock_config_and_dashboard() {
    let (_db_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = ReportImportRepositoryImpl::new(&db_path).unwrap();
    let importer = ReportImporterImpl::new(repo, MockConfig::new());

    let dir = TempDir::new().unwrap();
    let delivery = write_csv(&dir, "delivery.csv", &DELIVERY_LINES).unwrap();
    let pickups = write_csv(&dir, "pickups.csv", &PICKUP_LINES).unwrap();
    let report = importer.import_files(&[delivery, pickups]).await;
    assert_eq!(report.succeeded(), 2);

    // MockConfig 只把 "done" 视为成功，且不保留明细
    let pickup_outcome = &report.outcomes[1];
    let group = &pickup_outcome.result.records.as_pickup().unwrap()[0];
    assert_eq!(group.success_count, 1);
    assert!(group.raw_records.is_empty());

    let repo = ReportImportRepositoryImpl::new(&db_path).unwrap();
    let service = DashboardService::new(repo, &IngestConfig::default());

    let delivery = service
        .delivery_dashboard(&DashboardContext::new(FileType::DeliveryReport))
        .await
        .unwrap();
    assert_eq!(delivery.period.total_loaded, 290);
    assert_eq!(delivery.period.active_couriers, 2);
    assert_eq!(delivery.period.delivery_days, 2);
    assert_eq!(delivery.daily_trend.len(), 2);
    assert!(!delivery.insights.is_empty());

    let pickup = service
        .pickup_dashboard(&DashboardContext::new(FileType::PickupTransactions))
        .await
        .unwrap();
    assert_eq!(pickup.period.total_pickups, 3);
    assert_eq!(pickup.period.unique_countries, 2);
    assert_eq!(pickup.countries[0].country, "PL");
}
