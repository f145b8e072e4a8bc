// ==========================================
// 快递报表导入系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表（CREATE TABLE IF NOT EXISTS，不做迁移）
// ==========================================

use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "COURIER_INGEST_DB_PATH";

/// 配置 SQLite 连接的统一 PRAGMA
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

/// 默认数据库路径
///
/// 1. 环境变量 COURIER_INGEST_DB_PATH
/// 2. 用户数据目录 courier-ingest/courier_ingest.db
/// 3. 当前目录 ./courier_ingest.db
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./courier_ingest.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("courier-ingest");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("courier_ingest.db");
        }
    }
    path.to_string_lossy().to_string()
}

/// 建表（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS config_kv (
    scope_id   TEXT NOT NULL,
    key        TEXT NOT NULL,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS import_logs (
    batch_id         TEXT PRIMARY KEY,
    filename         TEXT NOT NULL,
    file_type        TEXT NOT NULL,
    records_count    INTEGER NOT NULL DEFAULT 0,
    records_imported INTEGER NOT NULL DEFAULT 0,
    records_failed   INTEGER NOT NULL DEFAULT 0,
    status           TEXT NOT NULL,
    errors           TEXT NOT NULL DEFAULT '[]',
    imported_at      TEXT NOT NULL,
    completed_at     TEXT,
    duration_ms      INTEGER
);

CREATE TABLE IF NOT EXISTS courier_performance (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    import_batch_id         TEXT NOT NULL REFERENCES import_logs(batch_id) ON DELETE CASCADE,
    report_date             TEXT NOT NULL,
    courier_name            TEXT NOT NULL,
    car_number              TEXT,
    department              TEXT,
    reports_count           INTEGER NOT NULL DEFAULT 0,
    addresses_count         INTEGER NOT NULL DEFAULT 0,
    loaded_parcels          INTEGER NOT NULL DEFAULT 0,
    delivered_parcels       INTEGER NOT NULL DEFAULT 0,
    delivered_in_hand       INTEGER NOT NULL DEFAULT 0,
    delivered_safe_place    INTEGER NOT NULL DEFAULT 0,
    undelivered_parcels     INTEGER NOT NULL DEFAULT 0,
    undelivered_with_reason INTEGER NOT NULL DEFAULT 0,
    undelivered_no_reason   INTEGER NOT NULL DEFAULT 0,
    delivery_success_rate   REAL NOT NULL DEFAULT 0,
    row_number              INTEGER NOT NULL DEFAULT 0,
    created_at              TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE INDEX IF NOT EXISTS idx_courier_performance_date ON courier_performance(report_date);
CREATE INDEX IF NOT EXISTS idx_courier_performance_courier ON courier_performance(courier_name);

CREATE TABLE IF NOT EXISTS pickup_orders (
    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
    import_batch_id       TEXT NOT NULL REFERENCES import_logs(batch_id) ON DELETE CASCADE,
    pickup_doc_number     TEXT,
    shipment_number       TEXT,
    execution_date        TEXT,
    shipment_created_date TEXT,
    courier_name          TEXT,
    sender_country        TEXT,
    recipient_country     TEXT,
    actual_weight         REAL NOT NULL DEFAULT 0,
    places_count          INTEGER NOT NULL DEFAULT 1,
    delivery_cost         REAL,
    delivery_currency     TEXT NOT NULL DEFAULT 'UAH',
    pickup_status         TEXT,
    shipment_status       TEXT,
    row_number            INTEGER NOT NULL DEFAULT 0,
    record_json           TEXT NOT NULL,
    created_at            TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE INDEX IF NOT EXISTS idx_pickup_orders_execution ON pickup_orders(execution_date);

CREATE TABLE IF NOT EXISTS pickup_daily_summary (
    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
    import_batch_id       TEXT NOT NULL REFERENCES import_logs(batch_id) ON DELETE CASCADE,
    courier_name          TEXT NOT NULL,
    summary_date          TEXT,
    total_pickups         INTEGER NOT NULL DEFAULT 0,
    total_weight          REAL NOT NULL DEFAULT 0,
    total_pieces          INTEGER NOT NULL DEFAULT 0,
    success_count         INTEGER NOT NULL DEFAULT 0,
    success_rate          REAL NOT NULL DEFAULT 0,
    total_cost            REAL NOT NULL DEFAULT 0,
    avg_cost_per_pickup   REAL NOT NULL DEFAULT 0,
    avg_weight_per_pickup REAL NOT NULL DEFAULT 0,
    created_at            TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE INDEX IF NOT EXISTS idx_pickup_summary_date ON pickup_daily_summary(summary_date);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('config_kv', 'import_logs', 'courier_performance',
                              'pickup_orders', 'pickup_daily_summary')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 5);
    }
}
