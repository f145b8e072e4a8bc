// ==========================================
// 快递报表导入系统 - 报表导入 Repository 实现
// ==========================================
// 职责: 实现导入相关数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::domain::delivery::CanonicalDeliveryRecord;
use crate::domain::import::{ImportLog, ValidationIssue};
use crate::domain::pickup::{AggregatedPickupRecord, CanonicalPickupRecord};
use crate::domain::types::{FileType, ImportStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::report_import_repo::{DateRange, ReportImportRepository};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ReportImportRepositoryImpl
// ==========================================
pub struct ReportImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ReportImportRepositoryImpl {
    /// 打开数据库并建表
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（重新应用 PRAGMA 并建表，幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 共享连接（供 ConfigManager 复用）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn insert_delivery_tx(
        tx: &Transaction,
        batch_id: &str,
        records: &[CanonicalDeliveryRecord],
    ) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO courier_performance (
                import_batch_id, report_date, courier_name, car_number, department,
                reports_count, addresses_count, loaded_parcels, delivered_parcels,
                delivered_in_hand, delivered_safe_place, undelivered_parcels,
                undelivered_with_reason, undelivered_no_reason,
                delivery_success_rate, row_number
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
        )?;

        let mut count = 0;
        for r in records {
            stmt.execute(params![
                batch_id,
                r.report_date,
                r.courier_name,
                r.car_number,
                r.department,
                r.reports_count,
                r.addresses_count,
                r.loaded_parcels,
                r.delivered_parcels,
                r.delivered_in_hand,
                r.delivered_safe_place,
                r.undelivered_parcels,
                r.undelivered_with_reason,
                r.undelivered_no_reason,
                r.delivery_success_rate,
                r.row_number as i64,
            ])?;
            count += 1;
        }
        Ok(count)
    }

    fn insert_pickup_raw_tx(
        tx: &Transaction,
        batch_id: &str,
        records: &[CanonicalPickupRecord],
    ) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO pickup_orders (
                import_batch_id, pickup_doc_number, shipment_number, execution_date,
                shipment_created_date, courier_name, sender_country, recipient_country,
                actual_weight, places_count, delivery_cost, delivery_currency,
                pickup_status, shipment_status, row_number, record_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
        )?;

        let mut count = 0;
        for r in records {
            let record_json = serde_json::to_string(r)?;
            stmt.execute(params![
                batch_id,
                r.pickup_doc_number,
                r.shipment_number,
                r.execution_date,
                r.shipment_created_date,
                r.courier_name,
                r.sender_country,
                r.recipient_country,
                r.actual_weight,
                r.places_count,
                r.delivery_cost,
                r.delivery_currency,
                r.pickup_status,
                r.shipment_status,
                r.row_number as i64,
                record_json,
            ])?;
            count += 1;
        }
        Ok(count)
    }

    fn insert_pickup_summary_tx(
        tx: &Transaction,
        batch_id: &str,
        summaries: &[AggregatedPickupRecord],
    ) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO pickup_daily_summary (
                import_batch_id, courier_name, summary_date, total_pickups, total_weight,
                total_pieces, success_count, success_rate, total_cost,
                avg_cost_per_pickup, avg_weight_per_pickup
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )?;

        let mut count = 0;
        for s in summaries {
            stmt.execute(params![
                batch_id,
                s.courier_name,
                s.date,
                s.total_pickups as i64,
                s.total_weight,
                s.total_pieces,
                s.success_count as i64,
                s.success_rate,
                s.total_cost,
                s.avg_cost_per_pickup,
                s.avg_weight_per_pickup,
            ])?;
            count += 1;
        }
        Ok(count)
    }
}

// ==========================================
// 行映射
// ==========================================

fn map_import_log(row: &Row) -> rusqlite::Result<ImportLog> {
    let file_type: String = row.get("file_type")?;
    let status: String = row.get("status")?;
    let errors_json: String = row.get("errors")?;
    let errors: Vec<ValidationIssue> = serde_json::from_str(&errors_json).unwrap_or_default();

    Ok(ImportLog {
        batch_id: row.get("batch_id")?,
        filename: row.get("filename")?,
        file_type: FileType::from_str_lossy(&file_type),
        records_count: to_usize(row.get("records_count")?),
        records_imported: to_usize(row.get("records_imported")?),
        records_failed: to_usize(row.get("records_failed")?),
        status: ImportStatus::from_str_lossy(&status),
        errors,
        imported_at: row.get::<_, DateTime<Utc>>("imported_at")?,
        completed_at: row.get::<_, Option<DateTime<Utc>>>("completed_at")?,
        duration_ms: row.get("duration_ms")?,
    })
}

fn map_delivery(row: &Row) -> rusqlite::Result<CanonicalDeliveryRecord> {
    Ok(CanonicalDeliveryRecord {
        report_date: row.get("report_date")?,
        courier_name: row.get("courier_name")?,
        car_number: row.get("car_number")?,
        department: row.get("department")?,
        reports_count: row.get("reports_count")?,
        addresses_count: row.get("addresses_count")?,
        loaded_parcels: row.get("loaded_parcels")?,
        delivered_parcels: row.get("delivered_parcels")?,
        delivered_in_hand: row.get("delivered_in_hand")?,
        delivered_safe_place: row.get("delivered_safe_place")?,
        undelivered_parcels: row.get("undelivered_parcels")?,
        undelivered_with_reason: row.get("undelivered_with_reason")?,
        undelivered_no_reason: row.get("undelivered_no_reason")?,
        delivery_success_rate: row.get("delivery_success_rate")?,
        row_number: to_usize(row.get("row_number")?),
    })
}

fn map_summary(row: &Row) -> rusqlite::Result<AggregatedPickupRecord> {
    Ok(AggregatedPickupRecord {
        courier_name: row.get("courier_name")?,
        date: row.get::<_, Option<NaiveDate>>("summary_date")?,
        total_pickups: to_usize(row.get("total_pickups")?),
        total_weight: row.get("total_weight")?,
        total_pieces: row.get("total_pieces")?,
        success_count: to_usize(row.get("success_count")?),
        success_rate: row.get("success_rate")?,
        total_cost: row.get("total_cost")?,
        avg_cost_per_pickup: row.get("avg_cost_per_pickup")?,
        avg_weight_per_pickup: row.get("avg_weight_per_pickup")?,
        raw_records: Vec::new(),
    })
}

fn to_usize(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

#[async_trait]
impl ReportImportRepository for ReportImportRepositoryImpl {
    async fn create_import_log(&self, log: &ImportLog) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO import_logs (
                batch_id, filename, file_type, records_count, records_imported,
                records_failed, status, errors, imported_at, completed_at, duration_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                log.batch_id,
                log.filename,
                log.file_type.as_str(),
                log.records_count as i64,
                log.records_imported as i64,
                log.records_failed as i64,
                log.status.as_str(),
                serde_json::to_string(&log.errors)?,
                log.imported_at,
                log.completed_at,
                log.duration_ms,
            ],
        )?;
        Ok(())
    }

    async fn update_import_log(&self, log: &ImportLog) -> RepositoryResult<()> {
        let conn = self.lock()?;
        let affected = conn.execute(
            r#"
            UPDATE import_logs SET
                file_type = ?2, records_count = ?3, records_imported = ?4,
                records_failed = ?5, status = ?6, errors = ?7,
                completed_at = ?8, duration_ms = ?9
            WHERE batch_id = ?1
            "#,
            params![
                log.batch_id,
                log.file_type.as_str(),
                log.records_count as i64,
                log.records_imported as i64,
                log.records_failed as i64,
                log.status.as_str(),
                serde_json::to_string(&log.errors)?,
                log.completed_at,
                log.duration_ms,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "import_log".to_string(),
                id: log.batch_id.clone(),
            });
        }
        Ok(())
    }

    async fn get_import_log(&self, batch_id: &str) -> RepositoryResult<Option<ImportLog>> {
        let conn = self.lock()?;
        let log = conn
            .query_row(
                "SELECT * FROM import_logs WHERE batch_id = ?1",
                params![batch_id],
                map_import_log,
            )
            .optional()?;
        Ok(log)
    }

    async fn list_recent_import_logs(&self, limit: usize) -> RepositoryResult<Vec<ImportLog>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM import_logs ORDER BY imported_at DESC, rowid DESC LIMIT ?1",
        )?;
        let logs = stmt
            .query_map(params![limit as i64], map_import_log)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    async fn insert_delivery_records(
        &self,
        batch_id: &str,
        records: &[CanonicalDeliveryRecord],
    ) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let count = Self::insert_delivery_tx(&tx, batch_id, records)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    async fn insert_pickup_records(
        &self,
        batch_id: &str,
        raw_records: &[CanonicalPickupRecord],
        summaries: &[AggregatedPickupRecord],
    ) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Self::insert_pickup_raw_tx(&tx, batch_id, raw_records)?;
        let count = Self::insert_pickup_summary_tx(&tx, batch_id, summaries)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    async fn delete_batch(&self, batch_id: &str) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut deleted = 0;
        for table in ["courier_performance", "pickup_orders", "pickup_daily_summary"] {
            deleted += tx.execute(
                &format!("DELETE FROM {} WHERE import_batch_id = ?1", table),
                params![batch_id],
            )?;
        }
        tx.execute("DELETE FROM import_logs WHERE batch_id = ?1", params![batch_id])?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(deleted)
    }

    async fn list_delivery_records(
        &self,
        range: DateRange,
    ) -> RepositoryResult<Vec<CanonicalDeliveryRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM courier_performance
            WHERE (?1 IS NULL OR report_date >= ?1)
              AND (?2 IS NULL OR report_date <= ?2)
            ORDER BY report_date, courier_name, id
            "#,
        )?;
        let records = stmt
            .query_map(params![range.from, range.to], map_delivery)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    async fn list_pickup_records(
        &self,
        range: DateRange,
    ) -> RepositoryResult<Vec<CanonicalPickupRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT record_json FROM pickup_orders
            WHERE (?1 IS NULL OR COALESCE(execution_date, shipment_created_date) >= ?1)
              AND (?2 IS NULL OR COALESCE(execution_date, shipment_created_date) <= ?2)
            ORDER BY id
            "#,
        )?;
        let payloads = stmt
            .query_map(params![range.from, range.to], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        payloads
            .iter()
            .map(|json| serde_json::from_str(json).map_err(RepositoryError::from))
            .collect()
    }

    async fn list_pickup_summaries(
        &self,
        range: DateRange,
    ) -> RepositoryResult<Vec<AggregatedPickupRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM pickup_daily_summary
            WHERE (?1 IS NULL OR summary_date >= ?1)
              AND (?2 IS NULL OR summary_date <= ?2)
            ORDER BY summary_date IS NULL, summary_date, courier_name, id
            "#,
        )?;
        let summaries = stmt
            .query_map(params![range.from, range.to], map_summary)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(summaries)
    }

    async fn count_delivery_records(&self) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM courier_performance", [], |row| row.get(0))?;
        Ok(to_usize(count))
    }

    async fn count_pickup_records(&self) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM pickup_orders", [], |row| row.get(0))?;
        Ok(to_usize(count))
    }
}
