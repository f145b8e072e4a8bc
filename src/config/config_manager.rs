// ==========================================
// 快递报表导入系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (scope_id + key + value)，仅使用 global 作用域
// ==========================================

use crate::config::import_config_trait::IngestConfigReader;
use crate::config::ingest_config::IngestConfig;
use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
    defaults: IngestConfig,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建 ConfigManager（重新应用 PRAGMA 并建表，幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ImportResult<Self> {
        {
            let guard = lock(&conn, "connection")?;
            configure_sqlite_connection(&guard)?;
            init_schema(&guard)?;
        }
        Ok(Self {
            conn,
            defaults: IngestConfig::default(),
        })
    }

    /// 读取 global 作用域的配置值
    pub fn get_global_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = lock(&self.conn, key)?;
        conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| config_error(key, e))
    }

    /// 写入 global 作用域的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = lock(&self.conn, key)?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )
        .map_err(|e| config_error(key, e))?;
        Ok(())
    }

    /// 全部 global 配置快照
    pub fn get_config_snapshot(&self) -> ImportResult<BTreeMap<String, String>> {
        let conn = lock(&self.conn, "snapshot")?;
        let mut stmt = conn
            .prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")
            .map_err(|e| config_error("snapshot", e))?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(|e| config_error("snapshot", e))?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row.map_err(|e| config_error("snapshot", e))?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 读取并解析；缺失或格式错误时回退默认值
    fn get_parsed_or<T: FromStr>(&self, key: &str, default: T) -> ImportResult<T> {
        let Some(raw) = self.get_global_config_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                tracing::warn!(config_key = key, raw_value = %raw, "配置值格式错误，使用默认值");
                Ok(default)
            }
        }
    }
}

fn lock<'a>(
    conn: &'a Arc<Mutex<Connection>>,
    key: &str,
) -> ImportResult<std::sync::MutexGuard<'a, Connection>> {
    conn.lock().map_err(|e| ImportError::ConfigReadError {
        key: key.to_string(),
        message: format!("lock poisoned: {}", e),
    })
}

fn config_error(key: &str, err: rusqlite::Error) -> ImportError {
    ImportError::ConfigReadError {
        key: key.to_string(),
        message: err.to_string(),
    }
}

// ==========================================
// IngestConfigReader Trait 实现
// ==========================================
#[async_trait]
impl IngestConfigReader for ConfigManager {
    async fn get_success_statuses(&self) -> ImportResult<Vec<String>> {
        let Some(value) = self.get_global_config_value(config_keys::SUCCESS_STATUSES)? else {
            return Ok(self.defaults.success_statuses.clone());
        };

        let statuses: Vec<String> = value
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        if statuses.is_empty() {
            Ok(self.defaults.success_statuses.clone())
        } else {
            Ok(statuses)
        }
    }

    async fn get_default_currency(&self) -> ImportResult<String> {
        let value = self
            .get_global_config_value(config_keys::DEFAULT_CURRENCY)?
            .map(|v| v.trim().to_uppercase())
            .filter(|v| v.len() == 3 && v.chars().all(|c| c.is_ascii_uppercase()));
        Ok(value.unwrap_or_else(|| self.defaults.default_currency.clone()))
    }

    async fn get_fuzzy_threshold(&self) -> ImportResult<f64> {
        self.get_parsed_or(config_keys::FUZZY_THRESHOLD, self.defaults.fuzzy_threshold)
    }

    async fn get_mapping_confidence_threshold(&self) -> ImportResult<f64> {
        self.get_parsed_or(
            config_keys::MAPPING_CONFIDENCE_THRESHOLD,
            self.defaults.mapping_confidence_threshold,
        )
    }

    async fn get_fuzzy_fallback(&self) -> ImportResult<bool> {
        self.get_parsed_or(config_keys::FUZZY_FALLBACK, self.defaults.fuzzy_fallback)
    }

    async fn get_retain_raw_records(&self) -> ImportResult<bool> {
        self.get_parsed_or(config_keys::RETAIN_RAW_RECORDS, self.defaults.retain_raw_records)
    }

    async fn get_surfaced_issue_limit(&self) -> ImportResult<usize> {
        self.get_parsed_or(
            config_keys::SURFACED_ISSUE_LIMIT,
            self.defaults.surfaced_issue_limit,
        )
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const SUCCESS_STATUSES: &str = "success_statuses"; // 逗号分隔
    pub const DEFAULT_CURRENCY: &str = "default_currency";
    pub const FUZZY_THRESHOLD: &str = "fuzzy_threshold";
    pub const MAPPING_CONFIDENCE_THRESHOLD: &str = "mapping_confidence_threshold";
    pub const FUZZY_FALLBACK: &str = "fuzzy_fallback";
    pub const RETAIN_RAW_RECORDS: &str = "retain_raw_records";
    pub const SURFACED_ISSUE_LIMIT: &str = "surfaced_issue_limit";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_empty_table_yields_defaults() {
        let config = manager().load_ingest_config().await.unwrap();
        assert_eq!(config, IngestConfig::default());
    }

    #[tokio::test]
    async fn test_overrides_are_read() {
        let manager = manager();
        manager
            .set_global_config_value(config_keys::SUCCESS_STATUSES, "Done, Delivered")
            .unwrap();
        manager
            .set_global_config_value(config_keys::DEFAULT_CURRENCY, "eur")
            .unwrap();
        manager
            .set_global_config_value(config_keys::FUZZY_FALLBACK, "true")
            .unwrap();
        manager
            .set_global_config_value(config_keys::SURFACED_ISSUE_LIMIT, "10")
            .unwrap();

        let config = manager.load_ingest_config().await.unwrap();
        assert_eq!(config.success_statuses, vec!["done", "delivered"]);
        assert_eq!(config.default_currency, "EUR");
        assert!(config.fuzzy_fallback);
        assert_eq!(config.surfaced_issue_limit, 10);
    }

    #[tokio::test]
    async fn test_malformed_values_fall_back() {
        let manager = manager();
        manager
            .set_global_config_value(config_keys::FUZZY_THRESHOLD, "high")
            .unwrap();
        manager
            .set_global_config_value(config_keys::DEFAULT_CURRENCY, "hryvnia")
            .unwrap();

        assert_eq!(manager.get_fuzzy_threshold().await.unwrap(), 0.6);
        assert_eq!(manager.get_default_currency().await.unwrap(), "UAH");
    }

    #[test]
    fn test_snapshot_and_upsert() {
        let manager = manager();
        manager.set_global_config_value("a", "1").unwrap();
        manager.set_global_config_value("a", "2").unwrap();
        manager.set_global_config_value("b", "3").unwrap();

        let snapshot = manager.get_config_snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("a").map(String::as_str), Some("2"));
    }
}
