// ==========================================
// 快递报表导入系统 - 配置层
// ==========================================
// 职责: 导入参数（静态默认值 + config_kv 覆写）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod import_config_trait;
pub mod ingest_config;

pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::IngestConfigReader;
pub use ingest_config::IngestConfig;
