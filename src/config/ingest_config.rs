// ==========================================
// 快递报表导入系统 - 导入配置
// ==========================================
// 职责: 解析管道的可调参数（静态默认值）
// 覆写: ConfigManager 从 config_kv 表读取同名键
// ==========================================

use crate::config::import_config_trait::IngestConfigReader;
use crate::domain::pickup::DEFAULT_CURRENCY;
use crate::importer::column_mapper::{DEFAULT_FUZZY_THRESHOLD, DEFAULT_MAPPING_CONFIDENCE};
use crate::importer::error::ImportResult;
use crate::importer::pickup_aggregator::default_success_statuses;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 默认醒目展示的问题条数
pub const DEFAULT_SURFACED_ISSUE_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// 成功状态词表（小写子串匹配）
    pub success_statuses: Vec<String>,
    /// 金额缺失币种时的默认币种
    pub default_currency: String,
    /// 模糊匹配阈值
    pub fuzzy_threshold: f64,
    /// 映射质量阈值（平均置信度）
    pub mapping_confidence_threshold: f64,
    /// 精确字典未命中时是否采用模糊匹配结果
    pub fuzzy_fallback: bool,
    /// 汇总记录是否保留明细
    pub retain_raw_records: bool,
    /// 导入提示中展示的问题条数
    pub surfaced_issue_limit: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            success_statuses: default_success_statuses(),
            default_currency: DEFAULT_CURRENCY.to_string(),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            mapping_confidence_threshold: DEFAULT_MAPPING_CONFIDENCE,
            fuzzy_fallback: false,
            retain_raw_records: true,
            surfaced_issue_limit: DEFAULT_SURFACED_ISSUE_LIMIT,
        }
    }
}

// 静态配置：直接返回字段值
#[async_trait]
impl IngestConfigReader for IngestConfig {
    async fn get_success_statuses(&self) -> ImportResult<Vec<String>> {
        Ok(self.success_statuses.clone())
    }

    async fn get_default_currency(&self) -> ImportResult<String> {
        Ok(self.default_currency.clone())
    }

    async fn get_fuzzy_threshold(&self) -> ImportResult<f64> {
        Ok(self.fuzzy_threshold)
    }

    async fn get_mapping_confidence_threshold(&self) -> ImportResult<f64> {
        Ok(self.mapping_confidence_threshold)
    }

    async fn get_fuzzy_fallback(&self) -> ImportResult<bool> {
        Ok(self.fuzzy_fallback)
    }

    async fn get_retain_raw_records(&self) -> ImportResult<bool> {
        Ok(self.retain_raw_records)
    }

    async fn get_surfaced_issue_limit(&self) -> ImportResult<usize> {
        Ok(self.surfaced_issue_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.default_currency, "UAH");
        assert_eq!(config.success_statuses.len(), 5);
        assert!(!config.fuzzy_fallback);
        assert!(config.retain_raw_records);
        assert_eq!(config.surfaced_issue_limit, 5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: IngestConfig =
            serde_json::from_str(r#"{"default_currency":"EUR","fuzzy_fallback":true}"#).unwrap();
        assert_eq!(config.default_currency, "EUR");
        assert!(config.fuzzy_fallback);
        assert_eq!(config.fuzzy_threshold, 0.6);
    }

    #[tokio::test]
    async fn test_static_reader_loads_itself() {
        let config = IngestConfig {
            surfaced_issue_limit: 3,
            ..Default::default()
        };
        let loaded = config.load_ingest_config().await.unwrap();
        assert_eq!(loaded, config);
    }
}
