// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use courier_ingest::config::IngestConfigReader;
use courier_ingest::importer::ImportResult;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub success_statuses: Vec<String>,
    pub default_currency: String,
    pub fuzzy_fallback: bool,
    pub surfaced_issue_limit: usize,
}

impl MockConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self {
            success_statuses: vec!["done".to_string()],
            default_currency: "EUR".to_string(),
            fuzzy_fallback: false,
            surfaced_issue_limit: 3,
        }
    }

    pub fn with_fuzzy_fallback(mut self) -> Self {
        self.fuzzy_fallback = true;
        self
    }
}

#[async_trait]
impl IngestConfigReader for MockConfig {
    async fn get_success_statuses(&self) -> ImportResult<Vec<String>> {
        Ok(self.success_statuses.clone())
    }

    async fn get_default_currency(&self) -> ImportResult<String> {
        Ok(self.default_currency.clone())
    }

    async fn get_fuzzy_threshold(&self) -> ImportResult<f64> {
        Ok(0.6)
    }

    async fn get_mapping_confidence_threshold(&self) -> ImportResult<f64> {
        Ok(0.7)
    }

    async fn get_fuzzy_fallback(&self) -> ImportResult<bool> {
        Ok(self.fuzzy_fallback)
    }

    async fn get_retain_raw_records(&self) -> ImportResult<bool> {
        Ok(false)
    }

    async fn get_surfaced_issue_limit(&self) -> ImportResult<usize> {
        Ok(self.surfaced_issue_limit)
    }
}
