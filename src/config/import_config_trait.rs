// ==========================================
// 快递报表导入系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::ingest_config::IngestConfig;
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// IngestConfigReader Trait
// ==========================================
// 实现者: IngestConfig（静态）、ConfigManager（config_kv 表）
#[async_trait]
pub trait IngestConfigReader: Send + Sync {
    /// 成功状态词表
    ///
    /// # 默认值
    /// - ["done", "закрито", "виконано", "closed", "completed"]
    async fn get_success_statuses(&self) -> ImportResult<Vec<String>>;

    /// 默认币种
    ///
    /// # 默认值
    /// - UAH
    async fn get_default_currency(&self) -> ImportResult<String>;

    /// 模糊匹配阈值（默认 0.6）
    async fn get_fuzzy_threshold(&self) -> ImportResult<f64>;

    /// 映射质量阈值（默认 0.7）
    async fn get_mapping_confidence_threshold(&self) -> ImportResult<f64>;

    /// 是否启用模糊匹配回退（默认 false）
    async fn get_fuzzy_fallback(&self) -> ImportResult<bool>;

    /// 汇总记录是否保留明细（默认 true）
    async fn get_retain_raw_records(&self) -> ImportResult<bool>;

    /// 导入提示中展示的问题条数（默认 5）
    async fn get_surfaced_issue_limit(&self) -> ImportResult<usize>;

    /// 一次性读取全部配置
    async fn load_ingest_config(&self) -> ImportResult<IngestConfig> {
        Ok(IngestConfig {
            success_statuses: self.get_success_statuses().await?,
            default_currency: self.get_default_currency().await?,
            fuzzy_threshold: self.get_fuzzy_threshold().await?,
            mapping_confidence_threshold: self.get_mapping_confidence_threshold().await?,
            fuzzy_fallback: self.get_fuzzy_fallback().await?,
            retain_raw_records: self.get_retain_raw_records().await?,
            surfaced_issue_limit: self.get_surfaced_issue_limit().await?,
        })
    }
}
