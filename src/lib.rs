// ==========================================
// 快递报表导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + calamine
// 系统定位: 配送/揽收报表导入、校验、汇总与看板统计
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部报表
pub mod importer;

// 配置层 - 导入参数
pub mod config;

// 统计分析层 - 看板
pub mod analytics;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{FileType, ImportStatus, IssueSeverity, SummaryLevel};

// 领域实体
pub use domain::{
    AggregatedPickupRecord, BatchImportReport, CanonicalDeliveryRecord, CanonicalPickupRecord,
    CellValue, FileImportOutcome, ImportLog, ImportSummary, ParseResult, RawRow, RawSheet,
    ValidationIssue,
};

// 导入
pub use importer::{ImportError, ImportResult, ReportImporter, ReportImporterImpl, ReportParser};

// 配置
pub use config::{ConfigManager, IngestConfig, IngestConfigReader};

// 仓储
pub use repository::{ReportImportRepository, ReportImportRepositoryImpl};

// 统计
pub use analytics::{DashboardContext, DashboardService};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "快递报表导入系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
