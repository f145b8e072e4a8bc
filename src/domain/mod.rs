// ==========================================
// 快递报表导入系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含解析逻辑
// ==========================================

pub mod cell;
pub mod delivery;
pub mod import;
pub mod pickup;
pub mod types;

// 重导出核心类型
pub use cell::{CellValue, RawRow, RawSheet};
pub use delivery::{CanonicalDeliveryRecord, DeliveryRowDraft};
pub use import::{
    BatchImportReport, DuplicatePair, FileImportOutcome, ImportLog, ImportSummary, ParseResult,
    ParseStats, ParsedRecords, ValidationIssue,
};
pub use pickup::{AggregatedPickupRecord, CanonicalPickupRecord, DEFAULT_CURRENCY, UNKNOWN_GROUP};
pub use types::{FileType, ImportStatus, IssueSeverity, SummaryLevel};
