// ==========================================
// 快递报表导入系统 - 导入结果模型
// ==========================================
// 用途: 单文件解析结果 / 导入日志 / 批量导入汇总
// 生命周期: ValidationIssue 仅存在于单个批次，不落库（日志中以 JSON 存档）
// ==========================================

use crate::domain::delivery::CanonicalDeliveryRecord;
use crate::domain::pickup::{AggregatedPickupRecord, CanonicalPickupRecord};
use crate::domain::types::{FileType, ImportStatus, IssueSeverity, SummaryLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ValidationIssue - 行级/批次级问题
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub row: Option<usize>, // 表格行号（表头为第 1 行）；None = 批次级
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
    pub severity: IssueSeverity,
}

impl ValidationIssue {
    pub fn error(row: usize, field: &str, message: impl Into<String>) -> Self {
        Self {
            row: Some(row),
            field: Some(field.to_string()),
            message: message.into(),
            severity: IssueSeverity::Error,
        }
    }

    pub fn warning(row: usize, field: &str, message: impl Into<String>) -> Self {
        Self {
            row: Some(row),
            field: Some(field.to_string()),
            message: message.into(),
            severity: IssueSeverity::Warning,
        }
    }

    pub fn file_error(message: impl Into<String>) -> Self {
        Self {
            row: None,
            field: None,
            message: message.into(),
            severity: IssueSeverity::Error,
        }
    }

    pub fn batch_warning(message: impl Into<String>) -> Self {
        Self {
            row: None,
            field: None,
            message: message.into(),
            severity: IssueSeverity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, IssueSeverity::Error)
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.row {
            Some(row) => write!(f, "Row {}: {}", row, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

// ==========================================
// DuplicatePair - 重复记录对
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicatePair {
    pub key: String,
    pub original: CanonicalDeliveryRecord,
    pub duplicate: CanonicalDeliveryRecord,
}

// ==========================================
// ParsedRecords - 标准记录集合
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParsedRecords {
    Delivery(Vec<CanonicalDeliveryRecord>),
    Pickup(Vec<AggregatedPickupRecord>),
}

impl ParsedRecords {
    pub fn len(&self) -> usize {
        match self {
            ParsedRecords::Delivery(records) => records.len(),
            ParsedRecords::Pickup(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_delivery(&self) -> Option<&[CanonicalDeliveryRecord]> {
        match self {
            ParsedRecords::Delivery(records) => Some(records),
            ParsedRecords::Pickup(_) => None,
        }
    }

    pub fn as_pickup(&self) -> Option<&[AggregatedPickupRecord]> {
        match self {
            ParsedRecords::Pickup(records) => Some(records),
            ParsedRecords::Delivery(_) => None,
        }
    }
}

impl Default for ParsedRecords {
    fn default() -> Self {
        ParsedRecords::Delivery(Vec::new())
    }
}

// ==========================================
// ParseStats - 解析统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseStats {
    pub total: usize,     // 输入数据行数
    pub processed: usize, // 输出记录数（揽收为汇总条数）
    pub errors_count: usize,
    pub warnings_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_count: Option<usize>, // 揽收明细条数
}

// ==========================================
// ParseResult - 单文件解析结果
// ==========================================
// 可直接交给存储层（落库 + 导入日志）或展示层（统计卡片/表格）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub file_type: FileType,
    pub records: ParsedRecords,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_records: Option<Vec<CanonicalPickupRecord>>,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub duplicates: Vec<DuplicatePair>,
    pub stats: ParseStats,
}

impl ParseResult {
    /// 文件级失败：单条错误、零记录
    pub fn failed(file_type: FileType, total: usize, message: impl Into<String>) -> Self {
        Self {
            file_type,
            records: ParsedRecords::default(),
            raw_records: None,
            errors: vec![ValidationIssue::file_error(message)],
            warnings: Vec::new(),
            duplicates: Vec::new(),
            stats: ParseStats {
                total,
                processed: 0,
                errors_count: 1,
                warnings_count: 0,
                raw_count: None,
            },
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_failed(&self) -> bool {
        self.records.is_empty() && self.has_errors()
    }

    /// 醒目展示的前 N 条问题（错误优先）
    pub fn issues_preview(&self, limit: usize) -> Vec<&ValidationIssue> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .take(limit)
            .collect()
    }

    /// 生成用户提示
    pub fn summary(&self, file_name: &str, preview_limit: usize) -> ImportSummary {
        let level = if self.is_failed() {
            SummaryLevel::Error
        } else if self.has_errors() || !self.warnings.is_empty() {
            SummaryLevel::Warning
        } else {
            SummaryLevel::Success
        };

        let message = match level {
            SummaryLevel::Error => format!(
                "{}: import failed ({} errors)",
                file_name, self.stats.errors_count
            ),
            _ => format!(
                "{}: {} {} records imported from {} rows ({} errors, {} warnings)",
                file_name,
                self.stats.processed,
                self.file_type,
                self.stats.total,
                self.stats.errors_count,
                self.stats.warnings_count
            ),
        };

        ImportSummary {
            file_name: file_name.to_string(),
            level,
            message,
            highlights: self
                .issues_preview(preview_limit)
                .into_iter()
                .map(|issue| issue.to_string())
                .collect(),
        }
    }
}

// ==========================================
// ImportSummary - 单文件导入提示
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub file_name: String,
    pub level: SummaryLevel,
    pub message: String,
    pub highlights: Vec<String>, // 前 N 条问题
}

// ==========================================
// ImportLog - 导入日志
// ==========================================
// 对齐: import_logs 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportLog {
    pub batch_id: String,
    pub filename: String,
    pub file_type: FileType,
    pub records_count: usize,
    pub records_imported: usize,
    pub records_failed: usize,
    pub status: ImportStatus,
    pub errors: Vec<ValidationIssue>,
    pub imported_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
}

// ==========================================
// FileImportOutcome - 单文件导入结果
// ==========================================
#[derive(Debug, Clone)]
pub struct FileImportOutcome {
    pub batch_id: Option<String>, // 未落库时为 None
    pub file_name: String,
    pub result: ParseResult,
    pub persisted: usize,
    pub summary: ImportSummary,
}

// ==========================================
// BatchImportReport - 批量导入汇总
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct BatchImportReport {
    pub outcomes: Vec<FileImportOutcome>,
}

impl BatchImportReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.result.is_failed()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_failed()).count()
    }

    pub fn total_records(&self) -> usize {
        self.outcomes.iter().map(|o| o.result.stats.processed).sum()
    }

    pub fn total_errors(&self) -> usize {
        self.outcomes.iter().map(|o| o.result.stats.errors_count).sum()
    }

    pub fn total_warnings(&self) -> usize {
        self.outcomes.iter().map(|o| o.result.stats.warnings_count).sum()
    }
}
