// ==========================================
// 快递报表导入系统 - 领域类型定义
// ==========================================
// 职责: 文件类型 / 问题级别 / 导入状态等枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 文件类型 (File Type)
// ==========================================
// 每个上传文件根据表头识别一次，之后不再变更
// 序列化格式: "delivery" / "pickup" / "unknown"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    #[serde(rename = "delivery")]
    DeliveryReport, // 配送报表（按快递员/日汇总）
    #[serde(rename = "pickup")]
    PickupTransactions, // 揽收明细（逐票）
    #[serde(rename = "unknown")]
    Unknown, // 无法识别
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::DeliveryReport => "delivery",
            FileType::PickupTransactions => "pickup",
            FileType::Unknown => "unknown",
        }
    }

    pub fn from_str_lossy(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "delivery" => FileType::DeliveryReport,
            "pickup" => FileType::PickupTransactions,
            _ => FileType::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FileType::Unknown)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 问题级别 (Issue Severity)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Warning, // 警告：记录保留
    Error,   // 错误：记录可能被丢弃
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSeverity::Warning => write!(f, "warning"),
            IssueSeverity::Error => write!(f, "error"),
        }
    }
}

// ==========================================
// 导入状态 (Import Status)
// ==========================================
// 与 import_logs.status 列一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Pending => "pending",
            ImportStatus::Processing => "processing",
            ImportStatus::Completed => "completed",
            ImportStatus::Failed => "failed",
        }
    }

    pub fn from_str_lossy(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "pending" => ImportStatus::Pending,
            "processing" => ImportStatus::Processing,
            "completed" => ImportStatus::Completed,
            _ => ImportStatus::Failed,
        }
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 提示级别 (Summary Level)
// ==========================================
// 每个文件导入后给用户的提示（成功/有警告/失败）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLevel {
    Success,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&FileType::DeliveryReport).unwrap(),
            "\"delivery\""
        );
        assert_eq!(
            serde_json::to_string(&FileType::PickupTransactions).unwrap(),
            "\"pickup\""
        );
        assert_eq!(FileType::from_str_lossy(" Pickup "), FileType::PickupTransactions);
        assert_eq!(FileType::from_str_lossy("xls"), FileType::Unknown);
    }

    #[test]
    fn test_import_status_round_trip() {
        for status in [
            ImportStatus::Pending,
            ImportStatus::Processing,
            ImportStatus::Completed,
            ImportStatus::Failed,
        ] {
            assert_eq!(ImportStatus::from_str_lossy(status.as_str()), status);
        }
    }
}
