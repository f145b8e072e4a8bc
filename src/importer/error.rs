// ==========================================
// 快递报表导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 行级问题走 ValidationIssue，不走错误类型
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型（文件级）
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("不支持的文件格式: {0} (支持 .xlsx/.xls/.xlsm/.xlsb/.ods/.csv)")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("工作表无数据")]
    EmptySheet,

    // ===== 内容错误 =====
    #[error("无法根据表头识别文件类型")]
    UnknownFileType,

    // ===== 存储/配置错误 =====
    #[error("仓储层错误: {0}")]
    Repository(#[from] RepositoryError),

    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ImportError::FileNotFound(err.to_string()),
            _ => ImportError::FileReadError(err.to_string()),
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::Repository(RepositoryError::from(err))
    }
}

impl ImportError {
    /// 面向用户的问题描述（写入 ValidationIssue）
    pub fn user_message(&self) -> String {
        match self {
            ImportError::FileNotFound(detail) => format!("File not found: {}", detail),
            ImportError::UnsupportedFormat(ext) => format!(
                "Unsupported file format: {} (expected .xlsx/.xls/.xlsm/.xlsb/.ods/.csv)",
                ext
            ),
            ImportError::FileReadError(detail) => format!("Failed to read file: {}", detail),
            ImportError::ExcelParseError(detail) => {
                format!("Failed to parse Excel workbook: {}", detail)
            }
            ImportError::CsvParseError(detail) => format!("Failed to parse CSV: {}", detail),
            ImportError::EmptySheet => "Workbook contains no data".to_string(),
            ImportError::UnknownFileType => "Cannot determine file type from headers".to_string(),
            ImportError::Repository(err) => format!("Storage error: {}", err),
            ImportError::ConfigReadError { key, .. } => {
                format!("Failed to read configuration value '{}'", key)
            }
            ImportError::Other(err) => err.to_string(),
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_maps_to_file_not_found() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.xlsx");
        assert!(matches!(ImportError::from(err), ImportError::FileNotFound(_)));

        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked");
        assert!(matches!(ImportError::from(err), ImportError::FileReadError(_)));
    }

    #[test]
    fn test_display_and_user_message() {
        assert_eq!(ImportError::EmptySheet.to_string(), "工作表无数据");
        assert_eq!(
            ImportError::UnknownFileType.user_message(),
            "Cannot determine file type from headers"
        );
        assert_eq!(
            ImportError::FileNotFound("a.xlsx".to_string()).user_message(),
            "File not found: a.xlsx"
        );
    }
}
