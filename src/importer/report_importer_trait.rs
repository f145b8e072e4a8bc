// ==========================================
// 快递报表导入系统 - 报表导入 Trait
// ==========================================
// 职责: 定义报表导入接口（不包含实现）
// ==========================================

use crate::domain::cell::RawSheet;
use crate::domain::import::{BatchImportReport, FileImportOutcome};
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

// ==========================================
// ReportImporter Trait
// ==========================================
// 用途: 报表导入主接口
// 实现者: ReportImporterImpl
#[async_trait]
pub trait ReportImporter: Send + Sync {
    /// 导入单个文件
    ///
    /// # 返回
    /// - Ok(FileImportOutcome): 文件级失败（读取失败/空表/类型未知）也以 Ok 返回，
    ///   结果中带单条错误
    /// - Err: 存储层错误
    ///
    /// # 导入流程
    /// 1. 读取文件字节（tokio::fs）
    /// 2. 解析首个工作表
    /// 3. 解析核心（识别 → 映射 → 校验 → 去重/汇总）
    /// 4. 落库 + 导入日志
    async fn import_file(&self, file_path: &Path) -> ImportResult<FileImportOutcome>;

    /// 导入内存中的文件内容（文件名用于判断格式）
    async fn import_bytes(&self, file_name: &str, bytes: Vec<u8>)
        -> ImportResult<FileImportOutcome>;

    /// 批量导入（顺序执行）
    ///
    /// # 说明
    /// - 每个文件独立，某个文件失败不影响其他文件
    /// - 所有结果在最后统一汇总
    async fn import_files(&self, file_paths: &[PathBuf]) -> BatchImportReport;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: ExcelParser, CsvParser
pub trait FileParser: Send + Sync {
    /// 解析文件内容为首个工作表
    fn parse_bytes(&self, bytes: Vec<u8>) -> ImportResult<RawSheet>;

    /// 解析磁盘文件
    fn parse_path(&self, file_path: &Path) -> ImportResult<RawSheet> {
        let bytes = std::fs::read(file_path)?;
        self.parse_bytes(bytes)
    }
}
