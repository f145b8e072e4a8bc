// ==========================================
// 快递报表导入系统 - 导入层
// ==========================================
// 职责: 外部报表导入,生成标准记录
// 支持: Excel (xlsx/xlsm/xls/xlsb/ods), CSV
// 流程: 读取 → 类型识别 → 列映射 → 行标准化 → 校验 → 去重/汇总 → 落库
// ==========================================

// 模块声明
pub mod column_dictionary;
pub mod column_mapper;
pub mod dq_validator;
pub mod duplicate_detector;
pub mod error;
pub mod field_mapper;
pub mod field_parser;
pub mod file_parser;
pub mod file_type_detector;
pub mod pickup_aggregator;
pub mod report_importer_impl;
pub mod report_importer_trait;
pub mod report_parser;

// 重导出核心类型
pub use column_mapper::{
    ColumnMapper, FuzzyHeaderMatcher, HeaderMapping, HeaderMatcher, MappingQuality,
    MatchCandidate,
};
pub use dq_validator::DqValidator;
pub use duplicate_detector::DuplicateDetector;
pub use error::{ImportError, ImportResult};
pub use field_mapper::RowNormalizer;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use file_type_detector::{Detection, FileTypeDetector};
pub use pickup_aggregator::PickupAggregator;
pub use report_importer_impl::ReportImporterImpl;
pub use report_parser::ReportParser;

// 重导出 Trait 接口
pub use report_importer_trait::{FileParser, ReportImporter};
