// ==========================================
// 快递报表导入系统 - 报表解析核心
// ==========================================
// 职责: (表头, 原始行) → ParseResult
// 流程: 类型识别 → 列映射 → 行标准化 → 行校验
//       → 配送: 重复检测 / 揽收: 日汇总
// 红线: 纯同步、无 IO；单文件失败只影响该文件
// ==========================================

use crate::config::IngestConfig;
use crate::domain::cell::{CellValue, RawRow, RawSheet};
use crate::domain::import::{ParseResult, ParseStats, ParsedRecords, ValidationIssue};
use crate::domain::types::FileType;
use crate::importer::column_dictionary::{is_total_row, MappedRow};
use crate::importer::column_mapper::{ColumnMapper, HeaderMapping};
use crate::importer::dq_validator::DqValidator;
use crate::importer::duplicate_detector::DuplicateDetector;
use crate::importer::field_mapper::RowNormalizer;
use crate::importer::file_type_detector::FileTypeDetector;
use crate::importer::pickup_aggregator::PickupAggregator;
use tracing::{debug, warn};

pub const MSG_NO_DATA: &str = "File contains no data rows";
pub const MSG_UNKNOWN_TYPE: &str =
    "Cannot determine file type: expected a courier delivery report or pickup transactions export";

/// 表头行占第 1 行，首个数据行为第 2 行
const FIRST_DATA_ROW: usize = 2;

pub struct ReportParser {
    config: IngestConfig,
    detector: FileTypeDetector,
    normalizer: RowNormalizer,
    validator: DqValidator,
    duplicates: DuplicateDetector,
    aggregator: PickupAggregator,
}

impl Default for ReportParser {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

impl ReportParser {
    pub fn new(config: IngestConfig) -> Self {
        Self {
            detector: FileTypeDetector::new(),
            normalizer: RowNormalizer::new(config.default_currency.clone()),
            validator: DqValidator::new(),
            duplicates: DuplicateDetector::new(),
            aggregator: PickupAggregator::new(
                config.success_statuses.clone(),
                config.retain_raw_records,
            ),
            config,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn parse_sheet(&self, sheet: &RawSheet) -> ParseResult {
        self.parse(&sheet.headers, &sheet.rows)
    }

    /// 解析单个工作表
    pub fn parse<S: AsRef<str>>(&self, headers: &[S], rows: &[RawRow]) -> ParseResult {
        let total = rows.len();

        if rows.is_empty() || headers.iter().all(|h| h.as_ref().trim().is_empty()) {
            warn!(total, "空工作表");
            return ParseResult::failed(FileType::Unknown, total, MSG_NO_DATA);
        }

        let detection = self.detector.detect_with_hits(headers);
        if !detection.file_type.is_known() {
            warn!(
                delivery_hits = detection.delivery_hits,
                pickup_hits = detection.pickup_hits,
                "无法识别文件类型"
            );
            return ParseResult::failed(FileType::Unknown, total, MSG_UNKNOWN_TYPE);
        }
        let file_type = detection.file_type;

        // ===== 列映射 =====
        let mapper = ColumnMapper::new(file_type)
            .with_fuzzy_threshold(self.config.fuzzy_threshold)
            .with_fuzzy_fallback(self.config.fuzzy_fallback)
            .with_min_confidence(self.config.mapping_confidence_threshold);
        let mapping = mapper.map_headers(headers);
        let quality = mapper.assess(&mapping);

        let mut warnings = Vec::new();
        if !quality.missing_fields.is_empty() {
            warnings.push(ValidationIssue::batch_warning(format!(
                "Missing expected columns: {}",
                quality.missing_fields.join(", ")
            )));
        }
        for (header, candidate) in &mapping.suggestions {
            debug!(
                header = %header,
                field = candidate.field,
                confidence = candidate.confidence,
                "未映射表头的模糊建议"
            );
        }

        let resolution = mapping.resolution();
        let data_rows = self.data_rows(rows, &resolution);

        let mut result = match file_type {
            FileType::DeliveryReport => self.parse_delivery(data_rows),
            _ => self.parse_pickup(data_rows),
        };

        warnings.append(&mut result.warnings);
        result.warnings = warnings;
        result.stats.total = total;
        result.stats.errors_count = result.errors.len();
        result.stats.warnings_count = result.warnings.len();

        log_mapping(&mapping, &result);
        result
    }

    /// 过滤合计行与空行，附带表格行号
    fn data_rows(
        &self,
        rows: &[RawRow],
        resolution: &[(String, &'static str)],
    ) -> Vec<(usize, MappedRow)> {
        rows.iter()
            .enumerate()
            .filter(|(_, row)| !is_total_row(row))
            .filter(|(_, row)| !row.values().all(CellValue::is_blank))
            .map(|(idx, row)| (idx + FIRST_DATA_ROW, MappedRow::from_raw(row, resolution)))
            .collect()
    }

    fn parse_delivery(&self, rows: Vec<(usize, MappedRow)>) -> ParseResult {
        let mut records = Vec::new();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for (row_number, row) in rows {
            let draft = self.normalizer.delivery(&row, row_number);
            let validation = self.validator.validate_delivery(draft);
            if validation.is_dropped() {
                debug!(row = row_number, "配送行被丢弃");
            }
            for issue in validation.issues {
                if issue.is_error() {
                    errors.push(issue);
                } else {
                    warnings.push(issue);
                }
            }
            if let Some(record) = validation.record {
                records.push(record);
            }
        }

        let duplicates = self.duplicates.detect(&records);
        if let Some(warning) = self.duplicates.summary_warning(&duplicates) {
            warnings.push(warning);
        }

        ParseResult {
            file_type: FileType::DeliveryReport,
            stats: ParseStats {
                processed: records.len(),
                ..Default::default()
            },
            records: ParsedRecords::Delivery(records),
            raw_records: None,
            errors,
            warnings,
            duplicates,
        }
    }

    fn parse_pickup(&self, rows: Vec<(usize, MappedRow)>) -> ParseResult {
        let mut raws = Vec::new();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for (row_number, row) in rows {
            let record = self.normalizer.pickup(&row, row_number);
            let validation = self.validator.validate_pickup(record);
            for issue in validation.issues {
                if issue.is_error() {
                    errors.push(issue);
                } else {
                    warnings.push(issue);
                }
            }
            if let Some(record) = validation.record {
                raws.push(record);
            }
        }

        let aggregated = self.aggregator.aggregate(&raws);

        ParseResult {
            file_type: FileType::PickupTransactions,
            stats: ParseStats {
                processed: aggregated.len(),
                raw_count: Some(raws.len()),
                ..Default::default()
            },
            records: ParsedRecords::Pickup(aggregated),
            raw_records: Some(raws),
            errors,
            warnings,
            duplicates: Vec::new(),
        }
    }
}

fn log_mapping(mapping: &HeaderMapping, result: &ParseResult) {
    debug!(
        file_type = %result.file_type,
        mapped_columns = mapping.mapped.len(),
        unmapped_columns = mapping.unmapped.len(),
        total = result.stats.total,
        processed = result.stats.processed,
        errors = result.stats.errors_count,
        warnings = result.stats.warnings_count,
        "工作表解析完成"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, CellValue)]) -> RawRow {
        pairs
            .iter()
            .map(|(h, v)| (h.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_empty_rows_fail_with_single_error() {
        let headers = ["Дата", "ПІБ кур'єра"];
        let result = ReportParser::default().parse(&headers, &[]);
        assert!(result.is_failed());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, MSG_NO_DATA);
    }

    #[test]
    fn test_unknown_type_fails_with_single_error() {
        let headers = ["Колонка A", "Колонка B"];
        let rows = vec![row(&[("Колонка A", CellValue::text("x"))])];
        let result = ReportParser::default().parse(&headers, &rows);

        assert_eq!(result.file_type, FileType::Unknown);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, MSG_UNKNOWN_TYPE);
        assert_eq!(result.stats.total, 1);
        assert!(result.records.is_empty());
    }

    #[test]
    fn test_blank_rows_skipped_and_row_numbers_preserved() {
        let headers = [
            "Дата",
            "ПІБ кур'єра",
            "Кількість відомостей",
            "Завантажено посилок",
            "Доставлено посилок",
        ];
        let rows = vec![
            row(&[("Дата", CellValue::Empty), ("ПІБ кур'єра", CellValue::text(" "))]),
            row(&[
                ("Дата", CellValue::text("2025-01-15")),
                ("Завантажено посилок", CellValue::Number(10.0)),
            ]),
        ];
        let result = ReportParser::default().parse(&headers, &rows);

        assert_eq!(result.file_type, FileType::DeliveryReport);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, Some(3));
        assert_eq!(result.stats.total, 2);
        assert_eq!(result.stats.processed, 0);
    }

    #[test]
    fn test_missing_required_columns_warns_once() {
        let headers = ["Номер документу PickUp", "Номер Shipment"];
        let rows = vec![row(&[
            ("Номер документу PickUp", CellValue::text("PU-1")),
            ("Номер Shipment", CellValue::text("SH-1")),
        ])];
        let result = ReportParser::default().parse(&headers, &rows);

        assert_eq!(result.file_type, FileType::PickupTransactions);
        // 缺少快递员/状态列 + 缺少日期
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.warnings[0].row, None);
        assert!(result.warnings[0].message.contains("courier_name"));
        assert_eq!(result.stats.processed, 1);
        assert_eq!(result.stats.raw_count, Some(1));
    }
}
