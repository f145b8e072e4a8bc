// ==========================================
// 快递报表导入系统 - 数据质量校验器
// ==========================================
// 职责: 行级校验，产出 ValidationIssue 并决定保留/丢弃
// 配送: 快递员/日期缺失 → 错误并丢弃；装车数为负 → 错误但保留；
//       妥投 > 装车 → 仅告警
// 揽收: 单号全缺 → 错误并丢弃；日期全缺 → 告警
// ==========================================

use crate::domain::delivery::{CanonicalDeliveryRecord, DeliveryRowDraft};
use crate::domain::import::ValidationIssue;
use crate::domain::pickup::CanonicalPickupRecord;
use crate::importer::column_dictionary::{delivery_fields as d, pickup_fields as p};

pub const MSG_MISSING_COURIER: &str = "Missing courier name";
pub const MSG_MISSING_DATE: &str = "Missing or invalid report date";
pub const MSG_NEGATIVE_LOADED: &str = "Loaded parcels cannot be negative";
pub const MSG_DELIVERED_EXCEEDS_LOADED: &str = "Delivered exceeds loaded";
pub const MSG_MISSING_IDENTIFIER: &str = "Missing both pickup document number and shipment number";
pub const MSG_MISSING_PICKUP_DATES: &str =
    "Missing both execution date and shipment creation date";

// ==========================================
// RowValidation - 单行校验结果
// ==========================================
#[derive(Debug, Clone)]
pub struct RowValidation<T> {
    pub record: Option<T>, // None = 丢弃
    pub issues: Vec<ValidationIssue>,
}

impl<T> RowValidation<T> {
    pub fn is_dropped(&self) -> bool {
        self.record.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DqValidator;

impl DqValidator {
    pub fn new() -> Self {
        Self
    }

    /// 配送行校验
    pub fn validate_delivery(&self, draft: DeliveryRowDraft) -> RowValidation<CanonicalDeliveryRecord> {
        let row = draft.row_number;
        let mut issues = Vec::new();

        if draft.courier_name.is_none() {
            issues.push(ValidationIssue::error(row, d::COURIER_NAME, MSG_MISSING_COURIER));
        }
        if draft.report_date.is_none() {
            issues.push(ValidationIssue::error(row, d::REPORT_DATE, MSG_MISSING_DATE));
        }
        if !issues.is_empty() {
            return RowValidation {
                record: None,
                issues,
            };
        }

        if draft.loaded_parcels < 0 {
            issues.push(ValidationIssue::error(
                row,
                d::LOADED_PARCELS,
                MSG_NEGATIVE_LOADED,
            ));
        }
        if draft.delivered_parcels > draft.loaded_parcels {
            issues.push(ValidationIssue::warning(
                row,
                d::DELIVERED_PARCELS,
                MSG_DELIVERED_EXCEEDS_LOADED,
            ));
        }

        RowValidation {
            record: draft.into_record(),
            issues,
        }
    }

    /// 揽收行校验
    pub fn validate_pickup(&self, record: CanonicalPickupRecord) -> RowValidation<CanonicalPickupRecord> {
        let row = record.row_number;

        if !record.has_identifier() {
            return RowValidation {
                record: None,
                issues: vec![ValidationIssue::error(
                    row,
                    p::PICKUP_DOC_NUMBER,
                    MSG_MISSING_IDENTIFIER,
                )],
            };
        }

        let mut issues = Vec::new();
        if record.effective_date().is_none() {
            issues.push(ValidationIssue::warning(
                row,
                p::EXECUTION_DATE,
                MSG_MISSING_PICKUP_DATES,
            ));
        }

        RowValidation {
            record: Some(record),
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::IssueSeverity;
    use chrono::NaiveDate;

    fn draft(loaded: i64, delivered: i64) -> DeliveryRowDraft {
        DeliveryRowDraft {
            report_date: NaiveDate::from_ymd_opt(2025, 1, 15),
            courier_name: Some("Іванов".to_string()),
            loaded_parcels: loaded,
            delivered_parcels: delivered,
            row_number: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_delivery_row_has_no_issues() {
        let result = DqValidator::new().validate_delivery(draft(100, 90));
        assert!(result.issues.is_empty());
        assert!(!result.is_dropped());
    }

    #[test]
    fn test_delivered_exceeds_loaded_is_warning_only() {
        let result = DqValidator::new().validate_delivery(draft(100, 120));
        assert!(!result.is_dropped());
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].severity, IssueSeverity::Warning);
        assert_eq!(result.issues[0].message, MSG_DELIVERED_EXCEEDS_LOADED);
        assert_eq!(result.issues[0].row, Some(5));
    }

    #[test]
    fn test_negative_loaded_is_error_but_kept() {
        let result = DqValidator::new().validate_delivery(draft(-1, 0));
        assert!(!result.is_dropped());
        assert_eq!(result.issues.len(), 2);
        assert!(result.issues[0].is_error());
        assert!(!result.issues[1].is_error());
    }

    #[test]
    fn test_missing_keys_drop_row() {
        let mut d = draft(10, 5);
        d.courier_name = None;
        d.report_date = None;
        let result = DqValidator::new().validate_delivery(d);
        assert!(result.is_dropped());
        assert_eq!(result.issues.len(), 2);
        assert!(result.issues.iter().all(|i| i.is_error()));
    }

    #[test]
    fn test_pickup_without_identifier_dropped() {
        let result = DqValidator::new().validate_pickup(CanonicalPickupRecord {
            row_number: 3,
            ..Default::default()
        });
        assert!(result.is_dropped());
        assert_eq!(result.issues[0].message, MSG_MISSING_IDENTIFIER);
    }

    #[test]
    fn test_pickup_without_dates_warns_and_keeps() {
        let result = DqValidator::new().validate_pickup(CanonicalPickupRecord {
            pickup_doc_number: Some("PU-1".to_string()),
            row_number: 3,
            ..Default::default()
        });
        assert!(!result.is_dropped());
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].severity, IssueSeverity::Warning);
    }
}
