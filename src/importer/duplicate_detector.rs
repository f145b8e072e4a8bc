// ==========================================
// 快递报表导入系统 - 重复记录检测器
// ==========================================
// 职责: 同批次内配送记录重复检测（键: date|courier_name|department）
// 策略: 只报告不删除；首条为原始记录，其后每条同键记录各成一对
// ==========================================

use crate::domain::delivery::CanonicalDeliveryRecord;
use crate::domain::import::{DuplicatePair, ValidationIssue};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateDetector;

impl DuplicateDetector {
    pub fn new() -> Self {
        Self
    }

    /// 检测同批次内重复
    pub fn detect(&self, records: &[CanonicalDeliveryRecord]) -> Vec<DuplicatePair> {
        let mut first_occurrence: HashMap<String, usize> = HashMap::new();
        let mut pairs = Vec::new();

        for (idx, record) in records.iter().enumerate() {
            let key = record.duplicate_key();
            match first_occurrence.get(&key) {
                Some(&original_idx) => pairs.push(DuplicatePair {
                    key,
                    original: records[original_idx].clone(),
                    duplicate: record.clone(),
                }),
                None => {
                    first_occurrence.insert(key, idx);
                }
            }
        }

        pairs
    }

    /// 批次级告警（无重复时为 None）
    pub fn summary_warning(&self, pairs: &[DuplicatePair]) -> Option<ValidationIssue> {
        if pairs.is_empty() {
            return None;
        }
        Some(ValidationIssue::batch_warning(format!(
            "Found {} duplicate record(s) with the same date, courier and department",
            pairs.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::delivery::DeliveryRowDraft;
    use chrono::NaiveDate;

    fn record(day: u32, courier: &str, department: Option<&str>, row: usize) -> CanonicalDeliveryRecord {
        DeliveryRowDraft {
            report_date: NaiveDate::from_ymd_opt(2025, 1, day),
            courier_name: Some(courier.to_string()),
            department: department.map(str::to_string),
            row_number: row,
            ..Default::default()
        }
        .into_record()
        .unwrap()
    }

    #[test]
    fn test_detect_pairs_against_first_occurrence() {
        let records = vec![
            record(15, "Іванов", Some("Київ-1"), 2),
            record(15, "Іванов", Some("Київ-1"), 3),
            record(15, "Іванов", Some("Київ-2"), 4),
            record(15, "Іванов", Some("Київ-1"), 5),
        ];
        let pairs = DuplicateDetector::new().detect(&records);

        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| p.original.row_number == 2));
        assert_eq!(pairs[0].duplicate.row_number, 3);
        assert_eq!(pairs[1].duplicate.row_number, 5);
    }

    #[test]
    fn test_missing_department_is_part_of_key() {
        let records = vec![
            record(15, "Іванов", None, 2),
            record(15, "Іванов", Some("Київ-1"), 3),
            record(16, "Іванов", None, 4),
        ];
        assert!(DuplicateDetector::new().detect(&records).is_empty());
    }

    #[test]
    fn test_summary_warning() {
        let detector = DuplicateDetector::new();
        assert!(detector.summary_warning(&[]).is_none());

        let records = vec![record(15, "Іванов", None, 2), record(15, "Іванов", None, 3)];
        let pairs = detector.detect(&records);
        let warning = detector.summary_warning(&pairs).unwrap();
        assert_eq!(warning.row, None);
        assert!(warning.message.starts_with("Found 1 duplicate"));
    }
}
