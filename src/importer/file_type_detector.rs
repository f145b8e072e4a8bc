// ==========================================
// 快递报表导入系统 - 文件类型识别器
// ==========================================
// 职责: 根据表头特征短语判定 配送报表 / 揽收明细
// 规则: 命中数 >= 2 才分类，避免单个共用表头造成误判
// ==========================================

use crate::domain::types::FileType;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 配送报表特征短语（小写）
pub const DELIVERY_MARKERS: [&str; 4] = [
    "кількість відомостей",
    "кількість адрес",
    "завантажено посилок",
    "доставлено в руки",
];

/// 揽收明细特征短语（小写）
pub const PICKUP_MARKERS: [&str; 4] = [
    "номер документу pickup",
    "дата виконання документу pickup",
    "номер shipment",
    "статус pickup",
];

/// 最少命中数
pub const MIN_MARKER_HITS: usize = 2;

// ==========================================
// Detection - 识别结果（含命中数，供诊断）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub file_type: FileType,
    pub delivery_hits: usize,
    pub pickup_hits: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileTypeDetector;

impl FileTypeDetector {
    pub fn new() -> Self {
        Self
    }

    /// 识别文件类型
    pub fn detect<S: AsRef<str>>(&self, headers: &[S]) -> FileType {
        self.detect_with_hits(headers).file_type
    }

    /// 识别文件类型并返回各类型命中数
    ///
    /// # 规则
    /// 1. 全部表头拼接后转小写
    /// 2. 分别统计两类特征短语的子串命中数
    /// 3. 配送命中 >= 2 且不少于揽收命中 → 配送报表（平局时配送优先）
    /// 4. 否则揽收命中 >= 2 → 揽收明细
    /// 5. 其他 → Unknown
    pub fn detect_with_hits<S: AsRef<str>>(&self, headers: &[S]) -> Detection {
        let haystack = headers
            .iter()
            .map(|h| h.as_ref().trim())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let delivery_hits = count_hits(&haystack, &DELIVERY_MARKERS);
        let pickup_hits = count_hits(&haystack, &PICKUP_MARKERS);

        let file_type = if delivery_hits >= MIN_MARKER_HITS && delivery_hits >= pickup_hits {
            FileType::DeliveryReport
        } else if pickup_hits >= MIN_MARKER_HITS {
            FileType::PickupTransactions
        } else {
            FileType::Unknown
        };

        debug!(
            file_type = %file_type,
            delivery_hits = delivery_hits,
            pickup_hits = pickup_hits,
            "文件类型识别完成"
        );

        Detection {
            file_type,
            delivery_hits,
            pickup_hits,
        }
    }
}

fn count_hits(haystack: &str, markers: &[&str]) -> usize {
    markers.iter().filter(|m| haystack.contains(*m)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delivery_report() {
        let headers = [
            "№",
            "Дата",
            "ПІБ кур'єра",
            "Кількість відомостей",
            "Кількість адрес",
            "Завантажено посилок",
        ];
        let detection = FileTypeDetector::new().detect_with_hits(&headers);
        assert_eq!(detection.file_type, FileType::DeliveryReport);
        assert_eq!(detection.delivery_hits, 3);
        assert_eq!(detection.pickup_hits, 0);
    }

    #[test]
    fn test_detect_pickup_transactions() {
        let headers = [
            "Номер документу PickUp",
            "Номер Shipment",
            "Статус PickUp",
            "ПІБ кур'єра",
        ];
        assert_eq!(
            FileTypeDetector::new().detect(&headers),
            FileType::PickupTransactions
        );
    }

    #[test]
    fn test_single_marker_is_unknown() {
        let headers = ["Номер Shipment", "Вага", "Місто"];
        assert_eq!(FileTypeDetector::new().detect(&headers), FileType::Unknown);

        let headers = ["Кількість адрес", "Статус PickUp"];
        assert_eq!(FileTypeDetector::new().detect(&headers), FileType::Unknown);
    }

    #[test]
    fn test_tie_prefers_delivery() {
        let headers = [
            "Кількість відомостей",
            "Кількість адрес",
            "Номер документу PickUp",
            "Номер Shipment",
        ];
        assert_eq!(
            FileTypeDetector::new().detect(&headers),
            FileType::DeliveryReport
        );
    }

    #[test]
    fn test_empty_headers_unknown() {
        let headers: Vec<String> = Vec::new();
        assert_eq!(FileTypeDetector::new().detect(&headers), FileType::Unknown);
    }
}
