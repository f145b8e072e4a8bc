// ==========================================
// 快递报表导入系统 - 列映射器
// ==========================================
// 职责: 表头 → 标准字段（精确字典优先，模糊匹配为诊断/可选回退）
// 模糊规则: 关键词包含 = 0.9；否则 Levenshtein 相似度 1 - d/max(len)
// ==========================================

use crate::domain::types::FileType;
use crate::importer::column_dictionary::{self, delivery_fields as d, pickup_fields as p};
use serde::Serialize;
use tracing::debug;

/// 模糊匹配默认阈值
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.6;

/// 映射质量默认阈值（平均置信度需大于该值）
pub const DEFAULT_MAPPING_CONFIDENCE: f64 = 0.7;

/// 关键词包含时的置信度
pub const CONTAINMENT_CONFIDENCE: f64 = 0.9;

/// 配送报表必需字段
pub const DELIVERY_REQUIRED: [&str; 4] = [
    d::REPORT_DATE,
    d::COURIER_NAME,
    d::LOADED_PARCELS,
    d::DELIVERED_PARCELS,
];

/// 揽收明细必需字段
pub const PICKUP_REQUIRED: [&str; 4] = [
    p::PICKUP_DOC_NUMBER,
    p::SHIPMENT_NUMBER,
    p::COURIER_NAME,
    p::PICKUP_STATUS,
];

pub fn required_fields(file_type: FileType) -> &'static [&'static str] {
    match file_type {
        FileType::DeliveryReport => &DELIVERY_REQUIRED,
        FileType::PickupTransactions => &PICKUP_REQUIRED,
        FileType::Unknown => &[],
    }
}

// ==========================================
// 关键词表（小写）
// ==========================================
const DELIVERY_KEYWORDS: &[(&str, &[&str])] = &[
    (d::REPORT_DATE, &["дата", "date"]),
    (d::COURIER_NAME, &["піб", "кур'єр", "курʼєр", "courier"]),
    (d::CAR_NUMBER, &["номер авто", "авто", "car"]),
    (d::DEPARTMENT, &["підрозділ", "department"]),
    (d::REPORTS_COUNT, &["кількість відомостей", "відомост"]),
    (d::ADDRESSES_COUNT, &["кількість адрес", "адрес"]),
    (d::LOADED_PARCELS, &["завантажено", "loaded"]),
    (d::DELIVERED_PARCELS, &["доставлено посилок", "delivered"]),
    (d::DELIVERED_IN_HAND, &["в руки"]),
    (d::DELIVERED_SAFE_PLACE, &["безпечне місце"]),
    (d::UNDELIVERED_PARCELS, &["не доставлено посилок", "undelivered"]),
    (d::UNDELIVERED_WITH_REASON, &["з причиною"]),
    (d::UNDELIVERED_NO_REASON, &["без причини"]),
    (d::DELIVERY_SUCCESS_RATE, &["% успішної", "успішної доставки", "success rate"]),
];

const PICKUP_KEYWORDS: &[(&str, &[&str])] = &[
    (p::PICKUP_DOC_NUMBER, &["номер документу pickup", "документ pickup"]),
    (p::SHIPMENTS_IN_DOC, &["кількість шипментів", "шипментів"]),
    (p::EXECUTION_DATE, &["дата виконання", "execution date"]),
    (p::TIME_INTERVAL, &["часовий інтервал", "інтервал"]),
    (p::SHIPMENT_NUMBER, &["номер shipment", "shipment number"]),
    (p::PLACES_COUNT, &["кількість місць", "кількість мість", "місць"]),
    (p::SHIPMENT_CREATED_DATE, &["дата створення"]),
    (p::ACTUAL_WEIGHT, &["фактична вага", "вага", "weight"]),
    (p::VOLUMETRIC_WEIGHT, &["об'ємна вага"]),
    (p::SENDER_COUNTRY, &["країна відправника"]),
    (p::SENDER_CITY, &["місто відправника"]),
    (p::SENDER_COMPANY, &["компанія відправник"]),
    (p::RECIPIENT_COUNTRY, &["країна отримувача"]),
    (p::PICKUP_STATUS, &["статус pickup", "pickup status"]),
    (p::COURIER_NAME, &["піб", "кур'єр", "курʼєр", "courier"]),
    (p::DELIVERY_COST, &["вартість доставки", "вартість", "cost"]),
    (p::PAYER, &["платник"]),
    (p::SHIPMENT_STATUS, &["останній статус"]),
    (p::NON_EXECUTION_REASON, &["причина невиконання"]),
];

fn keywords_for(file_type: FileType) -> &'static [(&'static str, &'static [&'static str])] {
    match file_type {
        FileType::DeliveryReport => DELIVERY_KEYWORDS,
        FileType::PickupTransactions => PICKUP_KEYWORDS,
        FileType::Unknown => &[],
    }
}

// ==========================================
// MatchCandidate - 候选字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchCandidate {
    pub field: &'static str,
    pub confidence: f64,
}

// ==========================================
// HeaderMatcher Trait
// ==========================================
// 用途: 表头打分（纯函数，与精确字典分离）
// 实现者: FuzzyHeaderMatcher
pub trait HeaderMatcher: Send + Sync {
    /// 候选字段（按置信度降序）
    fn candidates(&self, header: &str) -> Vec<MatchCandidate>;

    /// 阈值
    fn threshold(&self) -> f64;

    /// 最佳候选（高于阈值才返回）
    fn best_match(&self, header: &str) -> Option<MatchCandidate> {
        self.candidates(header)
            .into_iter()
            .next()
            .filter(|c| c.confidence > self.threshold())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FuzzyHeaderMatcher {
    file_type: FileType,
    threshold: f64,
}

impl FuzzyHeaderMatcher {
    pub fn new(file_type: FileType, threshold: f64) -> Self {
        Self {
            file_type,
            threshold,
        }
    }
}

impl HeaderMatcher for FuzzyHeaderMatcher {
    fn candidates(&self, header: &str) -> Vec<MatchCandidate> {
        let header = header.trim().to_lowercase();
        if header.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<MatchCandidate> = keywords_for(self.file_type)
            .iter()
            .map(|(field, keywords)| MatchCandidate {
                field: *field,
                confidence: keywords
                    .iter()
                    .map(|k| keyword_score(&header, k))
                    .fold(0.0, f64::max),
            })
            .filter(|c| c.confidence > 0.0)
            .collect();

        candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        candidates
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// 单个关键词得分（header 已小写）
pub fn keyword_score(header: &str, keyword: &str) -> f64 {
    if header.contains(keyword) {
        return CONTAINMENT_CONFIDENCE;
    }
    similarity(header, keyword)
}

/// Levenshtein 相似度: 1 - d / max(len)，按字符计
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// 编辑距离（按字符）
pub fn levenshtein(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

// ==========================================
// HeaderMapping - 表头解析结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedHeader {
    pub header: String,
    pub field: &'static str,
    pub confidence: f64,
    pub source: MatchSource,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HeaderMapping {
    pub mapped: Vec<MappedHeader>,
    pub unmapped: Vec<String>,
    /// 未映射表头的模糊建议（仅诊断）
    pub suggestions: Vec<(String, MatchCandidate)>,
}

impl HeaderMapping {
    /// 表头 → 标准字段（保持表头从左到右的顺序）
    pub fn resolution(&self) -> Vec<(String, &'static str)> {
        self.mapped
            .iter()
            .map(|m| (m.header.clone(), m.field))
            .collect()
    }

    pub fn average_confidence(&self) -> f64 {
        if self.mapped.is_empty() {
            return 0.0;
        }
        self.mapped.iter().map(|m| m.confidence).sum::<f64>() / self.mapped.len() as f64
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.mapped.iter().any(|m| m.field == field)
    }
}

// ==========================================
// MappingQuality - 映射质量
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingQuality {
    pub is_valid: bool,
    pub missing_fields: Vec<&'static str>,
    pub average_confidence: f64,
}

// ==========================================
// ColumnMapper - 列映射器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ColumnMapper {
    file_type: FileType,
    matcher: FuzzyHeaderMatcher,
    fuzzy_fallback: bool,
    min_confidence: f64,
}

impl ColumnMapper {
    pub fn new(file_type: FileType) -> Self {
        Self {
            file_type,
            matcher: FuzzyHeaderMatcher::new(file_type, DEFAULT_FUZZY_THRESHOLD),
            fuzzy_fallback: false,
            min_confidence: DEFAULT_MAPPING_CONFIDENCE,
        }
    }

    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.matcher = FuzzyHeaderMatcher::new(self.file_type, threshold);
        self
    }

    pub fn with_fuzzy_fallback(mut self, enabled: bool) -> Self {
        self.fuzzy_fallback = enabled;
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// 解析表头
    ///
    /// # 规则
    /// 1. 精确字典命中 → 置信度 1.0
    /// 2. 否则计算模糊候选；开启回退时采用最佳候选，否则仅记为建议
    /// 3. 其余表头记为未映射（丢弃）
    pub fn map_headers<S: AsRef<str>>(&self, headers: &[S]) -> HeaderMapping {
        let mut mapping = HeaderMapping::default();

        for header in headers {
            let header = header.as_ref();
            if header.trim().is_empty() {
                continue;
            }

            if let Some(field) = column_dictionary::lookup(self.file_type, header) {
                mapping.mapped.push(MappedHeader {
                    header: header.to_string(),
                    field,
                    confidence: 1.0,
                    source: MatchSource::Exact,
                });
                continue;
            }

            match self.matcher.best_match(header) {
                Some(candidate) if self.fuzzy_fallback => mapping.mapped.push(MappedHeader {
                    header: header.to_string(),
                    field: candidate.field,
                    confidence: candidate.confidence,
                    source: MatchSource::Fuzzy,
                }),
                Some(candidate) => {
                    mapping.suggestions.push((header.to_string(), candidate));
                    mapping.unmapped.push(header.to_string());
                }
                None => mapping.unmapped.push(header.to_string()),
            }
        }

        debug!(
            file_type = %self.file_type,
            mapped = mapping.mapped.len(),
            unmapped = mapping.unmapped.len(),
            "表头映射完成"
        );

        mapping
    }

    /// 映射质量: 必需字段齐全且平均置信度 > 阈值
    pub fn assess(&self, mapping: &HeaderMapping) -> MappingQuality {
        let missing_fields: Vec<&'static str> = required_fields(self.file_type)
            .iter()
            .copied()
            .filter(|field| !mapping.has_field(field))
            .collect();
        let average_confidence = mapping.average_confidence();

        MappingQuality {
            is_valid: missing_fields.is_empty() && average_confidence > self.min_confidence,
            missing_fields,
            average_confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("дата", "дати"), 1);
        assert!((similarity("дата", "дати") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_containment_scores_point_nine() {
        let matcher = FuzzyHeaderMatcher::new(FileType::DeliveryReport, 0.6);
        let best = matcher.best_match("Завантажено посилок (шт)").unwrap();
        assert_eq!(best.field, d::LOADED_PARCELS);
        assert!((best.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_candidates_ranked_descending() {
        let matcher = FuzzyHeaderMatcher::new(FileType::PickupTransactions, 0.6);
        let candidates = matcher.candidates("Фактична вага, кг");
        assert!(!candidates.is_empty());
        assert_eq!(candidates[0].field, p::ACTUAL_WEIGHT);
        assert!(candidates
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));
    }

    struct FixedMatcher(f64);

    impl HeaderMatcher for FixedMatcher {
        fn candidates(&self, _header: &str) -> Vec<MatchCandidate> {
            vec![MatchCandidate {
                field: d::COURIER_NAME,
                confidence: self.0,
            }]
        }

        fn threshold(&self) -> f64 {
            DEFAULT_FUZZY_THRESHOLD
        }
    }

    #[test]
    fn test_best_match_requires_score_above_threshold() {
        assert!(FixedMatcher(DEFAULT_FUZZY_THRESHOLD).best_match("x").is_none());
        let best = FixedMatcher(0.61).best_match("x").unwrap();
        assert_eq!(best.field, d::COURIER_NAME);
    }

    #[test]
    fn test_below_threshold_is_unmapped() {
        let matcher = FuzzyHeaderMatcher::new(FileType::DeliveryReport, 0.6);
        assert!(matcher.best_match("zzzzzzzzzzzz").is_none());
    }

    #[test]
    fn test_map_headers_exact_first_fuzzy_as_suggestion() {
        let mapper = ColumnMapper::new(FileType::DeliveryReport);
        let mapping = mapper.map_headers(&["Дата", "ПІБ кур'єра", "Завантажено (шт)", "Коментар"]);

        assert_eq!(mapping.mapped.len(), 2);
        assert!(mapping.mapped.iter().all(|m| m.source == MatchSource::Exact));
        assert_eq!(mapping.unmapped, vec!["Завантажено (шт)", "Коментар"]);
        assert_eq!(mapping.suggestions.len(), 1);
        assert_eq!(mapping.suggestions[0].1.field, d::LOADED_PARCELS);
    }

    #[test]
    fn test_map_headers_with_fuzzy_fallback() {
        let mapper = ColumnMapper::new(FileType::DeliveryReport).with_fuzzy_fallback(true);
        let mapping = mapper.map_headers(&["Дата", "Завантажено (шт)"]);

        assert_eq!(mapping.mapped.len(), 2);
        assert_eq!(mapping.mapped[1].source, MatchSource::Fuzzy);
        assert_eq!(
            mapping.resolution()[1],
            ("Завантажено (шт)".to_string(), d::LOADED_PARCELS)
        );
    }

    #[test]
    fn test_assess_reports_missing_required() {
        let mapper = ColumnMapper::new(FileType::PickupTransactions);
        let mapping = mapper.map_headers(&["Номер Shipment", "ПІБ кур'єра"]);
        let quality = mapper.assess(&mapping);

        assert!(!quality.is_valid);
        assert_eq!(
            quality.missing_fields,
            vec![p::PICKUP_DOC_NUMBER, p::PICKUP_STATUS]
        );
        assert!((quality.average_confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_assess_valid_delivery_mapping() {
        let mapper = ColumnMapper::new(FileType::DeliveryReport);
        let mapping = mapper.map_headers(&[
            "Дата",
            "ПІБ кур'єра",
            "Завантажено посилок",
            "Доставлено посилок",
        ]);
        assert!(mapper.assess(&mapping).is_valid);
    }
}
