// ==========================================
// 快递报表导入系统 - 字段解析器
// ==========================================
// 职责: 日期 / 整数 / 浮点 / 金额 / 百分比的本地化解析
// 红线: 任何解析失败都降级为默认值（0 / None / "UAH"），不返回错误
// ==========================================

use crate::domain::cell::CellValue;
use crate::domain::pickup::DEFAULT_CURRENCY;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Excel 序列日与 Unix 纪元的偏移（1899-12-30 起算）
const EXCEL_UNIX_EPOCH_OFFSET: f64 = 25569.0;

/// Excel 可表示的最大序列日（9999-12-31）
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

// ==========================================
// 日期格式（按顺序尝试，首个匹配生效）
// ==========================================
// 各格式的数字分组宽度互斥，顺序只影响性能
#[derive(Debug, Clone, Copy)]
enum DateLayout {
    DayFirst, // 日-月-年
    YearFirst, // 年-月-日
}

fn date_patterns() -> &'static [(Regex, DateLayout)] {
    static PATTERNS: OnceLock<Vec<(Regex, DateLayout)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"^(\d{1,2})-(\d{1,2})-(\d{4})\b", DateLayout::DayFirst), // DD-MM-YYYY
            (r"^(\d{1,2})\.(\d{1,2})\.(\d{4})\b", DateLayout::DayFirst), // DD.MM.YYYY
            (r"^(\d{4})-(\d{1,2})-(\d{1,2})\b", DateLayout::YearFirst), // YYYY-MM-DD
            (r"^(\d{1,2})/(\d{1,2})/(\d{4})\b", DateLayout::DayFirst), // DD/MM/YYYY
        ]
        .into_iter()
        .filter_map(|(pattern, layout)| Regex::new(pattern).ok().map(|re| (re, layout)))
        .collect()
    })
}

fn currency_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^([\d.,]+)\s*([A-Z]{3})?$").ok())
        .as_ref()
}

// ==========================================
// 日期
// ==========================================

/// 解析日期
///
/// # 支持
/// - 数值: Excel 序列日（小数部分即时间，直接截断）
/// - 原生日期 / 日期时间: 取日期部分
/// - 文本: DD-MM-YYYY → DD.MM.YYYY → YYYY-MM-DD → DD/MM/YYYY → 通用格式
///
/// # 返回
/// - None: 所有策略均失败
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(serial) => excel_serial_to_date(*serial),
        CellValue::Date(date) => Some(*date),
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Text(text) => parse_date_str(text),
    }
}

/// 解析日期字符串
pub fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    for (re, layout) in date_patterns() {
        if let Some(caps) = re.captures(text) {
            let a: u32 = caps[1].parse().ok()?;
            let b: u32 = caps[2].parse().ok()?;
            let c: u32 = caps[3].parse().ok()?;
            return match layout {
                DateLayout::DayFirst => NaiveDate::from_ymd_opt(c as i32, b, a),
                DateLayout::YearFirst => NaiveDate::from_ymd_opt(a as i32, b, c),
            };
        }
    }

    parse_date_fallback(text)
}

/// 通用兜底解析（ISO 日期时间 / 斜杠年份 / 文本形式的序列日）
fn parse_date_fallback(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }

    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }

    const DATE_FORMATS: [&str; 3] = ["%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"];
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }

    text.parse::<f64>().ok().and_then(excel_serial_to_date)
}

/// Excel 序列日 → 日历日期
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > EXCEL_MAX_SERIAL {
        return None;
    }

    let days = (serial - EXCEL_UNIX_EPOCH_OFFSET).floor() as i64;
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(Duration::days(days))
}

/// 标准 ISO 日期格式（YYYY-MM-DD）
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ==========================================
// 数值
// ==========================================

/// 解析整数
///
/// 文本去掉所有非数字字符后转换（"12 шт" → 12）；空值/无法解析 → 0
pub fn parse_int(value: &CellValue) -> i64 {
    match value {
        CellValue::Number(n) if n.is_finite() => n.trunc() as i64,
        CellValue::Text(text) => parse_int_str(text),
        _ => 0,
    }
}

pub fn parse_int_str(raw: &str) -> i64 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<i64>().unwrap_or(0)
}

/// 解析浮点数
///
/// 逗号按小数点处理，去掉数字/小数点/负号以外的字符；空值/无法解析 → 0
pub fn parse_float(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) if n.is_finite() => *n,
        CellValue::Text(text) => parse_float_str(text),
        _ => 0.0,
    }
}

pub fn parse_float_str(raw: &str) -> f64 {
    let cleaned: String = raw
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    leading_float(&cleaned).unwrap_or(0.0)
}

/// 可选浮点：空值 → None，其余同 parse_float
pub fn parse_optional_float(value: &CellValue) -> Option<f64> {
    if value.is_blank() {
        None
    } else {
        Some(parse_float(value))
    }
}

/// 取字符串开头的最长合法数值前缀（"1.2.3" → 1.2）
fn leading_float(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (idx, &b) in bytes.iter().enumerate() {
        match b {
            b'-' | b'+' if idx == 0 => {}
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = idx + 1;
    }

    if !seen_digit {
        return None;
    }

    let mut candidate = &text[..end];
    while candidate.ends_with('.') {
        candidate = &candidate[..candidate.len() - 1];
    }
    candidate.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ==========================================
// 金额
// ==========================================

/// 金额 + 币种
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyAmount {
    pub amount: Option<f64>,
    pub currency: String,
}

/// 解析金额（默认币种 UAH）
pub fn parse_currency(value: &CellValue) -> CurrencyAmount {
    parse_currency_with_default(value, DEFAULT_CURRENCY)
}

/// 解析金额
///
/// # 规则
/// - `^([\d.,]+)\s*([A-Z]{3})?$`：逗号按小数点处理，缺失币种用默认值
/// - 其余文本直接按数值转换，失败时 amount = None
pub fn parse_currency_with_default(value: &CellValue, default_currency: &str) -> CurrencyAmount {
    let default = || default_currency.to_string();

    match value {
        CellValue::Number(n) if n.is_finite() => CurrencyAmount {
            amount: Some(*n),
            currency: default(),
        },
        CellValue::Text(text) => {
            let trimmed = text.trim();
            if let Some(caps) = currency_pattern().and_then(|re| re.captures(trimmed)) {
                let amount = leading_float(&caps[1].replace(',', "."));
                let currency = caps
                    .get(2)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(default);
                return CurrencyAmount { amount, currency };
            }

            CurrencyAmount {
                amount: trimmed
                    .replace(',', ".")
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite()),
                currency: default(),
            }
        }
        _ => CurrencyAmount {
            amount: None,
            currency: default(),
        },
    }
}

// ==========================================
// 百分比
// ==========================================

/// 解析百分比
///
/// 去掉 `%`、逗号转小数点；(0, 1) 区间视为小数比例并乘以 100
/// （源文件同时存在 "95%" 和 "0.95" 两种写法）
pub fn parse_percentage(value: &CellValue) -> f64 {
    let number = match value {
        CellValue::Number(n) if n.is_finite() => *n,
        CellValue::Text(text) => {
            let cleaned = text.replace('%', "").replace(',', ".");
            leading_float(cleaned.trim()).unwrap_or(0.0)
        }
        _ => 0.0,
    };

    if number > 0.0 && number < 1.0 {
        number * 100.0
    } else {
        number
    }
}
