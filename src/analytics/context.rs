// ==========================================
// 快递报表导入系统 - 看板上下文
// ==========================================
// 职责: 看板状态（数据类型、筛选、分页）显式传入统计函数
// 红线: 不使用全局状态
// ==========================================

use crate::domain::delivery::CanonicalDeliveryRecord;
use crate::domain::pickup::{AggregatedPickupRecord, CanonicalPickupRecord};
use crate::domain::types::FileType;
use crate::repository::DateRange;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 500;

// ==========================================
// DashboardFilter - 筛选条件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub courier: Option<String>,    // 快递员（忽略大小写的精确匹配）
    pub department: Option<String>, // 网点（仅配送报表）
}

impl DashboardFilter {
    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.date_from, self.date_to)
    }

    fn matches_date(&self, date: Option<NaiveDate>) -> bool {
        if self.date_from.is_none() && self.date_to.is_none() {
            return true;
        }
        date.map_or(false, |d| self.date_range().contains(d))
    }

    fn matches_courier(&self, courier: Option<&str>) -> bool {
        matches_text(self.courier.as_deref(), courier)
    }

    pub fn matches_delivery(&self, record: &CanonicalDeliveryRecord) -> bool {
        self.matches_date(Some(record.report_date))
            && self.matches_courier(Some(&record.courier_name))
            && matches_text(self.department.as_deref(), record.department.as_deref())
    }

    pub fn matches_pickup(&self, record: &CanonicalPickupRecord) -> bool {
        self.matches_date(record.effective_date())
            && self.matches_courier(record.courier_name.as_deref())
    }

    pub fn matches_summary(&self, record: &AggregatedPickupRecord) -> bool {
        self.matches_date(record.date) && self.matches_courier(Some(&record.courier_name))
    }
}

fn matches_text(expected: Option<&str>, actual: Option<&str>) -> bool {
    let Some(expected) = expected.map(str::trim).filter(|s| !s.is_empty()) else {
        return true;
    };
    actual.map_or(false, |a| a.trim().to_lowercase() == expected.to_lowercase())
}

// ==========================================
// DashboardContext - 看板上下文
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardContext {
    pub data_type: FileType,
    pub filter: DashboardFilter,
    pub page: usize, // 从 1 开始
    pub page_size: usize,
}

impl Default for DashboardContext {
    fn default() -> Self {
        Self {
            data_type: FileType::DeliveryReport,
            filter: DashboardFilter::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl DashboardContext {
    pub fn new(data_type: FileType) -> Self {
        Self {
            data_type,
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: DashboardFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    /// 切换数据类型时回到第一页
    pub fn switch_data_type(&mut self, data_type: FileType) {
        if self.data_type != data_type {
            self.data_type = data_type;
            self.page = 1;
        }
    }

    pub fn paginate<T: Clone>(&self, items: &[T]) -> Page<T> {
        Page::slice(items, self.page, self.page_size)
    }
}

// ==========================================
// Page - 分页结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl<T: Clone> Page<T> {
    /// 页码越界时钳制到有效范围；page_size 为 0 时取默认值
    pub fn slice(items: &[T], page: usize, page_size: usize) -> Self {
        let page_size = match page_size {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };
        let total = items.len();
        let total_pages = total.div_ceil(page_size).max(1);
        let page = page.clamp(1, total_pages);
        let start = (page - 1) * page_size;
        let end = (start + page_size).min(total);

        Self {
            items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

/// 保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 百分比（分母为 0 时为 0）
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
