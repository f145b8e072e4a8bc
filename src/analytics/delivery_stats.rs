// ==========================================
// 快递报表导入系统 - 配送统计
// ==========================================
// 职责: 配送日报 → 期间汇总 / 日趋势 / 快递员排名 / 网点统计 / 提示
// 输入: 已按 DashboardContext 筛选的记录
// ==========================================

use crate::analytics::context::{percentage, round2};
use crate::domain::delivery::CanonicalDeliveryRecord;
use crate::domain::pickup::UNKNOWN_GROUP;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// 整体妥投率目标（%）
pub const SUCCESS_RATE_TARGET: f64 = 95.0;
/// 网点妥投率关注线（%）
pub const DEPARTMENT_ATTENTION_RATE: f64 = 90.0;

// ==========================================
// 期间汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPeriodStats {
    pub total_loaded: i64,
    pub total_delivered: i64,
    pub undelivered: i64,
    pub success_rate: f64,
    pub active_couriers: usize,
    pub delivery_days: usize,
}

pub fn period_stats(records: &[CanonicalDeliveryRecord]) -> DeliveryPeriodStats {
    let total_loaded: i64 = records.iter().map(|r| r.loaded_parcels).sum();
    let total_delivered: i64 = records.iter().map(|r| r.delivered_parcels).sum();
    let couriers: BTreeSet<&str> = records.iter().map(|r| r.courier_name.as_str()).collect();
    let days: BTreeSet<NaiveDate> = records.iter().map(|r| r.report_date).collect();

    DeliveryPeriodStats {
        total_loaded,
        total_delivered,
        undelivered: (total_loaded - total_delivered).max(0),
        success_rate: round2(percentage(total_delivered as f64, total_loaded as f64)),
        active_couriers: couriers.len(),
        delivery_days: days.len(),
    }
}

// ==========================================
// 日趋势
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDeliveryStats {
    pub date: NaiveDate,
    pub total_loaded: i64,
    pub total_delivered: i64,
    pub success_rate: f64,
    pub couriers: usize,
}

/// 按日期升序
pub fn daily_stats(records: &[CanonicalDeliveryRecord]) -> Vec<DailyDeliveryStats> {
    let mut by_day: BTreeMap<NaiveDate, (i64, i64, BTreeSet<&str>)> = BTreeMap::new();
    for r in records {
        let entry = by_day.entry(r.report_date).or_default();
        entry.0 += r.loaded_parcels;
        entry.1 += r.delivered_parcels;
        entry.2.insert(r.courier_name.as_str());
    }

    by_day
        .into_iter()
        .map(|(date, (loaded, delivered, couriers))| DailyDeliveryStats {
            date,
            total_loaded: loaded,
            total_delivered: delivered,
            success_rate: round2(percentage(delivered as f64, loaded as f64)),
            couriers: couriers.len(),
        })
        .collect()
}

// ==========================================
// 快递员排名
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourierDeliveryStats {
    pub courier_name: String,
    pub department: Option<String>, // 最近一次出现的网点
    pub working_days: usize,
    pub total_loaded: i64,
    pub total_delivered: i64,
    pub success_rate: f64,
}

/// 妥投率降序，其次妥投件数降序，再按姓名
pub fn courier_ranking(records: &[CanonicalDeliveryRecord], limit: usize) -> Vec<CourierDeliveryStats> {
    struct Acc<'a> {
        department: Option<&'a str>,
        department_date: Option<NaiveDate>,
        days: BTreeSet<NaiveDate>,
        loaded: i64,
        delivered: i64,
    }

    let mut by_courier: HashMap<&str, Acc> = HashMap::new();
    for r in records {
        let acc = by_courier.entry(r.courier_name.as_str()).or_insert_with(|| Acc {
            department: None,
            department_date: None,
            days: BTreeSet::new(),
            loaded: 0,
            delivered: 0,
        });
        if let Some(department) = r.department.as_deref() {
            if acc.department_date.map_or(true, |d| r.report_date >= d) {
                acc.department = Some(department);
                acc.department_date = Some(r.report_date);
            }
        }
        acc.days.insert(r.report_date);
        acc.loaded += r.loaded_parcels;
        acc.delivered += r.delivered_parcels;
    }

    let mut ranking: Vec<CourierDeliveryStats> = by_courier
        .into_iter()
        .map(|(name, acc)| CourierDeliveryStats {
            courier_name: name.to_string(),
            department: acc.department.map(str::to_string),
            working_days: acc.days.len(),
            total_loaded: acc.loaded,
            total_delivered: acc.delivered,
            success_rate: round2(percentage(acc.delivered as f64, acc.loaded as f64)),
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.success_rate
            .total_cmp(&a.success_rate)
            .then(b.total_delivered.cmp(&a.total_delivered))
            .then_with(|| a.courier_name.cmp(&b.courier_name))
    });
    ranking.truncate(limit);
    ranking
}

// ==========================================
// 网点统计
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentStats {
    pub department: String,
    pub couriers: usize,
    pub total_loaded: i64,
    pub total_delivered: i64,
    pub success_rate: f64,
}

/// 网点缺失时归入 "Unknown"；按妥投率降序
pub fn department_stats(records: &[CanonicalDeliveryRecord]) -> Vec<DepartmentStats> {
    let mut by_department: BTreeMap<&str, (BTreeSet<&str>, i64, i64)> = BTreeMap::new();
    for r in records {
        let key = r.department.as_deref().unwrap_or(UNKNOWN_GROUP);
        let entry = by_department.entry(key).or_default();
        entry.0.insert(r.courier_name.as_str());
        entry.1 += r.loaded_parcels;
        entry.2 += r.delivered_parcels;
    }

    let mut stats: Vec<DepartmentStats> = by_department
        .into_iter()
        .map(|(department, (couriers, loaded, delivered))| DepartmentStats {
            department: department.to_string(),
            couriers: couriers.len(),
            total_loaded: loaded,
            total_delivered: delivered,
            success_rate: round2(percentage(delivered as f64, loaded as f64)),
        })
        .collect();

    stats.sort_by(|a, b| b.success_rate.total_cmp(&a.success_rate));
    stats
}

// ==========================================
// 提示
// ==========================================

pub fn insights(
    period: &DeliveryPeriodStats,
    top_couriers: &[CourierDeliveryStats],
    departments: &[DepartmentStats],
) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(best) = top_couriers.first() {
        insights.push(format!(
            "Top courier: {} with {}% success rate",
            best.courier_name, best.success_rate
        ));
    }

    if let Some(worst) = departments
        .iter()
        .min_by(|a, b| a.success_rate.total_cmp(&b.success_rate))
    {
        if worst.success_rate < DEPARTMENT_ATTENTION_RATE {
            insights.push(format!(
                "Attention: {} has low success rate ({}%)",
                worst.department, worst.success_rate
            ));
        }
    }

    if period.total_loaded > 0 && period.success_rate < SUCCESS_RATE_TARGET {
        insights.push(format!(
            "Overall success rate ({}%) is below target ({}%)",
            period.success_rate, SUCCESS_RATE_TARGET
        ));
    }

    if period.undelivered > 0 {
        insights.push(format!("Undelivered packages: {}", period.undelivered));
    }

    insights
}

// ==========================================
// 期间对比
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub loaded_change: f64,       // %
    pub delivered_change: f64,    // %
    pub success_rate_change: f64, // 百分点
    pub couriers_change: f64,     // %
}

pub fn compare_periods(before: &DeliveryPeriodStats, after: &DeliveryPeriodStats) -> PeriodComparison {
    PeriodComparison {
        loaded_change: relative_change(before.total_loaded as f64, after.total_loaded as f64),
        delivered_change: relative_change(
            before.total_delivered as f64,
            after.total_delivered as f64,
        ),
        success_rate_change: round2(after.success_rate - before.success_rate),
        couriers_change: relative_change(
            before.active_couriers as f64,
            after.active_couriers as f64,
        ),
    }
}

/// 基期为 0 时: 增长记为 100%，否则为 0
fn relative_change(old: f64, new: f64) -> f64 {
    if old == 0.0 {
        return if new > 0.0 { 100.0 } else { 0.0 };
    }
    round2((new - old) / old * 100.0)
}
