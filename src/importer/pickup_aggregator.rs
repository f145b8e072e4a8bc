// ==========================================
// 快递报表导入系统 - 揽收日汇总器
// ==========================================
// 职责: 揽收明细按 (快递员, 日期) 分组汇总
// 日期: 执行日期优先，其次运单创建日期；均缺失归入 "Unknown"
// 输出: 按 (日期, 快递员) 排序，未知日期排最后
// ==========================================

use crate::domain::pickup::{AggregatedPickupRecord, CanonicalPickupRecord, UNKNOWN_GROUP};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// 默认成功状态词表（小写，子串匹配）
pub const DEFAULT_SUCCESS_STATUSES: [&str; 5] = ["done", "закрито", "виконано", "closed", "completed"];

pub fn default_success_statuses() -> Vec<String> {
    DEFAULT_SUCCESS_STATUSES.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone)]
pub struct PickupAggregator {
    success_statuses: Vec<String>,
    retain_raw_records: bool,
}

impl Default for PickupAggregator {
    fn default() -> Self {
        Self::new(default_success_statuses(), true)
    }
}

impl PickupAggregator {
    pub fn new(success_statuses: Vec<String>, retain_raw_records: bool) -> Self {
        Self {
            success_statuses: success_statuses
                .into_iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            retain_raw_records,
        }
    }

    /// 状态是否计为成功
    pub fn is_success(&self, status: Option<&str>) -> bool {
        let Some(status) = status else {
            return false;
        };
        let status = status.to_lowercase();
        self.success_statuses.iter().any(|s| status.contains(s.as_str()))
    }

    /// 分组汇总
    pub fn aggregate(&self, records: &[CanonicalPickupRecord]) -> Vec<AggregatedPickupRecord> {
        // (日期是否未知, 日期, 快递员) 作为有序键，保证输出确定
        let mut groups: BTreeMap<(bool, Option<NaiveDate>, String), AggregatedPickupRecord> =
            BTreeMap::new();

        for record in records {
            let courier = record
                .courier_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_GROUP.to_string());
            let date = record.effective_date();

            let group = groups
                .entry((date.is_none(), date, courier.clone()))
                .or_insert_with(|| empty_group(courier, date));

            group.total_pickups += 1;
            group.total_weight += record.actual_weight;
            group.total_pieces += record.places_count;
            group.total_cost += record.delivery_cost.unwrap_or(0.0);
            if self.is_success(record.pickup_status.as_deref()) {
                group.success_count += 1;
            }
            if self.retain_raw_records {
                group.raw_records.push(record.clone());
            }
        }

        let aggregated: Vec<AggregatedPickupRecord> = groups
            .into_values()
            .map(|mut group| {
                finalize(&mut group);
                group
            })
            .collect();

        debug!(
            raw = records.len(),
            groups = aggregated.len(),
            "揽收明细汇总完成"
        );

        aggregated
    }
}

fn empty_group(courier_name: String, date: Option<NaiveDate>) -> AggregatedPickupRecord {
    AggregatedPickupRecord {
        courier_name,
        date,
        total_pickups: 0,
        total_weight: 0.0,
        total_pieces: 0,
        success_count: 0,
        success_rate: 0.0,
        total_cost: 0.0,
        avg_cost_per_pickup: 0.0,
        avg_weight_per_pickup: 0.0,
        raw_records: Vec::new(),
    }
}

fn finalize(group: &mut AggregatedPickupRecord) {
    if group.total_pickups == 0 {
        return;
    }
    let n = group.total_pickups as f64;
    group.success_rate = group.success_count as f64 / n * 100.0;
    group.avg_cost_per_pickup = group.total_cost / n;
    group.avg_weight_per_pickup = group.total_weight / n;
}
