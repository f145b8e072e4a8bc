// ==========================================
// 快递报表导入系统 - 揽收统计
// ==========================================
// 职责: 揽收明细/日汇总 → 期间汇总 / 快递员排名 / 状态分布 / 国家统计
// 成功判定与汇总器一致（可配置词表，子串匹配）
// ==========================================

use crate::analytics::context::{percentage, round2};
use crate::domain::pickup::{AggregatedPickupRecord, CanonicalPickupRecord, UNKNOWN_GROUP};
use crate::importer::pickup_aggregator::PickupAggregator;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

// ==========================================
// 期间汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PickupPeriodStats {
    pub total_pickups: usize,
    pub total_shipments: i64,
    pub total_weight: f64,
    pub total_pieces: i64,
    pub total_cost: f64,
    pub success_count: usize,
    pub success_rate: f64,
    pub active_couriers: usize,
    pub unique_countries: usize, // 寄件国 ∪ 收件国
}

pub fn period_stats(
    records: &[CanonicalPickupRecord],
    aggregator: &PickupAggregator,
) -> PickupPeriodStats {
    let success_count = records
        .iter()
        .filter(|r| aggregator.is_success(r.pickup_status.as_deref()))
        .count();
    let couriers: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.courier_name.as_deref())
        .collect();
    let countries: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| [r.sender_country.as_deref(), r.recipient_country.as_deref()])
        .flatten()
        .collect();

    PickupPeriodStats {
        total_pickups: records.len(),
        total_shipments: records.iter().map(|r| r.shipments_in_doc).sum(),
        total_weight: round2(records.iter().map(|r| r.actual_weight).sum()),
        total_pieces: records.iter().map(|r| r.places_count).sum(),
        total_cost: round2(records.iter().filter_map(|r| r.delivery_cost).sum()),
        success_count,
        success_rate: round2(percentage(success_count as f64, records.len() as f64)),
        active_couriers: couriers.len(),
        unique_countries: countries.len(),
    }
}

// ==========================================
// 快递员排名（基于日汇总）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourierPickupStats {
    pub courier_name: String,
    pub working_days: usize,
    pub total_pickups: usize,
    pub success_count: usize,
    pub success_rate: f64,
    pub total_weight: f64,
    pub total_cost: f64,
}

/// 成功率降序，其次揽收数降序
pub fn courier_ranking(summaries: &[AggregatedPickupRecord], limit: usize) -> Vec<CourierPickupStats> {
    let mut by_courier: HashMap<&str, CourierPickupStats> = HashMap::new();
    for s in summaries {
        let entry = by_courier
            .entry(s.courier_name.as_str())
            .or_insert_with(|| CourierPickupStats {
                courier_name: s.courier_name.clone(),
                working_days: 0,
                total_pickups: 0,
                success_count: 0,
                success_rate: 0.0,
                total_weight: 0.0,
                total_cost: 0.0,
            });
        if s.date.is_some() {
            entry.working_days += 1;
        }
        entry.total_pickups += s.total_pickups;
        entry.success_count += s.success_count;
        entry.total_weight += s.total_weight;
        entry.total_cost += s.total_cost;
    }

    let mut ranking: Vec<CourierPickupStats> = by_courier
        .into_values()
        .map(|mut c| {
            c.success_rate = round2(percentage(c.success_count as f64, c.total_pickups as f64));
            c.total_weight = round2(c.total_weight);
            c.total_cost = round2(c.total_cost);
            c
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.success_rate
            .total_cmp(&a.success_rate)
            .then(b.total_pickups.cmp(&a.total_pickups))
            .then_with(|| a.courier_name.cmp(&b.courier_name))
    });
    ranking.truncate(limit);
    ranking
}

// ==========================================
// 状态分布
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusField {
    Pickup,   // 揽收状态
    Shipment, // 运单最终状态
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusShare {
    pub status: String,
    pub count: usize,
    pub percentage: f64,
}

/// 按数量降序；状态缺失归入 "Unknown"
pub fn status_distribution(records: &[CanonicalPickupRecord], field: StatusField) -> Vec<StatusShare> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in records {
        let status = match field {
            StatusField::Pickup => r.pickup_status.as_deref(),
            StatusField::Shipment => r.shipment_status.as_deref(),
        };
        *counts.entry(status.unwrap_or(UNKNOWN_GROUP)).or_default() += 1;
    }

    let total = records.len() as f64;
    let mut shares: Vec<StatusShare> = counts
        .into_iter()
        .map(|(status, count)| StatusShare {
            status: status.to_string(),
            count,
            percentage: round2(percentage(count as f64, total)),
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

// ==========================================
// 国家统计
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountryDirection {
    Sender,
    Recipient,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryStats {
    pub country: String,
    pub orders_count: usize,
    pub shipments_count: i64,
    pub total_weight: f64,
    pub total_revenue: f64,
}

/// 按订单数降序
pub fn country_stats(records: &[CanonicalPickupRecord], direction: CountryDirection) -> Vec<CountryStats> {
    let mut by_country: BTreeMap<&str, CountryStats> = BTreeMap::new();
    for r in records {
        let country = match direction {
            CountryDirection::Sender => r.sender_country.as_deref(),
            CountryDirection::Recipient => r.recipient_country.as_deref(),
        }
        .unwrap_or(UNKNOWN_GROUP);

        let entry = by_country.entry(country).or_insert_with(|| CountryStats {
            country: country.to_string(),
            orders_count: 0,
            shipments_count: 0,
            total_weight: 0.0,
            total_revenue: 0.0,
        });
        entry.orders_count += 1;
        entry.shipments_count += r.shipments_in_doc;
        entry.total_weight += r.actual_weight;
        entry.total_revenue += r.delivery_cost.unwrap_or(0.0);
    }

    let mut stats: Vec<CountryStats> = by_country
        .into_values()
        .map(|mut c| {
            c.total_weight = round2(c.total_weight);
            c.total_revenue = round2(c.total_revenue);
            c
        })
        .collect();
    stats.sort_by(|a, b| b.orders_count.cmp(&a.orders_count));
    stats
}
