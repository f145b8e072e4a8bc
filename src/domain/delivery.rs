// ==========================================
// 快递报表导入系统 - 配送报表领域模型
// ==========================================
// 用途: 导入层写入，存储/展示层只读
// 对齐: courier_performance 表
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// CanonicalDeliveryRecord - 配送日报（标准记录）
// ==========================================
// 红线: delivered_parcels > loaded_parcels 只告警，不拒收
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDeliveryRecord {
    // ===== 主键维度 =====
    pub report_date: NaiveDate, // 报表日期
    pub courier_name: String,   // 快递员姓名

    // ===== 描述信息 =====
    pub car_number: Option<String>, // 车牌号
    pub department: Option<String>, // 所属网点

    // ===== 计数（缺失按 0 处理）=====
    pub reports_count: i64,           // 派送单数
    pub addresses_count: i64,         // 地址数
    pub loaded_parcels: i64,          // 装车件数
    pub delivered_parcels: i64,       // 妥投件数
    pub delivered_in_hand: i64,       // 当面签收
    pub delivered_safe_place: i64,    // 安全点投放
    pub undelivered_parcels: i64,     // 未妥投件数
    pub undelivered_with_reason: i64, // 未妥投（有原因）
    pub undelivered_no_reason: i64,   // 未妥投（无原因）

    // ===== 比率 =====
    pub delivery_success_rate: f64, // 妥投率（0-100）

    // ===== 元信息 =====
    #[serde(default)]
    pub row_number: usize, // 原始文件行号
}

impl CanonicalDeliveryRecord {
    /// 重复检测键: date|courier_name|department
    pub fn duplicate_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.report_date.format("%Y-%m-%d"),
            self.courier_name,
            self.department.as_deref().unwrap_or("")
        )
    }

    pub fn delivered_exceeds_loaded(&self) -> bool {
        self.delivered_parcels > self.loaded_parcels
    }
}

// ==========================================
// DeliveryRowDraft - 配送行中间结构体
// ==========================================
// 用途: 字段映射 → 校验 → 标准记录
// 主键维度允许为空，由校验器决定是否丢弃
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryRowDraft {
    pub report_date: Option<NaiveDate>,
    pub courier_name: Option<String>,
    pub car_number: Option<String>,
    pub department: Option<String>,
    pub reports_count: i64,
    pub addresses_count: i64,
    pub loaded_parcels: i64,
    pub delivered_parcels: i64,
    pub delivered_in_hand: i64,
    pub delivered_safe_place: i64,
    pub undelivered_parcels: i64,
    pub undelivered_with_reason: i64,
    pub undelivered_no_reason: i64,
    pub delivery_success_rate: Option<f64>,
    pub row_number: usize,
}

impl DeliveryRowDraft {
    /// 转为标准记录；快递员或日期缺失时返回 None
    pub fn into_record(self) -> Option<CanonicalDeliveryRecord> {
        let report_date = self.report_date?;
        let courier_name = self.courier_name?;

        let delivery_success_rate = match self.delivery_success_rate {
            Some(rate) => rate.clamp(0.0, 100.0),
            None if self.loaded_parcels > 0 => {
                (self.delivered_parcels as f64 / self.loaded_parcels as f64 * 100.0)
                    .clamp(0.0, 100.0)
            }
            None => 0.0,
        };

        Some(CanonicalDeliveryRecord {
            report_date,
            courier_name,
            car_number: self.car_number,
            department: self.department,
            reports_count: self.reports_count,
            addresses_count: self.addresses_count,
            loaded_parcels: self.loaded_parcels,
            delivered_parcels: self.delivered_parcels,
            delivered_in_hand: self.delivered_in_hand,
            delivered_safe_place: self.delivered_safe_place,
            undelivered_parcels: self.undelivered_parcels,
            undelivered_with_reason: self.undelivered_with_reason,
            undelivered_no_reason: self.undelivered_no_reason,
            delivery_success_rate,
            row_number: self.row_number,
        })
    }
}
