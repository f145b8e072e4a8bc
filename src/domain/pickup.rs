// ==========================================
// 快递报表导入系统 - 揽收领域模型
// ==========================================
// 用途: 揽收明细（逐票）→ 快递员日汇总
// 对齐: pickup_orders / pickup_daily_summary 表
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "UAH";
pub const UNKNOWN_GROUP: &str = "Unknown";

// ==========================================
// CanonicalPickupRecord - 揽收明细（逐票）
// ==========================================
// 红线: pickup_doc_number / shipment_number 至少一个非空
// 描述性字段原样透传，供明细下钻
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPickupRecord {
    // ===== 揽收单信息 =====
    pub pickup_doc_number: Option<String>,
    pub shipments_in_doc: i64,
    pub execution_date: Option<NaiveDate>,
    pub time_interval: Option<String>,
    pub creation_source: Option<String>,
    pub first_warehouse: Option<String>,

    // ===== 运单信息 =====
    pub shipment_number: Option<String>,
    pub places_count: i64,
    pub shipment_created_date: Option<NaiveDate>,
    pub shipment_department: Option<String>,
    pub first_scan_date: Option<NaiveDate>,
    pub first_scan_warehouse: Option<String>,
    pub planned_delivery_date: Option<NaiveDate>,

    // ===== 寄件方 =====
    pub sender_country: Option<String>,
    pub sender_type: Option<String>,
    pub sender_company: Option<String>,
    pub sender_city: Option<String>,
    pub sender_address: Option<String>,

    // ===== 货物明细 =====
    pub shipment_type: Option<String>,
    pub shipment_description: Option<String>,
    pub declared_value: Option<f64>,
    pub actual_weight: f64, // 实重（kg，缺失按 0）
    pub volumetric_weight: Option<f64>,
    pub dimensions: Option<String>,

    // ===== 收件方 =====
    pub recipient_country: Option<String>,
    pub recipient_type: Option<String>,

    // ===== 揽收状态 =====
    pub pickup_status: Option<String>,
    pub pickup_status_date: Option<NaiveDate>,
    pub courier_name: Option<String>,

    // ===== 合作方 =====
    pub partner_pickup_number: Option<String>,
    pub partner_shipment_number: Option<String>,

    // ===== 费用与支付 =====
    pub delivery_cost: Option<f64>,
    pub delivery_currency: String,
    pub payer: Option<String>,
    pub payment_doc_number: Option<String>,
    pub payment_doc_status: Option<String>,
    pub payment_doc_status_date: Option<NaiveDate>,
    pub shipment_payment_status: Option<String>,
    pub shipment_payment_date: Option<NaiveDate>,

    // ===== 最终状态 =====
    pub shipment_status: Option<String>,
    pub shipment_status_date: Option<NaiveDate>,
    pub verification_result: Option<String>,
    pub acceptance_date: Option<NaiveDate>,
    pub last_scan_date: Option<NaiveDate>,
    pub last_scan_department: Option<String>,
    pub last_scan_report: Option<String>,

    // ===== 时效 =====
    pub execution_speed: Option<String>,
    pub non_execution_reason: Option<String>,

    // ===== 元信息 =====
    #[serde(default)]
    pub row_number: usize,
}

impl Default for CanonicalPickupRecord {
    fn default() -> Self {
        Self {
            pickup_doc_number: None,
            shipments_in_doc: 1,
            execution_date: None,
            time_interval: None,
            creation_source: None,
            first_warehouse: None,
            shipment_number: None,
            places_count: 1,
            shipment_created_date: None,
            shipment_department: None,
            first_scan_date: None,
            first_scan_warehouse: None,
            planned_delivery_date: None,
            sender_country: None,
            sender_type: None,
            sender_company: None,
            sender_city: None,
            sender_address: None,
            shipment_type: None,
            shipment_description: None,
            declared_value: None,
            actual_weight: 0.0,
            volumetric_weight: None,
            dimensions: None,
            recipient_country: None,
            recipient_type: None,
            pickup_status: None,
            pickup_status_date: None,
            courier_name: None,
            partner_pickup_number: None,
            partner_shipment_number: None,
            delivery_cost: None,
            delivery_currency: DEFAULT_CURRENCY.to_string(),
            payer: None,
            payment_doc_number: None,
            payment_doc_status: None,
            payment_doc_status_date: None,
            shipment_payment_status: None,
            shipment_payment_date: None,
            shipment_status: None,
            shipment_status_date: None,
            verification_result: None,
            acceptance_date: None,
            last_scan_date: None,
            last_scan_department: None,
            last_scan_report: None,
            execution_speed: None,
            non_execution_reason: None,
            row_number: 0,
        }
    }
}

impl CanonicalPickupRecord {
    pub fn has_identifier(&self) -> bool {
        self.pickup_doc_number.is_some() || self.shipment_number.is_some()
    }

    /// 汇总日期：执行日期优先，其次运单创建日期
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.execution_date.or(self.shipment_created_date)
    }
}

// ==========================================
// AggregatedPickupRecord - 揽收日汇总
// ==========================================
// 一条记录对应一个 (courier_name, date) 组合
// 红线: success_count <= total_pickups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedPickupRecord {
    pub courier_name: String,
    pub date: Option<NaiveDate>, // None 表示日期未知（"Unknown" 分组）

    pub total_pickups: usize,
    pub total_weight: f64,
    pub total_pieces: i64,
    pub success_count: usize,
    pub success_rate: f64,
    pub total_cost: f64,
    pub avg_cost_per_pickup: f64,
    pub avg_weight_per_pickup: f64,

    #[serde(rename = "_rawRecords", default, skip_serializing_if = "Vec::is_empty")]
    pub raw_records: Vec<CanonicalPickupRecord>,
}

impl AggregatedPickupRecord {
    /// 分组键: courier|date（缺失值为 "Unknown"）
    pub fn group_key(&self) -> String {
        format!(
            "{}|{}",
            self.courier_name,
            self.date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| UNKNOWN_GROUP.to_string())
        )
    }
}
