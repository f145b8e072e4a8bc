// ==========================================
// 快递报表导入系统 - 行标准化器
// ==========================================
// 职责: MappedRow（标准字段 → 单元格）→ 配送草稿 / 揽收记录
// 说明: 只做类型转换，不做校验；数值缺失按 0（件数按 1）
// ==========================================

use crate::domain::cell::CellValue;
use crate::domain::delivery::DeliveryRowDraft;
use crate::domain::pickup::{CanonicalPickupRecord, DEFAULT_CURRENCY};
use crate::importer::column_dictionary::{delivery_fields as d, pickup_fields as p, MappedRow};
use crate::importer::field_parser::{
    parse_currency_with_default, parse_date, parse_float, parse_int, parse_optional_float,
    parse_percentage,
};

#[derive(Debug, Clone)]
pub struct RowNormalizer {
    default_currency: String,
}

impl Default for RowNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY)
    }
}

impl RowNormalizer {
    pub fn new(default_currency: impl Into<String>) -> Self {
        Self {
            default_currency: default_currency.into(),
        }
    }

    /// 配送报表行 → 草稿
    pub fn delivery(&self, row: &MappedRow, row_number: usize) -> DeliveryRowDraft {
        let rate_cell = row.get(d::DELIVERY_SUCCESS_RATE);

        DeliveryRowDraft {
            report_date: parse_date(row.get(d::REPORT_DATE)),
            courier_name: row.text(d::COURIER_NAME),
            car_number: row.text(d::CAR_NUMBER),
            department: row.text(d::DEPARTMENT),
            reports_count: parse_int(row.get(d::REPORTS_COUNT)),
            addresses_count: parse_int(row.get(d::ADDRESSES_COUNT)),
            loaded_parcels: parse_int(row.get(d::LOADED_PARCELS)),
            delivered_parcels: parse_int(row.get(d::DELIVERED_PARCELS)),
            delivered_in_hand: parse_int(row.get(d::DELIVERED_IN_HAND)),
            delivered_safe_place: parse_int(row.get(d::DELIVERED_SAFE_PLACE)),
            undelivered_parcels: parse_int(row.get(d::UNDELIVERED_PARCELS)),
            undelivered_with_reason: parse_int(row.get(d::UNDELIVERED_WITH_REASON)),
            undelivered_no_reason: parse_int(row.get(d::UNDELIVERED_NO_REASON)),
            delivery_success_rate: (!rate_cell.is_blank()).then(|| parse_percentage(rate_cell)),
            row_number,
        }
    }

    /// 揽收明细行 → 标准记录
    pub fn pickup(&self, row: &MappedRow, row_number: usize) -> CanonicalPickupRecord {
        let cost = parse_currency_with_default(row.get(p::DELIVERY_COST), &self.default_currency);

        CanonicalPickupRecord {
            pickup_doc_number: row.text(p::PICKUP_DOC_NUMBER),
            shipments_in_doc: count_or_one(row.get(p::SHIPMENTS_IN_DOC)),
            execution_date: parse_date(row.get(p::EXECUTION_DATE)),
            time_interval: row.text(p::TIME_INTERVAL),
            creation_source: row.text(p::CREATION_SOURCE),
            first_warehouse: row.text(p::FIRST_WAREHOUSE),
            shipment_number: row.text(p::SHIPMENT_NUMBER),
            places_count: count_or_one(row.get(p::PLACES_COUNT)),
            shipment_created_date: parse_date(row.get(p::SHIPMENT_CREATED_DATE)),
            shipment_department: row.text(p::SHIPMENT_DEPARTMENT),
            first_scan_date: parse_date(row.get(p::FIRST_SCAN_DATE)),
            first_scan_warehouse: row.text(p::FIRST_SCAN_WAREHOUSE),
            planned_delivery_date: parse_date(row.get(p::PLANNED_DELIVERY_DATE)),
            sender_country: row.text(p::SENDER_COUNTRY),
            sender_type: row.text(p::SENDER_TYPE),
            sender_company: row.text(p::SENDER_COMPANY),
            sender_city: row.text(p::SENDER_CITY),
            sender_address: row.text(p::SENDER_ADDRESS),
            shipment_type: row.text(p::SHIPMENT_TYPE),
            shipment_description: row.text(p::SHIPMENT_DESCRIPTION),
            declared_value: parse_optional_float(row.get(p::DECLARED_VALUE)),
            actual_weight: parse_float(row.get(p::ACTUAL_WEIGHT)),
            volumetric_weight: parse_optional_float(row.get(p::VOLUMETRIC_WEIGHT)),
            dimensions: row.text(p::DIMENSIONS),
            recipient_country: row.text(p::RECIPIENT_COUNTRY),
            recipient_type: row.text(p::RECIPIENT_TYPE),
            pickup_status: row.text(p::PICKUP_STATUS),
            pickup_status_date: parse_date(row.get(p::PICKUP_STATUS_DATE)),
            courier_name: row.text(p::COURIER_NAME),
            partner_pickup_number: row.text(p::PARTNER_PICKUP_NUMBER),
            partner_shipment_number: row.text(p::PARTNER_SHIPMENT_NUMBER),
            delivery_cost: cost.amount,
            delivery_currency: cost.currency,
            payer: row.text(p::PAYER),
            payment_doc_number: row.text(p::PAYMENT_DOC_NUMBER),
            payment_doc_status: row.text(p::PAYMENT_DOC_STATUS),
            payment_doc_status_date: parse_date(row.get(p::PAYMENT_DOC_STATUS_DATE)),
            shipment_payment_status: row.text(p::SHIPMENT_PAYMENT_STATUS),
            shipment_payment_date: parse_date(row.get(p::SHIPMENT_PAYMENT_DATE)),
            shipment_status: row.text(p::SHIPMENT_STATUS),
            shipment_status_date: parse_date(row.get(p::SHIPMENT_STATUS_DATE)),
            verification_result: row.text(p::VERIFICATION_RESULT),
            acceptance_date: parse_date(row.get(p::ACCEPTANCE_DATE)),
            last_scan_date: parse_date(row.get(p::LAST_SCAN_DATE)),
            last_scan_department: row.text(p::LAST_SCAN_DEPARTMENT),
            last_scan_report: row.text(p::LAST_SCAN_REPORT),
            execution_speed: row.text(p::EXECUTION_SPEED),
            non_execution_reason: row.text(p::NON_EXECUTION_REASON),
            row_number,
        }
    }
}

/// 件数类字段：空单元格按 1，显式值原样保留（负数按 0）
fn count_or_one(value: &CellValue) -> i64 {
    if value.is_blank() {
        return 1;
    }
    parse_int(value).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cell::RawRow;
    use chrono::NaiveDate;

    fn mapped(pairs: &[(&'static str, CellValue)]) -> MappedRow {
        let mut row = RawRow::new();
        let mut resolution = Vec::new();
        for (field, value) in pairs {
            row.insert(field.to_string(), value.clone());
            resolution.push((field.to_string(), *field));
        }
        MappedRow::from_raw(&row, &resolution)
    }

    #[test]
    fn test_delivery_row_conversion() {
        let row = mapped(&[
            (d::REPORT_DATE, CellValue::text("15.01.2025")),
            (d::COURIER_NAME, CellValue::text(" Іванов Петро ")),
            (d::LOADED_PARCELS, CellValue::Number(100.0)),
            (d::DELIVERED_PARCELS, CellValue::text("95 шт")),
            (d::DELIVERY_SUCCESS_RATE, CellValue::text("95%")),
        ]);
        let draft = RowNormalizer::default().delivery(&row, 2);

        assert_eq!(draft.report_date, NaiveDate::from_ymd_opt(2025, 1, 15));
        assert_eq!(draft.courier_name.as_deref(), Some("Іванов Петро"));
        assert_eq!(draft.loaded_parcels, 100);
        assert_eq!(draft.delivered_parcels, 95);
        assert_eq!(draft.delivery_success_rate, Some(95.0));
        assert_eq!(draft.reports_count, 0);
        assert_eq!(draft.row_number, 2);
    }

    #[test]
    fn test_delivery_blank_rate_is_none() {
        let row = mapped(&[(d::DELIVERY_SUCCESS_RATE, CellValue::Empty)]);
        assert_eq!(RowNormalizer::default().delivery(&row, 3).delivery_success_rate, None);
    }

    #[test]
    fn test_pickup_row_conversion() {
        let row = mapped(&[
            (p::SHIPMENT_NUMBER, CellValue::Number(20450012345.0)),
            (p::EXECUTION_DATE, CellValue::Number(45672.0)),
            (p::ACTUAL_WEIGHT, CellValue::text("2,5")),
            (p::DELIVERY_COST, CellValue::text("150,50 EUR")),
            (p::PICKUP_STATUS, CellValue::text("Done")),
        ]);
        let record = RowNormalizer::default().pickup(&row, 4);

        assert_eq!(record.shipment_number.as_deref(), Some("20450012345"));
        assert_eq!(record.execution_date, NaiveDate::from_ymd_opt(2025, 1, 15));
        assert!((record.actual_weight - 2.5).abs() < 1e-9);
        assert_eq!(record.delivery_cost, Some(150.5));
        assert_eq!(record.delivery_currency, "EUR");
        assert_eq!(record.places_count, 1);
        assert_eq!(record.shipments_in_doc, 1);
        assert_eq!(record.row_number, 4);
    }

    #[test]
    fn test_pickup_default_currency_is_configurable() {
        let row = mapped(&[(p::DELIVERY_COST, CellValue::Number(80.0))]);
        let record = RowNormalizer::new("PLN").pickup(&row, 2);
        assert_eq!(record.delivery_currency, "PLN");
        assert_eq!(record.delivery_cost, Some(80.0));
    }

    #[test]
    fn test_places_count_blank_defaults_to_one() {
        assert_eq!(count_or_one(&CellValue::Empty), 1);
        assert_eq!(count_or_one(&CellValue::text("  ")), 1);
        assert_eq!(count_or_one(&CellValue::Number(3.0)), 3);
        assert_eq!(count_or_one(&CellValue::Number(0.0)), 0);
        assert_eq!(count_or_one(&CellValue::text("0")), 0);
        assert_eq!(count_or_one(&CellValue::Number(-2.0)), 0);
    }

    #[test]
    fn test_explicit_zero_places_kept() {
        let row = mapped(&[
            (p::SHIPMENT_NUMBER, CellValue::text("SH-9")),
            (p::PLACES_COUNT, CellValue::Number(0.0)),
        ]);
        let record = RowNormalizer::default().pickup(&row, 2);
        assert_eq!(record.places_count, 0);
        assert_eq!(record.shipments_in_doc, 1);
    }
}
