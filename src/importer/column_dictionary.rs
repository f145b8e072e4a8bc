// ==========================================
// 快递报表导入系统 - 标准列字典
// ==========================================
// 职责: 乌克兰语表头 → 标准字段名（精确匹配）
// 说明: 同一字段可有多个表头别名（不同导出版本）
// ==========================================

use crate::domain::cell::{CellValue, RawRow};
use crate::domain::types::FileType;
use std::collections::HashMap;

/// 小计/合计行标记列
pub const ROW_NUMBER_HEADER: &str = "№";

/// 小计/合计行标记值（不区分大小写）
pub const TOTAL_ROW_MARKERS: [&str; 3] = ["всього", "total", "разом"];

// ==========================================
// 配送报表标准字段
// ==========================================
pub mod delivery_fields {
    pub const REPORT_DATE: &str = "report_date";
    pub const COURIER_NAME: &str = "courier_name";
    pub const CAR_NUMBER: &str = "car_number";
    pub const DEPARTMENT: &str = "department";
    pub const REPORTS_COUNT: &str = "reports_count";
    pub const ADDRESSES_COUNT: &str = "addresses_count";
    pub const LOADED_PARCELS: &str = "loaded_parcels";
    pub const DELIVERED_PARCELS: &str = "delivered_parcels";
    pub const DELIVERED_IN_HAND: &str = "delivered_in_hand";
    pub const DELIVERED_SAFE_PLACE: &str = "delivered_safe_place";
    pub const UNDELIVERED_PARCELS: &str = "undelivered_parcels";
    pub const UNDELIVERED_WITH_REASON: &str = "undelivered_with_reason";
    pub const UNDELIVERED_NO_REASON: &str = "undelivered_no_reason";
    pub const DELIVERY_SUCCESS_RATE: &str = "delivery_success_rate";
}

// ==========================================
// 揽收明细标准字段
// ==========================================
pub mod pickup_fields {
    pub const PICKUP_DOC_NUMBER: &str = "pickup_doc_number";
    pub const SHIPMENTS_IN_DOC: &str = "shipments_in_doc";
    pub const EXECUTION_DATE: &str = "execution_date";
    pub const TIME_INTERVAL: &str = "time_interval";
    pub const CREATION_SOURCE: &str = "creation_source";
    pub const FIRST_WAREHOUSE: &str = "first_warehouse";
    pub const SHIPMENT_NUMBER: &str = "shipment_number";
    pub const PLACES_COUNT: &str = "places_count";
    pub const SHIPMENT_CREATED_DATE: &str = "shipment_created_date";
    pub const SHIPMENT_DEPARTMENT: &str = "shipment_department";
    pub const FIRST_SCAN_DATE: &str = "first_scan_date";
    pub const FIRST_SCAN_WAREHOUSE: &str = "first_scan_warehouse";
    pub const PLANNED_DELIVERY_DATE: &str = "planned_delivery_date";
    pub const SENDER_COUNTRY: &str = "sender_country";
    pub const SENDER_TYPE: &str = "sender_type";
    pub const SENDER_COMPANY: &str = "sender_company";
    pub const SENDER_CITY: &str = "sender_city";
    pub const SENDER_ADDRESS: &str = "sender_address";
    pub const SHIPMENT_TYPE: &str = "shipment_type";
    pub const SHIPMENT_DESCRIPTION: &str = "shipment_description";
    pub const DECLARED_VALUE: &str = "declared_value";
    pub const ACTUAL_WEIGHT: &str = "actual_weight";
    pub const VOLUMETRIC_WEIGHT: &str = "volumetric_weight";
    pub const DIMENSIONS: &str = "dimensions";
    pub const RECIPIENT_COUNTRY: &str = "recipient_country";
    pub const RECIPIENT_TYPE: &str = "recipient_type";
    pub const PICKUP_STATUS: &str = "pickup_status";
    pub const PICKUP_STATUS_DATE: &str = "pickup_status_date";
    pub const COURIER_NAME: &str = "courier_name";
    pub const PARTNER_PICKUP_NUMBER: &str = "partner_pickup_number";
    pub const PARTNER_SHIPMENT_NUMBER: &str = "partner_shipment_number";
    pub const DELIVERY_COST: &str = "delivery_cost";
    pub const PAYER: &str = "payer";
    pub const PAYMENT_DOC_NUMBER: &str = "payment_doc_number";
    pub const PAYMENT_DOC_STATUS: &str = "payment_doc_status";
    pub const PAYMENT_DOC_STATUS_DATE: &str = "payment_doc_status_date";
    pub const SHIPMENT_PAYMENT_STATUS: &str = "shipment_payment_status";
    pub const SHIPMENT_PAYMENT_DATE: &str = "shipment_payment_date";
    pub const SHIPMENT_STATUS: &str = "shipment_status";
    pub const SHIPMENT_STATUS_DATE: &str = "shipment_status_date";
    pub const VERIFICATION_RESULT: &str = "verification_result";
    pub const ACCEPTANCE_DATE: &str = "acceptance_date";
    pub const LAST_SCAN_DATE: &str = "last_scan_date";
    pub const LAST_SCAN_DEPARTMENT: &str = "last_scan_department";
    pub const LAST_SCAN_REPORT: &str = "last_scan_report";
    pub const EXECUTION_SPEED: &str = "execution_speed";
    pub const NON_EXECUTION_REASON: &str = "non_execution_reason";
}

use delivery_fields as d;
use pickup_fields as p;

/// 配送报表：表头 → 标准字段
pub const DELIVERY_COLUMNS: &[(&str, &str)] = &[
    ("Дата", d::REPORT_DATE),
    ("Дата відомості", d::REPORT_DATE),
    ("ПІБ кур'єра", d::COURIER_NAME),
    ("ПІБ курʼєра", d::COURIER_NAME),
    ("Кур'єр", d::COURIER_NAME),
    ("Номер авто", d::CAR_NUMBER),
    ("Підрозділ", d::DEPARTMENT),
    ("Підрозділ відомості", d::DEPARTMENT),
    ("Кількість відомостей", d::REPORTS_COUNT),
    ("Кількість адрес", d::ADDRESSES_COUNT),
    ("Завантажено посилок", d::LOADED_PARCELS),
    ("Доставлено посилок", d::DELIVERED_PARCELS),
    ("Доставлено в руки", d::DELIVERED_IN_HAND),
    ("Доставлено в безпечне місце", d::DELIVERED_SAFE_PLACE),
    ("Не доставлено посилок", d::UNDELIVERED_PARCELS),
    ("Не доставлено з причиною", d::UNDELIVERED_WITH_REASON),
    ("Не доставлено без причини", d::UNDELIVERED_NO_REASON),
    ("% успішної доставки", d::DELIVERY_SUCCESS_RATE),
    ("Відсоток успішної доставки", d::DELIVERY_SUCCESS_RATE),
];

/// 揽收明细：表头 → 标准字段
pub const PICKUP_COLUMNS: &[(&str, &str)] = &[
    ("Номер документу PickUp", p::PICKUP_DOC_NUMBER),
    ("Кількість шипментів у документі PickUp", p::SHIPMENTS_IN_DOC),
    ("Дата виконання документу PickUp", p::EXECUTION_DATE),
    ("Замовлений часовий інтервал", p::TIME_INTERVAL),
    ("Джерело створення", p::CREATION_SOURCE),
    ("Перший склад", p::FIRST_WAREHOUSE),
    ("Номер Shipment", p::SHIPMENT_NUMBER),
    ("Кількість місць", p::PLACES_COUNT),
    ("Кількість мість", p::PLACES_COUNT),
    ("Дата створення Shipment", p::SHIPMENT_CREATED_DATE),
    ("Підрозділ Shipment", p::SHIPMENT_DEPARTMENT),
    ("Дата першого сканування", p::FIRST_SCAN_DATE),
    ("Склад першого сканування", p::FIRST_SCAN_WAREHOUSE),
    ("Планова дата доставки", p::PLANNED_DELIVERY_DATE),
    ("Країна відправника", p::SENDER_COUNTRY),
    ("Тип відправника", p::SENDER_TYPE),
    ("Компанія відправник", p::SENDER_COMPANY),
    ("Місто відправника", p::SENDER_CITY),
    ("Адреса відправника", p::SENDER_ADDRESS),
    ("Тип відправлення", p::SHIPMENT_TYPE),
    ("Опис відправлення", p::SHIPMENT_DESCRIPTION),
    ("Оголошена вартість відправлення", p::DECLARED_VALUE),
    ("Загальна фактична вага відправлення", p::ACTUAL_WEIGHT),
    ("Загальна об'ємна вага відправлення", p::VOLUMETRIC_WEIGHT),
    ("Довжина, см*Ширина, см*Висота, см", p::DIMENSIONS),
    ("Країна отримувача", p::RECIPIENT_COUNTRY),
    ("Тип отримувача", p::RECIPIENT_TYPE),
    ("Статус PickUp", p::PICKUP_STATUS),
    ("Дата статусу PickUp", p::PICKUP_STATUS_DATE),
    ("ПІБ кур'єра", p::COURIER_NAME),
    ("ПІБ курʼєра", p::COURIER_NAME),
    ("Номер PickUp партнера", p::PARTNER_PICKUP_NUMBER),
    ("Номер Shipment партнера", p::PARTNER_SHIPMENT_NUMBER),
    ("Вартість доставки", p::DELIVERY_COST),
    ("Платник", p::PAYER),
    ("Номер платіжного документу", p::PAYMENT_DOC_NUMBER),
    ("Статус платіжного документу", p::PAYMENT_DOC_STATUS),
    ("Дата статусу платіжного документу", p::PAYMENT_DOC_STATUS_DATE),
    ("Статус оплати Shipment", p::SHIPMENT_PAYMENT_STATUS),
    ("Дата оплати Shipment", p::SHIPMENT_PAYMENT_DATE),
    ("Останній статус Shipment", p::SHIPMENT_STATUS),
    ("Дата останнього статусу Shipment", p::SHIPMENT_STATUS_DATE),
    ("Результат перевірки", p::VERIFICATION_RESULT),
    ("Дата приймання", p::ACCEPTANCE_DATE),
    ("Дата останнього сканування", p::LAST_SCAN_DATE),
    ("Підрозділ останнього сканування", p::LAST_SCAN_DEPARTMENT),
    ("Відомість останнього сканування", p::LAST_SCAN_REPORT),
    ("Швидкість виконання", p::EXECUTION_SPEED),
    ("Причина невиконання", p::NON_EXECUTION_REASON),
];

/// 按文件类型取字典
pub fn columns_for(file_type: FileType) -> &'static [(&'static str, &'static str)] {
    match file_type {
        FileType::DeliveryReport => DELIVERY_COLUMNS,
        FileType::PickupTransactions => PICKUP_COLUMNS,
        FileType::Unknown => &[],
    }
}

/// 精确查找（忽略首尾空白）
pub fn lookup(file_type: FileType, header: &str) -> Option<&'static str> {
    let header = header.trim();
    columns_for(file_type)
        .iter()
        .find(|(h, _)| *h == header)
        .map(|(_, field)| *field)
}

/// 标准字段全集（去重，保持字典顺序）
pub fn canonical_fields(file_type: FileType) -> Vec<&'static str> {
    let mut fields: Vec<&'static str> = Vec::new();
    for (_, field) in columns_for(file_type) {
        if !fields.contains(field) {
            fields.push(field);
        }
    }
    fields
}

/// 小计/合计行判定（№ 列为 ВСЬОГО / Total / Разом）
pub fn is_total_row(row: &RawRow) -> bool {
    row.iter()
        .find(|(header, _)| header.trim() == ROW_NUMBER_HEADER)
        .and_then(|(_, value)| value.as_text())
        .map(|text| TOTAL_ROW_MARKERS.contains(&text.to_lowercase().as_str()))
        .unwrap_or(false)
}

// ==========================================
// MappedRow - 标准字段 → 单元格值
// ==========================================
// 别名冲突时按表头顺序保留最左侧的非空值
#[derive(Debug, Clone, Default)]
pub struct MappedRow {
    values: HashMap<&'static str, CellValue>,
}

impl MappedRow {
    /// 按列解析结果（表头 → 标准字段，表头顺序）把原始行转成标准字段视图
    pub fn from_raw(row: &RawRow, resolution: &[(String, &'static str)]) -> Self {
        let mut values: HashMap<&'static str, CellValue> = HashMap::new();
        for (header, field) in resolution {
            let Some(value) = row.get(header) else {
                continue;
            };
            let replace = match values.get(field) {
                None => true,
                Some(existing) => existing.is_blank() && !value.is_blank(),
            };
            if replace {
                values.insert(field, value.clone());
            }
        }
        Self { values }
    }

    pub fn get(&self, field: &str) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.values.get(field).unwrap_or(&EMPTY)
    }

    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).as_text()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }
}
