// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use courier_ingest::domain::{CellValue, RawRow};

// ==========================================
// 表头常量
// ==========================================

pub const DELIVERY_HEADERS: [&str; 13] = [
    "№",
    "Дата",
    "ПІБ кур'єра",
    "Номер авто",
    "Підрозділ",
    "Кількість відомостей",
    "Кількість адрес",
    "Завантажено посилок",
    "Доставлено посилок",
    "Доставлено в руки",
    "Доставлено в безпечне місце",
    "Не доставлено посилок",
    "Відсоток успішної доставки",
];

pub const PICKUP_HEADERS: [&str; 10] = [
    "Номер документу PickUp",
    "Дата виконання документу PickUp",
    "Номер Shipment",
    "Кількість місць",
    "Загальна фактична вага відправлення",
    "Вартість доставки",
    "Статус PickUp",
    "ПІБ кур'єра",
    "Країна отримувача",
    "Останній статус Shipment",
];

// ==========================================
// RowBuilder - 原始行构建器
// ==========================================

#[derive(Default)]
pub struct RowBuilder {
    row: RawRow,
}

impl RowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, header: &str, value: &str) -> Self {
        self.row.insert(header.to_string(), CellValue::text(value));
        self
    }

    pub fn number(mut self, header: &str, value: f64) -> Self {
        self.row.insert(header.to_string(), CellValue::Number(value));
        self
    }

    pub fn empty(mut self, header: &str) -> Self {
        self.row.insert(header.to_string(), CellValue::Empty);
        self
    }

    pub fn build(self) -> RawRow {
        self.row
    }
}

/// 配送报表行
pub fn delivery_row(date: &str, courier: &str, department: &str, loaded: f64, delivered: f64) -> RawRow {
    RowBuilder::new()
        .text("Дата", date)
        .text("ПІБ кур'єра", courier)
        .text("Підрозділ", department)
        .number("Кількість відомостей", 1.0)
        .number("Кількість адрес", loaded)
        .number("Завантажено посилок", loaded)
        .number("Доставлено посилок", delivered)
        .number("Не доставлено посилок", (loaded - delivered).max(0.0))
        .build()
}

/// 揽收明细行
pub fn pickup_row(doc: &str, date: &str, shipment: &str, weight: f64, status: &str, courier: &str) -> RawRow {
    RowBuilder::new()
        .text("Номер документу PickUp", doc)
        .text("Дата виконання документу PickUp", date)
        .text("Номер Shipment", shipment)
        .number("Кількість місць", 1.0)
        .number("Загальна фактична вага відправлення", weight)
        .text("Статус PickUp", status)
        .text("ПІБ кур'єра", courier)
        .build()
}

pub fn headers(list: &[&str]) -> Vec<String> {
    list.iter().map(|h| h.to_string()).collect()
}
