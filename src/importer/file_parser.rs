// ==========================================
// 快递报表导入系统 - 文件解析器实现
// ==========================================
// 职责: 文件字节 → RawSheet（首个工作表的表头 + 数据行）
// 支持: Excel (.xlsx/.xlsm/.xls/.xlsb/.ods) / CSV (.csv)
// 说明: 仅读取第一个工作表；中间空行保留以对齐表格行号
// ==========================================

use crate::domain::cell::{CellValue, RawRow, RawSheet};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::report_importer_trait::FileParser;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// 支持的 Excel 扩展名
pub const EXCEL_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_bytes(&self, bytes: Vec<u8>) -> ImportResult<RawSheet> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(ImportError::EmptySheet)?;

        let range = workbook.worksheet_range(&sheet_name)?;
        debug!(sheet = %sheet_name, height = range.height(), "读取首个工作表");
        range_to_sheet(&range)
    }
}

fn range_to_sheet(range: &Range<Data>) -> ImportResult<RawSheet> {
    let mut rows = range.rows();
    let header_row = rows.next().ok_or(ImportError::EmptySheet)?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(ImportError::EmptySheet);
    }

    let data_rows = rows
        .map(|row| build_row(&headers, row.iter().map(convert_cell)))
        .collect();

    Ok(RawSheet::new(headers, trim_trailing_blank(data_rows)))
}

/// calamine 单元格 → CellValue
///
/// 日期单元格保留为 Excel 序列号，由日期解析器统一转换
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
// 分隔符: 首行中 ';' 多于 ',' 时用 ';'（本地化 Excel 导出）
// 编码: 非法 UTF-8 按替换字符处理
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_bytes(&self, bytes: Vec<u8>) -> ImportResult<RawSheet> {
        let text = String::from_utf8_lossy(&bytes);
        let text = text.trim_start_matches('\u{feff}');
        let delimiter = sniff_delimiter(text);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::EmptySheet);
        }

        let mut data_rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            data_rows.push(build_row(
                &headers,
                record.iter().map(|value| {
                    let value = value.trim();
                    if value.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::text(value)
                    }
                }),
            ));
        }

        Ok(RawSheet::new(headers, trim_trailing_blank(data_rows)))
    }
}

fn sniff_delimiter(text: &str) -> u8 {
    let first_line = text.lines().next().unwrap_or("");
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

// ==========================================
// 公共工具
// ==========================================

/// 按列位置组装行；无表头的列忽略，同名表头保留第一个
fn build_row(headers: &[String], cells: impl Iterator<Item = CellValue>) -> RawRow {
    let mut row = RawRow::new();
    for (header, value) in headers.iter().zip(cells) {
        if header.is_empty() || row.contains_key(header) {
            continue;
        }
        row.insert(header.clone(), value);
    }
    row
}

fn trim_trailing_blank(mut rows: Vec<RawRow>) -> Vec<RawRow> {
    while rows
        .last()
        .map(|row| row.values().all(CellValue::is_blank))
        .unwrap_or(false)
    {
        rows.pop();
    }
    rows
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    /// 按文件名扩展名选择解析器
    pub fn parser_for(file_name: &str) -> ImportResult<Box<dyn FileParser>> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(Box::new(CsvParser)),
            e if EXCEL_EXTENSIONS.contains(&e) => Ok(Box::new(ExcelParser)),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }

    /// 解析内存中的文件内容
    pub fn parse_bytes(&self, file_name: &str, bytes: Vec<u8>) -> ImportResult<RawSheet> {
        Self::parser_for(file_name)?.parse_bytes(bytes)
    }

    /// 解析磁盘文件
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<RawSheet> {
        let path = file_path.as_ref();
        let parser = Self::parser_for(&path.to_string_lossy())?;
        parser.parse_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_csv_parser_comma_delimited() {
        let file = csv_file("Номер Shipment,Статус PickUp\nSH-1,Done\nSH-2,Closed\n");
        let sheet = UniversalFileParser.parse(file.path()).unwrap();

        assert_eq!(sheet.headers, vec!["Номер Shipment", "Статус PickUp"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(
            sheet.rows[0].get("Номер Shipment"),
            Some(&CellValue::text("SH-1"))
        );
    }

    #[test]
    fn test_csv_parser_semicolon_and_bom() {
        let file = csv_file("\u{feff}Дата;ПІБ кур'єра;Завантажено посилок\n15.01.2025;Іванов;100,5\n");
        let sheet = UniversalFileParser.parse(file.path()).unwrap();

        assert_eq!(sheet.headers[0], "Дата");
        assert_eq!(
            sheet.rows[0].get("Завантажено посилок"),
            Some(&CellValue::text("100,5"))
        );
    }

    #[test]
    fn test_csv_keeps_interior_blank_rows() {
        let file = csv_file("A,B\n1,2\n,\n3,4\n,\n");
        let sheet = UniversalFileParser.parse(file.path()).unwrap();

        // 中间空行保留（行号对齐），末尾空行丢弃
        assert_eq!(sheet.rows.len(), 3);
        assert!(sheet.rows[1].values().all(CellValue::is_blank));
    }

    #[test]
    fn test_csv_blank_header_is_empty_sheet() {
        let file = csv_file(",\n1,2\n");
        let result = UniversalFileParser.parse(file.path());
        assert!(matches!(result, Err(ImportError::EmptySheet)));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = UniversalFileParser.parse_bytes("report.pdf", Vec::new());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "pdf"));
    }

    #[test]
    fn test_missing_file() {
        let result = UniversalFileParser.parse("does_not_exist.csv");
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_invalid_excel_bytes() {
        let result = UniversalFileParser.parse_bytes("broken.xlsx", b"not a workbook".to_vec());
        assert!(matches!(result, Err(ImportError::ExcelParseError(_))));
    }

    #[test]
    fn test_convert_cell_variants() {
        assert_eq!(convert_cell(&Data::Int(5)), CellValue::Number(5.0));
        assert_eq!(convert_cell(&Data::Empty), CellValue::Empty);
        assert_eq!(
            convert_cell(&Data::String("Done".to_string())),
            CellValue::text("Done")
        );
    }
}
