use crate::domain::model::{ImportRow, RawFields, SheetRow, UnreadableRow};
use crate::utils::error::{ImportError, Result};
use calamine::{Data, Range, Reader, Xls, Xlsx};
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Xls,
    Xlsx,
}

impl SheetFormat {
    /// 依副檔名（不分大小寫）判斷格式
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(SheetFormat::Csv),
            Some("xls") => Ok(SheetFormat::Xls),
            Some("xlsx") => Ok(SheetFormat::Xlsx),
            _ => Err(ImportError::UnsupportedFormatError {
                file_name: file_name.to_string(),
            }),
        }
    }
}

/// 解析整個檔案：第一列為標題，其後每一列產生一個 `SheetRow`。
/// 全空白的列會略過，但仍佔一個列號，列號與檔案中的位置一致。
/// CSV 中完全空的行不算一筆紀錄。
pub fn parse_sheet(bytes: &[u8], format: SheetFormat) -> Result<Vec<SheetRow>> {
    let rows = match format {
        SheetFormat::Csv => parse_csv(bytes)?,
        SheetFormat::Xls => parse_range(&first_sheet(Xls::new(Cursor::new(bytes.to_vec())))?)?,
        SheetFormat::Xlsx => {
            parse_range(&first_sheet(Xlsx::new(Cursor::new(bytes.to_vec())))?)?
        }
    };

    if rows.is_empty() {
        return Err(ImportError::EmptyFileError {
            message: "no data rows after the header row".to_string(),
        });
    }

    tracing::debug!("Parsed {} data rows ({:?})", rows.len(), format);
    Ok(rows)
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<SheetRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();
    ensure_header(&headers)?;

    let mut rows = Vec::new();
    for (index, record) in reader.byte_records().enumerate() {
        let row_number = index + 1;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("⚠️ Row {} could not be read: {}", row_number, e);
                rows.push(SheetRow::Unreadable(UnreadableRow {
                    row_number,
                    raw_fields: RawFields::new(),
                    message: e.to_string(),
                }));
                continue;
            }
        };

        let mut raw_fields = RawFields::new();
        let mut bad_column = None;
        for (header, cell) in headers.iter().zip(record.iter()) {
            match std::str::from_utf8(cell) {
                Ok(value) => raw_fields.push(header.as_str(), value),
                Err(_) => {
                    raw_fields.push(header.as_str(), String::from_utf8_lossy(cell));
                    bad_column.get_or_insert_with(|| header.clone());
                }
            }
        }

        if raw_fields.is_blank() && bad_column.is_none() {
            continue;
        }

        rows.push(match bad_column {
            Some(column) => SheetRow::Unreadable(UnreadableRow {
                row_number,
                raw_fields,
                message: format!("column '{}' is not valid UTF-8 text", column),
            }),
            None => SheetRow::Row(ImportRow {
                row_number,
                raw_fields,
            }),
        });
    }

    Ok(rows)
}

type SheetReader = Cursor<Vec<u8>>;

fn first_sheet<R>(
    workbook: std::result::Result<R, <R as Reader<SheetReader>>::Error>,
) -> Result<Range<Data>>
where
    R: Reader<SheetReader>,
    <R as Reader<SheetReader>>::Error: std::fmt::Display,
{
    let mut workbook = workbook.map_err(|e| ImportError::SpreadsheetError {
        message: e.to_string(),
    })?;

    match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| ImportError::SpreadsheetError {
            message: e.to_string(),
        }),
        None => Err(ImportError::EmptyFileError {
            message: "workbook has no worksheets".to_string(),
        }),
    }
}

fn parse_range(range: &Range<Data>) -> Result<Vec<SheetRow>> {
    let mut sheet_rows = range.rows();

    let headers: Vec<String> = match sheet_rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell_to_string(cell).unwrap_or_default().trim().to_string())
            .collect(),
        None => Vec::new(),
    };
    ensure_header(&headers)?;

    let mut rows = Vec::new();
    for (index, cells) in sheet_rows.enumerate() {
        let row_number = index + 1;
        let mut raw_fields = RawFields::new();
        let mut cell_error = None;

        for (header, cell) in headers.iter().zip(cells.iter()) {
            if header.is_empty() {
                continue;
            }
            match cell_to_string(cell) {
                Ok(value) => raw_fields.push(header.as_str(), value.trim()),
                Err(error) => {
                    raw_fields.push(header.as_str(), error.clone());
                    cell_error.get_or_insert_with(|| {
                        format!("cell error {} in column '{}'", error, header)
                    });
                }
            }
        }

        if raw_fields.is_blank() && cell_error.is_none() {
            continue;
        }

        rows.push(match cell_error {
            Some(message) => {
                tracing::warn!("⚠️ Row {} could not be read: {}", row_number, message);
                SheetRow::Unreadable(UnreadableRow {
                    row_number,
                    raw_fields,
                    message,
                })
            }
            None => SheetRow::Row(ImportRow {
                row_number,
                raw_fields,
            }),
        });
    }

    Ok(rows)
}

/// 儲存格轉字串：日期輸出 `YYYY-MM-DD`，整數浮點數不帶 `.0`；錯誤儲存格回傳 `Err`
fn cell_to_string(cell: &Data) -> std::result::Result<String, String> {
    match cell {
        Data::Empty => Ok(String::new()),
        Data::String(s) => Ok(s.clone()),
        Data::Int(i) => Ok(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Ok(format!("{}", *f as i64)),
        Data::Float(f) => Ok(f.to_string()),
        Data::Bool(b) => Ok(b.to_string()),
        Data::DateTime(dt) => Ok(dt
            .as_datetime()
            .map(|d| d.date().format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| dt.as_f64().to_string())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Ok(s.clone()),
        Data::Error(e) => Err(e.to_string()),
    }
}

fn ensure_header(headers: &[String]) -> Result<()> {
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ImportError::EmptyFileError {
            message: "missing header row".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(rows: &[SheetRow], index: usize) -> &ImportRow {
        match &rows[index] {
            SheetRow::Row(row) => row,
            SheetRow::Unreadable(row) => panic!("row {} unreadable: {}", row.row_number, row.message),
        }
    }

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(SheetFormat::from_file_name("members.csv").unwrap(), SheetFormat::Csv);
        assert_eq!(SheetFormat::from_file_name("Members.XLS").unwrap(), SheetFormat::Xls);
        assert_eq!(SheetFormat::from_file_name("a.b.xlsx").unwrap(), SheetFormat::Xlsx);
        assert!(matches!(
            SheetFormat::from_file_name("members.txt"),
            Err(ImportError::UnsupportedFormatError { .. })
        ));
        assert!(SheetFormat::from_file_name("members").is_err());
    }

    #[test]
    fn test_parse_csv_rows_keep_original_headers() {
        let csv = "Full Name , Email,Phone Number\nJohn Doe, john@x.com ,9876543210\n\nJane,jane@x.com,9999999999\n";
        let rows = parse_sheet(csv.as_bytes(), SheetFormat::Csv).unwrap();

        assert_eq!(rows.len(), 2);
        let first = row(&rows, 0);
        assert_eq!(first.row_number, 1);
        let fields: Vec<(&str, &str)> = first.raw_fields.iter().collect();
        assert_eq!(
            fields,
            vec![
                ("Full Name", "John Doe"),
                ("Email", "john@x.com"),
                ("Phone Number", "9876543210")
            ]
        );
        assert_eq!(row(&rows, 1).row_number, 2);
    }

    #[test]
    fn test_parse_csv_short_rows_are_kept() {
        let csv = "name,email,mobile\nJohn,john@x.com\n";
        let rows = parse_sheet(csv.as_bytes(), SheetFormat::Csv).unwrap();
        assert_eq!(row(&rows, 0).raw_fields.len(), 2);
    }

    #[test]
    fn test_parse_csv_invalid_utf8_row_does_not_stop_later_rows() {
        let mut bytes = b"name,email\n".to_vec();
        bytes.extend_from_slice(b"Jo\xffhn,john@x.com\n");
        bytes.extend_from_slice(b"Jane,jane@x.com\n");

        let rows = parse_sheet(&bytes, SheetFormat::Csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(matches!(&rows[0], SheetRow::Unreadable(r) if r.message.contains("name")));
        assert_eq!(row(&rows, 1).row_number, 2);
    }

    #[test]
    fn test_header_only_file_is_empty() {
        assert!(matches!(
            parse_sheet(b"name,email\n", SheetFormat::Csv),
            Err(ImportError::EmptyFileError { .. })
        ));
        assert!(matches!(
            parse_sheet(b"", SheetFormat::Csv),
            Err(ImportError::EmptyFileError { .. })
        ));
    }

    #[test]
    fn test_corrupt_workbook_is_batch_fatal() {
        assert!(matches!(
            parse_sheet(b"definitely not a workbook", SheetFormat::Xlsx),
            Err(ImportError::SpreadsheetError { .. })
        ));
        assert!(matches!(
            parse_sheet(b"definitely not a workbook", SheetFormat::Xls),
            Err(ImportError::SpreadsheetError { .. })
        ));
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Float(9876543210.0)).unwrap(), "9876543210");
        assert_eq!(cell_to_string(&Data::Float(12.5)).unwrap(), "12.5");
        assert_eq!(cell_to_string(&Data::Int(500)).unwrap(), "500");
        assert_eq!(cell_to_string(&Data::Empty).unwrap(), "");
        assert!(cell_to_string(&Data::Error(calamine::CellErrorType::Div0)).is_err());
    }

    #[test]
    fn test_blank_rows_keep_their_row_numbers() {
        let csv = "name,email\nJohn,john@x.com\n , \n,\nJane,jane@x.com\n";
        let rows = parse_sheet(csv.as_bytes(), SheetFormat::Csv).unwrap();

        let numbers: Vec<usize> = rows.iter().map(SheetRow::row_number).collect();
        assert_eq!(numbers, vec![1, 4]);
    }
}
