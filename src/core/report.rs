use crate::core::validity::display_valid_until;
use crate::domain::model::{ImportOutcome, ImportResponse};
use crate::utils::error::{ImportError, Result};
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

/// 匯入報表 ZIP：`results.json` 一定有；有成功列時附 `imported.csv`，
/// 有失敗列時附 `failed_rows.csv`（原始欄位 + `error`，修正後可直接重新上傳）
pub fn build_report_bundle(outcome: &ImportOutcome) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let response = ImportResponse::from_outcome(outcome.clone());
    zip.start_file("results.json", options)?;
    zip.write_all(serde_json::to_string_pretty(&response)?.as_bytes())?;

    if !outcome.success.is_empty() {
        zip.start_file("imported.csv", options)?;
        zip.write_all(&imported_csv(outcome)?)?;
    }

    if !outcome.failed.is_empty() {
        zip.start_file("failed_rows.csv", options)?;
        zip.write_all(&failed_rows_csv(outcome)?)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn imported_csv(outcome: &ImportOutcome) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "row",
        "membershipId",
        "name",
        "email",
        "validFrom",
        "validUntil",
    ])?;

    for entry in &outcome.success {
        writer.write_record([
            entry.row.to_string(),
            entry.membership_id.clone(),
            entry.name.clone(),
            entry.email.clone(),
            entry.valid_from.format("%Y-%m-%d").to_string(),
            display_valid_until(&entry.valid_until),
        ])?;
    }

    into_bytes(writer)
}

/// 欄位為所有失敗列出現過的原始欄名（依首次出現順序），最後加上 `error`
fn failed_rows_csv(outcome: &ImportOutcome) -> Result<Vec<u8>> {
    let mut headers: Vec<&str> = Vec::new();
    for failure in &outcome.failed {
        for header in failure.data.headers() {
            if !headers.contains(&header) {
                headers.push(header);
            }
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header_record: Vec<&str> = vec!["row"];
    header_record.extend(headers.iter().copied());
    header_record.push("error");
    writer.write_record(&header_record)?;

    for failure in &outcome.failed {
        let mut record = vec![failure.row.to_string()];
        for header in &headers {
            let value = failure
                .data
                .iter()
                .find(|(h, _)| h == header)
                .map(|(_, v)| v.to_string())
                .unwrap_or_default();
            record.push(value);
        }
        record.push(failure.error.clone());
        writer.write_record(&record)?;
    }

    into_bytes(writer)
}

fn into_bytes(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer.into_inner().map_err(|e| ImportError::IoError(e.into_error()))
}
