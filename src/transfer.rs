use crate::calendar;
use crate::errors::{AppError, AppResult};
use crate::models::{Entry, ExportDocument, StoredEntry};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

pub const EXPORT_FORMAT_VERSION: &str = "1.0";

const REQUIRED_FIELDS: [&str; 4] = ["id", "date", "content", "createdAt"];

pub fn build_export(entries: &[Entry], exported_at: DateTime<Utc>) -> ExportDocument {
    ExportDocument {
        version: EXPORT_FORMAT_VERSION.to_string(),
        export_date: exported_at,
        entries: entries.to_vec(),
    }
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("life-os-backup-{}.json", calendar::format_day(date))
}

pub fn render_export(document: &ExportDocument) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

pub fn parse_import(raw: &str) -> AppResult<Vec<Entry>> {
    let document: Value = serde_json::from_str(raw)
        .map_err(|error| AppError::ImportFormat(format!("document is not valid JSON: {}", error)))?;

    let Some(records) = document.get("entries").and_then(Value::as_array) else {
        return Err(AppError::ImportFormat(
            "document has no entries list".to_string(),
        ));
    };

    let mut entries = Vec::with_capacity(records.len());
    let mut skipped = 0usize;
    for record in records {
        match import_record(record) {
            Some(entry) => entries.push(entry),
            None => skipped += 1,
        }
    }

    if entries.is_empty() {
        return Err(AppError::ImportEmpty(format!(
            "none of the {} records are complete entries",
            records.len()
        )));
    }

    if skipped > 0 {
        tracing::warn!(skipped, kept = entries.len(), "skipped incomplete import records");
    }
    Ok(entries)
}

fn has_required_fields(record: &Value) -> bool {
    REQUIRED_FIELDS.iter().all(|field| match record.get(field) {
        Some(Value::String(value)) => !value.is_empty(),
        Some(Value::Number(value)) => value.as_f64() != Some(0.0),
        _ => false,
    })
}

fn import_record(record: &Value) -> Option<Entry> {
    if !has_required_fields(record) {
        return None;
    }

    let stored: StoredEntry = match serde_json::from_value(record.clone()) {
        Ok(stored) => stored,
        Err(error) => {
            tracing::debug!(error = %error, "import record failed to parse");
            return None;
        }
    };
    let Some(date) = calendar::parse_day(&stored.date) else {
        tracing::debug!(entry_id = %stored.id, date = %stored.date, "import record has malformed date");
        return None;
    };
    Some(stored.into_entry(date))
}
