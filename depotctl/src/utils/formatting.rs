use chrono::{DateTime, Local, Utc};
use depot_core::pagination::PageView;
use depot_core::record::FileRecord;
use tabled::{builder::Builder, settings::Style};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// 1024-based size with at most two decimals, trailing zeros dropped.
/// Anything past the gigabyte range is still shown in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut threshold: u64 = 1024;
    while unit < SIZE_UNITS.len() - 1 && bytes >= threshold {
        unit += 1;
        threshold = threshold.saturating_mul(1024);
    }

    let value = bytes as f64 / 1024f64.powi(unit as i32);
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

pub fn format_upload_time(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Page numbers around the current one, e.g. `< 5 6 [7] 8 9 >`.
/// The arrows are left out when there is nowhere to go.
pub fn format_pager(view: &PageView<'_, FileRecord>) -> String {
    let mut parts = Vec::new();
    if view.can_go_prev() {
        parts.push("<".to_string());
    }
    for page in view.window() {
        if page == view.current_page {
            parts.push(format!("[{page}]"));
        } else {
            parts.push(page.to_string());
        }
    }
    if view.can_go_next() {
        parts.push(">".to_string());
    }
    parts.join(" ")
}

pub fn format_page(view: &PageView<'_, FileRecord>) -> String {
    let mut output = String::new();

    if view.items.is_empty() {
        output.push_str("No files found.\n");
    } else {
        let mut builder = Builder::default();
        builder.push_record(vec!["#", "Original Name", "Stored Name", "Size", "Uploaded"]);
        for (offset, record) in view.items.iter().enumerate() {
            builder.push_record(vec![
                (view.start_index + offset + 1).to_string(),
                record.original_name.clone(),
                record.stored_name.clone(),
                format_file_size(record.file_size),
                format_upload_time(&record.upload_time),
            ]);
        }
        let mut table = builder.build();
        table.with(Style::rounded());
        output.push_str(&table.to_string());
        output.push('\n');
    }

    output.push_str(&view.summary());
    output.push_str("  ");
    output.push_str(&format_pager(view));
    output
}
