//! Result formatting for the interactive shell.

use kestrel_common::schema::ColumnDef;
use kestrel_engine::{Record, TableInfo};

/// Render records as an aligned text table in schema column order.
/// Fields absent from a record render as empty cells.
pub fn format_records(columns: &[ColumnDef], records: &[Record]) -> String {
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    let ncols = names.len();
    let mut out = String::new();

    let cell = |record: &Record, name: &str| -> String {
        record
            .get(name)
            .map(|v| v.to_string())
            .unwrap_or_default()
    };

    // Compute column widths
    let mut widths: Vec<usize> = names.iter().map(|n| n.len()).collect();
    for record in records {
        for (i, w) in widths.iter_mut().enumerate() {
            *w = (*w).max(cell(record, names[i]).len());
        }
    }

    // Header
    let header: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(i, n)| format!("{:<width$}", n, width = widths[i]))
        .collect();
    out.push_str(&format!(" {} \n", header.join(" | ")));

    // Separator
    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w + 2)).collect();
    out.push_str(&format!("{}\n", sep.join("+")));

    // Rows
    for record in records {
        let cells: Vec<String> = (0..ncols)
            .map(|i| format!("{:<width$}", cell(record, names[i]), width = widths[i]))
            .collect();
        out.push_str(&format!(" {} \n", cells.join(" | ")));
    }

    out.push_str(&format!(
        "({} row{})\n",
        records.len(),
        if records.len() == 1 { "" } else { "s" }
    ));
    out
}

pub fn format_json(records: &[Record]) -> String {
    serde_json::to_string_pretty(records).unwrap_or_default()
}

pub fn format_info(info: &TableInfo) -> String {
    let columns: Vec<String> = info.columns.iter().map(|c| c.to_string()).collect();
    format!(
        "Table:   {}\nColumns: {}\nRecords: {}\n",
        info.name,
        columns.join(", "),
        info.record_count
    )
}
