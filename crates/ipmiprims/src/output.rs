use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// A command result: serialized as-is for JSON, shown as field/value rows
/// otherwise. `raw` is the bare value printed by `--format raw`.
pub struct Record<'a, T: Serialize> {
    pub value: &'a T,
    pub rows: Vec<(&'static str, String)>,
    pub raw: String,
}

pub fn print_record<T: Serialize>(record: &Record<'_, T>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(record.value).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (field, value) in &record.rows {
                table.add_row(vec![field.to_string(), value.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let width = record
                .rows
                .iter()
                .map(|(field, _)| field.len())
                .max()
                .unwrap_or(0);
            for (field, value) in &record.rows {
                println!("{field:<width$} : {value}");
            }
        }
        OutputFormat::Raw => {
            println!("{}", record.raw);
        }
    }
}

/// Space-separated lowercase hex, as `ipmitool raw` prints it.
pub fn hex_bytes(data: &[u8]) -> String {
    data.iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_bytes_formats_like_ipmitool() {
        assert_eq!(hex_bytes(&[0x20, 0x01, 0xff]), "20 01 ff");
        assert_eq!(hex_bytes(&[]), "");
    }
}
