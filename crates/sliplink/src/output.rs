use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

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

#[derive(Serialize)]
struct DatagramOutput<'a> {
    kind: &'a str,
    index: usize,
    size: usize,
    hex: String,
    text: Option<&'a str>,
    timestamp: String,
}

#[derive(Serialize)]
struct FrameOutput {
    kind: &'static str,
    datagram_size: usize,
    frame_size: usize,
    hex: String,
}

/// Print one decoded datagram. `index` counts datagrams from 1.
pub fn print_datagram(datagram: &[u8], index: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = DatagramOutput {
                kind: "datagram",
                index,
                size: datagram.len(),
                hex: hex::encode(datagram),
                text: std::str::from_utf8(datagram).ok(),
                timestamp: now_unix_seconds(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    index.to_string(),
                    datagram.len().to_string(),
                    payload_preview(datagram),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "#{index} size={} payload={}",
                datagram.len(),
                payload_preview(datagram)
            );
        }
        OutputFormat::Raw => print_raw(datagram),
    }
}

/// Print an encoded frame together with the size of the datagram it carries.
pub fn print_frame(frame: &[u8], datagram_size: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&FrameOutput {
            kind: "frame",
            datagram_size,
            frame_size: frame.len(),
            hex: hex::encode(frame),
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["DATAGRAM", "FRAME", "HEX"])
                .add_row(vec![
                    datagram_size.to_string(),
                    frame.len().to_string(),
                    spaced_hex(frame),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", spaced_hex(frame)),
        OutputFormat::Raw => print_raw(frame),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn spaced_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) if !text.chars().any(char::is_control) => text.to_string(),
        _ => spaced_hex(payload),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
