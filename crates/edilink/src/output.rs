use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use edilink_session::{Received, Status};
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
struct StatusOutput<'a> {
    kind: &'static str,
    peer: &'a str,
    #[serde(flatten)]
    status: &'a Status,
    timestamp: String,
}

#[derive(Serialize)]
struct ReceivedOutput<'a> {
    kind: &'static str,
    peer: &'a str,
    payload_size: usize,
    payload: String,
    #[serde(flatten)]
    status: &'a Status,
    timestamp: String,
}

/// Print the outcome of a protocol step.
///
/// Raw output prints nothing; only payloads are written in raw mode.
pub fn print_status(status: &Status, peer: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = StatusOutput {
                kind: "status",
                peer,
                status,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["OP", "CODE", "LEN", "PEER", "MESSAGE"])
                .add_row(vec![
                    status.op().to_string(),
                    status.code().to_string(),
                    status.len().to_string(),
                    peer.to_string(),
                    status.message().to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "op={} code={} len={} peer={} message={}",
                status.op(),
                status.code(),
                status.len(),
                peer,
                status.message()
            );
        }
        OutputFormat::Raw => {}
    }
}

/// Print a received frame.
pub fn print_received(received: &Received, peer: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ReceivedOutput {
                kind: "received",
                peer,
                payload_size: received.payload.len(),
                payload: received.text().into_owned(),
                status: &received.status,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SIZE", "PEER", "PAYLOAD"])
                .add_row(vec![
                    received.payload.len().to_string(),
                    peer.to_string(),
                    received.text().into_owned(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "size={} peer={} payload={}",
                received.payload.len(),
                peer,
                received.text()
            );
        }
        OutputFormat::Raw => {
            print_raw(received.payload.as_ref());
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
