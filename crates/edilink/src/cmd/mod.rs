use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use edilink_frame::{FrameConfig, ReceiveMode};
use edilink_session::{HandshakeConfig, SessionConfig};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod probe;
pub mod recv;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one payload, optionally wait for one reply, then disconnect.
    Send(SendArgs),
    /// Receive frames until the host ends the session.
    Recv(RecvArgs),
    /// Handshake with a host and disconnect.
    Probe(ProbeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Recv(args) => recv::run(args, format),
        Command::Probe(args) => probe::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Host address (host:port).
    pub addr: String,
    /// Handshake token. Defaults to the standard host token.
    #[arg(long, env = "EDILINK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// Socket deadline for connect, reads and writes (e.g. 5s, 500ms).
    /// Without it every step blocks until the host answers.
    #[arg(long)]
    pub timeout: Option<String>,
}

impl ConnectArgs {
    pub fn session_config(&self, receive_mode: ReceiveMode) -> CliResult<SessionConfig> {
        let timeout = self.timeout.as_deref().map(parse_duration).transpose()?;
        let mut handshake = HandshakeConfig::default();
        if let Some(token) = &self.token {
            handshake.token = token.clone();
        }

        Ok(SessionConfig {
            handshake,
            frame: FrameConfig {
                receive_mode,
                ..FrameConfig::default()
            },
            connect_timeout: timeout,
            read_timeout: timeout,
            write_timeout: timeout,
        })
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Raw string payload.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Wait for one reply frame and print it.
    #[arg(long)]
    pub wait: bool,
}

#[derive(Args, Debug)]
pub struct RecvArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Stop after receiving N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Read exactly the declared length of each frame.
    #[arg(long)]
    pub exact: bool,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
