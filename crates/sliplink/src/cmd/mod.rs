use clap::{Args, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sliplink::frame::DecoderConfig;
use sliplink::transport::{open_serial, StreamEndpoint};
use sliplink::{LinkSet, PeerAddress};

use crate::exit::{transport_error, CliError, CliResult, DATA_INVALID, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the SLIP frame for a datagram.
    Encode(EncodeArgs),
    /// Decode a captured byte stream into datagrams.
    Decode(DecodeArgs),
    /// Send one datagram to a peer.
    Send(SendArgs),
    /// Print datagrams arriving on any link.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Send(args) => send::run(args),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// One `ADDR=PATH` entry: the peer at the far end of the serial line at PATH.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkSpec {
    pub peer: PeerAddress,
    pub path: PathBuf,
}

impl FromStr for LinkSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (peer, path) = s
            .split_once('=')
            .ok_or_else(|| format!("expected ADDR=PATH, got {s:?}"))?;
        if peer.is_empty() || path.is_empty() {
            return Err(format!("expected ADDR=PATH, got {s:?}"));
        }
        Ok(Self {
            peer: PeerAddress::from(peer),
            path: PathBuf::from(path),
        })
    }
}

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Serial line for a peer, as ADDR=PATH (repeatable).
    #[arg(long = "link", value_name = "ADDR=PATH", required = true)]
    pub links: Vec<LinkSpec>,
    /// Drop incoming frames larger than this many bytes (escaped size).
    #[arg(long, value_name = "BYTES")]
    pub max_frame_size: Option<usize>,
}

/// A link set together with the serial lines under it.
pub struct OpenLinks {
    pub set: LinkSet,
    lines: Vec<Arc<StreamEndpoint>>,
}

impl OpenLinks {
    /// Start reading every line. Register the upstream receiver first: bytes
    /// decoded before that are dropped.
    pub fn start_reading(&self) -> CliResult<()> {
        for line in &self.lines {
            line.start()
                .map_err(|err| transport_error("reader start failed", err))?;
        }
        Ok(())
    }
}

impl LinkArgs {
    /// Open every serial line and build the link set over them.
    pub fn open(&self) -> CliResult<OpenLinks> {
        let mut mapping: Vec<(PeerAddress, Arc<StreamEndpoint>)> =
            Vec::with_capacity(self.links.len());
        for spec in &self.links {
            if mapping.iter().any(|(peer, _)| *peer == spec.peer) {
                return Err(CliError::new(
                    USAGE,
                    format!("duplicate --link for {}", spec.peer),
                ));
            }
            let endpoint = open_serial(&spec.path)
                .map_err(|err| transport_error("open failed", err))?;
            mapping.push((spec.peer.clone(), Arc::new(endpoint)));
        }

        let lines = mapping.iter().map(|(_, line)| Arc::clone(line)).collect();
        let decoder = DecoderConfig {
            max_frame_size: self.max_frame_size,
        };
        Ok(OpenLinks {
            set: LinkSet::with_config(mapping, decoder),
            lines,
        })
    }
}

#[derive(Args, Debug)]
pub struct PayloadArgs {
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["hex", "file"])]
    pub data: Option<String>,
    /// Hex-encoded payload.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["data", "hex"])]
    pub file: Option<PathBuf>,
}

impl PayloadArgs {
    pub fn resolve(&self) -> CliResult<Vec<u8>> {
        if let Some(data) = &self.data {
            return Ok(data.as_bytes().to_vec());
        }
        if let Some(text) = &self.hex {
            return parse_hex(text);
        }
        if let Some(path) = &self.file {
            return fs::read(path).map_err(|err| {
                crate::exit::io_error(&format!("failed reading {}", path.display()), err)
            });
        }
        Ok(Vec::new())
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub payload: PayloadArgs,
    /// Drop frames larger than this many bytes (escaped size).
    #[arg(long, value_name = "BYTES")]
    pub max_frame_size: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub links: LinkArgs,
    /// Peer address to send to.
    #[arg(long)]
    pub to: PeerAddress,
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub links: LinkArgs,
    /// Exit after receiving N datagrams.
    #[arg(long)]
    pub count: Option<usize>,
    /// Exit with a timeout status when nothing arrives for this long (e.g. 5s, 500ms).
    #[arg(long)]
    pub idle_timeout: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse hex, ignoring whitespace and `:` separators.
pub fn parse_hex(text: &str) -> CliResult<Vec<u8>> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&compact).map_err(|err| CliError::new(DATA_INVALID, format!("invalid hex: {err}")))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(num) => (num, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
