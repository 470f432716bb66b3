use clap::{Args, Subcommand};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use oistream_transport::topic::{
    DEFAULT_CONTROL_TOPIC, DEFAULT_STREAM_TOPIC, DEFAULT_TELEMETRY_TOPIC,
};

use crate::exit::{io_error, CliError, CliResult, INTERNAL};
use crate::output::OutputFormat;

pub mod decode;
pub mod replay;
pub mod sample;
pub mod sensors;
pub mod telemetry;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a raw sensor stream from a file or stdin.
    Decode(DecodeArgs),
    /// Replay a captured broker session through the decoders.
    Replay(ReplayArgs),
    /// Decode one `TS;...` telemetry line.
    Telemetry(TelemetryArgs),
    /// Write the demonstration sensor frame.
    Sample(SampleArgs),
    /// List the known sensor packets.
    Sensors(SensorsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Replay(args) => replay::run(args, format),
        Command::Telemetry(args) => telemetry::run(args, format),
        Command::Sample(args) => sample::run(args),
        Command::Sensors(args) => sensors::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Input file. Reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,
    /// Input is hex text (whitespace ignored) instead of raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Bytes handed to the parser per read.
    #[arg(long, default_value = "4096", value_parser = clap::value_parser!(u32).range(1..))]
    pub chunk_size: u32,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<u64>,
    /// Also print frames whose checksum failed.
    #[arg(long)]
    pub all: bool,
    /// Print parser counters when the input ends.
    #[arg(long)]
    pub stats: bool,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Capture file (JSON lines). Reads stdin when `-`.
    pub capture: PathBuf,
    /// Topic carrying `TS;...` telemetry lines.
    #[arg(long, env = "OISTREAM_TOPIC_TELEMETRY", default_value = DEFAULT_TELEMETRY_TOPIC)]
    pub topic_telemetry: String,
    /// Topic carrying joystick control bytes.
    #[arg(long, env = "OISTREAM_TOPIC_CONTROL", default_value = DEFAULT_CONTROL_TOPIC)]
    pub topic_control: String,
    /// Topic carrying the binary sensor stream.
    #[arg(long, env = "OISTREAM_TOPIC_STREAM", default_value = DEFAULT_STREAM_TOPIC)]
    pub topic_stream: String,
    /// Minimum milliseconds between two sensor frame refreshes.
    #[arg(long, env = "OISTREAM_REFRESH_MS", default_value = "250")]
    pub refresh_ms: u64,
}

#[derive(Args, Debug)]
pub struct TelemetryArgs {
    /// Telemetry line, e.g. `TS;1000;-60;3.7;0.5;120`.
    pub line: String,
    /// Clamp the battery percentage to 0..=100.
    #[arg(long)]
    pub clamp: bool,
}

#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Write hex text instead of raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Current in mA.
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub current: i16,
    /// Voltage in mV.
    #[arg(long, default_value = "0")]
    pub voltage: i16,
    /// Report the virtual wall as seen.
    #[arg(long)]
    pub virtual_wall: bool,
    /// Number of frames to write.
    #[arg(long, default_value = "1")]
    pub count: u32,
}

#[derive(Args, Debug, Default)]
pub struct SensorsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Open a file argument, treating `-` as stdin.
pub(crate) fn open_input(path: Option<&Path>) -> CliResult<Box<dyn BufRead>> {
    match path {
        None => Ok(Box::new(io::stdin().lock())),
        Some(path) if path == Path::new("-") => Ok(Box::new(io::stdin().lock())),
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

/// Flag cleared by Ctrl-C so read loops can stop between messages.
pub(crate) fn install_ctrlc_handler() -> CliResult<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || {
        flag.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))?;
    Ok(running)
}
