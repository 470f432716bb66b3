use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use oistream_frame::{ParsedSensor, ParserStats, SensorFrame, SensorRegistry};
use oistream_telemetry::{BoardStats, SensorBoard};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
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
struct SensorOutput<'a> {
    id: u8,
    label: &'a str,
    value: i32,
    #[serde(skip_serializing_if = "is_blank")]
    unit: &'a str,
    raw: [u8; 2],
}

impl<'a> From<&'a ParsedSensor> for SensorOutput<'a> {
    fn from(sensor: &'a ParsedSensor) -> Self {
        Self {
            id: sensor.id,
            label: sensor.label,
            value: sensor.value,
            unit: sensor.unit,
            raw: [sensor.raw_high, sensor.raw_low],
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    frame: u64,
    checksum_ok: bool,
    checksum: u8,
    expected_checksum: u8,
    sensors: Vec<SensorOutput<'a>>,
}

#[derive(Serialize)]
struct JoystickOutput {
    x: f32,
    y: f32,
}

#[derive(Serialize)]
struct BoardOutput<'a> {
    trigger: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    joystick: Option<JoystickOutput>,
    records: Vec<SensorOutput<'a>>,
}

#[derive(Serialize)]
struct DefinitionOutput<'a> {
    id: u8,
    bytes: usize,
    label: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    unit: &'a str,
}

#[derive(Serialize)]
struct ParserStatsOutput {
    bytes_consumed: u64,
    bytes_skipped: u64,
    frames_emitted: u64,
    checksum_failures: u64,
    frames_aborted: u64,
}

#[derive(Serialize)]
struct BoardStatsOutput {
    frames_applied: u64,
    frames_throttled: u64,
    frames_rejected: u64,
    telemetry_updates: u64,
    control_updates: u64,
}

#[derive(Serialize)]
struct SummaryOutput {
    parser: ParserStatsOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    board: Option<BoardStatsOutput>,
}

fn is_blank(unit: &&str) -> bool {
    unit.is_empty()
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn sensor_table(sensors: &[ParsedSensor]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "SENSOR", "VALUE", "UNIT"]);
    for sensor in sensors {
        table.add_row(vec![
            sensor.id.to_string(),
            sensor.label.to_string(),
            sensor.value.to_string(),
            sensor.unit.to_string(),
        ]);
    }
    table
}

fn print_pretty_sensors(sensors: &[ParsedSensor]) {
    for sensor in sensors {
        println!("  [{:>3}] {sensor}", sensor.id);
    }
}

pub fn print_frame(frame: &SensorFrame, index: u64, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&FrameOutput {
            frame: index,
            checksum_ok: frame.checksum_ok,
            checksum: frame.checksum,
            expected_checksum: frame.expected_checksum,
            sensors: frame.sensors.iter().map(SensorOutput::from).collect(),
        }),
        OutputFormat::Table => {
            println!("frame {index} ({})", checksum_label(frame));
            println!("{}", sensor_table(&frame.sensors));
        }
        OutputFormat::Pretty => {
            println!(
                "frame={index} sensors={} checksum={}",
                frame.len(),
                checksum_label(frame)
            );
            print_pretty_sensors(&frame.sensors);
        }
    }
}

pub fn print_records(records: &[ParsedSensor], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out: Vec<SensorOutput<'_>> = records.iter().map(SensorOutput::from).collect();
            print_json(&out);
        }
        OutputFormat::Table => println!("{}", sensor_table(records)),
        OutputFormat::Pretty => print_pretty_sensors(records),
    }
}

pub fn print_board(board: &SensorBoard, trigger: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&BoardOutput {
            trigger,
            joystick: board
                .joystick()
                .map(|pos| JoystickOutput { x: pos.x, y: pos.y }),
            records: board.records().iter().map(SensorOutput::from).collect(),
        }),
        OutputFormat::Table | OutputFormat::Pretty => {
            match board.joystick() {
                Some(pos) => println!("board ({trigger}) joystick=({:.2}, {:.2})", pos.x, pos.y),
                None => println!("board ({trigger})"),
            }
            if format == OutputFormat::Table {
                println!("{}", sensor_table(board.records()));
            } else {
                print_pretty_sensors(board.records());
            }
        }
    }
}

pub fn print_registry(registry: &SensorRegistry, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out: Vec<DefinitionOutput<'_>> = registry
                .iter()
                .map(|def| DefinitionOutput {
                    id: def.id,
                    bytes: def.byte_len.get(),
                    label: def.label,
                    unit: def.unit,
                })
                .collect();
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "BYTES", "SENSOR", "UNIT"]);
            for def in registry.iter() {
                table.add_row(vec![
                    def.id.to_string(),
                    def.byte_len.get().to_string(),
                    def.label.to_string(),
                    def.unit.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for def in registry.iter() {
                println!("{:>3} {}B {} {}", def.id, def.byte_len.get(), def.label, def.unit);
            }
        }
    }
}

/// Print end-of-run counters. JSON goes to stdout; other formats print a
/// single summary line.
pub fn print_summary(parser: &ParserStats, board: Option<&BoardStats>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&SummaryOutput {
            parser: ParserStatsOutput {
                bytes_consumed: parser.bytes_consumed,
                bytes_skipped: parser.bytes_skipped,
                frames_emitted: parser.frames_emitted,
                checksum_failures: parser.checksum_failures,
                frames_aborted: parser.frames_aborted,
            },
            board: board.map(|stats| BoardStatsOutput {
                frames_applied: stats.frames_applied,
                frames_throttled: stats.frames_throttled,
                frames_rejected: stats.frames_rejected,
                telemetry_updates: stats.telemetry_updates,
                control_updates: stats.control_updates,
            }),
        }),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!(
                "bytes={} skipped={} frames={} checksum_failures={} aborted={}",
                parser.bytes_consumed,
                parser.bytes_skipped,
                parser.frames_emitted,
                parser.checksum_failures,
                parser.frames_aborted
            );
            if let Some(stats) = board {
                println!(
                    "board applied={} throttled={} rejected={} telemetry={} control={}",
                    stats.frames_applied,
                    stats.frames_throttled,
                    stats.frames_rejected,
                    stats.telemetry_updates,
                    stats.control_updates
                );
            }
        }
    }
}

fn checksum_label(frame: &SensorFrame) -> String {
    if frame.checksum_ok {
        "ok".to_string()
    } else {
        format!(
            "bad: got {:#04x}, expected {:#04x}",
            frame.checksum, frame.expected_checksum
        )
    }
}
