use oistream_telemetry::{parse_telemetry_line_with, TelemetryConfig};

use crate::cmd::TelemetryArgs;
use crate::exit::{telemetry_error, CliResult, SUCCESS};
use crate::output::{print_records, OutputFormat};

pub fn run(args: TelemetryArgs, format: OutputFormat) -> CliResult<i32> {
    let config = TelemetryConfig {
        clamp_percentage: args.clamp,
        ..TelemetryConfig::default()
    };
    let records = parse_telemetry_line_with(&args.line, &config)
        .map_err(|err| telemetry_error("invalid telemetry line", err))?;
    print_records(&records, format);
    Ok(SUCCESS)
}
