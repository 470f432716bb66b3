use std::io::{BufRead, Cursor, Read};
use std::sync::atomic::Ordering;

use oistream_frame::{FrameError, FrameReader, ParserConfig, SensorRegistry, StreamParser};
use tracing::info;

use crate::cmd::{install_ctrlc_handler, open_input, DecodeArgs};
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_frame, print_summary, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let input = open_input(args.input.as_deref())?;
    let source: Box<dyn Read> = if args.hex {
        Box::new(Cursor::new(read_hex(input)?))
    } else {
        Box::new(input)
    };

    let config = ParserConfig {
        emit_corrupt_frames: args.all,
        ..ParserConfig::default()
    };
    let parser = StreamParser::with_config(SensorRegistry::open_interface_shared(), config);
    let mut reader = FrameReader::with_parser(source, parser).with_chunk_size(args.chunk_size as usize);

    let running = install_ctrlc_handler()?;
    let mut printed = 0u64;

    while running.load(Ordering::SeqCst) {
        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => return Err(frame_error("read failed", err)),
        };

        printed = printed.saturating_add(1);
        print_frame(&frame, printed, format);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
    }

    let stats = reader.stats();
    info!(
        frames = stats.frames_emitted,
        skipped = stats.bytes_skipped,
        aborted = stats.frames_aborted,
        checksum_failures = stats.checksum_failures,
        "decode finished"
    );
    if args.stats {
        print_summary(stats, None, format);
    }

    Ok(SUCCESS)
}

/// Read hex text, ignoring whitespace and line breaks.
fn read_hex(mut input: Box<dyn BufRead>) -> CliResult<Vec<u8>> {
    let mut text = String::new();
    input
        .read_to_string(&mut text)
        .map_err(|err| io_error("failed reading input", err))?;
    decode_hex(&text)
}

fn decode_hex(text: &str) -> CliResult<Vec<u8>> {
    let digits: String = text.split_whitespace().collect();
    hex::decode(&digits).map_err(|err| CliError::new(DATA_INVALID, format!("invalid hex input: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_ignores_whitespace() {
        let bytes = decode_hex("13 08 2e0a07\n2f0ac8 0d01\t97\n").unwrap();
        assert_eq!(bytes, vec![19, 8, 46, 10, 7, 47, 10, 200, 13, 1, 151]);
    }

    #[test]
    fn hex_rejects_odd_digits() {
        let err = decode_hex("130").unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }
}
