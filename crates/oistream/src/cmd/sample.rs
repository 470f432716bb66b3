use std::io::{self, Write};

use oistream_frame::{sample_records, FrameWriter, SampleValues};

use crate::cmd::SampleArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};

pub fn run(args: SampleArgs) -> CliResult<i32> {
    let values = SampleValues {
        current: i32::from(args.current),
        voltage: i32::from(args.voltage),
        virtual_wall: args.virtual_wall,
        ..SampleValues::default()
    };
    let records = sample_records(&values);

    let mut writer = FrameWriter::new(Vec::new());
    for _ in 0..args.count {
        writer
            .send(&records)
            .map_err(|err| frame_error("encode failed", err))?;
    }
    let bytes = writer.into_inner();

    let mut stdout = io::stdout().lock();
    let written = if args.hex {
        writeln!(stdout, "{}", hex::encode(&bytes))
    } else {
        stdout.write_all(&bytes)
    };
    written
        .and_then(|()| stdout.flush())
        .map_err(|err| io_error("failed writing output", err))?;

    Ok(SUCCESS)
}
