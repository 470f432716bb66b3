use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use oistream_frame::{SensorFrame, StreamParser};
use oistream_telemetry::{parse_control, parse_telemetry_line, BoardConfig, SensorBoard};
use oistream_transport::{CaptureSource, MessageSource, Topic, TopicConfig};
use tracing::{debug, warn};

use crate::cmd::{install_ctrlc_handler, open_input, ReplayArgs};
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_board, print_summary, OutputFormat};

pub fn run(args: ReplayArgs, format: OutputFormat) -> CliResult<i32> {
    let topics = TopicConfig {
        telemetry: args.topic_telemetry,
        control: args.topic_control,
        stream: args.topic_stream,
    };
    let input = open_input(Some(&args.capture))?;
    let mut source = CaptureSource::with_topics(input, topics);

    let mut parser = StreamParser::new();
    let mut board = SensorBoard::with_config(BoardConfig {
        refresh_interval: Duration::from_millis(args.refresh_ms),
    });
    let mut frames: Vec<SensorFrame> = Vec::new();

    let running = install_ctrlc_handler()?;

    while running.load(Ordering::SeqCst) {
        let Some(message) = source
            .recv()
            .map_err(|err| transport_error("replay failed", err))?
        else {
            break;
        };

        match &message.topic {
            Topic::SensorStream => {
                parser.parse(&message.payload, &mut frames);
                for frame in frames.drain(..) {
                    if board.apply_frame(&frame, Instant::now()) {
                        print_board(&board, "stream", format);
                    }
                }
            }
            Topic::Telemetry => match parse_telemetry_line(&message.text()) {
                Ok(records) => {
                    board.apply_telemetry(records);
                    print_board(&board, "telemetry", format);
                }
                Err(err) => warn!(
                    line = source.line(),
                    topic = source.topics().name_of(&message.topic),
                    error = %err,
                    "skipping telemetry line"
                ),
            },
            Topic::Control => match parse_control(&message.payload) {
                Some(position) => {
                    board.apply_control(position);
                    print_board(&board, "control", format);
                }
                None => debug!(
                    line = source.line(),
                    topic = source.topics().name_of(&message.topic),
                    "ignoring control message"
                ),
            },
            Topic::Other(name) => debug!(topic = %name, "ignoring message on unknown topic"),
        }
    }

    print_summary(parser.stats(), Some(board.stats()), format);
    Ok(SUCCESS)
}
