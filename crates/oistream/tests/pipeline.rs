#![cfg(feature = "telemetry")]

use std::io::Cursor;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use oistream::frame::{SensorFrame, StreamParser};
use oistream::telemetry::{parse_control, parse_telemetry_line, BoardConfig, SensorBoard};
use oistream::transport::{CaptureSource, CapturedMessage, Message, MessageSource, Topic};

fn drive<S: MessageSource>(mut source: S, board: &mut SensorBoard, start: Instant) -> StreamParser {
    let mut parser = StreamParser::new();
    let mut frames = Vec::new();
    let mut tick = 0u64;

    while let Some(message) = source.recv().expect("source should not fail") {
        tick += 1;
        let now = start + Duration::from_millis(tick * 100);
        match message.topic {
            Topic::SensorStream => {
                parser.parse(&message.payload, &mut frames);
                for frame in frames.drain(..) {
                    board.apply_frame(&frame, now);
                }
            }
            Topic::Telemetry => {
                if let Ok(records) = parse_telemetry_line(&message.text()) {
                    board.apply_telemetry(records);
                }
            }
            Topic::Control => {
                if let Some(position) = parse_control(&message.payload) {
                    board.apply_control(position);
                }
            }
            Topic::Other(_) => {}
        }
    }
    parser
}

fn voltage_frame(high: u8, low: u8) -> Vec<u8> {
    let mut bytes = vec![19, 3, 22, high, low];
    let sum = bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    bytes.push(0u8.wrapping_sub(sum));
    bytes
}

#[test]
fn capture_replay_throttles_stream_refreshes() {
    let capture: Vec<String> = (0..5u8)
        .map(|i| CapturedMessage::binary("robot/stream", &voltage_frame(0x3A, i)).to_line())
        .collect();
    let source = CaptureSource::new(Cursor::new(capture.join("\n")));

    let mut board = SensorBoard::new();
    let parser = drive(source, &mut board, Instant::now());

    // Messages land 100 ms apart; only every third one clears 250 ms.
    assert_eq!(parser.stats().frames_emitted, 5);
    assert_eq!(board.stats().frames_applied, 2);
    assert_eq!(board.stats().frames_throttled, 3);
    assert_eq!(board.records()[0].value, 0x3A03);
}

#[test]
fn channel_source_mixes_topics() {
    let (tx, rx) = mpsc::channel();
    let frame = voltage_frame(0x3A, 0x98);
    let (head, tail) = frame.split_at(3);
    tx.send(Message::new(Topic::SensorStream, head.to_vec())).unwrap();
    tx.send(Message::new(Topic::SensorStream, tail.to_vec())).unwrap();
    tx.send(Message::new(Topic::Control, b"$\x05\x00\xc8".to_vec())).unwrap();
    tx.send(Message::new(Topic::Telemetry, b"TS;5;-70;4.2;1.5;300".to_vec())).unwrap();
    drop(tx);

    let mut board = SensorBoard::with_config(BoardConfig {
        refresh_interval: Duration::ZERO,
    });
    let parser = drive(rx, &mut board, Instant::now());

    assert_eq!(parser.stats().frames_emitted, 1);
    assert_eq!(board.stats().frames_applied, 1);
    let joystick = board.joystick().expect("joystick set");
    assert_eq!((joystick.x, joystick.y), (1.0, -1.0));

    // Telemetry replaced the stream records.
    let percent = board.records().iter().find(|r| r.id == 25).expect("percentage");
    assert_eq!(percent.value, 100);
}

#[test]
fn malformed_telemetry_keeps_previous_records() {
    let lines = [
        CapturedMessage::text("robot/telemetry", "TS;1000;-60;3.7;0.5;120").to_line(),
        CapturedMessage::text("robot/telemetry", "TS;1000;-60;abc;0.5;120").to_line(),
        CapturedMessage::text("robot/telemetry", "TS;1000;-60").to_line(),
    ];
    let source = CaptureSource::new(Cursor::new(lines.join("\n")));

    let mut board = SensorBoard::new();
    drive(source, &mut board, Instant::now());

    let expected = parse_telemetry_line("TS;1000;-60;3.7;0.5;120").expect("valid line");
    assert_eq!(board.records(), expected.as_slice());
    assert_eq!(board.stats().telemetry_updates, 1);
}

#[test]
fn listener_closure_sees_frames() {
    let mut seen: Vec<SensorFrame> = Vec::new();
    let mut parser = StreamParser::new();
    let bytes = voltage_frame(0x00, 0x10);
    parser.parse(&bytes, &mut |frame: SensorFrame| seen.push(frame));
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].get(22).map(|s| s.value), Some(16));
}
