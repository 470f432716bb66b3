use std::borrow::Cow;
use std::sync::mpsc::Receiver;

use bytes::Bytes;

use crate::error::Result;
use crate::topic::Topic;

/// One payload delivered by the broker, tagged with its logical topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The topic the payload arrived on.
    pub topic: Topic,
    /// The payload bytes, exactly as delivered.
    pub payload: Bytes,
}

impl Message {
    /// Create a new message.
    pub fn new(topic: Topic, payload: impl Into<Bytes>) -> Self {
        Self {
            topic,
            payload: payload.into(),
        }
    }

    /// The payload as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// A source of messages in delivery order.
///
/// Broker clients deliver from a callback thread; the usual adapter is an
/// `mpsc` channel, for which this trait is implemented directly.
pub trait MessageSource {
    /// Receive the next message.
    ///
    /// Returns `Ok(None)` once the source is exhausted or disconnected.
    fn recv(&mut self) -> Result<Option<Message>>;
}

impl<S: MessageSource + ?Sized> MessageSource for &mut S {
    fn recv(&mut self) -> Result<Option<Message>> {
        (**self).recv()
    }
}

impl MessageSource for Receiver<Message> {
    fn recv(&mut self) -> Result<Option<Message>> {
        Ok(Receiver::recv(self).ok())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn text_is_lossy() {
        let msg = Message::new(Topic::Telemetry, &b"TS;1\xff"[..]);
        assert_eq!(msg.text(), "TS;1\u{fffd}");
    }

    #[test]
    fn channel_receiver_drains_then_ends() {
        let (tx, mut rx) = mpsc::channel();
        tx.send(Message::new(Topic::SensorStream, vec![19u8, 0, 237]))
            .unwrap();
        tx.send(Message::new(Topic::Control, b"$".to_vec())).unwrap();
        drop(tx);

        let first = MessageSource::recv(&mut rx).unwrap().unwrap();
        assert_eq!(first.topic, Topic::SensorStream);
        assert_eq!(first.payload.as_ref(), &[19, 0, 237]);

        let second = MessageSource::recv(&mut rx).unwrap().unwrap();
        assert_eq!(second.topic, Topic::Control);

        assert!(MessageSource::recv(&mut rx).unwrap().is_none());
    }

    #[test]
    fn thread_delivery_preserves_order() {
        let (tx, mut rx) = mpsc::channel();
        let producer = std::thread::spawn(move || {
            for i in 0..32u8 {
                tx.send(Message::new(Topic::SensorStream, vec![i])).unwrap();
            }
        });

        let mut seen = Vec::new();
        while let Some(msg) = MessageSource::recv(&mut rx).unwrap() {
            seen.push(msg.payload[0]);
        }
        producer.join().unwrap();

        assert_eq!(seen, (0..32u8).collect::<Vec<_>>());
    }
}
