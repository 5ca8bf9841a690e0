use std::io::{self, Read};

use gps_socket::client::blocking::MessageReader;
use gps_socket::error::GpsSocketError;
use gps_socket::protocol::{FrameDecoder, Message, encode_frame};
use proptest::prelude::*;
use serde_json::json;

/// Yields the wrapped bytes in chunks of the given sizes, cycling through them
struct Chunked {
    bytes: Vec<u8>,
    pos: usize,
    sizes: Vec<usize>,
    turn: usize,
}

impl Read for Chunked {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let size = self.sizes[self.turn % self.sizes.len()];
        self.turn += 1;

        let n = size.min(buf.len()).min(self.bytes.len() - self.pos);
        buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

fn arb_message() -> impl Strategy<Value = Message> {
    prop_oneof![
        any::<String>().prop_map(Message::from),
        any::<i64>().prop_map(Message::from),
        any::<bool>().prop_map(Message::from),
        ("[a-z_]{1,8}", any::<u32>(), prop::collection::vec(any::<i32>(), 0..8))
            .prop_map(|(key, i_tow, xs)| json!({ key: { "i_tow": i_tow, "xs": xs } })),
    ]
}

fn encode_all(messages: &[Message]) -> Vec<u8> {
    let mut out = Vec::new();
    for msg in messages {
        encode_frame(msg.to_string().as_bytes(), &mut out).unwrap();
    }
    out
}

proptest! {
    #[test]
    fn prop_text_round_trips(s in any::<String>()) {
        let mut bytes = Vec::new();
        encode_frame(s.as_bytes(), &mut bytes).unwrap();

        let mut decoder = FrameDecoder::new();
        decoder.extend(&bytes);
        prop_assert_eq!(decoder.next_frame().unwrap(), Some(s));
        prop_assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn prop_chunking_does_not_change_messages(
        messages in prop::collection::vec(arb_message(), 1..8),
        sizes in prop::collection::vec(1..40usize, 1..8),
    ) {
        let bytes = encode_all(&messages);
        let total = bytes.len();
        let mut reader = MessageReader::open(Chunked { bytes, pos: 0, sizes, turn: 0 });

        for expected in &messages {
            prop_assert_eq!(&reader.read_message().unwrap(), expected);
        }
        prop_assert_eq!(reader.buffered(), 0);
        prop_assert_eq!(reader.get_ref().pos, total);
        let closed = matches!(
            reader.read_message(),
            Err(GpsSocketError::ConnectionClosed { pending: 0 })
        );
        prop_assert!(closed);
    }

    #[test]
    fn prop_decoder_matches_whole_stream(
        messages in prop::collection::vec(arb_message(), 1..8),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..16),
    ) {
        let bytes = encode_all(&messages);

        let mut whole = FrameDecoder::new();
        whole.extend(&bytes);
        let mut expected = Vec::new();
        while let Some(frame) = whole.next_frame().unwrap() {
            expected.push(frame);
        }

        let mut offsets: Vec<usize> = cuts.iter().map(|i| i.index(bytes.len())).collect();
        offsets.push(bytes.len());
        offsets.sort_unstable();

        let mut split = FrameDecoder::new();
        let mut actual = Vec::new();
        let mut start = 0;
        for end in offsets {
            split.extend(&bytes[start..end]);
            start = end;
            while let Some(frame) = split.next_frame().unwrap() {
                actual.push(frame);
            }
        }

        prop_assert_eq!(actual, expected);
        prop_assert!(split.is_empty());
    }

    #[test]
    fn prop_partial_header_never_yields(prefix in prop::collection::vec(any::<u8>(), 1..4)) {
        let mut decoder = FrameDecoder::new();
        decoder.extend(&prefix);
        prop_assert_eq!(decoder.next_payload(), None);
        prop_assert_eq!(decoder.buffered(), prefix.len());
    }

    #[test]
    fn prop_partial_body_keeps_header(s in "\\PC{1,64}", keep in any::<prop::sample::Index>()) {
        let mut bytes = Vec::new();
        encode_frame(s.as_bytes(), &mut bytes).unwrap();
        let cut = 4 + keep.index(s.len());

        let mut decoder = FrameDecoder::new();
        decoder.extend(&bytes[..cut]);
        prop_assert_eq!(decoder.next_payload(), None);
        prop_assert_eq!(decoder.buffered(), cut);

        decoder.extend(&bytes[cut..]);
        prop_assert_eq!(decoder.next_frame().unwrap(), Some(s));
    }
}
