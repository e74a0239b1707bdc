//! Stream-level behavior of the codec: chunking, framing laws, and
//! recovery from unknown codes.

use assert_matches::assert_matches;
use bytes::BytesMut;
use pretty_assertions::assert_eq;

use miltwire_common::codec::MilterCodec;
use miltwire_common::commands::{Body, Connect, EndOfHeaders, Family, Header, Helo};
use miltwire_common::encoding::Writable;
use miltwire_common::modifications::ChangeSender;
use miltwire_common::optneg::Negotiate;
use miltwire_common::responses::{Continue, ReplyCode};
use miltwire_common::{Message, ProtocolError};

fn sample_stream() -> (Vec<Message>, BytesMut) {
    let messages: Vec<Message> = vec![
        Negotiate::default().into(),
        Connect::new(b"mail.example.com", Family::Inet, Some(25), b"192.0.2.1").into(),
        Helo::from(b"mail.example.com".as_slice()).into(),
        Header::new(b"Subject", b"hi").into(),
        EndOfHeaders.into(),
        Body::from(b"hello\r\n".as_slice()).into(),
        Continue.into(),
        ReplyCode::new(451, b"slow down").expect("code in range").into(),
        ChangeSender::new(b"u@e.com", Some(b"A=B")).into(),
    ];

    let codec = MilterCodec::default();
    let mut wire = BytesMut::new();
    for message in &messages {
        codec.encode(message, &mut wire).expect("messages fit");
    }

    (messages, wire)
}

#[test]
fn frame_size_law() {
    let (messages, wire) = sample_stream();

    let mut rest = &wire[..];
    for message in &messages {
        let size = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;

        assert_eq!(size, message.len() + 1);
        assert_eq!(rest[4], message.code());

        rest = &rest[4 + size..];
    }
    assert!(rest.is_empty());
}

#[test]
fn whole_stream_decodes_to_the_same_messages() {
    let (messages, wire) = sample_stream();

    let mut codec = MilterCodec::default();
    codec.feed(&wire);

    let decoded: Vec<Message> = codec
        .read_many()
        .collect::<Result<_, _>>()
        .expect("stream is well formed");

    assert_eq!(decoded, messages);
}

#[test]
fn chunked_feed_is_equivalent_to_feeding_at_once() {
    let (messages, wire) = sample_stream();

    // Any partition must produce the same message sequence; cover
    // several chunk sizes including pathological one-byte feeding.
    for chunk_size in [1, 2, 3, 5, 7, 16, wire.len()] {
        let mut codec = MilterCodec::default();
        let mut decoded = Vec::new();

        for chunk in wire.chunks(chunk_size) {
            codec.feed(chunk);
            for message in codec.read_many() {
                decoded.push(message.expect("stream is well formed"));
            }
        }

        assert_eq!(decoded, messages, "chunk size {chunk_size}");
    }
}

#[test]
fn unknown_code_does_not_poison_the_stream() {
    let mut codec = MilterCodec::default();

    // A frame with code 0xFF and arbitrary payload, then a valid one.
    codec.feed(&[0, 0, 0, 5, 0xFF, 1, 2, 3, 4]);
    codec.feed(&[0, 0, 0, 1, b'c']);

    let first = codec.read_one().expect("unknown codes are recoverable");
    assert_matches!(
        first,
        Some(Message::Unimplemented(u)) if u.tag() == 0xFF && u.payload() == [1, 2, 3, 4]
    );

    let second = codec.read_one().expect("stream continues");
    assert_matches!(second, Some(Message::Continue(_)));
}

#[test]
fn declared_giant_frame_is_rejected_without_buffering() {
    let mut codec = MilterCodec::default();

    codec.feed(&[0x80, 0x00, 0x00, 0x00, b'B']);

    assert_matches!(
        codec.read_one(),
        Err(ProtocolError::TooMuchData(len)) if len == 1 << 31
    );
}

#[test]
fn encode_decode_identity() {
    let (messages, _) = sample_stream();
    let codec = MilterCodec::default();

    for message in messages {
        let mut wire = BytesMut::new();
        codec.encode(&message, &mut wire).expect("messages fit");

        let mut decoder = MilterCodec::default();
        decoder.feed(&wire);
        let decoded = decoder
            .read_one()
            .expect("well formed")
            .expect("complete frame");

        assert_eq!(decoded, message);
    }
}

#[test]
fn change_sender_variants_stay_distinct() {
    let codec = MilterCodec::default();

    let without_args: Message = ChangeSender::new(b"u@e.com", None).into();
    let with_args: Message = ChangeSender::new(b"u@e.com", Some(b"A=B")).into();

    let mut plain = BytesMut::new();
    codec.encode(&without_args, &mut plain).expect("fits");
    let mut extended = BytesMut::new();
    codec.encode(&with_args, &mut extended).expect("fits");

    // One cstring vs two.
    assert_eq!(&plain[5..], b"u@e.com\0");
    assert_eq!(&extended[5..], b"u@e.com\0A=B\0");

    let mut decoder = MilterCodec::default();
    decoder.feed(&plain);
    decoder.feed(&extended);
    assert_eq!(decoder.read_one().unwrap().unwrap(), without_args);
    assert_eq!(decoder.read_one().unwrap().unwrap(), with_args);
}
