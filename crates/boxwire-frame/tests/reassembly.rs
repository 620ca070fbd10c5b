use boxwire_frame::{ByteOrder, FieldType, Frame, FrameError, FrameKind, ParseOutcome};
use bytes::{Buf, BytesMut};
use proptest::prelude::*;

fn packet_kind() -> FrameKind {
    FrameKind::builder()
        .field("magic", FieldType::I32, 0x1234_5678)
        .field("packet_len", FieldType::I32, 0)
        .field("cmd", FieldType::I32, 0)
        .field("sn", FieldType::I32, 0)
        .build()
        .unwrap()
}

fn body_kind() -> FrameKind {
    FrameKind::builder()
        .field("magic", FieldType::U16, 0xB0C5)
        .field("flag", FieldType::I8, 0)
        .field("body_len", FieldType::U32, 0)
        .field("cmd", FieldType::U16, 0)
        .field("sn", FieldType::I64, 0)
        .byte_order(ByteOrder::Little)
        .build()
        .unwrap()
}

fn kinds() -> impl Strategy<Value = FrameKind> {
    prop_oneof![
        Just(packet_kind()),
        Just(body_kind()),
        Just(FrameKind::reference())
    ]
}

/// A frame with random in-range values for every stored field.
fn frames() -> impl Strategy<Value = Frame> {
    (
        kinds(),
        proptest::collection::vec(any::<i64>(), 8),
        proptest::collection::vec(any::<u8>(), 0..256),
    )
        .prop_map(|(kind, seeds, payload)| {
            let mut frame = kind.frame().with_payload(payload);
            let fields: Vec<_> = kind
                .fields()
                .iter()
                .filter(|f| f.name != "magic")
                .cloned()
                .collect();
            for (field, seed) in fields.iter().zip(seeds) {
                let value = seed.clamp(field.ty.min(), field.ty.max());
                frame.set(&field.name, value).unwrap();
            }
            frame
        })
}

proptest! {
    #[test]
    fn unpack_restores_packed_frame(frame in frames()) {
        let wire = frame.pack().unwrap();
        let mut parsed = frame.kind().frame();

        prop_assert_eq!(parsed.unpack(&wire).used(), Some(wire.len()));
        prop_assert_eq!(parsed, frame);
    }

    #[test]
    fn every_strict_prefix_is_incomplete(frame in frames()) {
        let wire = frame.pack().unwrap();
        let mut parsed = frame.kind().frame();
        let pristine = parsed.clone();

        for cut in 0..wire.len() {
            prop_assert!(parsed.unpack(&wire[..cut]).is_incomplete());
            prop_assert_eq!(&parsed, &pristine);
        }
    }

    #[test]
    fn trailing_bytes_do_not_change_used_length(
        frame in frames(),
        trailing in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let wire = frame.pack().unwrap();
        let mut buf = wire.to_vec();
        buf.extend_from_slice(&trailing);

        let mut parsed = frame.kind().frame();
        prop_assert_eq!(parsed.unpack(&buf).used(), Some(wire.len()));
        prop_assert_eq!(&buf[wire.len()..], trailing.as_slice());
        prop_assert_eq!(parsed, frame);
    }

    #[test]
    fn chunked_delivery_matches_single_shot(
        frame in frames(),
        chunk in 1usize..17,
    ) {
        let wire = frame.pack().unwrap();
        let mut buf = BytesMut::new();
        let mut parsed = frame.kind().frame();

        let mut outcome = parsed.unpack(&buf);
        for piece in wire.chunks(chunk) {
            prop_assert!(outcome.is_incomplete());
            buf.extend_from_slice(piece);
            outcome = parsed.unpack(&buf);
        }

        prop_assert_eq!(outcome.used(), Some(wire.len()));
        prop_assert_eq!(parsed, frame);
    }

    #[test]
    fn corrupted_magic_never_completes(frame in frames(), flip in 1u8..=255) {
        let kind = frame.kind().clone();
        let offset = kind.offset_of("magic").unwrap();
        let mut wire = frame.pack().unwrap().to_vec();
        wire[offset] ^= flip;

        let outcome = kind.check(&wire);
        prop_assert!(
            matches!(outcome, ParseOutcome::Error(FrameError::Verification(_))),
            "unexpected outcome {:?}",
            outcome
        );
    }
}

#[test]
fn stream_of_frames_drains_completely() {
    let kind = FrameKind::reference();
    let mut buf = BytesMut::new();
    for sn in 0..10 {
        Frame::with_fields(&kind, &[("cmd", 1), ("sn", sn)])
            .unwrap()
            .with_payload(vec![sn as u8; sn as usize])
            .pack_into(&mut buf)
            .unwrap();
    }

    let mut received = Vec::new();
    loop {
        let mut frame = kind.frame();
        match frame.unpack(&buf) {
            ParseOutcome::Complete(used) => {
                buf.advance(used);
                received.push(frame);
            }
            ParseOutcome::Incomplete => break,
            ParseOutcome::Error(err) => panic!("unexpected framing error: {err}"),
        }
    }

    assert!(buf.is_empty());
    assert_eq!(received.len(), 10);
    for (sn, frame) in received.iter().enumerate() {
        assert_eq!(frame.get("sn"), Some(sn as i64));
        assert_eq!(frame.payload().len(), sn);
    }
}

#[test]
fn kind_without_magic_accepts_any_header() {
    let kind = FrameKind::builder()
        .field("body_len", FieldType::U8, 0)
        .field("tag", FieldType::U8, 0)
        .build()
        .unwrap();

    assert_eq!(kind.check(&[0, 0xFF]).code(), 2);
    assert_eq!(kind.check(&[1, 0xAA, b'!']).code(), 3);
}

#[test]
fn custom_verifier_replaces_magic_check() {
    fn even_cmd(header: &boxwire_frame::Header<'_>) -> bool {
        header.get("cmd").is_some_and(|cmd| cmd % 2 == 0)
    }

    let kind = FrameKind::builder()
        .field("body_len", FieldType::U16, 0)
        .field("cmd", FieldType::U16, 0)
        .verifier(even_cmd)
        .build()
        .unwrap();

    let odd = Frame::with_fields(&kind, &[("cmd", 3)])
        .unwrap()
        .pack()
        .unwrap();
    let even = Frame::with_fields(&kind, &[("cmd", 4)])
        .unwrap()
        .pack()
        .unwrap();

    assert_eq!(kind.check(&odd).code(), -2);
    assert_eq!(kind.check(&even).code(), 4);
}
