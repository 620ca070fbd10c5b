//! `tokio_util` codec adapter (requires the `async` feature).

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{FrameError, Result};
use crate::frame::Frame;
use crate::kind::FrameKind;

/// Decodes and encodes frames of one kind for `Framed*` streams.
///
/// Framing errors are returned from `decode`, which ends the stream.
#[derive(Debug, Clone)]
pub struct BoxCodec {
    kind: FrameKind,
}

impl BoxCodec {
    pub fn new(kind: &FrameKind) -> Self {
        Self { kind: kind.clone() }
    }

    pub fn kind(&self) -> &FrameKind {
        &self.kind
    }
}

impl Decoder for BoxCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        match self.kind.parse(src)? {
            Some((frame, used)) => {
                src.advance(used);
                Ok(Some(frame))
            }
            None => {
                if src.len() < self.kind.header_len() {
                    src.reserve(self.kind.header_len() - src.len());
                }
                Ok(None)
            }
        }
    }
}

impl Encoder<Frame> for BoxCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<()> {
        item.pack_into(dst)
    }
}

impl Encoder<&Frame> for BoxCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &Frame, dst: &mut BytesMut) -> Result<()> {
        item.pack_into(dst)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use futures_util::{SinkExt, StreamExt};
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;

    fn request(kind: &FrameKind, sn: i64) -> Frame {
        Frame::with_fields(kind, &[("cmd", 2), ("sn", sn)])
            .unwrap()
            .with_payload(Bytes::from(format!("req-{sn}")))
    }

    #[test]
    fn decode_waits_for_full_frame_and_keeps_trailing_bytes() {
        let kind = FrameKind::reference();
        let mut codec = BoxCodec::new(&kind);
        let first = request(&kind, 1).pack().unwrap();
        let second = request(&kind, 2).pack().unwrap();

        let mut src = BytesMut::new();
        src.extend_from_slice(&first[..10]);
        assert!(codec.decode(&mut src).unwrap().is_none());
        assert_eq!(src.len(), 10);

        src.extend_from_slice(&first[10..]);
        src.extend_from_slice(&second[..3]);
        let frame = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(frame.get("sn"), Some(1));
        assert_eq!(src.as_ref(), &second[..3]);
    }

    #[test]
    fn decode_surfaces_verification_error() {
        let kind = FrameKind::reference();
        let mut codec = BoxCodec::new(&kind);
        let mut src = BytesMut::from(request(&kind, 1).pack().unwrap().as_ref());
        src[0] = 0;

        assert!(matches!(
            codec.decode(&mut src),
            Err(FrameError::Verification(_))
        ));
    }

    #[tokio::test]
    async fn framed_roundtrip() {
        let kind = FrameKind::reference();

        let mut sink = FramedWrite::new(Vec::new(), BoxCodec::new(&kind));
        for sn in 0..3 {
            sink.send(request(&kind, sn)).await.unwrap();
        }
        let wire = sink.into_inner();

        let mut stream = FramedRead::new(wire.as_slice(), BoxCodec::new(&kind));
        for sn in 0..3 {
            let frame = stream.next().await.unwrap().unwrap();
            assert_eq!(frame, request(&kind, sn));
        }
        assert!(stream.next().await.is_none());
    }
}
