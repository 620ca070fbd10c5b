use boxwire_frame::{Frame, FrameKind};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cmd::{read_hex_input, DecodeArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_frame, print_json, FrameOutput, OutputFormat};

#[derive(Serialize)]
struct DecodeOutput<'a> {
    frames: Vec<FrameOutput<'a>>,
    consumed: usize,
    remaining: usize,
}

pub fn run(args: DecodeArgs, kind: &FrameKind, format: OutputFormat) -> CliResult<i32> {
    let buf = read_hex_input(args.hex)?;
    let (frames, consumed, failure) = split_frames(kind, &buf);

    let remaining = buf.len() - consumed;
    match format {
        OutputFormat::Json => print_json(&DecodeOutput {
            frames: frames
                .iter()
                .map(|(offset, frame)| FrameOutput::new(frame, *offset))
                .collect(),
            consumed,
            remaining,
        }),
        _ => {
            for (offset, frame) in &frames {
                print_frame(&FrameOutput::new(frame, *offset), format);
            }
        }
    }

    if let Some(err) = failure {
        return Err(frame_error(&format!("frame at offset {consumed}"), err));
    }
    if remaining > 0 {
        warn!(remaining, "trailing bytes do not form a complete frame");
    }
    Ok(SUCCESS)
}

/// Take complete frames off the front of `buf` until it runs dry or a
/// frame is rejected.
fn split_frames(
    kind: &FrameKind,
    buf: &[u8],
) -> (Vec<(usize, Frame)>, usize, Option<boxwire_frame::FrameError>) {
    let mut frames = Vec::new();
    let mut offset = 0usize;

    loop {
        match kind.parse(&buf[offset..]) {
            Ok(Some((frame, used))) => {
                debug!(offset, used, "decoded frame");
                frames.push((offset, frame));
                offset += used;
            }
            Ok(None) => return (frames, offset, None),
            Err(err) => return (frames, offset, Some(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use boxwire_frame::FrameError;

    use super::*;

    #[test]
    fn splits_back_to_back_frames_and_reports_tail() {
        let kind = FrameKind::reference();
        let mut buf = Vec::new();
        for sn in 0..3 {
            let frame = Frame::with_fields(&kind, &[("sn", sn)]).unwrap();
            buf.extend_from_slice(&frame.pack().unwrap());
        }
        buf.extend_from_slice(&[0x12, 0x34]);

        let (frames, consumed, failure) = split_frames(&kind, &buf);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].0, 52);
        assert_eq!(consumed, 78);
        assert!(failure.is_none());
    }

    #[test]
    fn stops_at_first_rejected_frame() {
        let kind = FrameKind::reference();
        let wire = kind.frame().pack().unwrap();
        let mut buf = wire.to_vec();
        buf.extend_from_slice(&wire);
        buf[26] = 0;

        let (frames, consumed, failure) = split_frames(&kind, &buf);
        assert_eq!(frames.len(), 1);
        assert_eq!(consumed, 26);
        assert!(matches!(failure, Some(FrameError::Verification(_))));
    }
}
