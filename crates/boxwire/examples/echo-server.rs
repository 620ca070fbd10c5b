//! Minimal echo server: accepts one TCP client and answers every request
//! with a response that carries the same `cmd`/`sn` and `ret = 0`.
//!
//! Run with:
//!   cargo run --example echo-server
//!
//! In another terminal:
//!   cargo run --features cli -- --format raw pack --set cmd=1 --set sn=7 --data hi \
//!     | nc -q 1 127.0.0.1 7878 | xxd -p | cargo run --features cli -- decode

use std::net::TcpListener;

use boxwire::{FrameError, FrameKind, FrameReader, FrameWriter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let kind = FrameKind::reference();
    let listener = TcpListener::bind("127.0.0.1:7878")?;
    eprintln!("Listening on {}", listener.local_addr()?);

    let (stream, addr) = listener.accept()?;
    eprintln!("Client connected: {addr}");

    let mut reader = FrameReader::new(stream.try_clone()?, &kind);
    let mut writer = FrameWriter::new(stream);

    loop {
        match reader.read_frame() {
            Ok(request) => {
                eprintln!(
                    "Received cmd={:?} sn={:?} ({} payload bytes)",
                    request.get("cmd"),
                    request.get("sn"),
                    request.payload().len()
                );
                let response = request
                    .map(&[("ret", 0)])?
                    .with_payload(request.payload().clone());
                writer.write_frame(&response)?;
            }
            Err(FrameError::ConnectionClosed) => {
                eprintln!("Client disconnected");
                break;
            }
            Err(e) => {
                eprintln!("Dropping client: {e}");
                break;
            }
        }
    }

    Ok(())
}
