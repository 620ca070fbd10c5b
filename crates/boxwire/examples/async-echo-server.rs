//! Async echo server using `BoxCodec` with `tokio_util::codec::Framed`.
//!
//! Run with:
//!   cargo run --example async-echo-server --features async

use boxwire::{BoxCodec, FrameKind};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_util::codec::Framed;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let kind = FrameKind::reference();
    let listener = TcpListener::bind("127.0.0.1:7879").await?;
    eprintln!("Listening on {}", listener.local_addr()?);

    loop {
        let (stream, addr) = listener.accept().await?;
        let kind = kind.clone();

        tokio::spawn(async move {
            let mut framed = Framed::new(stream, BoxCodec::new(&kind));
            while let Some(next) = framed.next().await {
                let request = match next {
                    Ok(frame) => frame,
                    Err(e) => {
                        eprintln!("{addr}: dropping client: {e}");
                        return;
                    }
                };

                let response = match request.map(&[("ret", 0)]) {
                    Ok(frame) => frame.with_payload(request.payload().clone()),
                    Err(e) => {
                        eprintln!("{addr}: {e}");
                        return;
                    }
                };
                if let Err(e) = framed.send(response).await {
                    eprintln!("{addr}: send failed: {e}");
                    return;
                }
            }
            eprintln!("{addr}: disconnected");
        });
    }
}
