//! Serves JSON lines read from stdin as frames to a single client.
//!
//! ```text
//! cargo run --example replay_server < capture.jsonl
//! cargo run --example field_monitor -- --fields Ubx.Nav.RelPosNed.i_tow
//! ```

use std::io::BufRead;
use std::net::{IpAddr, TcpListener};

use clap::Parser;
use gps_socket::protocol::{GpsJsonEncode, Message};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "127.0.0.1")]
    addr: IpAddr,
    #[arg(short, long, default_value = "9165")]
    port: u16,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let listener = TcpListener::bind((args.addr, args.port)).unwrap();
    info!(addr = %listener.local_addr().unwrap(), "waiting for a client");

    let (mut socket, peer) = listener.accept().unwrap();
    info!(%peer, "client connected");

    for line in std::io::stdin().lock().lines() {
        let line = line.unwrap();
        if line.trim().is_empty() {
            continue;
        }

        let msg: Message = match serde_json::from_str(&line) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "skipping line that is not JSON");
                continue;
            }
        };

        if let Err(e) = socket.write_message(&msg) {
            eprintln!("Error sending message: {e}");
            return;
        }
    }
    info!("input exhausted, closing connection");
}
