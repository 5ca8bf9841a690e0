use std::net::IpAddr;

use clap::Parser;

use futures::StreamExt;
use gps_socket::{
    client::MessageReader,
    path::{self, Path},
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "127.0.0.1")]
    addr: IpAddr,
    #[arg(short, long, default_value = "9165")]
    port: u16,
    /// Comma-separated dotted paths to print; prints whole messages when empty
    #[arg(short, long, default_value = "")]
    fields: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let fields = Path::parse_list(&args.fields);

    let mut reader = MessageReader::connect(format!("{}:{}", args.addr, args.port))
        .await
        .unwrap();

    loop {
        match reader.next().await {
            Some(Ok(msg)) if fields.is_empty() => println!("{msg}"),
            Some(Ok(msg)) => {
                let line: Vec<String> = path::filter(&msg, &fields)
                    .filter_map(|field| field.ok())
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect();
                if !line.is_empty() {
                    println!("{}", line.join(" "));
                }
            }
            Some(Err(e)) => {
                eprintln!("Error receiving message: {e}");
                return;
            }
            None => {
                eprintln!("Stream ended unexpectedly");
                return;
            }
        }
    }
}
