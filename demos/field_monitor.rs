use std::net::IpAddr;

use clap::Parser;
use gps_socket::{
    client::{ReaderOptions, blocking},
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
    /// Comma-separated dotted paths to print, e.g. Ubx.Nav.RelPosNed.i_tow
    #[arg(short, long, default_value = "Ubx.Nav.RelPosNed.i_tow")]
    fields: String,
    /// Dotted path of a numeric field to keep a running average of
    #[arg(long)]
    average: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let fields = Path::parse_list(&args.fields);
    let average = args.average.as_deref().map(Path::parse);

    let reader = blocking::MessageReader::connect_with(
        format!("{}:{}", args.addr, args.port),
        ReaderOptions::default(),
    )
    .unwrap();

    let (mut sum, mut count) = (0.0, 0u64);

    for msg in reader {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                eprintln!("Error receiving message: {e}");
                return;
            }
        };

        for field in path::filter(&msg, &fields) {
            match field {
                Ok((key, value)) => println!("{key}: {value}"),
                Err(e) => eprintln!("Error extracting field: {e}"),
            }
        }

        if let Some(avg) = &average {
            if let Ok(Some(value)) = path::lookup(&msg, avg) {
                if let Some(value) = value.as_f64() {
                    sum += value;
                    count += 1;
                    println!("{avg} average over {count}: {:.3}", sum / count as f64);
                }
            }
        }
    }
}
