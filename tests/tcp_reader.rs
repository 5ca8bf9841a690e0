use std::io::Write;
use std::net::{SocketAddr, TcpListener};
use std::thread;

use futures::StreamExt;
use gps_socket::client::{self, ReaderOptions, blocking::MessageReader};
use gps_socket::error::GpsSocketError;
use gps_socket::path::{self, Path};
use gps_socket::protocol::{GpsJsonEncode, Message};
use serde_json::json;

/// Accepts one connection, writes `bytes` in pieces of `piece` bytes and closes it
fn serve_once(bytes: Vec<u8>, piece: usize) -> (SocketAddr, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (mut socket, _) = listener.accept().unwrap();
        socket.set_nodelay(true).unwrap();
        for chunk in bytes.chunks(piece) {
            socket.write_all(chunk).unwrap();
            socket.flush().unwrap();
        }
    });

    (addr, handle)
}

fn telemetry() -> Vec<Message> {
    vec![
        json!({"Ubx": {"Nav": {"RelPosNed": {"i_tow": 1000, "rel_pos_n": 12, "rel_pos_e": -3}}}}),
        json!({"Ubx": {"Mon": {"Rf": {"blocks": [{"noise_per_ms": 82, "agc_cnt": 5000}]}}}}),
        json!({"Ubx": {"Nav": {"RelPosNed": {"i_tow": 1200, "rel_pos_n": 13, "rel_pos_e": -2}}}}),
    ]
}

fn encode(messages: &[Message]) -> Vec<u8> {
    let mut out = Vec::new();
    for msg in messages {
        out.write_message(msg).unwrap();
    }
    out
}

#[test]
fn blocking_reader_receives_all_messages() {
    let messages = telemetry();
    let (addr, server) = serve_once(encode(&messages), 7);

    let mut reader = MessageReader::connect(addr).unwrap();
    for expected in &messages {
        assert_eq!(&reader.read_message().unwrap(), expected);
    }
    assert!(matches!(
        reader.read_message(),
        Err(GpsSocketError::ConnectionClosed { pending: 0 })
    ));

    server.join().unwrap();
}

#[test]
fn blocking_reader_reports_truncated_frame() {
    let mut bytes = encode(&telemetry()[..1]);
    bytes.extend_from_slice(&[200, 0, 0, 0, b'{']);
    let (addr, server) = serve_once(bytes, 4096);

    let opts = ReaderOptions::default().chunk_size(16);
    let results: Vec<_> = MessageReader::connect_with(addr, opts).unwrap().collect();

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(GpsSocketError::ConnectionClosed { pending: 5 })
    ));

    server.join().unwrap();
}

#[test]
fn selected_fields_are_extracted_per_message() {
    let (addr, server) = serve_once(encode(&telemetry()), 1);
    let paths = Path::parse_list("Ubx.Nav.RelPosNed.i_tow,Ubx.Mon.Rf.blocks.0.noise_per_ms");

    let mut rows = Vec::new();
    for msg in MessageReader::connect(addr).unwrap() {
        let Ok(msg) = msg else { break };
        let fields = path::filter(&msg, &paths)
            .map(|field| field.map(|(key, value)| format!("{key}={value}")))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        rows.push(fields);
    }

    assert_eq!(
        rows,
        vec![
            vec!["Ubx.Nav.RelPosNed.i_tow=1000".to_string()],
            vec!["Ubx.Mon.Rf.blocks.0.noise_per_ms=82".to_string()],
            vec!["Ubx.Nav.RelPosNed.i_tow=1200".to_string()],
        ]
    );

    server.join().unwrap();
}

#[tokio::test]
async fn async_reader_streams_messages() {
    let messages = telemetry();
    let (addr, server) = serve_once(encode(&messages), 5);

    let reader = client::MessageReader::connect(addr).await.unwrap();
    let results: Vec<_> = reader.collect().await;

    assert_eq!(results.len(), messages.len() + 1);
    for (result, expected) in results.iter().zip(&messages) {
        assert_eq!(result.as_ref().unwrap(), expected);
    }
    assert!(matches!(
        results.last(),
        Some(Err(GpsSocketError::ConnectionClosed { .. }))
    ));

    tokio::task::spawn_blocking(move || server.join().unwrap())
        .await
        .unwrap();
}
