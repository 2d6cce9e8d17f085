//! Network sink tests against a local TCP listener
//!
//! These tests verify:
//! - One line per record on the wire
//! - Exactly one reconnect attempt per write on a dead connection
//! - A failed send tears the connection down
//! - The dispatcher keeps running through network failures

use rust_log_dispatcher::prelude::*;
use rust_log_dispatcher::ConnectionState;
use std::io::{BufRead, BufReader};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

fn listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// A port with nothing listening on it
fn dead_port() -> u16 {
    let (_listener, port) = listener();
    port
}

fn read_lines(stream: TcpStream, count: usize) -> Vec<String> {
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    BufReader::new(stream)
        .lines()
        .take(count)
        .map(|line| line.expect("Failed to read line"))
        .collect()
}

#[test]
fn test_dispatcher_delivers_lines_over_tcp() {
    let (listener, port) = listener();

    let sink = create_sink(&SinkConfig::network("127.0.0.1", port).with_level(LogLevel::Info))
        .expect("Failed to create sink");
    let (server_side, _) = listener.accept().unwrap();

    let mut dispatcher = Dispatcher::new(sink);
    dispatcher.start().expect("Failed to start");
    dispatcher.debug("filtered out");
    dispatcher.info("first");
    dispatcher.error("second");
    dispatcher.stop();

    let lines = read_lines(server_side, 2);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("] [INFO] first"));
    assert!(lines[1].ends_with("] [ERROR] second"));
    assert_eq!(dispatcher.history_count(), 3);
}

#[test]
fn test_reconnect_after_close_delivers() {
    let (listener, port) = listener();

    let sink = NetworkSink::new("127.0.0.1", port);
    sink.init().unwrap();
    let _first = listener.accept().unwrap();
    sink.close();
    assert_eq!(sink.state(), ConnectionState::Disconnected);

    let attempts = sink.connect_attempts();
    assert_eq!(sink.write(&LogRecord::info("after reconnect")).unwrap(), Delivery::Written);
    assert_eq!(sink.connect_attempts(), attempts + 1);
    assert_eq!(sink.state(), ConnectionState::Connected);

    let (second, _) = listener.accept().unwrap();
    let lines = read_lines(second, 1);
    assert!(lines[0].ends_with("[INFO] after reconnect"));
}

#[test]
fn test_failed_reconnect_returns_open_failed_once_per_write() {
    let (listener, port) = listener();

    let sink = NetworkSink::new("127.0.0.1", port);
    sink.init().unwrap();
    let _accepted = listener.accept().unwrap();
    drop(listener);
    sink.close();

    for _ in 0..3 {
        let attempts = sink.connect_attempts();
        let err = sink.write(&LogRecord::error("lost")).unwrap_err();
        assert!(err.is_open_failed());
        assert_eq!(sink.connect_attempts(), attempts + 1);
        assert_eq!(sink.state(), ConnectionState::Disconnected);
        assert!(!sink.is_connected());
    }
}

#[test]
fn test_uninitialized_sink_connects_on_first_write() {
    let (listener, port) = listener();

    let sink = NetworkSink::new("127.0.0.1", port);
    assert_eq!(sink.state(), ConnectionState::Uninitialized);
    sink.write(&LogRecord::info("lazy")).unwrap();
    assert_eq!(sink.connect_attempts(), 1);
    assert!(sink.is_initialized());

    let (server_side, _) = listener.accept().unwrap();
    assert!(read_lines(server_side, 1)[0].ends_with("[INFO] lazy"));
}

#[test]
fn test_send_failure_tears_down_then_reconnects() {
    let (listener, port) = listener();

    let sink = NetworkSink::new("127.0.0.1", port);
    sink.init().unwrap();
    let (peer, _) = listener.accept().unwrap();
    drop(peer);

    // The first send after the peer closes may still be accepted by the kernel;
    // a following one fails once the reset arrives.
    let mut failure = None;
    for _ in 0..50 {
        match sink.write(&LogRecord::info("into the void")) {
            Ok(_) => thread::sleep(Duration::from_millis(10)),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    let failure = failure.expect("send to a closed peer never failed");
    assert!(failure.is_write_failed());
    assert_eq!(sink.state(), ConnectionState::Disconnected);
    assert!(!sink.is_connected());

    let attempts = sink.connect_attempts();
    assert_eq!(sink.write(&LogRecord::info("back online")).unwrap(), Delivery::Written);
    assert_eq!(sink.connect_attempts(), attempts + 1);

    let (fresh, _) = listener.accept().unwrap();
    assert!(read_lines(fresh, 1)[0].ends_with("[INFO] back online"));
}

#[test]
fn test_factory_fails_fast_when_unreachable() {
    let result = create_sink(&SinkConfig::network("127.0.0.1", dead_port()));
    assert!(matches!(
        result,
        Err(DispatchError::Sink(SinkError::OpenFailed { .. }))
    ));
}

#[test]
fn test_dispatcher_survives_unreachable_server() {
    let (listener, port) = listener();

    let sink = create_sink(&SinkConfig::network("127.0.0.1", port)).expect("Failed to create sink");
    let (peer, _) = listener.accept().unwrap();
    drop(peer);
    drop(listener);

    let mut dispatcher = Dispatcher::new(sink);
    dispatcher.start().expect("Failed to start");
    for i in 0..20 {
        dispatcher.info(format!("Message {}", i));
        thread::sleep(Duration::from_millis(2));
    }
    dispatcher.stop();

    assert_eq!(dispatcher.history_count(), 20);
    let metrics = dispatcher.metrics();
    assert_eq!(metrics.delivered() + metrics.failed(), 20);
    assert!(metrics.failed() > 0, "a closed server should produce failures");
    assert!(!dispatcher.is_running());
}
