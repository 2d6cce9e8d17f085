//! Network sink for remote logging
//!
//! Sends one formatted line per record to a remote server over TCP. The connection
//! is established lazily and torn down on the first failed send, so the next write
//! makes a single reconnect attempt instead of failing against a dead socket.

use crate::core::timestamp::format_line_at;
use crate::core::{Delivery, LevelThreshold, LogLevel, LogRecord, Sink, SinkError};
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Default socket write timeout
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default limit for a single connection attempt
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle of the sink's connection
///
/// `Uninitialized` and `Disconnected` behave the same on the next write: both lead
/// to one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Uninitialized,
    Connected,
    Disconnected,
    Closed,
}

struct Connection {
    stream: Option<TcpStream>,
    state: ConnectionState,
}

impl Connection {
    fn teardown(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        if self.state == ConnectionState::Connected {
            self.state = ConnectionState::Disconnected;
        }
    }
}

/// Network sink that sends logs to a remote TCP server
///
/// # Example
///
/// ```no_run
/// use rust_log_dispatcher::sinks::NetworkSink;
/// use rust_log_dispatcher::{LogLevel, LogRecord, Sink};
///
/// let sink = NetworkSink::new("127.0.0.1", 5140).with_level(LogLevel::Debug);
/// sink.init().expect("log server unreachable");
/// sink.write(&LogRecord::error("disk failure")).unwrap();
/// ```
pub struct NetworkSink {
    host: String,
    port: u16,
    threshold: LevelThreshold,
    write_timeout: Option<Duration>,
    connect_timeout: Duration,
    connection: Mutex<Connection>,
    initialized: AtomicBool,
    connect_attempts: AtomicU64,
}

impl NetworkSink {
    /// Create a sink for `host:port` without connecting
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            threshold: LevelThreshold::default(),
            write_timeout: Some(DEFAULT_WRITE_TIMEOUT),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            connection: Mutex::new(Connection {
                stream: None,
                state: ConnectionState::Uninitialized,
            }),
            initialized: AtomicBool::new(false),
            connect_attempts: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_level(self, level: LogLevel) -> Self {
        self.threshold.set(level);
        self
    }

    /// Set the socket write timeout; `None` blocks indefinitely
    ///
    /// Default: 5 seconds
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Limit each connection attempt, per resolved address
    ///
    /// Default: 5 seconds. A zero duration is raised to one millisecond.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout.max(Duration::from_millis(1));
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// First connection attempt; succeeds immediately when already connected
    pub fn init(&self) -> Result<(), SinkError> {
        let mut connection = self.connection.lock();
        if connection.stream.is_some() {
            return Ok(());
        }
        self.connect_locked(&mut connection)
    }

    /// Drop any existing connection and connect again
    pub fn reconnect(&self) -> Result<(), SinkError> {
        let mut connection = self.connection.lock();
        self.connect_locked(&mut connection)
    }

    /// Close the connection; the next accepted write reconnects
    pub fn close(&self) {
        self.connection.lock().teardown();
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.lock().state
    }

    pub fn is_connected(&self) -> bool {
        self.connection.lock().stream.is_some()
    }

    /// True once any connection attempt has succeeded
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Number of connection attempts made so far, successful or not
    pub fn connect_attempts(&self) -> u64 {
        self.connect_attempts.load(Ordering::Relaxed)
    }

    fn connect_locked(&self, connection: &mut Connection) -> Result<(), SinkError> {
        connection.teardown();
        self.connect_attempts.fetch_add(1, Ordering::Relaxed);

        match self.open_stream() {
            Ok(stream) => {
                tracing::debug!(sink = "network", endpoint = %self.target(), "connected");
                connection.stream = Some(stream);
                connection.state = ConnectionState::Connected;
                self.initialized.store(true, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(sink = "network", endpoint = %self.target(), error = %e, "connect failed");
                Err(SinkError::open_failed(self.target(), e))
            }
        }
    }

    fn open_stream(&self) -> io::Result<TcpStream> {
        let mut last_error = None;
        for addr in (self.host.as_str(), self.port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => return self.configure(stream),
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses")
        }))
    }

    fn configure(&self, stream: TcpStream) -> io::Result<TcpStream> {
        stream.set_write_timeout(self.write_timeout)?;
        // Enable TCP_NODELAY for low-latency logging
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

impl Sink for NetworkSink {
    fn write_at(&self, record: &LogRecord, at: &DateTime<Local>) -> Result<Delivery, SinkError> {
        if !self.threshold.accepts(record.level()) {
            return Ok(Delivery::Filtered);
        }

        let mut line = format_line_at(record, at);
        line.push('\n');

        let mut connection = self.connection.lock();
        if connection.stream.is_none() {
            // Exactly one attempt per write; no loop, no backoff
            self.connect_locked(&mut connection)?;
        }

        let result = match connection.stream.as_mut() {
            Some(stream) => stream.write_all(line.as_bytes()),
            None => Err(io::Error::from(io::ErrorKind::NotConnected)),
        };

        match result {
            Ok(()) => Ok(Delivery::Written),
            Err(e) => {
                tracing::warn!(sink = "network", endpoint = %self.target(), error = %e, "send failed, dropping connection");
                connection.teardown();
                Err(SinkError::write_failed(self.target(), e))
            }
        }
    }

    fn set_level(&self, level: LogLevel) {
        self.threshold.set(level);
    }

    fn level(&self) -> LogLevel {
        self.threshold.get()
    }

    fn type_tag(&self) -> &'static str {
        "network"
    }

    fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn flush(&self) -> Result<(), SinkError> {
        let mut connection = self.connection.lock();
        if let Some(ref mut stream) = connection.stream {
            stream
                .flush()
                .map_err(|e| SinkError::write_failed(self.target(), e))?;
        }
        Ok(())
    }
}

impl Drop for NetworkSink {
    fn drop(&mut self) {
        let connection = self.connection.get_mut();
        connection.teardown();
        connection.state = ConnectionState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;

    fn dead_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn test_new_does_not_connect() {
        let sink = NetworkSink::new("127.0.0.1", dead_port());
        assert_eq!(sink.state(), ConnectionState::Uninitialized);
        assert!(!sink.is_initialized());
        assert_eq!(sink.connect_attempts(), 0);
        assert_eq!(sink.type_tag(), "network");
    }

    #[test]
    fn test_init_fails_without_server() {
        let sink = NetworkSink::new("127.0.0.1", dead_port());
        let err = sink.init().unwrap_err();
        assert!(err.is_open_failed());
        assert_eq!(sink.state(), ConnectionState::Uninitialized);
        assert!(!sink.is_connected());
    }

    #[test]
    fn test_init_is_idempotent() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let sink = NetworkSink::new("127.0.0.1", port);
        sink.init().unwrap();
        sink.init().unwrap();
        assert_eq!(sink.connect_attempts(), 1);
        assert_eq!(sink.state(), ConnectionState::Connected);
        assert!(sink.is_initialized());
    }

    #[test]
    fn test_filtered_write_never_connects() {
        let sink = NetworkSink::new("127.0.0.1", dead_port()).with_level(LogLevel::Error);
        assert_eq!(sink.write(&LogRecord::info("skip")).unwrap(), Delivery::Filtered);
        assert_eq!(sink.connect_attempts(), 0);
    }

    #[test]
    fn test_write_sends_one_line() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let sink = NetworkSink::new("127.0.0.1", port);
        sink.init().unwrap();
        let (server_side, _) = listener.accept().unwrap();

        sink.write(&LogRecord::info("over the wire")).unwrap();

        let mut line = String::new();
        BufReader::new(server_side).read_line(&mut line).unwrap();
        assert!(line.ends_with("] [INFO] over the wire\n"));
    }

    #[test]
    fn test_close_moves_to_disconnected() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let sink = NetworkSink::new("127.0.0.1", port);
        sink.init().unwrap();
        sink.close();
        assert_eq!(sink.state(), ConnectionState::Disconnected);
        assert!(!sink.is_connected());
        assert!(sink.is_initialized());
    }

    #[test]
    fn test_connect_attempt_is_bounded() {
        // Non-routable address: either refused at once or cut off by the timeout
        let sink = NetworkSink::new("10.255.255.1", 9)
            .with_connect_timeout(Duration::from_millis(200));

        let started = std::time::Instant::now();
        let err = sink.init().unwrap_err();
        assert!(err.is_open_failed());
        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!(sink.connect_attempts(), 1);
    }

    #[test]
    fn test_concurrent_writers_produce_whole_lines() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 100;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let sink = NetworkSink::new("127.0.0.1", port);
        sink.init().unwrap();
        let (server_side, _) = listener.accept().unwrap();
        let reader = std::thread::spawn(move || {
            BufReader::new(server_side)
                .lines()
                .map(|line| line.unwrap())
                .collect::<Vec<_>>()
        });

        std::thread::scope(|scope| {
            for t in 0..THREADS {
                let sink = &sink;
                scope.spawn(move || {
                    for m in 0..PER_THREAD {
                        let record = LogRecord::error(format!("writer {} line {}", t, m));
                        assert_eq!(sink.write(&record).unwrap(), Delivery::Written);
                    }
                });
            }
        });
        assert_eq!(sink.connect_attempts(), 1);
        drop(sink);

        let lines = reader.join().unwrap();
        assert_eq!(lines.len(), THREADS * PER_THREAD);
        let mut seen = std::collections::HashSet::new();
        for line in &lines {
            let (prefix, message) = line.split_once("] [ERROR] ").expect("complete line");
            assert_eq!(prefix.len(), 20, "bad timestamp in {:?}", line);
            assert!(seen.insert(message.to_string()), "duplicate {:?}", line);
        }
        for t in 0..THREADS {
            for m in 0..PER_THREAD {
                assert!(seen.contains(&format!("writer {} line {}", t, m)));
            }
        }
    }
}
