//! Sink implementations and the sink factory

pub mod file;
pub mod network;

pub use file::FileSink;
pub use network::{ConnectionState, NetworkSink, DEFAULT_CONNECT_TIMEOUT, DEFAULT_WRITE_TIMEOUT};

pub use crate::core::Sink;

use crate::core::{DispatchError, Result, SinkConfig, SinkKind};
use std::sync::Arc;

/// Build a sink from its configuration
///
/// File sinks open lazily and are always produced. Network sinks make their first
/// connection attempt here; an unreachable endpoint is returned as an error, which
/// callers should treat as fatal to startup.
///
/// # Example
///
/// ```no_run
/// use rust_log_dispatcher::sinks::create_sink;
/// use rust_log_dispatcher::{LogLevel, SinkConfig};
///
/// let sink = create_sink(&SinkConfig::file("app.txt").with_level(LogLevel::Debug)).unwrap();
/// assert_eq!(sink.type_tag(), "file");
/// ```
pub fn create_sink(config: &SinkConfig) -> Result<Arc<dyn Sink>> {
    config.validate()?;

    match config.kind {
        SinkKind::File => Ok(Arc::new(
            FileSink::new(&config.target).with_level(config.level),
        )),
        SinkKind::Network => {
            let port = config
                .port
                .ok_or_else(|| DispatchError::config("SinkConfig", "network sink requires a port"))?;
            let sink = NetworkSink::new(config.target.clone(), port).with_level(config.level);
            sink.init()?;
            Ok(Arc::new(sink))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, SinkError};
    use std::net::TcpListener;

    #[test]
    fn test_create_file_sink() {
        let sink = create_sink(&SinkConfig::file("never-written.txt").with_level(LogLevel::Error))
            .unwrap();
        assert_eq!(sink.type_tag(), "file");
        assert_eq!(sink.level(), LogLevel::Error);
        assert_eq!(sink.target(), "never-written.txt");
    }

    #[test]
    fn test_create_network_sink_connects() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let sink = create_sink(&SinkConfig::network("127.0.0.1", port)).unwrap();
        assert_eq!(sink.type_tag(), "network");
        assert_eq!(sink.target(), format!("127.0.0.1:{}", port));
    }

    #[test]
    fn test_create_network_sink_fails_when_unreachable() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let result = create_sink(&SinkConfig::network("127.0.0.1", port));
        assert!(matches!(
            result,
            Err(DispatchError::Sink(SinkError::OpenFailed { .. }))
        ));
    }

    #[test]
    fn test_create_rejects_invalid_config() {
        let result = create_sink(&SinkConfig::file(""));
        assert!(matches!(
            result,
            Err(DispatchError::InvalidConfiguration { .. })
        ));
    }
}
