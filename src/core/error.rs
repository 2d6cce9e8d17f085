//! Error types for the dispatch pipeline

pub type Result<T> = std::result::Result<T, DispatchError>;

/// Failure reported by a [`Sink`](super::Sink) for a single write
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The file could not be opened or the connection could not be established
    #[error("failed to open '{target}': {source}")]
    OpenFailed {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// The handle was open but the write itself failed
    #[error("failed to write to '{target}': {source}")]
    WriteFailed {
        target: String,
        #[source]
        source: std::io::Error,
    },
}

impl SinkError {
    /// Create an open failure for the given target
    pub fn open_failed(target: impl Into<String>, source: std::io::Error) -> Self {
        SinkError::OpenFailed {
            target: target.into(),
            source,
        }
    }

    /// Create a write failure for the given target
    pub fn write_failed(target: impl Into<String>, source: std::io::Error) -> Self {
        SinkError::WriteFailed {
            target: target.into(),
            source,
        }
    }

    pub fn is_open_failed(&self) -> bool {
        matches!(self, SinkError::OpenFailed { .. })
    }

    pub fn is_write_failed(&self) -> bool {
        matches!(self, SinkError::WriteFailed { .. })
    }

    /// Short name of the failure kind, used in history entries
    pub fn kind(&self) -> &'static str {
        match self {
            SinkError::OpenFailed { .. } => "OpenFailed",
            SinkError::WriteFailed { .. } => "WriteFailed",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Sink failure surfaced outside the worker (e.g. initial connect)
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// `start()` called without a configured sink
    #[error("no sink configured")]
    NoSink,

    /// `start()` called while the worker is already running
    #[error("dispatcher already started")]
    AlreadyStarted,

    /// `start()` called after `stop()`
    #[error("dispatcher already stopped")]
    Stopped,

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Unrecognized log level name
    #[error("Invalid log level: '{0}'")]
    InvalidLevel(String),

    /// Console or terminal IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON configuration error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Worker thread could not be spawned
    #[error("failed to spawn dispatch worker: {0}")]
    Spawn(#[source] std::io::Error),
}

impl DispatchError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        DispatchError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }
}
