//! Error types for the WebSocket adapter

use multichat_application::TransportError;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors raised while talking to the streaming endpoint
#[derive(Error, Debug)]
pub enum WsError {
    #[error("Server is unavailable: {0}")]
    Unavailable(String),

    #[error("WebSocket error: {0}")]
    Protocol(#[from] tungstenite::Error),

    #[error("Connection timeout")]
    Timeout,

    #[error("Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

impl WsError {
    /// Classify a tungstenite error, separating refused connections from
    /// protocol failures.
    pub fn from_tungstenite(err: tungstenite::Error) -> Self {
        let unavailable = match &err {
            tungstenite::Error::Io(io_err) => matches!(
                io_err.kind(),
                std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
            ),
            _ => false,
        };
        if unavailable {
            Self::Unavailable(err.to_string())
        } else {
            Self::Protocol(err)
        }
    }
}

impl From<WsError> for TransportError {
    fn from(err: WsError) -> Self {
        match err {
            WsError::Timeout => TransportError::Timeout,
            WsError::InvalidEndpoint { .. } => TransportError::InvalidEndpoint(err.to_string()),
            WsError::Unavailable(_) | WsError::Protocol(_) => {
                TransportError::ConnectionError(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_connection_is_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = WsError::from_tungstenite(tungstenite::Error::Io(io));
        assert!(matches!(err, WsError::Unavailable(_)));
    }

    #[test]
    fn closed_connection_is_protocol_error() {
        let err = WsError::from_tungstenite(tungstenite::Error::ConnectionClosed);
        assert!(matches!(err, WsError::Protocol(_)));
    }

    #[test]
    fn converts_to_transport_error() {
        assert_eq!(TransportError::from(WsError::Timeout), TransportError::Timeout);
        let err = TransportError::from(WsError::Unavailable("refused".to_string()));
        assert!(matches!(err, TransportError::ConnectionError(_)));
    }
}
