use std::fmt;

// One variant per pipeline stage. No stage recovers from another stage's
// failure, so the caller always sees exactly one of these.
#[derive(Debug)]
pub enum TxError {
    Resolution(String),
    Socket(std::io::Error),
    Precondition(String),
    Send(std::io::Error),
}

impl TxError {
    pub fn stage(&self) -> &'static str {
        match self {
            TxError::Resolution(_) => "resolve",
            TxError::Socket(_) => "socket",
            TxError::Precondition(_) => "precondition",
            TxError::Send(_) => "send",
        }
    }
}

impl fmt::Display for TxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxError::Resolution(msg) => write!(f, "resolve: {}", msg),
            TxError::Socket(err) => write!(f, "socket: {}", err),
            TxError::Precondition(msg) => write!(f, "precondition: {}", msg),
            TxError::Send(err) => write!(f, "send: {}", err),
        }
    }
}

impl std::error::Error for TxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TxError::Socket(err) | TxError::Send(err) => Some(err),
            _ => None,
        }
    }
}
