pub type Result<T> = core::result::Result<T, Error>;

pub struct Error {
    pub inner: Box<ErrorKind>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Error {
        Error {
            inner: Box::new(kind),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.inner
    }

    /// True when the page did not have the expected shape or the redirect chain
    /// did not land where expected.
    pub fn is_structural(&self) -> bool {
        matches!(
            *self.inner,
            ErrorKind::Structure(_) | ErrorKind::Contract(_)
        )
    }

    /// The raw text the server displayed when it rejected an action.
    pub fn server_message(&self) -> Option<&str> {
        match *self.inner {
            ErrorKind::ServerMessage(ref message) => Some(message),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self.inner)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.inner.as_ref())
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error::new(kind)
    }
}

#[cfg(feature = "reqwest-client")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Error {
        Error::new(ErrorKind::Reqwest(e))
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Error {
        Error::new(ErrorKind::Url(e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::new(ErrorKind::SerdeJson(e))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[cfg(feature = "reqwest-client")]
    #[error("request failed: {0}")]
    Reqwest(#[source] reqwest::Error),
    #[error("HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },
    #[error("unexpected page structure: {0}")]
    Structure(String),
    #[error("unexpected response URL: {0}")]
    Contract(String),
    #[error("server rejected the request: {0:?}")]
    ServerMessage(String),
    #[error("table not found, page heading is {heading:?}")]
    TableNotFound { heading: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("duplicate serial number {0}")]
    DuplicateSerialNumber(String),
    #[error("duplicate priority {0}")]
    DuplicatePriority(u8),
    #[error("not logged in")]
    NotLoggedIn,
    #[error("unknown session language {0:?}")]
    UnknownLanguage(String),
    #[error("invalid URL: {0}")]
    Url(#[source] url::ParseError),
    #[error("JSON error: {0}")]
    SerdeJson(#[source] serde_json::Error),
}

/// Shorthand for a structural mismatch.
pub(crate) fn structure(detail: impl Into<String>) -> Error {
    ErrorKind::Structure(detail.into()).into()
}

/// Shorthand for a response URL contract mismatch.
pub(crate) fn contract(detail: impl Into<String>) -> Error {
    ErrorKind::Contract(detail.into()).into()
}
