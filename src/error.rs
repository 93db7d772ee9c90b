/// Failures that abort installing the switcher for the current page load.
#[derive(Debug, thiserror::Error)]
pub enum SwitcherError {
    /// No appearance form with theme radios was found.
    #[error("appearance form not found in {location}")]
    FormNotFound { location: String },

    /// The settings page could not be fetched.
    #[error("GET {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The settings page answered with a non-success status.
    #[error("GET {url} failed with status {status}")]
    FetchStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The form carries no usable authenticity token.
    #[error("authenticity token not found")]
    TokenMissing,

    #[error("invalid url {path}: {source}")]
    InvalidUrl {
        path: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The source form could not be located.
    SourceUnavailable,
    /// The form was found but required data is missing from it.
    MissingData,
}

impl SwitcherError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SwitcherError::TokenMissing => FailureKind::MissingData,
            SwitcherError::FormNotFound { .. }
            | SwitcherError::Fetch { .. }
            | SwitcherError::FetchStatus { .. }
            | SwitcherError::InvalidUrl { .. } => FailureKind::SourceUnavailable,
        }
    }
}
