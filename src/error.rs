use serde::Serialize;

/// App-wide error type. Every fallible function returns `Result<T, AppError>`.
/// Serializes as `{ error, kind }` so crash reports and Sentry get structured messages.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Zendesk error: {0}")]
    Http(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

/// Failures while paging through the listing endpoint.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Malformed views page {page}: {reason}")]
    Malformed { page: u32, reason: String },

    #[error("The final views page was empty; nothing to copy")]
    NoViews,

    #[error("Views request failed: {0}")]
    Http(String),
}

/// Failures while recovering an entity id from a free-text error description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("No numeric id found in \"{0}\"")]
    NoId(String),

    #[error("Ambiguous ids {found:?} in \"{description}\"")]
    AmbiguousId {
        description: String,
        found: Vec<String>,
    },

    #[error("Id \"{0}\" does not fit in 64 bits")]
    Invalid(String),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("AppError", 2)?;
        s.serialize_field("error", &self.to_string())?;
        s.serialize_field(
            "kind",
            match self {
                AppError::Config(_) => "config",
                AppError::Session(_) => "session",
                AppError::Http(_) => "http",
                AppError::Fetch(_) => "fetch",
                AppError::Io(_) => "io",
                AppError::Internal(_) => "internal",
            },
        )?;
        s.end()
    }
}
