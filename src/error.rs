use thiserror::Error;

/// Errors surfaced to API clients.
///
/// Each variant maps to an HTTP status and a stable `id` string in the JSON
/// error body (see `server::handlers`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A required field or query parameter is absent or empty
    #[error("{0}")]
    MissingParams(&'static str),

    /// A value is present but does not name anything valid
    #[error("{0}")]
    InvalidParams(&'static str),

    /// The auth gate refused the request
    #[error("Unauthorized request")]
    Unauthorized,

    /// No route matches the request path
    #[error("Page not found")]
    NotFound,

    /// The route exists but does not accept this method
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The request body could not be parsed as the expected JSON document
    #[error("Malformed request body: {reason}")]
    MalformedBody { reason: String },

    /// The request body stream failed before it completed
    #[error("Request body stream failed: {reason}")]
    BodyStream { reason: String },
}

impl ApiError {
    /// Error identifier reported in the `id` field of the response body.
    pub fn id(&self) -> &'static str {
        match self {
            ApiError::MissingParams(_) => "missingParams",
            ApiError::InvalidParams(_) => "invalidParams",
            ApiError::Unauthorized => "unauthorized",
            ApiError::NotFound => "notFound",
            ApiError::MethodNotAllowed => "methodNotAllowed",
            ApiError::MalformedBody { .. } => "malformedBody",
            ApiError::BodyStream { .. } => "bodyStream",
        }
    }
}

/// Failures while probing a remote image URL
#[derive(Debug, Clone, Error)]
pub enum ValidatorError {
    /// URL could not be parsed or uses a scheme other than http(s)
    #[error("Unsupported image URL: {0}")]
    UnsupportedUrl(String),

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Errors loading the static client assets at startup
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
