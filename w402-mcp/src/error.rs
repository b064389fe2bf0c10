//! Errors that stop the server before or while serving.

use w402::CredentialError;
use w402_http::HttpError;

/// Failures that end the process.
///
/// Tool invocations never produce these; they always answer with an envelope.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// A signing key is malformed, or none is configured.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// The resource server base URL and path do not form a URL.
    #[error("invalid endpoint URL {url}: {source}")]
    EndpointUrl {
        /// The joined URL that failed to parse.
        url: String,
        /// The parse failure.
        source: url::ParseError,
    },

    /// The HTTP client could not be built.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The MCP transport failed to start or stopped with an error.
    #[error("MCP server error: {0}")]
    Server(String),
}
