use thiserror::Error;

/// Request rejected before anything is sent to the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("blog topic is empty")]
    EmptyTopic,
    #[error("at least one product is required")]
    NoProducts,
    #[error("product {position} needs a name and an affiliate link")]
    IncompleteProduct { position: usize },
}

/// JSON-LD blob could not be turned into a product record.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no JSON-LD data was provided")]
    MissingBlob,
    #[error("JSON-LD parse error: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("JSON-LD parse error: no 'Product' typed entry found")]
    ProductNotFound,
}

/// What went wrong inside a failed generation. Diagnostic only; callers see one error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network error, bad HTTP status or an unreadable envelope.
    Transport,
    /// Response text is not a `BlogPost`.
    Malformed,
    /// Response deserialized but breaks an article invariant.
    Invalid,
}

/// Single opaque failure for the whole generation call. No partial article survives it.
#[derive(Debug, Error)]
#[error("failed to generate the review article")]
pub struct GenerationError {
    kind: FailureKind,
    detail: String,
}

impl GenerationError {
    pub(crate) fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        GenerationError { kind, detail: detail.into() }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("generated {generated} reviews for {inputs} input products")]
    LengthMismatch { generated: usize, inputs: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("generation service API key is not set")]
    MissingCredential,
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error(transparent)]
    Source(#[from] config::ConfigError),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
