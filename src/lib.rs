//! Affiliate review-article generator: product JSON-LD in, a ranked Korean
//! blog post out, exported as HTML or Markdown with its structured data intact.

pub mod client;
pub mod error;
pub mod extract;
pub mod merge;
pub mod model;
pub mod prompt;
pub mod render;
pub mod session;
pub mod settings;
pub mod telemetry;

pub use client::{GeminiTransport, GenerationClient, GenerationRequest, TextGenerator};
pub use error::{ConfigError, ExtractError, FailureKind, GenerationError, MergeError, ValidationError};
pub use extract::{extract_product, ExtractedProduct};
pub use merge::merge;
pub use model::{
    AggregateRating, BlogPost, Faq, ProductId, ProductInput, ProductReview, RenderableBlogPost,
    RenderableProduct,
};
pub use render::{export, render_html, render_markdown, ExportFormat};
pub use session::{Completion, GenerationTicket, Session};
pub use settings::GeneratorConfig;
pub use telemetry::init_tracing;
