//! Editable generator workspace: topic, ordered product rows, one article slot,
//! and the request sequencing that keeps a late response from overwriting a newer one.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::client::GenerationClient;
use crate::error::{ExtractError, GenerationError, ValidationError};
use crate::extract::extract_product;
use crate::merge::merge;
use crate::model::{BlogPost, ProductId, ProductInput, RenderableBlogPost};
use crate::render::{export, ExportFormat};

pub const DEFAULT_TOPIC: &str = "2024년 최고의 가성비 무선 청소기 추천 TOP 3";

/// Shown for any generation failure; details only go to the log.
pub const GENERATION_FAILED_MESSAGE: &str =
    "콘텐츠 생성 중 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";

/// Check the preconditions of a generation request.
pub fn validate_request(topic: &str, products: &[ProductInput]) -> Result<(), ValidationError> {
    if topic.trim().is_empty() {
        return Err(ValidationError::EmptyTopic);
    }
    if products.is_empty() {
        return Err(ValidationError::NoProducts);
    }
    if let Some(position) = products.iter().position(|p| !p.is_complete()) {
        return Err(ValidationError::IncompleteProduct { position: position + 1 });
    }
    Ok(())
}

/// Snapshot of one generation request. The product list inside never changes,
/// whatever happens to the session while the request is in flight.
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    seq: u64,
    topic: String,
    products: Vec<ProductInput>,
}

impl GenerationTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn products(&self) -> &[ProductInput] {
        &self.products
    }
}

/// What happened to a finished request.
#[derive(Debug)]
pub enum Completion {
    /// Article merged and stored in the session.
    Ready,
    /// A newer request was issued; the result was dropped.
    Stale,
    /// Generation or merge failed; the session holds no article.
    Failed(String),
}

#[derive(Debug)]
pub struct Session {
    topic: String,
    products: Vec<ProductInput>,
    next_id: u64,
    seq: u64,
    in_flight: bool,
    article: Option<RenderableBlogPost>,
    last_error: Option<String>,
    extract_errors: HashMap<ProductId, String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let mut session = Session {
            topic: DEFAULT_TOPIC.to_string(),
            products: Vec::new(),
            next_id: 0,
            seq: 0,
            in_flight: false,
            article: None,
            last_error: None,
            extract_errors: HashMap::new(),
        };
        session.add_product();
        session
    }

    // ── Topic & products ──

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = topic.into();
    }

    pub fn products(&self) -> &[ProductInput] {
        &self.products
    }

    pub fn product(&self, id: ProductId) -> Option<&ProductInput> {
        self.products.iter().find(|p| p.id == id)
    }

    fn product_mut(&mut self, id: ProductId) -> Option<&mut ProductInput> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    /// Append an empty row and return its id.
    pub fn add_product(&mut self) -> ProductId {
        self.next_id += 1;
        let id = ProductId(self.next_id);
        self.products.push(ProductInput::empty(id));
        id
    }

    /// Remove a row. The last remaining row stays; returns whether anything was removed.
    pub fn remove_product(&mut self, id: ProductId) -> bool {
        if self.products.len() <= 1 {
            return false;
        }
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        self.extract_errors.remove(&id);
        self.products.len() != before
    }

    pub fn set_link(&mut self, id: ProductId, link: impl Into<String>) -> bool {
        match self.product_mut(id) {
            Some(p) => {
                p.coupang_link = link.into();
                true
            }
            None => false,
        }
    }

    pub fn set_json_ld(&mut self, id: ProductId, blob: impl Into<String>) -> bool {
        match self.product_mut(id) {
            Some(p) => {
                p.json_ld = blob.into();
                true
            }
            None => false,
        }
    }

    /// Flip the blob editor open/closed. Returns the new state.
    pub fn toggle_json_ld(&mut self, id: ProductId) -> Option<bool> {
        let p = self.product_mut(id)?;
        p.is_json_ld_visible = !p.is_json_ld_visible;
        Some(p.is_json_ld_visible)
    }

    /// Run the extractor over the row's blob. On failure the row is left as it was
    /// and the error is kept for that row. `None` when no row has this id.
    pub fn apply_json_ld(&mut self, id: ProductId) -> Option<Result<(), ExtractError>> {
        let blob = self.product(id)?.json_ld.clone();

        let outcome = match extract_product(&blob) {
            Ok(extracted) => {
                if let Some(p) = self.product_mut(id) {
                    extracted.apply_to(p);
                }
                self.extract_errors.remove(&id);
                info!(%id, "product filled from JSON-LD");
                Ok(())
            }
            Err(e) => {
                warn!(%id, "JSON-LD extraction failed: {}", e);
                self.extract_errors.insert(id, e.to_string());
                Err(e)
            }
        };
        Some(outcome)
    }

    pub fn extract_error(&self, id: ProductId) -> Option<&str> {
        self.extract_errors.get(&id).map(String::as_str)
    }

    // ── Generation ──

    pub fn is_generating(&self) -> bool {
        self.in_flight
    }

    /// Validate, clear the previous article, and issue a new ticket. Any ticket
    /// issued before this one becomes stale.
    pub fn begin_generation(&mut self) -> Result<GenerationTicket, ValidationError> {
        if let Err(e) = validate_request(&self.topic, &self.products) {
            self.last_error = Some(e.to_string());
            return Err(e);
        }

        self.seq += 1;
        self.in_flight = true;
        self.article = None;
        self.last_error = None;
        debug!(seq = self.seq, products = self.products.len(), "generation started");

        Ok(GenerationTicket {
            seq: self.seq,
            topic: self.topic.clone(),
            products: self.products.clone(),
        })
    }

    /// Settle a ticket. Results for anything but the newest ticket are dropped.
    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<BlogPost, GenerationError>,
    ) -> Completion {
        if ticket.seq != self.seq {
            info!(stale = ticket.seq, current = self.seq, "discarding stale generation result");
            return Completion::Stale;
        }
        self.in_flight = false;

        let merged = result
            .map_err(|e| {
                warn!(kind = ?e.kind(), "generation failed: {}", e.detail());
            })
            .and_then(|post| {
                merge(post, &ticket.products).map_err(|e| {
                    warn!("merge failed: {}", e);
                })
            });

        match merged {
            Ok(article) => {
                info!(seq = ticket.seq, products = article.products.len(), "article ready");
                self.article = Some(article);
                Completion::Ready
            }
            Err(()) => {
                self.last_error = Some(GENERATION_FAILED_MESSAGE.to_string());
                Completion::Failed(GENERATION_FAILED_MESSAGE.to_string())
            }
        }
    }

    /// Begin, await the client once, complete.
    pub async fn generate(
        &mut self,
        client: &GenerationClient,
        today: NaiveDate,
    ) -> Result<Completion, ValidationError> {
        let ticket = self.begin_generation()?;
        let result = client.generate(ticket.topic(), ticket.products(), today).await;
        Ok(self.complete_generation(ticket, result))
    }

    // ── Article ──

    pub fn article(&self) -> Option<&RenderableBlogPost> {
        self.article.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Drop the current article so the form can be edited and regenerated.
    pub fn reset_article(&mut self) {
        self.article = None;
    }

    pub fn export(&self, format: ExportFormat) -> Option<String> {
        self.article.as_ref().map(|post| export(post, format))
    }
}

// ── Tests ──
