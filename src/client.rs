//! Generation service boundary: request construction, transport, and the
//! parse/validate/normalize step applied to whatever text comes back.

use std::sync::{Arc, LazyLock};
use std::time::Instant;

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{ConfigError, FailureKind, GenerationError};
use crate::model::{BlogPost, ProductInput};
use crate::prompt::schema::{MAX_FAQ, MIN_FAQ};
use crate::prompt::{blog_post_schema, build_instruction, Schema, SiteProfile};
use crate::settings::GeneratorConfig;

pub const JSON_MIME_TYPE: &str = "application/json";

static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n(.*?)\n?\s*```\s*$").unwrap());

/// Everything the service needs for one article.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub model: String,
    pub instruction: String,
    pub response_mime_type: String,
    pub schema: Schema,
}

/// Sends a request and returns the raw response text. One call, no retry.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String>;
}

// ── Gemini transport ──

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Schema,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

/// `generateContent` over HTTPS with the key from [`GeneratorConfig`].
pub struct GeminiTransport {
    client: reqwest::Client,
    config: GeneratorConfig,
}

impl GeminiTransport {
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MIME_TYPE));
        let mut key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| ConfigError::Invalid("API key contains invalid characters".into()))?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        Ok(GeminiTransport { client, config })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiTransport {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: Some(request.instruction.clone()) }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: &request.response_mime_type,
                response_schema: &request.schema,
            },
        };

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .json(&body)
            .send()
            .await
            .context("generation request failed")?;

        let status = response.status();
        let text = response.text().await.context("failed to read generation response")?;
        if !status.is_success() {
            bail!("generation service returned HTTP {}: {}", status, text);
        }

        let parsed: GeminiResponse =
            serde_json::from_str(&text).context("unexpected generation response envelope")?;
        candidate_text(parsed)
    }
}

fn candidate_text(response: GeminiResponse) -> anyhow::Result<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        bail!("prompt blocked: {}", reason);
    }
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no candidates in generation response"))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        bail!(
            "empty candidate (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        );
    }
    Ok(text)
}

// ── Client ──

/// Builds the request, awaits the service once, and hands back a checked `BlogPost`.
#[derive(Clone)]
pub struct GenerationClient {
    backend: Arc<dyn TextGenerator>,
    model: String,
    site: SiteProfile,
}

impl GenerationClient {
    pub fn from_config(config: GeneratorConfig) -> Result<Self, ConfigError> {
        let model = config.model.clone();
        let transport = GeminiTransport::new(config)?;
        Ok(Self::with_backend(Arc::new(transport), model))
    }

    pub fn with_backend(backend: Arc<dyn TextGenerator>, model: impl Into<String>) -> Self {
        GenerationClient {
            backend,
            model: model.into(),
            site: SiteProfile::default(),
        }
    }

    pub fn with_site(mut self, site: SiteProfile) -> Self {
        self.site = site;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn build_request(
        &self,
        topic: &str,
        products: &[ProductInput],
        today: NaiveDate,
    ) -> GenerationRequest {
        GenerationRequest {
            model: self.model.clone(),
            instruction: build_instruction(topic, products, today, &self.site),
            response_mime_type: JSON_MIME_TYPE.to_string(),
            schema: blog_post_schema(products.len()),
        }
    }

    /// Generate one article. Long-running; not cancellable once issued.
    pub async fn generate(
        &self,
        topic: &str,
        products: &[ProductInput],
        today: NaiveDate,
    ) -> Result<BlogPost, GenerationError> {
        let request = self.build_request(topic, products, today);
        info!(
            model = %request.model,
            products = products.len(),
            prompt_chars = request.instruction.chars().count(),
            "requesting article"
        );

        let start = Instant::now();
        let text = self.backend.generate(&request).await.map_err(|e| {
            warn!("generation transport failed: {:#}", e);
            GenerationError::new(FailureKind::Transport, format!("{:#}", e))
        })?;
        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            response_chars = text.chars().count(),
            "article response received"
        );

        parse_blog_post(&text, products.len())
    }
}

/// Deserialize service text into a `BlogPost`, sort reviews by rank, and check it.
pub fn parse_blog_post(text: &str, expected_products: usize) -> Result<BlogPost, GenerationError> {
    let body = strip_code_fence(text);
    let mut post: BlogPost = serde_json::from_str(body).map_err(|e| {
        warn!("generation response is not a valid article: {}", e);
        GenerationError::new(FailureKind::Malformed, e.to_string())
    })?;

    post.sort_by_rank();

    validate_blog_post(&post, expected_products).map_err(|reason| {
        warn!("generated article rejected: {}", reason);
        GenerationError::new(FailureKind::Invalid, reason)
    })?;
    Ok(post)
}

fn strip_code_fence(text: &str) -> &str {
    match CODE_FENCE_RE.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => text.trim(),
    }
}

/// Article invariants the service's own schema enforcement is not trusted with.
/// Expects `products` already sorted by rank.
pub fn validate_blog_post(post: &BlogPost, expected_products: usize) -> Result<(), String> {
    if post.products.len() != expected_products {
        return Err(format!(
            "expected {} products, got {}",
            expected_products,
            post.products.len()
        ));
    }
    for (i, product) in post.products.iter().enumerate() {
        let expected_rank = i as u32 + 1;
        if product.rank != expected_rank {
            return Err(format!(
                "ranks are not 1..={}: position {} has rank {}",
                expected_products, i, product.rank
            ));
        }
        if product.product_name.trim().is_empty() {
            return Err(format!("product at rank {} has no name", product.rank));
        }
        let rating = product.aggregate_rating;
        if !(0.0..=5.0).contains(&rating.rating_value) {
            return Err(format!(
                "product at rank {} has rating {} outside 0..=5",
                product.rank, rating.rating_value
            ));
        }
    }

    let narrative = [
        ("blogTitle", &post.blog_title),
        ("introduction", &post.introduction),
        ("conclusion", &post.conclusion),
        ("metaDescription", &post.meta_description),
    ];
    if let Some((name, _)) = narrative.iter().find(|(_, v)| v.trim().is_empty()) {
        return Err(format!("{} is empty", name));
    }

    if !(MIN_FAQ..=MAX_FAQ).contains(&post.faq.len()) {
        return Err(format!(
            "faq has {} entries, expected {}..={}",
            post.faq.len(),
            MIN_FAQ,
            MAX_FAQ
        ));
    }

    check_schema_markup(&post.schema_markup, expected_products)
}

/// `schemaMarkup` must be an `@graph` with one `BlogPosting` reviewing every
/// product and a `FAQPage`. Only checked here; renderers embed it as-is.
fn check_schema_markup(markup: &str, expected_products: usize) -> Result<(), String> {
    let value: Value = serde_json::from_str(markup)
        .map_err(|e| format!("schemaMarkup is not valid JSON: {}", e))?;
    let graph = match value.get("@graph") {
        Some(Value::Array(nodes)) => nodes,
        _ => return Err("schemaMarkup has no @graph array".to_string()),
    };

    let posting = graph
        .iter()
        .find(|node| has_type(node, "BlogPosting"))
        .ok_or("schemaMarkup has no BlogPosting node")?;
    let reviews = match posting.get("review") {
        Some(Value::Array(reviews)) => reviews.len(),
        Some(Value::Object(_)) => 1,
        _ => 0,
    };
    if reviews != expected_products {
        return Err(format!(
            "schemaMarkup has {} Review nodes for {} products",
            reviews, expected_products
        ));
    }

    if !graph.iter().any(|node| has_type(node, "FAQPage")) {
        return Err("schemaMarkup has no FAQPage node".to_string());
    }
    Ok(())
}

fn has_type(node: &Value, wanted: &str) -> bool {
    match node.get("@type") {
        Some(Value::String(t)) => t == wanted,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(wanted)),
        _ => false,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AggregateRating, ProductId};
    use serde_json::json;
    use std::sync::Mutex;

    pub(crate) fn article_json(ranks: &[u32]) -> String {
        let products: Vec<_> = ranks
            .iter()
            .map(|r| {
                json!({
                    "rank": r,
                    "productName": format!("상품 {}", r),
                    "description": "설명",
                    "pros": ["가벼움"],
                    "cons": ["소음"],
                    "price": "100000",
                    "aggregateRating": {"ratingValue": 4.5, "ratingCount": 10}
                })
            })
            .collect();
        json!({
            "blogTitle": "제목",
            "introduction": "소개",
            "products": products,
            "conclusion": "결론",
            "metaDescription": "설명",
            "keywords": ["청소기"],
            "faq": [
                {"question": "q1", "answer": "a1"},
                {"question": "q2", "answer": "a2"},
                {"question": "q3", "answer": "a3"}
            ],
            "schemaMarkup": markup(ranks.len())
        })
        .to_string()
    }

    fn markup(reviews: usize) -> String {
        let reviews: Vec<_> = (0..reviews).map(|_| json!({"@type": "Review"})).collect();
        json!({
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "BlogPosting", "headline": "제목", "review": reviews},
                {"@type": "FAQPage", "mainEntity": []}
            ]
        })
        .to_string()
    }

    fn with_field(ranks: &[u32], field: &str, replacement: serde_json::Value) -> String {
        let mut value: serde_json::Value = serde_json::from_str(&article_json(ranks)).unwrap();
        value[field] = replacement;
        value.to_string()
    }

    struct Canned {
        reply: anyhow::Result<String>,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(anyhow!("{}", e)),
            }
        }
    }

    fn product(id: u64) -> ProductInput {
        let mut p = ProductInput::empty(ProductId(id));
        p.product_name = Some(format!("상품 {}", id));
        p.coupang_link = format!("https://link.coupang.com/a/{}", id);
        p.aggregate_rating = Some(AggregateRating { rating_value: 4.5, rating_count: 10 });
        p
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn parse_sorts_by_rank() {
        let post = parse_blog_post(&article_json(&[2, 1, 3]), 3).unwrap();
        let ranks: Vec<u32> = post.products.iter().map(|p| p.rank).collect();
        assert_eq!(ranks, [1, 2, 3]);
        assert_eq!(post.products[0].product_name, "상품 1");
    }

    #[test]
    fn parse_accepts_fenced_json() {
        let fenced = format!("```json\n{}\n```", article_json(&[1]));
        assert!(parse_blog_post(&fenced, 1).is_ok());
    }

    #[test]
    fn malformed_text_fails() {
        let err = parse_blog_post("not json at all", 1).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Malformed);
        assert_eq!(err.to_string(), "failed to generate the review article");
    }

    #[test]
    fn wrong_product_count_fails() {
        let err = parse_blog_post(&article_json(&[1, 2]), 3).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Invalid);
        assert!(err.detail().contains("expected 3 products"));
    }

    #[test]
    fn duplicate_ranks_fail() {
        let err = parse_blog_post(&article_json(&[1, 1, 3]), 3).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Invalid);
    }

    #[test]
    fn schema_markup_must_be_a_graph() {
        let mut value: serde_json::Value = serde_json::from_str(&article_json(&[1])).unwrap();
        value["schemaMarkup"] = json!(r#"{"@type":"BlogPosting"}"#);
        let err = parse_blog_post(&value.to_string(), 1).unwrap_err();
        assert!(err.detail().contains("@graph"));

        value["schemaMarkup"] = json!("{broken");
        assert!(parse_blog_post(&value.to_string(), 1).is_err());
    }

    #[test]
    fn review_nodes_must_match_products() {
        let text = with_field(&[1, 2, 3], "schemaMarkup", json!(markup(1)));
        let err = parse_blog_post(&text, 3).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Invalid);
        assert!(err.detail().contains("1 Review nodes for 3 products"));
    }

    #[test]
    fn faq_page_node_is_required() {
        let graph = json!({"@graph": [{"@type": "BlogPosting", "review": [{"@type": "Review"}]}]});
        let text = with_field(&[1], "schemaMarkup", json!(graph.to_string()));
        let err = parse_blog_post(&text, 1).unwrap_err();
        assert!(err.detail().contains("FAQPage"));
    }

    #[test]
    fn blog_posting_node_is_required() {
        let graph = json!({"@graph": [{"@type": "FAQPage"}]});
        let text = with_field(&[1], "schemaMarkup", json!(graph.to_string()));
        assert!(parse_blog_post(&text, 1).unwrap_err().detail().contains("BlogPosting"));
    }

    #[test]
    fn faq_count_must_be_three_to_five() {
        let one = with_field(&[1], "faq", json!([{"question": "q", "answer": "a"}]));
        let err = parse_blog_post(&one, 1).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Invalid);
        assert!(err.detail().contains("faq has 1 entries"));

        let six: Vec<_> = (0..6).map(|i| json!({"question": format!("q{}", i), "answer": "a"})).collect();
        assert!(parse_blog_post(&with_field(&[1], "faq", json!(six)), 1).is_err());

        let five: Vec<_> = (0..5).map(|i| json!({"question": format!("q{}", i), "answer": "a"})).collect();
        assert!(parse_blog_post(&with_field(&[1], "faq", json!(five)), 1).is_ok());
    }

    #[test]
    fn empty_title_fails() {
        let mut value: serde_json::Value = serde_json::from_str(&article_json(&[1])).unwrap();
        value["blogTitle"] = json!(" ");
        let err = parse_blog_post(&value.to_string(), 1).unwrap_err();
        assert!(err.detail().contains("blogTitle"));
    }

    #[test]
    fn candidate_parts_are_joined() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"a\":"}, {"text": "1}"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(candidate_text(response).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn blocked_prompt_is_an_error() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert!(candidate_text(response).unwrap_err().to_string().contains("SAFETY"));
    }

    #[test]
    fn endpoint_joins_model() {
        let mut config = GeneratorConfig::new("key");
        config.base_url = "https://example.test/v1beta/".into();
        let transport = GeminiTransport::new(config).unwrap();
        assert_eq!(
            transport.endpoint("gemini-2.5-flash"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn client_sends_schema_and_normalizes() {
        let backend = Arc::new(Canned {
            reply: Ok(article_json(&[3, 1, 2])),
            seen: Mutex::new(Vec::new()),
        });
        let client = GenerationClient::with_backend(backend.clone(), "test-model");
        let products = [product(1), product(2), product(3)];

        let post = client.generate("청소기", &products, today()).await.unwrap();
        assert_eq!(post.products[2].rank, 3);

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "test-model");
        assert_eq!(seen[0].response_mime_type, JSON_MIME_TYPE);
        assert_eq!(seen[0].schema.property("products").unwrap().max_items, Some(3));
        assert!(seen[0].instruction.contains("Top 3"));
    }

    #[tokio::test]
    async fn transport_failure_is_opaque() {
        let backend = Arc::new(Canned {
            reply: Err(anyhow!("connection reset")),
            seen: Mutex::new(Vec::new()),
        });
        let client = GenerationClient::with_backend(backend, "m");
        let err = client.generate("t", &[product(1)], today()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
        assert!(err.detail().contains("connection reset"));
        assert!(!err.to_string().contains("connection reset"));
    }
}
