#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use review_blog::{GenerationClient, GenerationRequest, TextGenerator};
use serde_json::json;

/// Article text in the service's wire shape, reviews listed in `ranks` order.
pub fn article_json(ranks: &[u32]) -> String {
    let products: Vec<_> = ranks
        .iter()
        .map(|r| {
            json!({
                "rank": r,
                "productName": format!("청소기 {}", r),
                "description": format!("{}위 제품 설명", r),
                "pros": ["강력한 흡입력"],
                "cons": ["소음"],
                "price": "199000",
                "aggregateRating": {"ratingValue": 4.5, "ratingCount": 100 + r}
            })
        })
        .collect();
    json!({
        "blogTitle": "Top 3 vacuum cleaners",
        "introduction": "올해의 무선 청소기를 비교했습니다.",
        "products": products,
        "conclusion": "용도에 맞게 고르세요.",
        "metaDescription": "무선 청소기 TOP 3 비교",
        "keywords": ["무선 청소기", "\"가성비\""],
        "faq": [
            {"question": "q1", "answer": "a1"},
            {"question": "q2", "answer": "a2"},
            {"question": "q3", "answer": "a3"}
        ],
        "schemaMarkup": schema_markup(ranks.len())
    })
    .to_string()
}

/// Minified `@graph` with one `Review` per product and an FAQ page.
pub fn schema_markup(reviews: usize) -> String {
    let reviews: Vec<_> = (1..=reviews)
        .map(|i| json!({"@type": "Review", "itemReviewed": {"@type": "Product", "name": format!("청소기 {}", i)}}))
        .collect();
    json!({
        "@context": "https://schema.org",
        "@graph": [
            {"@type": "BlogPosting", "headline": "Top 3 \"vacuum\" cleaners", "review": reviews},
            {"@type": "FAQPage", "mainEntity": []}
        ]
    })
    .to_string()
}

pub fn product_blob(name: &str, image: &str) -> String {
    json!({
        "@context": "https://schema.org",
        "@type": "Product",
        "name": name,
        "image": image,
        "brand": {"@type": "Brand", "name": "Acme"},
        "offers": {"@type": "Offer", "price": "199000"},
        "aggregateRating": {"ratingValue": "4.6", "reviewCount": "1234"}
    })
    .to_string()
}

/// Backend that replies with queued texts in order and records every request.
#[derive(Default)]
pub struct Scripted {
    replies: Mutex<Vec<String>>,
    pub seen: Mutex<Vec<GenerationRequest>>,
}

impl Scripted {
    pub fn new(replies: Vec<String>) -> Arc<Self> {
        let mut replies = replies;
        replies.reverse();
        Arc::new(Scripted { replies: Mutex::new(replies), seen: Mutex::new(Vec::new()) })
    }
}

#[async_trait]
impl TextGenerator for Scripted {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String> {
        self.seen.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| anyhow::anyhow!("no scripted reply left"))
    }
}

pub fn client(backend: Arc<Scripted>) -> GenerationClient {
    GenerationClient::with_backend(backend, "test-model")
}
