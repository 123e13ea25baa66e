use std::fmt::Write;

use chrono::NaiveDate;

use crate::model::ProductInput;

const MISSING: &str = "N/A";

/// Names and logo the JSON-LD `author` / `publisher` nodes are filled with.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteProfile {
    pub author_name: String,
    pub publisher_name: String,
    pub logo_url: String,
}

impl Default for SiteProfile {
    fn default() -> Self {
        SiteProfile {
            author_name: "콘텐츠 전문가".to_string(),
            publisher_name: "블로그 이름".to_string(),
            logo_url: "https://example.com/logo.png".to_string(),
        }
    }
}

/// One line per product, in list order.
pub fn product_summary(products: &[ProductInput]) -> String {
    products
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let rating = p.aggregate_rating.map(|r| r.rating_value.to_string());
            let reviews = p.aggregate_rating.map(|r| r.rating_count.to_string());
            format!(
                "Product {}: Name='{}', Price='{}', Brand='{}', Rating='{}', Reviews='{}'",
                i + 1,
                p.product_name.as_deref().unwrap_or(MISSING),
                p.price.as_deref().unwrap_or(MISSING),
                p.brand.as_deref().unwrap_or(MISSING),
                rating.as_deref().unwrap_or(MISSING),
                reviews.as_deref().unwrap_or(MISSING),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full instruction text. Callers must have validated topic and products already.
pub fn build_instruction(
    topic: &str,
    products: &[ProductInput],
    today: NaiveDate,
    site: &SiteProfile,
) -> String {
    let n = products.len();
    let date = today.format("%Y-%m-%d");
    let mut out = String::with_capacity(4096);

    let _ = writeln!(
        out,
        "You are an expert Korean SEO content strategist and copywriter who writes affiliate \
         review posts that earn rich results on Google."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Topic of the blog post: \"{topic}\".");
    let _ = writeln!(out, "Format: a \"Top {n}\" product review, ranked in the order given below.");
    let _ = writeln!(
        out,
        "Write everything in Korean and return only JSON that follows the supplied response schema."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Products to review:");
    let _ = writeln!(out, "{}", product_summary(products));
    let _ = writeln!(out);

    let _ = writeln!(out, "CONTENT REQUIREMENTS:");
    let _ = writeln!(
        out,
        "1. Reader first: answer the questions and doubts a buyer has, in a helpful and \
         trustworthy tone that leads to a confident purchase."
    );
    let _ = writeln!(
        out,
        "2. Keywords: work the main keywords of \"{topic}\" and close synonyms naturally into \
         'blogTitle', 'introduction', every product description, 'conclusion' and 'faq'."
    );
    let _ = writeln!(
        out,
        "3. Credibility: mention each product's brand, rating and review count in its review \
         (e.g. \"1,000개가 넘는 리뷰에서 4.5점의 높은 평점을 받은 제품입니다.\")."
    );
    let _ = writeln!(
        out,
        "4. FAQ: write 3 to 5 questions a shopper asks before buying, with answers, to target \
         \"People Also Ask\" results."
    );
    let _ = writeln!(
        out,
        "5. Products: return exactly {n} entries in 'products', with 'rank' 1 to {n} matching \
         the order above, and copy name, price and rating values from the product data."
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "SCHEMA MARKUP REQUIREMENTS ('schemaMarkup'):");
    let _ = writeln!(out, "- One minified JSON-LD string using a top-level \"@graph\" array.");
    let _ = writeln!(
        out,
        "- Exactly one 'BlogPosting' node with 'headline', 'description', 'image' (first \
         product image), 'author' ({{\"@type\":\"Person\",\"name\":\"{author}\"}}), \
         'publisher' ({{\"@type\":\"Organization\",\"name\":\"{publisher}\",\"logo\":\
         {{\"@type\":\"ImageObject\",\"url\":\"{logo}\"}}}}), 'datePublished': \"{date}\" and \
         'dateModified': \"{date}\".",
        author = site.author_name,
        publisher = site.publisher_name,
        logo = site.logo_url,
    );
    let _ = writeln!(
        out,
        "- The BlogPosting 'review' list holds exactly {n} 'Review' nodes, one per product in \
         rank order. Each has 'author' (same Person), 'reviewRating' ({{\"@type\":\"Rating\",\
         \"ratingValue\": the product's rating, \"bestRating\":\"5\"}}) and a 'reviewBody' \
         summary."
    );
    let _ = writeln!(
        out,
        "- Each Review's 'itemReviewed' is a full 'Product' node with 'name', 'image' (from the \
         input), 'description', 'brand' ({{\"@type\":\"Brand\",\"name\": from the input}}), \
         'offers' ({{\"@type\":\"Offer\",\"price\": from the input,\"priceCurrency\":\"KRW\",\
         \"availability\":\"https://schema.org/InStock\"}}) and an 'aggregateRating' \
         ({{\"@type\":\"AggregateRating\",\"ratingValue\",\"ratingCount\"}}) using the same \
         rating and review count as the product data."
    );
    let _ = writeln!(
        out,
        "- Exactly one 'FAQPage' node whose 'mainEntity' lists every question and answer from \
         'faq' as 'Question' / 'Answer' nodes."
    );
    let _ = writeln!(
        out,
        "- Escape every double quote inside the string value (\\\") so the outer JSON stays valid."
    );
    let _ = writeln!(out);
    let _ = write!(out, "Return the JSON object only, with no surrounding text.");

    out
}

// ── Tests ──
