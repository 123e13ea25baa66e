//! Markdown export with a front-matter header for static-site pipelines.

use chrono::{Local, NaiveDate};

use crate::model::{Faq, RenderableBlogPost, RenderableProduct};

use super::{CTA_LABEL, DISCLOSURE, HEADING_CONCLUSION, HEADING_FAQ, HEADING_PRODUCTS};

const CTA_STYLE: &str = "display:inline-block; background-color:#0073e6; color:white; font-weight:bold; padding: 12px 24px; border-radius: 8px; text-align:center; text-decoration: none;";

/// Export stamped with today's local date. The date is the only part that varies
/// between exports of the same article.
pub fn export_markdown(post: &RenderableBlogPost) -> String {
    render_markdown(post, Local::now().date_naive())
}

/// Render with an explicit header date.
pub fn render_markdown(post: &RenderableBlogPost, date: NaiveDate) -> String {
    let products_md = post
        .products
        .iter()
        .map(render_product)
        .collect::<Vec<_>>()
        .join("\n---\n\n");
    let faq_md = post
        .faq
        .iter()
        .map(render_faq)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"{front_matter}
{introduction}

## {products_heading}

{products_md}
## {conclusion_heading}

{conclusion}

## {faq_heading}

{faq_md}
---

*{disclosure}*

<script type="application/ld+json">{schema}</script>
"#,
        front_matter = front_matter(post, date),
        introduction = post.introduction,
        products_heading = HEADING_PRODUCTS,
        products_md = products_md,
        conclusion_heading = HEADING_CONCLUSION,
        conclusion = post.conclusion,
        faq_heading = HEADING_FAQ,
        faq_md = faq_md,
        disclosure = DISCLOSURE,
        schema = post.schema_markup,
    )
}

fn front_matter(post: &RenderableBlogPost, date: NaiveDate) -> String {
    let keywords = post
        .keywords
        .iter()
        .map(|k| format!("\"{}\"", escape_quotes(k)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "---\ntitle: \"{}\"\ndate: '{}'\ndescription: \"{}\"\nkeywords: [{}]\n---\n",
        escape_quotes(&post.blog_title),
        date.format("%Y-%m-%d"),
        escape_quotes(&post.meta_description),
        keywords,
    )
}

/// `"` → `\"` so header values stay inside their double-quoted scalars.
pub fn escape_quotes(value: &str) -> String {
    value.replace('"', "\\\"")
}

fn render_product(product: &RenderableProduct) -> String {
    let review = &product.review;
    let image = match product.image_url.as_deref() {
        Some(url) => format!("![{}]({})\n\n", review.product_name, url),
        None => String::new(),
    };

    format!(
        r#"### {rank}. {name}

{image}{description}

**장점:**
{pros}

**단점:**
{cons}

<a href="{link}" target="_blank" rel="noopener sponsored" style="{style}">{cta}</a>
"#,
        rank = review.rank,
        name = review.product_name,
        image = image,
        description = review.description,
        pros = bullets(&review.pros),
        cons = bullets(&review.cons),
        link = product.coupang_link,
        style = CTA_STYLE,
        cta = CTA_LABEL,
    )
}

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_faq(faq: &Faq) -> String {
    format!("### {}\n\n{}\n", faq.question, faq.answer)
}

// ── Tests ──
