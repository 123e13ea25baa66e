//! Standalone HTML document export.

use crate::model::{Faq, RenderableBlogPost, RenderableProduct};

use super::{CTA_LABEL, DISCLOSURE, HEADING_CONCLUSION, HEADING_FAQ};

/// Render the full document. Field text is emitted as given; nothing is escaped,
/// reordered or shortened, and `schema_markup` goes into the head untouched.
pub fn render_html(post: &RenderableBlogPost) -> String {
    let products_html: String = post.products.iter().map(render_product).collect();
    let faq_html: String = post.faq.iter().map(render_faq).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <meta name="description" content="{description}">
  <meta name="keywords" content="{keywords}">
  <script src="https://cdn.tailwindcss.com"></script>
  <script type="application/ld+json">{schema}</script>
</head>
<body class="bg-gray-50 font-sans">
  <main class="container mx-auto p-8 bg-white shadow-lg my-8 rounded-lg">
    <article>
      <header>
        <h1 class="text-5xl font-extrabold text-gray-900 mb-4">{title}</h1>
        <p class="text-xl text-gray-600 mb-8">{introduction}</p>
      </header>

      <section class="mb-12">{products_html}
      </section>

      <section class="mb-12">
        <h2 class="text-3xl font-bold mb-4">{conclusion_heading}</h2>
        <p class="text-lg">{conclusion}</p>
      </section>

      <section>
        <h2 class="text-3xl font-bold mb-4">{faq_heading}</h2>{faq_html}
      </section>
    </article>
    <footer class="text-center text-sm text-gray-500 mt-12 pt-6 border-t">
      <p>{disclosure}</p>
    </footer>
  </main>
</body>
</html>
"#,
        title = post.blog_title,
        description = post.meta_description,
        keywords = post.keywords.join(", "),
        schema = post.schema_markup,
        introduction = post.introduction,
        products_html = products_html,
        conclusion_heading = HEADING_CONCLUSION,
        conclusion = post.conclusion,
        faq_heading = HEADING_FAQ,
        faq_html = faq_html,
        disclosure = DISCLOSURE,
    )
}

fn render_product(product: &RenderableProduct) -> String {
    let review = &product.review;
    let image = match product.image_url.as_deref() {
        Some(url) => format!(
            r#"<img src="{}" alt="{}" class="rounded-lg shadow-lg w-full">"#,
            url, review.product_name
        ),
        None => String::new(),
    };

    format!(
        r#"
        <div class="mb-12">
          <h2 class="text-3xl font-bold mb-4">{rank}. {name}</h2>
          <div class="flex flex-col md:flex-row gap-8">
            <div class="md:w-1/3">
              {image}
            </div>
            <div class="md:w-2/3">
              <p class="text-lg mb-4">{description}</p>
              <div class="grid grid-cols-1 sm:grid-cols-2 gap-4 mb-6">
                <div class="bg-green-50 p-4 rounded-lg">
                  <h3 class="font-bold text-green-800 mb-2">장점 (Pros)</h3>
                  <ul class="list-disc list-inside text-green-700">{pros}</ul>
                </div>
                <div class="bg-red-50 p-4 rounded-lg">
                  <h3 class="font-bold text-red-800 mb-2">단점 (Cons)</h3>
                  <ul class="list-disc list-inside text-red-700">{cons}</ul>
                </div>
              </div>
              <a href="{link}" target="_blank" rel="noopener sponsored" class="inline-block bg-blue-600 hover:bg-blue-700 text-white font-bold py-3 px-6 rounded-lg text-center no-underline">{cta}</a>
            </div>
          </div>
        </div>"#,
        rank = review.rank,
        name = review.product_name,
        image = image,
        description = review.description,
        pros = list_items(&review.pros),
        cons = list_items(&review.cons),
        link = product.coupang_link,
        cta = CTA_LABEL,
    )
}

fn list_items(items: &[String]) -> String {
    items.iter().map(|item| format!("<li>{}</li>", item)).collect()
}

fn render_faq(faq: &Faq) -> String {
    format!(
        r#"
        <div class="mb-4">
          <h3 class="text-xl font-semibold">{}</h3>
          <p class="text-gray-600 mt-1">{}</p>
        </div>"#,
        faq.question, faq.answer
    )
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::sample_post;

    #[test]
    fn payload_is_embedded_verbatim() {
        let post = sample_post();
        let html = render_html(&post);
        assert!(html.contains(&post.schema_markup));
        assert!(html.contains(&format!(
            r#"<script type="application/ld+json">{}</script>"#,
            post.schema_markup
        )));
    }

    #[test]
    fn head_carries_metadata() {
        let html = render_html(&sample_post());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>최고의 무선 청소기 TOP 2</title>"));
        assert!(html.contains(r#"<meta name="description" content="올해 가장 인기 있는 무선 청소기 비교">"#));
        assert!(html.contains(r#"<meta name="keywords" content="무선 청소기, 가성비 청소기">"#));
    }

    #[test]
    fn products_render_in_order_with_links() {
        let html = render_html(&sample_post());
        let first = html.find("1. 다이슨 V12").unwrap();
        let second = html.find("2. LG 코드제로").unwrap();
        assert!(first < second);
        assert!(html.contains(r#"<a href="https://link.coupang.com/a/aaa" target="_blank" rel="noopener sponsored""#));
        assert!(html.contains(r#"<img src="https://img.example/v12.jpg" alt="다이슨 V12""#));
        assert!(html.contains("<li>강력한 흡입력</li><li>가벼운 무게</li>"));
        assert!(html.contains("<li>비싼 가격</li>"));
        assert_eq!(html.matches(CTA_LABEL).count(), 2);
    }

    #[test]
    fn closing_sections_are_present() {
        let html = render_html(&sample_post());
        let conclusion = html.find(HEADING_CONCLUSION).unwrap();
        let faq = html.find(HEADING_FAQ).unwrap();
        assert!(conclusion < faq);
        let q1 = html.find("먼지통 비우기는 쉬운가요?").unwrap();
        let q2 = html.find("배터리는 얼마나 가나요?").unwrap();
        assert!(q1 < q2);
        assert!(html.contains(DISCLOSURE));
    }

    #[test]
    fn missing_image_emits_no_img_tag() {
        let mut post = sample_post();
        post.products[1].image_url = None;
        let html = render_html(&post);
        assert_eq!(html.matches("<img ").count(), 1);
    }

    #[test]
    fn rendering_is_pure() {
        let post = sample_post();
        assert_eq!(render_html(&post), render_html(&post.clone()));
    }
}
