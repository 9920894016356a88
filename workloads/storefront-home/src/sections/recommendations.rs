//! Recommended products section renderer.

use edge_executor::DeferredValue;
use edge_streaming::Boundary;

use crate::data::{RecommendedProduct, RecommendedProducts};

use super::escape_html;

/// Boundary the recommended products are streamed into.
pub const RECOMMENDED_PRODUCTS_BOUNDARY: &str = "recommended-products";

const SKELETON_CARDS: usize = 4;

/// Boundary with the skeleton grid as its fallback.
pub fn recommended_products_boundary() -> Boundary {
    Boundary::new(RECOMMENDED_PRODUCTS_BOUNDARY).with_fallback(render_recommended_products_fallback())
}

/// Section frame sent in the initial response, with the boundary placeholder
/// where the grid will go.
pub fn render_recommended_section(boundary: &Boundary) -> String {
    format!(
        r#"<section class="recommended-products" data-section="recommended-products">
    <h2>Recommended Products</h2>
    {placeholder}
    <a class="cta-secondary" href="/collections">View All Products</a>
</section>
"#,
        placeholder = boundary.render_placeholder()
    )
}

/// Skeleton grid shown until the products arrive.
pub fn render_recommended_products_fallback() -> String {
    let card = r#"<div class="product-card product-card--skeleton" aria-hidden="true"><div class="skeleton-image"></div><div class="skeleton-line"></div><div class="skeleton-line skeleton-line--short"></div></div>"#;
    format!(
        r#"<div class="recommended-products-grid recommended-products-grid--loading">{}</div>"#,
        card.repeat(SKELETON_CARDS)
    )
}

/// Grid that replaces the fallback. `Unavailable` renders an empty grid.
pub fn render_recommended_products(products: DeferredValue<&RecommendedProducts>) -> String {
    let cards: String = match products {
        DeferredValue::Ready(products) => products.nodes().iter().map(render_product_card).collect(),
        DeferredValue::Unavailable => String::new(),
    };

    format!(r#"<div class="recommended-products-grid">{}</div>"#, cards)
}

/// Render a single product card.
pub fn render_product_card(product: &RecommendedProduct) -> String {
    let image = match &product.featured_image {
        Some(image) => format!(
            r#"<img src="{src}" alt="{alt}" loading="lazy" sizes="(min-width: 768px) 25vw, (min-width: 640px) 50vw, 100vw">"#,
            src = escape_html(&image.url),
            alt = escape_html(image.alt_or(&product.title))
        ),
        None => r#"<div class="product-card-placeholder"></div>"#.to_string(),
    };

    format!(
        r#"<a class="product-card" href="{url}">
        <div class="product-card-image">{image}</div>
        <h3 class="product-card-title">{title}</h3>
        <p class="product-card-price">{price}</p>
    </a>"#,
        url = escape_html(&product.url()),
        image = image,
        title = escape_html(&product.title),
        price = escape_html(&product.price().format())
    )
}
