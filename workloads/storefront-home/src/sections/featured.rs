//! Featured collection section renderer.

use crate::data::FeaturedCollection;

use super::escape_html;

/// Render the featured collection section.
///
/// Returns `None` when the store has no collection; the page then simply
/// omits the section.
pub fn render_featured_collection(collection: Option<&FeaturedCollection>) -> Option<String> {
    let collection = collection?;

    let image = collection
        .image
        .as_ref()
        .map(|image| {
            let size = match (image.width, image.height) {
                (Some(w), Some(h)) => format!(r#" width="{}" height="{}""#, w, h),
                _ => String::new(),
            };
            format!(
                r#"<div class="featured-collection-image">
            <img src="{src}" alt="{alt}"{size} sizes="(min-width: 768px) 50vw, 100vw">
        </div>"#,
                src = escape_html(&image.url),
                alt = escape_html(image.alt_or(&collection.title)),
                size = size
            )
        })
        .unwrap_or_default();

    Some(format!(
        r#"<section class="featured-collection" data-section="featured-collection">
    <h2>Featured Collection</h2>
    <a class="featured-collection-link" href="{url}">
        {image}
        <h3>{title}</h3>
        <span class="cta-primary">Explore Collection</span>
    </a>
</section>
"#,
        url = escape_html(&collection.url()),
        image = image,
        title = escape_html(&collection.title)
    ))
}

#[cfg(test)]
mod tests {
    use crate::data::Image;

    use super::*;

    fn collection(image: Option<Image>) -> FeaturedCollection {
        FeaturedCollection {
            id: "c1".to_string(),
            title: "Bath & Body".to_string(),
            handle: "bath-body".to_string(),
            image,
        }
    }

    #[test]
    fn test_none_renders_nothing() {
        assert!(render_featured_collection(None).is_none());
    }

    #[test]
    fn test_renders_link_and_escaped_title() {
        let html = render_featured_collection(Some(&collection(None))).unwrap();
        assert!(html.contains(r#"href="/collections/bath-body""#));
        assert!(html.contains("<h3>Bath &amp; Body</h3>"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_renders_image_with_dimensions() {
        let image = Image {
            id: None,
            url: "https://cdn.example.com/c.jpg".to_string(),
            alt_text: Some("Soaps".to_string()),
            width: Some(1200),
            height: Some(800),
        };
        let html = render_featured_collection(Some(&collection(Some(image)))).unwrap();
        assert!(html.contains(r#"src="https://cdn.example.com/c.jpg" alt="Soaps" width="1200" height="800""#));
    }
}
