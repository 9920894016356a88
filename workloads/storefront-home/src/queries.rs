//! GraphQL documents issued by the home page.
//!
//! Both run in the request's country/language context; the variables are
//! supplied by `QueryContext`.

use edge_data::Query;

pub const FEATURED_COLLECTION_QUERY: &str = r#"
  fragment FeaturedCollection on Collection {
    id
    title
    image {
      id
      url
      altText
      width
      height
    }
    handle
  }
  query FeaturedCollection($country: CountryCode, $language: LanguageCode)
    @inContext(country: $country, language: $language) {
    collections(first: 1, sortKey: UPDATED_AT, reverse: true) {
      nodes {
        ...FeaturedCollection
      }
    }
  }
"#;

pub const RECOMMENDED_PRODUCTS_QUERY: &str = r#"
  fragment RecommendedProduct on Product {
    id
    title
    handle
    priceRange {
      minVariantPrice {
        amount
        currencyCode
      }
    }
    featuredImage {
      id
      url
      altText
      width
      height
    }
  }
  query RecommendedProducts($country: CountryCode, $language: LanguageCode)
    @inContext(country: $country, language: $language) {
    products(first: 4, sortKey: UPDATED_AT, reverse: true) {
      nodes {
        ...RecommendedProduct
      }
    }
  }
"#;

/// Most recently updated collection.
pub fn featured_collection() -> Query {
    Query::new("FeaturedCollection", FEATURED_COLLECTION_QUERY)
}

/// Four most recently updated products.
pub fn recommended_products() -> Query {
    Query::new("RecommendedProducts", RECOMMENDED_PRODUCTS_QUERY)
}
