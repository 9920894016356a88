//! Product data models.

use serde::{Deserialize, Serialize};

use super::{Connection, Image};

/// Money amount as returned by the storefront API.
///
/// `amount` stays a decimal string so no precision is lost before display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: String,
    pub currency_code: String,
}

impl Money {
    /// Format with a currency symbol where one is known, otherwise a code suffix.
    pub fn format(&self) -> String {
        let amount = format_decimal(&self.amount, minor_digits(&self.currency_code))
            .unwrap_or_else(|| self.amount.clone());

        match self.currency_code.as_str() {
            "USD" => format!("${}", amount),
            "CAD" => format!("CA${}", amount),
            "EUR" => format!("€{}", amount),
            "GBP" => format!("£{}", amount),
            code => format!("{} {}", amount, code),
        }
    }
}

/// Fraction digits shown for a currency.
fn minor_digits(currency_code: &str) -> usize {
    match currency_code {
        "JPY" | "KRW" | "VND" | "CLP" | "ISK" => 0,
        _ => 2,
    }
}

/// Pad the fraction of a decimal string to `digits` places.
///
/// Works on the text, so nothing is rounded: non-zero digits past `digits`
/// are kept. Returns `None` if `amount` is not a plain decimal.
fn format_decimal(amount: &str, digits: usize) -> Option<String> {
    let (sign, unsigned) = match amount.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", amount),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if whole.is_empty() || !is_digits(whole) || !is_digits(fraction) {
        return None;
    }

    let mut fraction = fraction.trim_end_matches('0').to_string();
    while fraction.len() < digits {
        fraction.push('0');
    }

    Some(if fraction.is_empty() {
        format!("{}{}", sign, whole)
    } else {
        format!("{}{}.{}", sign, whole, fraction)
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min_variant_price: Money,
}

/// Product shown in the recommendations grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedProduct {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub handle: String,
    pub price_range: PriceRange,
    #[serde(default)]
    pub featured_image: Option<Image>,
}

impl RecommendedProduct {
    /// Storefront URL for the product.
    pub fn url(&self) -> String {
        format!("/products/{}", self.handle)
    }

    /// Lowest variant price.
    pub fn price(&self) -> &Money {
        &self.price_range.min_variant_price
    }
}

/// `data` payload of the recommended products query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendedProducts {
    pub products: Connection<RecommendedProduct>,
}

impl RecommendedProducts {
    /// Products in display order.
    pub fn nodes(&self) -> &[RecommendedProduct] {
        &self.products.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.products.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(amount: &str, code: &str) -> Money {
        Money {
            amount: amount.to_string(),
            currency_code: code.to_string(),
        }
    }

    #[test]
    fn test_money_format() {
        assert_eq!(money("19.5", "USD").format(), "$19.50");
        assert_eq!(money("10.0", "EUR").format(), "€10.00");
        assert_eq!(money("3", "GBP").format(), "£3.00");
        assert_eq!(money("7.25", "CAD").format(), "CA$7.25");
        assert_eq!(money("n/a", "USD").format(), "$n/a");
    }

    #[test]
    fn test_money_keeps_the_decimal_text() {
        assert_eq!(money("1200", "JPY").format(), "1200 JPY");
        assert_eq!(money("1200.0", "JPY").format(), "1200 JPY");
        assert_eq!(money("0.125", "USD").format(), "$0.125");
        assert_eq!(money("12345678901234567.10", "CHF").format(), "12345678901234567.10 CHF");
        assert_eq!(money("-4.5", "EUR").format(), "€-4.50");
        assert_eq!(money("1e3", "USD").format(), "$1e3");
    }

    #[test]
    fn test_decode_products() {
        let data: RecommendedProducts = serde_json::from_value(serde_json::json!({
            "products": { "nodes": [{
                "id": "gid://shopify/Product/1",
                "title": "Serum",
                "handle": "serum",
                "priceRange": { "minVariantPrice": { "amount": "24.0", "currencyCode": "USD" } },
                "featuredImage": null
            }]}
        }))
        .unwrap();

        assert_eq!(data.nodes().len(), 1);
        let product = &data.nodes()[0];
        assert_eq!(product.url(), "/products/serum");
        assert_eq!(product.price().format(), "$24.00");
        assert!(product.featured_image.is_none());
    }

    #[test]
    fn test_default_is_empty() {
        assert!(RecommendedProducts::default().is_empty());
    }
}
