use cdp_client_instrumented::prelude::{ClientError, ClientResult, Session};
use serde::Deserialize;

/// What the product page showed, extracted from the rendered DOM.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub features: Vec<String>,
    pub image: String,
    pub related: Vec<RelatedProduct>,
    pub reviews: Vec<Review>,
}

/// One entry of the related-products strip.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RelatedProduct {
    pub name: String,
    pub price: f64,
    pub image: String,
}

/// One customer review.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Review {
    pub name: String,
    pub text: String,
}

/// A related-product row as the page projection returns it, price still unparsed.
#[derive(Debug, Deserialize)]
struct RelatedRow {
    name: String,
    price: String,
    image: String,
}

const RELATED_JS: &str = "Array.from(document.querySelectorAll('#product-related > div'))\
    .map((row) => ({ \
        name: row.querySelector('h4').textContent, \
        price: row.querySelector('p').textContent, \
        image: row.querySelector('img').getAttribute('src') }))";

const REVIEWS_JS: &str = "Array.from(document.querySelectorAll('#product-reviews > div'))\
    .map((row) => ({ \
        name: row.querySelector('h4').textContent, \
        text: row.querySelector('p').textContent }))";

/// Parses displayed price text such as `$244.99`.
///
/// Exactly one leading currency symbol is stripped and the remainder parsed as a float. Text
/// that is empty or starts with a digit is an extraction error, never a silent zero; `field`
/// names the record field the text came from.
pub fn parse_price(field: &str, text: &str) -> ClientResult<f64> {
    let mut chars = text.chars();
    let leading = chars.next().ok_or_else(|| ClientError::Extraction {
        field: field.to_string(),
        reason: "price text is empty".to_string(),
    })?;
    if leading.is_ascii_digit() {
        return Err(ClientError::Extraction {
            field: field.to_string(),
            reason: format!("price text {text:?} does not start with a currency symbol"),
        });
    }
    let amount = chars.as_str();
    amount.parse::<f64>().map_err(|e| ClientError::Extraction {
        field: field.to_string(),
        reason: format!("cannot parse {amount:?} as a price: {e}"),
    })
}

/// Pulls the product record out of the rendered page, one field per evaluation.
///
/// A selector that matches nothing makes its evaluation throw, which surfaces as an
/// `Extraction` error naming the field. A partially rendered page therefore fails on the
/// first field that is missing.
pub async fn extract_product(session: &Session) -> ClientResult<ProductRecord> {
    let name = session
        .evaluate("name", "document.querySelector('#product-name').textContent")
        .await?;
    let price_text: String = session
        .evaluate("price", "document.querySelector('#product-price').textContent")
        .await?;
    let price = parse_price("price", &price_text)?;
    let description = session
        .evaluate(
            "description",
            "document.querySelector('#product-description').textContent",
        )
        .await?;
    let features = session
        .evaluate(
            "features",
            "Array.from(document.querySelectorAll('#product-features > li')).map((li) => li.textContent)",
        )
        .await?;
    let image = session
        .evaluate(
            "image",
            "document.querySelector('#product-image').getAttribute('src')",
        )
        .await?;

    let related_rows: Vec<RelatedRow> = session.evaluate("related", RELATED_JS).await?;
    let mut related = Vec::with_capacity(related_rows.len());
    for (index, row) in related_rows.into_iter().enumerate() {
        let price = parse_price(&format!("related[{index}].price"), &row.price)?;
        related.push(RelatedProduct {
            name: row.name,
            price,
            image: row.image,
        });
    }

    let reviews = session.evaluate("reviews", REVIEWS_JS).await?;

    Ok(ProductRecord {
        name,
        price,
        description,
        features,
        image,
        related,
        reviews,
    })
}

/// What the product page is expected to show.
///
/// Every field is optional and `None` skips that assertion, so script variants that assert
/// more or less are configuration of the same validator rather than separate code paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductExpectations {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub features: Option<Vec<String>>,
    pub related_count: Option<usize>,
    pub related: Option<Vec<RelatedProduct>>,
    pub reviews_count: Option<usize>,
    pub reviews: Option<Vec<Review>>,
}

/// The values the campfire-commerce demo page renders once fully loaded.
pub fn campfire_expectations() -> ProductExpectations {
    ProductExpectations {
        price: Some(244.99),
        image: Some("images/nomad_000.jpg".to_string()),
        related_count: Some(3),
        reviews_count: Some(3),
        ..Default::default()
    }
}

/// Compares an extracted record against the expectations.
///
/// Stops at the first mismatch with a [ClientError::ValidationMismatch] naming the offending
/// field, which the scenario treats as fatal for the whole run loop.
pub fn validate_product(
    record: &ProductRecord,
    expectations: &ProductExpectations,
) -> ClientResult<()> {
    if let Some(name) = &expectations.name {
        if &record.name != name {
            return Err(mismatch("name", &record.name, name));
        }
    }
    if let Some(price) = expectations.price {
        if record.price != price {
            return Err(mismatch("price", record.price, price));
        }
    }
    if let Some(image) = &expectations.image {
        if &record.image != image {
            return Err(mismatch("image", &record.image, image));
        }
    }
    if let Some(features) = &expectations.features {
        validate_list("features", &record.features, features)?;
    }
    if let Some(count) = expectations.related_count {
        if record.related.len() != count {
            return Err(mismatch("related", record.related.len(), count));
        }
    }
    if let Some(related) = &expectations.related {
        validate_list("related", &record.related, related)?;
    }
    if let Some(count) = expectations.reviews_count {
        if record.reviews.len() != count {
            return Err(mismatch("reviews", record.reviews.len(), count));
        }
    }
    if let Some(reviews) = &expectations.reviews {
        validate_list("reviews", &record.reviews, reviews)?;
    }
    Ok(())
}

/// Length equality first, then element-wise comparison naming the indexed field.
fn validate_list<T: PartialEq + std::fmt::Debug>(
    field: &str,
    actual: &[T],
    expected: &[T],
) -> ClientResult<()> {
    if actual.len() != expected.len() {
        return Err(mismatch(field, actual.len(), expected.len()));
    }
    for (index, (got, want)) in actual.iter().zip(expected).enumerate() {
        if got != want {
            return Err(mismatch(
                format!("{field}[{index}]"),
                format!("{got:?}"),
                format!("{want:?}"),
            ));
        }
    }
    Ok(())
}

fn mismatch(
    field: impl Into<String>,
    actual: impl std::fmt::Display,
    expected: impl std::fmt::Display,
) -> ClientError {
    ClientError::ValidationMismatch {
        field: field.into(),
        actual: actual.to_string(),
        expected: expected.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_record() -> ProductRecord {
        ProductRecord {
            name: "Nomad Camp Stove".to_string(),
            price: 244.99,
            description: "A compact stove for base camp.".to_string(),
            features: vec![
                "Wind resistant".to_string(),
                "Packs flat".to_string(),
            ],
            image: "images/nomad_000.jpg".to_string(),
            related: vec![
                RelatedProduct {
                    name: "Fuel Canister".to_string(),
                    price: 12.50,
                    image: "images/fuel_000.jpg".to_string(),
                },
                RelatedProduct {
                    name: "Wind Screen".to_string(),
                    price: 18.00,
                    image: "images/screen_000.jpg".to_string(),
                },
                RelatedProduct {
                    name: "Spark Lighter".to_string(),
                    price: 7.25,
                    image: "images/lighter_000.jpg".to_string(),
                },
            ],
            reviews: vec![
                Review {
                    name: "Ada".to_string(),
                    text: "Boils fast even in wind.".to_string(),
                },
                Review {
                    name: "Grace".to_string(),
                    text: "Light enough to forget it is in the pack.".to_string(),
                },
                Review {
                    name: "Edsger".to_string(),
                    text: "Simple and correct.".to_string(),
                },
            ],
        }
    }

    #[test]
    fn parses_a_symbol_prefixed_price() {
        assert_eq!(parse_price("price", "$244.99").unwrap(), 244.99);
    }

    #[test]
    fn a_zero_price_is_still_a_price() {
        assert_eq!(parse_price("price", "$0.00").unwrap(), 0.0);
    }

    #[test]
    fn any_single_leading_symbol_is_stripped() {
        // The strip is one character, not one byte.
        assert_eq!(parse_price("price", "€9.50").unwrap(), 9.5);
    }

    #[test]
    fn a_price_without_a_currency_symbol_is_rejected() {
        let err = parse_price("price", "244.99").unwrap_err();
        match err {
            ClientError::Extraction { field, reason } => {
                assert_eq!(field, "price");
                assert!(reason.contains("currency symbol"), "{reason}");
            }
            other => panic!("expected an extraction error, got {other:?}"),
        }
    }

    #[test]
    fn empty_price_text_is_rejected() {
        let err = parse_price("related[1].price", "").unwrap_err();
        match err {
            ClientError::Extraction { field, reason } => {
                assert_eq!(field, "related[1].price");
                assert_eq!(reason, "price text is empty");
            }
            other => panic!("expected an extraction error, got {other:?}"),
        }
    }

    #[test]
    fn a_symbol_followed_by_garbage_is_rejected() {
        assert!(parse_price("price", "$free").is_err());
    }

    #[test]
    fn a_matching_record_passes() {
        validate_product(&sample_record(), &campfire_expectations()).unwrap();
    }

    #[test]
    fn no_expectations_means_no_assertions() {
        validate_product(&sample_record(), &ProductExpectations::default()).unwrap();
    }

    #[test]
    fn a_price_mismatch_names_the_field() {
        let mut record = sample_record();
        record.price = 199.99;

        let err = validate_product(&record, &campfire_expectations()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "validation failed for price: got 199.99, want 244.99"
        );
    }

    #[test]
    fn a_missing_review_fails_the_count_check() {
        let mut record = sample_record();
        record.reviews.pop();

        let err = validate_product(&record, &campfire_expectations()).unwrap_err();

        assert_eq!(err.to_string(), "validation failed for reviews: got 2, want 3");
    }

    #[test]
    fn an_element_mismatch_names_the_index() {
        let record = sample_record();
        let mut expected = record.reviews.clone();
        expected[1].text = "over 9000!".to_string();
        let expectations = ProductExpectations {
            reviews: Some(expected),
            ..Default::default()
        };

        let err = validate_product(&record, &expectations).unwrap_err();

        match err {
            ClientError::ValidationMismatch { field, .. } => assert_eq!(field, "reviews[1]"),
            other => panic!("expected a validation mismatch, got {other:?}"),
        }
    }

    #[test]
    fn list_lengths_are_checked_before_elements() {
        let record = sample_record();
        let expectations = ProductExpectations {
            features: Some(vec!["Wind resistant".to_string()]),
            ..Default::default()
        };

        let err = validate_product(&record, &expectations).unwrap_err();

        assert_eq!(err.to_string(), "validation failed for features: got 2, want 1");
    }
}
