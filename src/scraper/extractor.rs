use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::domain::{FieldValue, LeadRecord, NO_RATING, NO_REVIEWS};
use crate::scraper::locators;
use crate::scraper::{Driver, DriverError, DriverResult};

static RATING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d\.\d|\d)").expect("rating pattern is valid"));

static REVIEWS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((\d{1,3}(?:,\d{3})*|[\d,]+)\)").expect("review pattern is valid")
});

// Detail rows are prefixed by a pipe or an icon-font glyph from the private use area.
static LEADING_GLYPH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[|·\x{E000}-\x{F8FF}]\s*").expect("glyph pattern is valid")
});

/// Split the composite rating blob (e.g. `"4.5 (1,234)"`) into rating and review count.
///
/// Only the first match of each pattern counts. Thousands separators are
/// removed from the review count.
pub fn parse_review_blob(text: &str) -> (String, String) {
    let rating = RATING_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or_else(|| NO_RATING.to_string(), |m| m.as_str().to_string());

    let reviews = REVIEWS_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or_else(|| NO_REVIEWS.to_string(), |m| m.as_str().replace(',', ""));

    (rating, reviews)
}

/// Strip one leading separator glyph and surrounding whitespace.
pub fn clean_text(text: &str) -> String {
    LEADING_GLYPH_RE
        .replace(text.trim_start(), "")
        .trim()
        .to_string()
}

/// Drop everything from the first `?` on.
pub fn clean_url(url: &str) -> String {
    url.split_once('?')
        .map_or(url, |(base, _)| base)
        .to_string()
}

/// Reads every lead field from an opened detail view.
///
/// Fields are looked up independently; a field whose element is missing is
/// recorded as [`FieldValue::NotFound`] and extraction moves on. Any other
/// driver error aborts the extraction.
#[derive(Debug, Clone, Default)]
pub struct FieldExtractor;

impl FieldExtractor {
    pub fn new() -> Self {
        Self
    }

    pub async fn extract<D: Driver>(&self, driver: &D) -> DriverResult<LeadRecord> {
        let name = Self::text_of(driver, locators::DETAIL_HEADING)
            .await?
            .map(|s| s.trim().to_string());

        let (rating, reviews) = match Self::text_of(driver, locators::REVIEW_BLOB).await? {
            Some(blob) => parse_review_blob(&blob),
            None => (NO_RATING.to_string(), NO_REVIEWS.to_string()),
        };

        let pricing = Self::text_of(driver, locators::PRICING)
            .await?
            .map(|s| clean_text(&s.replace('·', "")));

        let address = Self::cleaned(driver, locators::ADDRESS).await?;
        let hours = Self::cleaned(driver, locators::HOURS).await?;
        let plus_code = Self::cleaned(driver, locators::PLUS_CODE).await?;
        let phone = Self::cleaned(driver, locators::PHONE).await?;

        let website = Self::attribute_of(driver, locators::WEBSITE, "href")
            .await?
            .map(|href| clean_url(&href));

        Ok(LeadRecord {
            name: FieldValue::from_option(name),
            rating: FieldValue::Value(rating),
            reviews: FieldValue::Value(reviews),
            pricing: FieldValue::from_option(pricing),
            address: FieldValue::from_option(address),
            hours: FieldValue::from_option(hours),
            plus_code: FieldValue::from_option(plus_code),
            phone: FieldValue::from_option(phone),
            website: FieldValue::from_option(website),
        })
    }

    async fn cleaned<D: Driver>(driver: &D, locator: &str) -> DriverResult<Option<String>> {
        Ok(Self::text_of(driver, locator).await?.map(|s| clean_text(&s)))
    }

    async fn text_of<D: Driver>(driver: &D, locator: &str) -> DriverResult<Option<String>> {
        let lookup = async {
            let handle = driver.find(locator).await?;
            driver.read_text(&handle).await
        };
        Self::optional(locator, lookup.await)
    }

    async fn attribute_of<D: Driver>(
        driver: &D,
        locator: &str,
        name: &str,
    ) -> DriverResult<Option<String>> {
        let lookup = async {
            let handle = driver.find(locator).await?;
            driver.read_attribute(&handle, name).await
        };
        Ok(Self::optional(locator, lookup.await)?.flatten())
    }

    /// A missing element is an absent field; every other error propagates.
    fn optional<T>(locator: &str, result: DriverResult<T>) -> DriverResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(DriverError::NotFound(_)) => {
                debug!("Field not present: {}", locator);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NOT_FOUND;
    use crate::scraper::mock::{MockDriver, MockListing};

    #[test]
    fn test_review_blob_with_thousands() {
        let (rating, reviews) = parse_review_blob("4.5 (1,234)");
        assert_eq!(rating, "4.5");
        assert_eq!(reviews, "1234");
    }

    #[test]
    fn test_review_blob_without_count() {
        let (rating, reviews) = parse_review_blob("4.8");
        assert_eq!(rating, "4.8");
        assert_eq!(reviews, "0");
    }

    #[test]
    fn test_review_blob_integer_rating() {
        let (rating, reviews) = parse_review_blob("5 (12)");
        assert_eq!(rating, "5");
        assert_eq!(reviews, "12");
    }

    #[test]
    fn test_review_blob_first_match_only() {
        let (rating, reviews) = parse_review_blob("3.9 (87) · 4.2 (1,000)");
        assert_eq!(rating, "3.9");
        assert_eq!(reviews, "87");
    }

    #[test]
    fn test_review_blob_empty() {
        assert_eq!(
            parse_review_blob("No reviews"),
            ("N/A".to_string(), "0".to_string())
        );
    }

    #[test]
    fn test_clean_text_strips_glyph() {
        assert_eq!(clean_text("| 123 Main St "), "123 Main St");
        assert_eq!(clean_text("\u{e0c8}\n+1 512-555-0100"), "+1 512-555-0100");
        assert_eq!(clean_text("  plain  "), "plain");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_clean_text_strips_only_one_glyph() {
        assert_eq!(clean_text("| | x"), "| x");
    }

    #[test]
    fn test_clean_url() {
        assert_eq!(
            clean_url("https://cafe.test/?utm_source=gmb&x=1"),
            "https://cafe.test/"
        );
        assert_eq!(clean_url("https://cafe.test/menu"), "https://cafe.test/menu");
        assert_eq!(clean_url("a?b?c"), "a");
    }

    #[tokio::test]
    async fn test_extract_full_listing() {
        let listing = MockListing::new("Blue Cafe")
            .with(locators::REVIEW_BLOB, "4.6(2,310)")
            .with(locators::PRICING, "· $$")
            .with(locators::ADDRESS, "\u{e0c8} 1 Main St, Austin, TX")
            .with(locators::HOURS, "Open ⋅ Closes 6 PM")
            .with(locators::PLUS_CODE, "| 6PH4+2X Austin")
            .with(locators::PHONE, "\u{e0b0}(512) 555-0100")
            .with_website("https://bluecafe.test/?utm_source=maps");
        let driver = MockDriver::with_open_listing(listing);

        let record = FieldExtractor::new().extract(&driver).await.unwrap();

        assert_eq!(record.name.as_str(), "Blue Cafe");
        assert_eq!(record.rating.as_str(), "4.6");
        assert_eq!(record.reviews.as_str(), "2310");
        assert_eq!(record.pricing.as_str(), "$$");
        assert_eq!(record.address.as_str(), "1 Main St, Austin, TX");
        assert_eq!(record.hours.as_str(), "Open ⋅ Closes 6 PM");
        assert_eq!(record.plus_code.as_str(), "6PH4+2X Austin");
        assert_eq!(record.phone.as_str(), "(512) 555-0100");
        assert_eq!(record.website.as_str(), "https://bluecafe.test/");
    }

    #[tokio::test]
    async fn test_extract_missing_fields_become_markers() {
        let listing = MockListing::new("Bare Shop");
        let driver = MockDriver::with_open_listing(listing);

        let record = FieldExtractor::new().extract(&driver).await.unwrap();

        assert_eq!(record.name.as_str(), "Bare Shop");
        assert_eq!(record.rating.as_str(), "N/A");
        assert_eq!(record.reviews.as_str(), "0");
        for value in [
            &record.pricing,
            &record.address,
            &record.hours,
            &record.plus_code,
            &record.phone,
            &record.website,
        ] {
            assert_eq!(value.as_str(), NOT_FOUND);
        }
        assert_eq!(record.natural_key(), None);
    }

    #[tokio::test]
    async fn test_extract_propagates_browser_fault() {
        let listing = MockListing::new("Blue Cafe")
            .with(locators::PHONE, "(512) 555-0100")
            .with_fault(locators::ADDRESS, DriverError::Browser("connection closed".into()));
        let driver = MockDriver::with_open_listing(listing);

        let err = FieldExtractor::new().extract(&driver).await.unwrap_err();
        assert_eq!(err, DriverError::Browser("connection closed".into()));
    }

    #[tokio::test]
    async fn test_extract_propagates_stale_field() {
        let listing = MockListing::new("Blue Cafe").with_fault(locators::HOURS, DriverError::Stale);
        let driver = MockDriver::with_open_listing(listing);

        assert_eq!(
            FieldExtractor::new().extract(&driver).await,
            Err(DriverError::Stale)
        );
    }
}
