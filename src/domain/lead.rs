use std::fmt;

/// Marker written for any field whose element could not be located.
pub const NOT_FOUND: &str = "Not Found";

/// Rating written when the review blob carries no rating token.
pub const NO_RATING: &str = "N/A";

/// Review count written when the review blob carries no parenthesized count.
pub const NO_REVIEWS: &str = "0";

/// Columns of the output file, in header order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    BusinessName,
    StarRating,
    ReviewCount,
    Pricing,
    Address,
    Hours,
    PlusCode,
    Phone,
    Website,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::BusinessName,
        Field::StarRating,
        Field::ReviewCount,
        Field::Pricing,
        Field::Address,
        Field::Hours,
        Field::PlusCode,
        Field::Phone,
        Field::Website,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Field::BusinessName => "Business Name",
            Field::StarRating => "Star Rating",
            Field::ReviewCount => "Number of Google Reviews",
            Field::Pricing => "Pricing",
            Field::Address => "Full Business Address",
            Field::Hours => "Business Hours",
            Field::PlusCode => "Plus Code",
            Field::Phone => "Phone Number",
            Field::Website => "Website URL",
        }
    }

    pub fn headers() -> [&'static str; 9] {
        Self::ALL.map(Field::header)
    }
}

/// A single extracted field: either a value or the explicit "not found" marker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    Value(String),
    #[default]
    NotFound,
}

impl FieldValue {
    pub fn value(s: impl Into<String>) -> Self {
        FieldValue::Value(s.into())
    }

    /// Build from an optional lookup result; `None` becomes the marker.
    pub fn from_option(value: Option<String>) -> Self {
        value.map_or(FieldValue::NotFound, FieldValue::Value)
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldValue::Value(s) => s,
            FieldValue::NotFound => NOT_FOUND,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One business listing as written to the output file.
///
/// Every field is always present; fields that could not be extracted hold
/// [`FieldValue::NotFound`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadRecord {
    pub name: FieldValue,
    pub rating: FieldValue,
    pub reviews: FieldValue,
    pub pricing: FieldValue,
    pub address: FieldValue,
    pub hours: FieldValue,
    pub plus_code: FieldValue,
    pub phone: FieldValue,
    pub website: FieldValue,
}

impl Default for LeadRecord {
    fn default() -> Self {
        Self {
            name: FieldValue::NotFound,
            rating: FieldValue::value(NO_RATING),
            reviews: FieldValue::value(NO_REVIEWS),
            pricing: FieldValue::NotFound,
            address: FieldValue::NotFound,
            hours: FieldValue::NotFound,
            plus_code: FieldValue::NotFound,
            phone: FieldValue::NotFound,
            website: FieldValue::NotFound,
        }
    }
}

impl LeadRecord {
    pub fn get(&self, field: Field) -> &FieldValue {
        match field {
            Field::BusinessName => &self.name,
            Field::StarRating => &self.rating,
            Field::ReviewCount => &self.reviews,
            Field::Pricing => &self.pricing,
            Field::Address => &self.address,
            Field::Hours => &self.hours,
            Field::PlusCode => &self.plus_code,
            Field::Phone => &self.phone,
            Field::Website => &self.website,
        }
    }

    /// Row values in header order.
    pub fn row(&self) -> [&str; 9] {
        Field::ALL.map(|field| self.get(field).as_str())
    }

    /// The full address, used to detect duplicates across runs.
    pub fn natural_key(&self) -> Option<&str> {
        match &self.address {
            FieldValue::Value(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_str()
    }
}
