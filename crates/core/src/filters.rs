//! Catalog filter record and its URL query encoding.
//!
//! The query string is the source of truth: a filter record is decoded from
//! the current URL on navigation, and every edit re-encodes the whole record
//! back into it. Multi-valued fields (`size`, `material`, `brand`) travel as
//! a single comma-joined parameter. Empty fields are never written.

use std::fmt;
use std::str::FromStr;

use url::Url;
use url::form_urlencoded;

/// Sort order understood by `/api/products`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    Popularity,
    /// A sort key this client does not know; kept verbatim.
    Other(String),
}

impl SortKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::PriceAsc => "priceAsc",
            Self::PriceDesc => "priceDesc",
            Self::Popularity => "popularity",
            Self::Other(key) => key,
        }
    }
}

impl From<&str> for SortKey {
    fn from(value: &str) -> Self {
        match value {
            "priceAsc" => Self::PriceAsc,
            "priceDesc" => Self::PriceDesc,
            "popularity" => Self::Popularity,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field of the filter record, named by its query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Category,
    Gender,
    Color,
    Size,
    Material,
    Brand,
    MinPrice,
    MaxPrice,
    SortBy,
    Search,
    Collection,
}

impl FilterField {
    /// Every field, in the order they are written to the query string.
    pub const ALL: [Self; 11] = [
        Self::Category,
        Self::Gender,
        Self::Color,
        Self::Size,
        Self::Material,
        Self::Brand,
        Self::MinPrice,
        Self::MaxPrice,
        Self::SortBy,
        Self::Search,
        Self::Collection,
    ];

    /// The query parameter name.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Gender => "gender",
            Self::Color => "color",
            Self::Size => "size",
            Self::Material => "material",
            Self::Brand => "brand",
            Self::MinPrice => "minPrice",
            Self::MaxPrice => "maxPrice",
            Self::SortBy => "sortBy",
            Self::Search => "search",
            Self::Collection => "collection",
        }
    }

    /// Whether the field holds a comma-joined list.
    #[must_use]
    pub const fn is_multi(self) -> bool {
        matches!(self, Self::Size | Self::Material | Self::Brand)
    }
}

impl FromStr for FilterField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| format!("unknown filter field: {s}"))
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The catalog filter record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filters {
    pub category: Option<String>,
    pub gender: Option<String>,
    pub color: Option<String>,
    pub size: Vec<String>,
    pub material: Vec<String>,
    pub brand: Vec<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort_by: Option<SortKey>,
    pub search: Option<String>,
    pub collection: Option<String>,
}

impl Filters {
    /// Decode a filter record from a query string (with or without `?`).
    ///
    /// Unknown parameters are ignored; when a parameter repeats, the last
    /// occurrence wins.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut filters = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if let Ok(field) = key.parse::<FilterField>() {
                filters.set(field, &value);
            }
        }
        filters
    }

    /// Decode the filter record carried by a URL.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        url.query().map(Self::from_query).unwrap_or_default()
    }

    /// Non-empty fields as `(parameter, value)` pairs, in canonical order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        FilterField::ALL
            .into_iter()
            .filter_map(|field| self.get(field).map(|value| (field.key(), value)))
            .collect()
    }

    /// Encode the record as a query string without the leading `?`.
    #[must_use]
    pub fn to_query(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }

    /// Replace the query of `url` with this record.
    pub fn apply_to_url(&self, url: &mut Url) {
        let query = self.to_query();
        url.set_query(if query.is_empty() { None } else { Some(&query) });
    }

    /// The encoded value of one field, or `None` when it is empty.
    #[must_use]
    pub fn get(&self, field: FilterField) -> Option<String> {
        let value = match field {
            FilterField::Category => self.category.clone(),
            FilterField::Gender => self.gender.clone(),
            FilterField::Color => self.color.clone(),
            FilterField::Size => join(&self.size),
            FilterField::Material => join(&self.material),
            FilterField::Brand => join(&self.brand),
            FilterField::MinPrice => self.min_price.clone(),
            FilterField::MaxPrice => self.max_price.clone(),
            FilterField::SortBy => self.sort_by.as_ref().map(|key| key.as_str().to_string()),
            FilterField::Search => self.search.clone(),
            FilterField::Collection => self.collection.clone(),
        };
        value.filter(|value| !value.is_empty())
    }

    /// Set one field from its encoded form. An empty value clears it.
    pub fn set(&mut self, field: FilterField, value: &str) {
        match field {
            FilterField::Category => self.category = non_empty(value),
            FilterField::Gender => self.gender = non_empty(value),
            FilterField::Color => self.color = non_empty(value),
            FilterField::Size => self.size = split(value),
            FilterField::Material => self.material = split(value),
            FilterField::Brand => self.brand = split(value),
            FilterField::MinPrice => self.min_price = non_empty(value),
            FilterField::MaxPrice => self.max_price = non_empty(value),
            FilterField::SortBy => {
                self.sort_by = non_empty(value).map(|key| SortKey::from(key.as_str()));
            }
            FilterField::Search => self.search = non_empty(value),
            FilterField::Collection => self.collection = non_empty(value),
        }
    }

    /// Clear one field.
    pub fn clear(&mut self, field: FilterField) {
        self.set(field, "");
    }

    /// Checkbox semantics for list fields: add `value` if absent, remove it
    /// if present. Scalar fields behave like a radio button and are set.
    ///
    /// Returns whether `value` is selected afterwards.
    pub fn toggle(&mut self, field: FilterField, value: &str) -> bool {
        let list = match field {
            FilterField::Size => &mut self.size,
            FilterField::Material => &mut self.material,
            FilterField::Brand => &mut self.brand,
            scalar => {
                self.set(scalar, value);
                return !value.is_empty();
            }
        };

        if let Some(pos) = list.iter().position(|selected| selected == value) {
            list.remove(pos);
            false
        } else if value.is_empty() {
            false
        } else {
            list.push(value.to_string());
            true
        }
    }

    /// Price slider: cap the maximum price and drop the lower bound.
    pub fn set_max_price(&mut self, max: u32) {
        self.min_price = None;
        self.max_price = Some(max.to_string());
    }

    /// Overlay every non-empty field of `patch` onto this record.
    pub fn merge(&mut self, patch: &Self) {
        for field in FilterField::ALL {
            if let Some(value) = patch.get(field) {
                self.set(field, &value);
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        FilterField::ALL
            .into_iter()
            .all(|field| self.get(field).is_none())
    }
}

impl fmt::Display for Filters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query())
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn split(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn join(values: &[String]) -> Option<String> {
    (!values.is_empty()).then(|| values.join(","))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Filters {
        Filters {
            category: Some("Shoes".to_string()),
            gender: Some("Women".to_string()),
            color: Some("Black".to_string()),
            size: vec!["9".to_string(), "11".to_string()],
            material: vec!["Mesh Fabric".to_string()],
            brand: vec!["Nike".to_string(), "Vans".to_string()],
            min_price: Some("10".to_string()),
            max_price: Some("80".to_string()),
            sort_by: Some(SortKey::PriceAsc),
            search: Some("trail runner".to_string()),
            collection: Some("summer".to_string()),
        }
    }

    #[test]
    fn test_round_trip_through_query() {
        let filters = sample();
        let query = filters.to_query();
        assert_eq!(Filters::from_query(&query), filters);
    }

    #[test]
    fn test_round_trip_through_url() {
        let filters = sample();
        let mut url = Url::parse("https://shop.example/collections/all").unwrap();
        filters.apply_to_url(&mut url);
        assert_eq!(Filters::from_url(&url), filters);
    }

    #[test]
    fn test_surrounding_spaces_survive_the_url() {
        let filters = Filters {
            search: Some(" trail ".to_string()),
            brand: vec![" Nike".to_string(), "Vans ".to_string()],
            ..Filters::default()
        };
        let mut url = Url::parse("https://shop.example/collections/all").unwrap();
        filters.apply_to_url(&mut url);

        let decoded = Filters::from_url(&url);
        assert_eq!(decoded.search.as_deref(), Some(" trail "));
        assert_eq!(decoded.brand, vec![" Nike", "Vans "]);
        assert_eq!(decoded, filters);
    }

    #[test]
    fn test_multi_fields_are_comma_joined() {
        let filters = Filters {
            size: vec!["9".to_string(), "11".to_string()],
            ..Filters::default()
        };
        assert_eq!(filters.to_query(), "size=9%2C11");

        let decoded = Filters::from_query("size=9,11");
        assert_eq!(decoded.size, vec!["9", "11"]);
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let filters = Filters {
            category: Some(String::new()),
            ..Filters::default()
        };
        assert_eq!(Filters::from_query("category=&size=").query_pairs(), vec![]);
        assert_eq!(Filters::default().to_query(), "");
        assert!(filters.get(FilterField::Category).is_none());
        assert_eq!(filters.to_query(), "");
    }

    #[test]
    fn test_empty_record_clears_url_query() {
        let mut url = Url::parse("https://shop.example/collections/all?color=Red").unwrap();
        Filters::default().apply_to_url(&mut url);
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_decode_ignores_unknown_and_last_wins() {
        let filters = Filters::from_query("?limit=8&color=Red&color=Blue&sortBy=newest");
        assert_eq!(filters.color.as_deref(), Some("Blue"));
        assert_eq!(filters.sort_by, Some(SortKey::Other("newest".to_string())));
        assert_eq!(filters.to_query(), "color=Blue&sortBy=newest");
    }

    #[test]
    fn test_toggle_list_field() {
        let mut filters = Filters::default();
        assert!(filters.toggle(FilterField::Size, "9"));
        assert!(filters.toggle(FilterField::Size, "11"));
        assert!(!filters.toggle(FilterField::Size, "9"));
        assert_eq!(filters.size, vec!["11"]);
    }

    #[test]
    fn test_toggle_scalar_field_sets() {
        let mut filters = Filters::default();
        assert!(filters.toggle(FilterField::Gender, "Men"));
        assert!(filters.toggle(FilterField::Gender, "Women"));
        assert_eq!(filters.gender.as_deref(), Some("Women"));
    }

    #[test]
    fn test_set_max_price_drops_lower_bound() {
        let mut filters = Filters::from_query("minPrice=20&maxPrice=100");
        filters.set_max_price(60);
        assert_eq!(filters.to_query(), "maxPrice=60");
    }

    #[test]
    fn test_merge_overlays_non_empty_fields() {
        let mut filters = Filters::from_query("category=Shoes&color=Red");
        filters.merge(&Filters::from_query("color=Blue&search=mesh"));
        assert_eq!(filters.to_query(), "category=Shoes&color=Blue&search=mesh");
    }

    #[test]
    fn test_field_parse() {
        assert_eq!("minPrice".parse::<FilterField>(), Ok(FilterField::MinPrice));
        assert!("limit".parse::<FilterField>().is_err());
        assert!(FilterField::Brand.is_multi());
        assert!(!FilterField::Color.is_multi());
    }
}
