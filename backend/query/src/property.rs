//! # Property Search
//!
//! Flat query-string parameters to a MongoDB filter plus pagination.
//!
//! ## Parameters
//! - `state`, `type`: exact match, skipped when blank
//! - `propertyID`: exact integer match
//! - `price`, `yearBuilt`, `beds`, `baths`: ranges written as `price[$gte]=100000`
//!   or `price[min]=100000`, with `$lte`/`max` for the upper bound
//! - `page`, `limit`: pagination
//!
//! ## Leniency
//! Values that fail to parse as integers are dropped with a warning instead of
//! failing the request. A range keeps whichever bound survives and disappears
//! entirely when neither does, so an empty range never reaches the store.
use std::collections::BTreeMap;

use mongodb::bson::{Document, doc};
use tracing::{debug, warn};

pub const PROPERTY_COLLECTION: &str = "properties";

const MAX_SKIP: u64 = i64::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RangeField {
    Price,
    YearBuilt,
    Beds,
    Baths,
}

impl RangeField {
    pub const ALL: [Self; 4] = [Self::Price, Self::YearBuilt, Self::Beds, Self::Baths];

    pub fn key(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::YearBuilt => "yearBuilt",
            Self::Beds => "beds",
            Self::Baths => "baths",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Gte,
    Lte,
}

impl Bound {
    pub fn operator(self) -> &'static str {
        match self {
            Self::Gte => "$gte",
            Self::Lte => "$lte",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "$gte" | "gte" | "min" => Some(Self::Gte),
            "$lte" | "lte" | "max" => Some(Self::Lte),
            _ => None,
        }
    }
}

/// Raw, unparsed bounds of one range field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRange {
    pub gte: Option<String>,
    pub lte: Option<String>,
}

impl RawRange {
    fn set(&mut self, bound: Bound, value: String) {
        match bound {
            Bound::Gte => self.gte = Some(value),
            Bound::Lte => self.lte = Some(value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyParams {
    pub property_id: Option<String>,
    pub state: Option<String>,
    pub kind: Option<String>,
    pub ranges: BTreeMap<RangeField, RawRange>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PropertyParams {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();

        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.into();

            match key {
                "propertyID" => params.property_id = Some(value),
                "state" => params.state = Some(value),
                "type" => params.kind = Some(value),
                "page" => params.page = Some(value),
                "limit" => params.limit = Some(value),
                _ => match split_bracketed(key) {
                    Some((field, bound)) => {
                        params.ranges.entry(field).or_default().set(bound, value)
                    }
                    None => debug!("Ignoring unknown property parameter {key}"),
                },
            }
        }

        params
    }
}

/// `price[$gte]` -> (`Price`, `Gte`)
fn split_bracketed(key: &str) -> Option<(RangeField, Bound)> {
    let (field, rest) = key.split_once('[')?;
    let bound = rest.strip_suffix(']')?;

    Some((RangeField::from_key(field)?, Bound::from_key(bound)?))
}

fn parse_int(name: &str, value: &str) -> Option<i64> {
    value
        .trim()
        .parse()
        .map_err(|e| {
            warn!("Dropping {name}={value:?}: {e}");
        })
        .ok()
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|value| !value.trim().is_empty())
}

pub fn build_property_filter(params: &PropertyParams) -> Document {
    let mut filter = Document::new();

    if let Some(state) = non_blank(params.state.as_ref()) {
        filter.insert("state", state);
    }
    if let Some(kind) = non_blank(params.kind.as_ref()) {
        filter.insert("type", kind);
    }
    if let Some(id) = params
        .property_id
        .as_deref()
        .and_then(|id| parse_int("propertyID", id))
    {
        filter.insert("propertyID", id);
    }

    for (field, raw) in &params.ranges {
        let mut range = Document::new();

        for (bound, value) in [(Bound::Gte, &raw.gte), (Bound::Lte, &raw.lte)] {
            let name = format!("{}[{}]", field.key(), bound.operator());

            if let Some(value) = value.as_deref().and_then(|value| parse_int(&name, value)) {
                range.insert(bound.operator(), value);
            }
        }

        if !range.is_empty() {
            filter.insert(field.key(), range);
        }
    }

    filter
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Pagination {
    /// Unparseable or zero values fall back to page 1 and `default_limit`.
    /// `page` is clamped so that the skip still fits the store's signed 64-bit offset.
    pub fn from_params(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: u64,
        max_limit: u64,
    ) -> Self {
        let limit = positive(limit).unwrap_or(default_limit).min(max_limit).max(1);
        let last_page = MAX_SKIP / limit + 1;
        let page = positive(page).unwrap_or(1).min(last_page);

        Self { page, limit }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit).min(MAX_SKIP)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

fn positive(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|&value| value > 0)
}
