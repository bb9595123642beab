//! Client-side narrowing of listing collections.
//!
//! Every predicate is independent and inactive predicates always pass, so
//! the output is a pure, order-preserving function of (criteria, source).

use crate::api::{ApiError, ApiScope, PropertyApi};
use crate::models::{Property, PropertyType, Status};
use std::str::FromStr;
use tracing::{debug, warn};

/// Selector value meaning "no restriction"
pub const MATCH_ALL: &str = "ALL";

/// Exact-match selector over an enum column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selector<T> {
    #[default]
    All,
    Only(T),
    /// Set from a value no listing can have; matches nothing.
    Nothing,
}

impl<T: Copy + PartialEq> Selector<T> {
    pub fn is_active(&self) -> bool {
        !matches!(self, Selector::All)
    }

    pub fn accepts(&self, value: T) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(wanted) => *wanted == value,
            Selector::Nothing => false,
        }
    }
}

impl<T: FromStr> Selector<T> {
    /// Parse a dropdown value; `"ALL"` or blank means no restriction.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(MATCH_ALL) {
            return Selector::All;
        }
        match raw.parse() {
            Ok(value) => Selector::Only(value),
            Err(_) => Selector::Nothing,
        }
    }
}

/// Which text columns the search term is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchFields {
    /// Agent's own listings: title only
    #[default]
    Title,
    /// Admin view: title, locality, and city
    TitleLocalityCity,
}

impl SearchFields {
    fn texts(self, property: &Property) -> Vec<&str> {
        match self {
            SearchFields::Title => vec![property.property_title.as_str()],
            SearchFields::TitleLocalityCity => vec![
                property.property_title.as_str(),
                property.locality.as_str(),
                property.city.as_str(),
            ],
        }
    }
}

/// Anything that can accept or reject one listing
pub trait ListingPredicate {
    fn matches(&self, property: &Property) -> bool;
}

/// Free-text, status, and type predicates as set in the filter bar
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub text: String,
    pub status: Selector<Status>,
    pub property_type: Selector<PropertyType>,
    pub fields: SearchFields,
}

impl FilterCriteria {
    /// Pass-everything criteria for an agent's own listings
    pub fn agent() -> Self {
        Self::default()
    }

    /// Pass-everything criteria for the admin view
    pub fn admin() -> Self {
        Self {
            fields: SearchFields::TitleLocalityCity,
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_status(mut self, status: Selector<Status>) -> Self {
        self.status = status;
        self
    }

    pub fn with_type(mut self, property_type: Selector<PropertyType>) -> Self {
        self.property_type = property_type;
        self
    }

    /// True when no predicate is active
    pub fn is_match_all(&self) -> bool {
        self.text.is_empty() && !self.status.is_active() && !self.property_type.is_active()
    }

    fn text_matches(&self, property: &Property) -> bool {
        if self.text.is_empty() {
            return true;
        }
        let needle = self.text.to_lowercase();
        self.fields
            .texts(property)
            .into_iter()
            .any(|haystack| haystack.to_lowercase().contains(&needle))
    }
}

impl ListingPredicate for FilterCriteria {
    fn matches(&self, property: &Property) -> bool {
        self.text_matches(property)
            && self.status.accepts(property.status)
            && self.property_type.accepts(property.property_type)
    }
}

/// Logical AND of several criteria
impl ListingPredicate for [FilterCriteria] {
    fn matches(&self, property: &Property) -> bool {
        self.iter().all(|criteria| criteria.matches(property))
    }
}

impl ListingPredicate for Vec<FilterCriteria> {
    fn matches(&self, property: &Property) -> bool {
        self.as_slice().matches(property)
    }
}

/// Pointwise AND of two criteria
pub fn combine(first: &FilterCriteria, second: &FilterCriteria) -> Vec<FilterCriteria> {
    vec![first.clone(), second.clone()]
}

/// Keep the listings the predicate accepts, in source order.
pub fn apply<P>(collection: &[Property], predicate: &P) -> Vec<Property>
where
    P: ListingPredicate + ?Sized,
{
    collection
        .iter()
        .filter(|property| predicate.matches(property))
        .cloned()
        .collect()
}

/// State of the collection a listing view filters
#[derive(Debug, Clone, PartialEq)]
pub enum SourceState {
    Loading,
    Loaded(Vec<Property>),
    Failed(String),
}

/// What the listing table should show
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Visible<'a> {
    Loading,
    Failed(&'a str),
    /// Source loaded but nothing passed the filter (or the source is empty)
    Empty,
    Rows(&'a [Property]),
}

/// A listing collection plus the criteria narrowing it.
///
/// The visible subset is recomputed whenever either side changes.
#[derive(Debug, Clone)]
pub struct ListingView {
    source: SourceState,
    criteria: FilterCriteria,
    visible: Vec<Property>,
}

impl ListingView {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self {
            source: SourceState::Loading,
            criteria,
            visible: Vec::new(),
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn source(&self) -> &SourceState {
        &self.source
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.recompute();
    }

    /// Replace the source collection, e.g. after a refetch.
    pub fn set_source(&mut self, properties: Vec<Property>) {
        self.source = SourceState::Loaded(properties);
        self.recompute();
    }

    pub fn set_failed(&mut self, message: impl Into<String>) {
        self.source = SourceState::Failed(message.into());
        self.recompute();
    }

    /// Fetch the collection for `scope` and recompute.
    ///
    /// A failed refetch keeps previously loaded rows; only a view that never
    /// loaded switches to the failed state.
    pub async fn refresh(&mut self, api: &dyn PropertyApi, scope: ApiScope) -> Result<(), ApiError> {
        match api.get_properties(scope).await {
            Ok(properties) => {
                debug!("Loaded {} listings", properties.len());
                self.set_source(properties);
                Ok(())
            }
            Err(err) => {
                warn!("Failed to load listings: {}", err);
                if !matches!(self.source, SourceState::Loaded(_)) {
                    self.set_failed(err.user_message());
                }
                Err(err)
            }
        }
    }

    fn recompute(&mut self) {
        self.visible = match &self.source {
            SourceState::Loaded(properties) => apply(properties, &self.criteria),
            SourceState::Loading | SourceState::Failed(_) => Vec::new(),
        };
    }

    pub fn visible(&self) -> Visible<'_> {
        match &self.source {
            SourceState::Loading => Visible::Loading,
            SourceState::Failed(message) => Visible::Failed(message),
            SourceState::Loaded(_) if self.visible.is_empty() => Visible::Empty,
            SourceState::Loaded(_) => Visible::Rows(&self.visible),
        }
    }
}
