//! Search composer.
//!
//! The search form submits optional text, tag and date queries, each behind a
//! checkbox. [`SearchQuery::from_params`] turns that form into a declarative
//! list of [`Criterion`] values that are ANDed together. The store compiles the
//! list to SQL; [`SearchQuery::matches`] evaluates the same predicate in memory.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::tags::parse_tags;
use crate::Fragment;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw query string of `/pages/search`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub search_text: Option<String>,
    pub text_query: Option<String>,
    pub search_tags: Option<String>,
    pub tags_query: Option<String>,
    /// Any non-empty value switches tag matching from "any" to "all".
    pub operator: Option<String>,
    pub search_by_date: Option<String>,
    pub date_query: Option<String>,
    #[serde(rename = "date-radio")]
    pub date_mode: Option<String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("'{0}' is not a date, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("a between search needs exactly two dates separated by a comma")]
    BetweenBounds,
    #[error("start date {from} is after end date {to}")]
    ReversedRange { from: NaiveDate, to: NaiveDate },
    #[error("unknown date mode '{0}'")]
    UnknownDateMode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMatch {
    /// Every listed tag must be present.
    All,
    /// At least one listed tag must be present.
    Any,
}

/// Date comparison. Both ends of every range are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    On(NaiveDate),
    OnOrBefore(NaiveDate),
    OnOrAfter(NaiveDate),
    Between { from: NaiveDate, to: NaiveDate },
}

impl DateFilter {
    /// Build a filter from the `date-radio` mode and the date query.
    /// Whitespace anywhere in the query is ignored.
    pub fn parse(mode: &str, raw: &str) -> Result<Self, SearchError> {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        match mode {
            "on" => Ok(Self::On(parse_date(&compact)?)),
            "before" => Ok(Self::OnOrBefore(parse_date(&compact)?)),
            "after" => Ok(Self::OnOrAfter(parse_date(&compact)?)),
            "between" => {
                let bounds: Vec<&str> = compact.split(',').collect();
                let [from, to] = bounds.as_slice() else {
                    return Err(SearchError::BetweenBounds);
                };
                if from.is_empty() || to.is_empty() {
                    return Err(SearchError::BetweenBounds);
                }
                let (from, to) = (parse_date(from)?, parse_date(to)?);
                if from > to {
                    return Err(SearchError::ReversedRange { from, to });
                }
                Ok(Self::Between { from, to })
            }
            other => Err(SearchError::UnknownDateMode(other.to_string())),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Self::On(d) => date == d,
            Self::OnOrBefore(d) => date <= d,
            Self::OnOrAfter(d) => date >= d,
            Self::Between { from, to } => from <= date && date <= to,
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, SearchError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| SearchError::InvalidDate(raw.to_string()))
}

/// One filter category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Case-insensitive substring of the fragment body.
    TextContains(String),
    Tags { tags: Vec<String>, mode: TagMatch },
    Date(DateFilter),
}

impl Criterion {
    pub fn matches(&self, fragment: &Fragment) -> bool {
        match self {
            Self::TextContains(needle) => fragment
                .text
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Self::Tags { tags, mode: TagMatch::All } => tags.iter().all(|t| fragment.has_tag(t)),
            Self::Tags { tags, mode: TagMatch::Any } => tags.iter().any(|t| fragment.has_tag(t)),
            Self::Date(filter) => filter.contains(fragment.date),
        }
    }
}

/// Conjunction of criteria. An empty query matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    criteria: Vec<Criterion>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, needle: impl Into<String>) -> Self {
        self.criteria.push(Criterion::TextContains(needle.into()));
        self
    }

    pub fn tags(mut self, tags: Vec<String>, mode: TagMatch) -> Self {
        self.criteria.push(Criterion::Tags { tags, mode });
        self
    }

    pub fn date(mut self, filter: DateFilter) -> Self {
        self.criteria.push(Criterion::Date(filter));
        self
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn matches(&self, fragment: &Fragment) -> bool {
        !self.is_empty() && self.criteria.iter().all(|c| c.matches(fragment))
    }

    /// Compose a query from the search form.
    ///
    /// A category takes part only when its checkbox and its query are both
    /// filled in; the date category also needs a mode. `Ok(None)` is the null
    /// query: nothing was selected.
    pub fn from_params(params: &SearchParams) -> Result<Option<Self>, SearchError> {
        let mut query = Self::new();

        if let Some(text) = selected(&params.search_text, &params.text_query) {
            query = query.text(text);
        }

        if let Some(raw) = selected(&params.search_tags, &params.tags_query) {
            let tags = parse_tags(raw);
            if !tags.is_empty() {
                let mode = if filled(&params.operator).is_some() {
                    TagMatch::All
                } else {
                    TagMatch::Any
                };
                query = query.tags(tags, mode);
            }
        }

        if let (Some(raw), Some(mode)) = (
            selected(&params.search_by_date, &params.date_query),
            filled(&params.date_mode),
        ) {
            query = query.date(DateFilter::parse(mode, raw)?);
        }

        Ok((!query.is_empty()).then_some(query))
    }
}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn selected<'a>(flag: &Option<String>, value: &'a Option<String>) -> Option<&'a str> {
    filled(flag).and(filled(value))
}
