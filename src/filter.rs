// src/filter.rs
//! Filter predicates over an aggregated document sequence, plus the mapping from
//! the page's query string.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::document::{Agency, ContentType, Document};
use crate::error::FilterError;

/// Years accepted from the query string: any four-digit calendar year. A year
/// with no documents filters to an empty feed; it is not rejected.
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// User-selected constraints. Every field's empty/`None` value means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub content_types: BTreeSet<ContentType>,
    pub year: Option<i32>,
    pub agency: Option<Agency>,
}

impl FilterCriteria {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_content_types<I: IntoIterator<Item = ContentType>>(mut self, types: I) -> Self {
        self.content_types = types.into_iter().collect();
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_agency(mut self, agency: Agency) -> Self {
        self.agency = Some(agency);
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        (self.content_types.is_empty() || self.content_types.contains(&doc.content_type))
            && self.year.map_or(true, |y| doc.publication_year() == y)
            && self.agency.map_or(true, |a| doc.agency == a)
    }

    /// Keep matching documents, preserving order. Pure and idempotent.
    pub fn apply(&self, docs: &[Document]) -> Vec<Document> {
        docs.iter().filter(|d| self.matches(d)).cloned().collect()
    }

    /// Map query-string pairs to criteria. Unrecognized values are returned as
    /// errors alongside the criteria; the affected parameter stays "all".
    ///
    /// `content_type` may repeat and may hold comma-separated values; `content`
    /// is accepted as an alias.
    pub fn parse_query<K, V>(pairs: &[(K, V)]) -> (Self, Vec<FilterError>)
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut criteria = Self::default();
        let mut errors = Vec::new();

        let mut types = BTreeSet::new();
        let mut types_invalid = false;
        let mut types_all = false;

        for (k, v) in pairs {
            let v = v.as_ref().trim();
            match k.as_ref() {
                "content_type" | "content" => {
                    for part in v.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                        if part.eq_ignore_ascii_case("all") {
                            types_all = true;
                            continue;
                        }
                        match part.parse::<ContentType>() {
                            Ok(ct) => {
                                types.insert(ct);
                            }
                            Err(_) => {
                                types_invalid = true;
                                errors.push(FilterError::InvalidFilterCriteria {
                                    param: "content_type",
                                    value: part.to_string(),
                                });
                            }
                        }
                    }
                }
                "year" => {
                    if v.is_empty() || v.eq_ignore_ascii_case("all") {
                        criteria.year = None;
                        continue;
                    }
                    match v.parse::<i32>() {
                        Ok(y) if (MIN_YEAR..=MAX_YEAR).contains(&y) => criteria.year = Some(y),
                        _ => {
                            criteria.year = None;
                            errors.push(FilterError::InvalidFilterCriteria {
                                param: "year",
                                value: v.to_string(),
                            });
                        }
                    }
                }
                "agency" => {
                    if v.is_empty() || v.eq_ignore_ascii_case("all") {
                        criteria.agency = None;
                        continue;
                    }
                    match v.parse::<Agency>() {
                        Ok(a) => criteria.agency = Some(a),
                        Err(_) => {
                            criteria.agency = None;
                            errors.push(FilterError::InvalidFilterCriteria {
                                param: "agency",
                                value: v.to_string(),
                            });
                        }
                    }
                }
                _ => {}
            }
        }

        if !types_all && !types_invalid {
            criteria.content_types = types;
        }
        (criteria, errors)
    }

    /// Like `parse_query`, logging each rejected value.
    pub fn from_query<K, V>(pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let (criteria, errors) = Self::parse_query(pairs);
        for e in &errors {
            tracing::warn!(target: "filter", error = %e, "falling back to all");
        }
        criteria
    }
}
