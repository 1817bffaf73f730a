// src/document.rs
//! Common document shape every source adapter normalizes into.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of regulatory item.
///
/// Variant order is the page's section order, so `BTreeSet<ContentType>` iterates
/// the same way the page renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    Rule,
    #[serde(rename = "PRORULE")]
    ProposedRule,
    Notice,
    LetterOfInterpretation,
    Directive,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::Rule,
        ContentType::ProposedRule,
        ContentType::Notice,
        ContentType::LetterOfInterpretation,
        ContentType::Directive,
    ];

    /// Wire code, as used in `conditions[type][]` for Federal Register types.
    pub fn code(self) -> &'static str {
        match self {
            ContentType::Rule => "RULE",
            ContentType::ProposedRule => "PRORULE",
            ContentType::Notice => "NOTICE",
            ContentType::LetterOfInterpretation => "LETTER_OF_INTERPRETATION",
            ContentType::Directive => "DIRECTIVE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContentType::Rule => "Final Rule",
            ContentType::ProposedRule => "Proposed Rule",
            ContentType::Notice => "Notice",
            ContentType::LetterOfInterpretation => "Letter of Interpretation",
            ContentType::Directive => "Directive",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            ContentType::Rule => "Final Rules",
            ContentType::ProposedRule => "Proposed Rules",
            ContentType::Notice => "Notices",
            ContentType::LetterOfInterpretation => "Letters of Interpretation",
            ContentType::Directive => "Directives",
        }
    }

    /// True for types the Federal Register API can be queried for.
    pub fn is_federal_register(self) -> bool {
        matches!(
            self,
            ContentType::Rule | ContentType::ProposedRule | ContentType::Notice
        )
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue(pub String);

impl fmt::Display for UnknownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized value {:?}", self.0)
    }
}

impl std::error::Error for UnknownValue {}

impl FromStr for ContentType {
    type Err = UnknownValue;

    /// Accepts wire codes, Federal Register display names and the page's short names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let ct = match key.as_str() {
            "rule" | "rules" | "final_rule" | "final_rules" => ContentType::Rule,
            "prorule" | "proposed_rule" | "proposed_rules" | "proposed" => {
                ContentType::ProposedRule
            }
            "notice" | "notices" => ContentType::Notice,
            "letter_of_interpretation" | "letters_of_interpretation" | "interpretation"
            | "interpretations" => ContentType::LetterOfInterpretation,
            "directive" | "directives" => ContentType::Directive,
            _ => return Err(UnknownValue(s.to_string())),
        };
        Ok(ct)
    }
}

/// Issuing agency. Only OSHA is wired to sources today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Agency {
    Osha,
    Epa,
    Dot,
}

impl Agency {
    pub fn code(self) -> &'static str {
        match self {
            Agency::Osha => "osha",
            Agency::Epa => "epa",
            Agency::Dot => "dot",
        }
    }

    /// Agency slug understood by `conditions[agencies][]`.
    pub fn federal_register_slug(self) -> &'static str {
        match self {
            Agency::Osha => "occupational-safety-and-health-administration",
            Agency::Epa => "environmental-protection-agency",
            Agency::Dot => "transportation-department",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Agency::Osha => "OSHA",
            Agency::Epa => "EPA",
            Agency::Dot => "DOT",
        }
    }
}

impl fmt::Display for Agency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Agency {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        [Agency::Osha, Agency::Epa, Agency::Dot]
            .into_iter()
            .find(|a| a.code() == key || a.federal_register_slug() == key)
            .ok_or_else(|| UnknownValue(s.to_string()))
    }
}

/// One regulatory item. Built once by an adapter and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub content_type: ContentType,
    pub title: String,
    pub summary: Option<String>,
    pub publication_date: NaiveDate,
    pub effective_date: Option<NaiveDate>,
    pub url: String,
    pub pdf_url: Option<String>,
    /// Unique within its source; `(content_type, identifier)` is the dedup key.
    pub identifier: String,
    pub agency: Agency,
    /// Display name of the adapter that produced the document.
    pub source: String,
}

impl Document {
    pub fn dedup_key(&self) -> (ContentType, &str) {
        (self.content_type, self.identifier.as_str())
    }

    pub fn publication_year(&self) -> i32 {
        self.publication_date.year()
    }
}

/// Scope requested from the sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QueryWindow {
    #[default]
    All,
    Year(i32),
    /// Published on or after the date.
    Since(NaiveDate),
}

impl QueryWindow {
    /// `Since(today - days)`, or `All` when that date is out of range.
    pub fn since_days_before(today: NaiveDate, days: u32) -> Self {
        today
            .checked_sub_days(Days::new(u64::from(days)))
            .map_or(QueryWindow::All, QueryWindow::Since)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            QueryWindow::All => true,
            QueryWindow::Year(y) => date.year() == y,
            QueryWindow::Since(from) => date >= from,
        }
    }
}

impl fmt::Display for QueryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryWindow::All => f.write_str("all"),
            QueryWindow::Year(y) => write!(f, "year:{y}"),
            QueryWindow::Since(d) => write!(f, "since:{d}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_parses_codes_labels_and_short_names() {
        assert_eq!("RULE".parse::<ContentType>().unwrap(), ContentType::Rule);
        assert_eq!(
            "Proposed Rule".parse::<ContentType>().unwrap(),
            ContentType::ProposedRule
        );
        assert_eq!(
            "prorule".parse::<ContentType>().unwrap(),
            ContentType::ProposedRule
        );
        assert_eq!(
            "interpretations".parse::<ContentType>().unwrap(),
            ContentType::LetterOfInterpretation
        );
        assert_eq!(
            "LETTER_OF_INTERPRETATION".parse::<ContentType>().unwrap(),
            ContentType::LetterOfInterpretation
        );
        assert!("memo".parse::<ContentType>().is_err());
    }

    #[test]
    fn content_type_serializes_as_wire_code() {
        let s = serde_json::to_string(&ContentType::ProposedRule).unwrap();
        assert_eq!(s, "\"PRORULE\"");
        let s = serde_json::to_string(&ContentType::LetterOfInterpretation).unwrap();
        assert_eq!(s, "\"LETTER_OF_INTERPRETATION\"");
    }

    #[test]
    fn agency_accepts_code_or_slug() {
        assert_eq!("OSHA".parse::<Agency>().unwrap(), Agency::Osha);
        assert_eq!(
            "environmental-protection-agency".parse::<Agency>().unwrap(),
            Agency::Epa
        );
        assert!("fda".parse::<Agency>().is_err());
    }

    #[test]
    fn window_contains() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert!(QueryWindow::All.contains(d));
        assert!(QueryWindow::Year(2024).contains(d));
        assert!(!QueryWindow::Year(2023).contains(d));
        assert!(QueryWindow::Since(d).contains(d));
        assert!(!QueryWindow::Since(d.succ_opt().unwrap()).contains(d));
    }

    #[test]
    fn days_before_saturates_to_all() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            QueryWindow::since_days_before(d, 30),
            QueryWindow::Since(NaiveDate::from_ymd_opt(2024, 2, 4).unwrap())
        );
        assert_eq!(QueryWindow::since_days_before(d, 0), QueryWindow::Since(d));
        assert_eq!(QueryWindow::since_days_before(d, u32::MAX), QueryWindow::All);
    }
}
