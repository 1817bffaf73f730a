// tests/providers_osha_rss.rs
use chrono::NaiveDate;
use osha_monitor::ingest::providers::osha_rss::{
    OshaFeedAdapter, DIRECTIVES_NAME, INTERPRETATIONS_NAME,
};
use osha_monitor::ingest::types::SourceAdapter;
use osha_monitor::{Agency, ContentType, QueryWindow};

const INTERP_XML: &str = include_str!("fixtures/osha_interpretations.xml");
const DIRECTIVES_XML: &str = include_str!("fixtures/osha_directives.xml");

#[tokio::test]
async fn interpretations_fixture_parses_and_normalizes() {
    let adapter = OshaFeedAdapter::interpretations_from_fixture_str(INTERP_XML);
    assert_eq!(adapter.name(), INTERPRETATIONS_NAME);

    let docs = adapter.fetch(&QueryWindow::All).await.expect("rss parse ok");
    assert_eq!(docs.len(), 2, "undated item is dropped");
    assert!(docs
        .iter()
        .all(|d| d.content_type == ContentType::LetterOfInterpretation));
    assert!(docs.iter().all(|d| d.agency == Agency::Osha));
    assert!(docs.iter().all(|d| d.effective_date.is_none()));

    let first = &docs[0];
    assert_eq!(
        first.title,
        "Clarification on respirator fit testing for facial hair policies"
    );
    assert_eq!(
        first.summary.as_deref(),
        Some("This letter clarifies the requirements of 29 CFR 1910.134(g)(1)(i)(A).")
    );
    assert_eq!(
        first.publication_date,
        NaiveDate::from_ymd_opt(2024, 2, 20).unwrap()
    );
    assert_eq!(first.identifier, first.url);
}

#[tokio::test]
async fn directives_fixture_filters_by_year() {
    let adapter = OshaFeedAdapter::directives_from_fixture_str(DIRECTIVES_XML);
    assert_eq!(adapter.name(), DIRECTIVES_NAME);

    let docs = adapter.fetch(&QueryWindow::Year(2024)).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].content_type, ContentType::Directive);
    assert_eq!(
        docs[0].title,
        "CPL 03-00-024: National Emphasis Program - Outdoor and Indoor Heat-Related Hazards"
    );
}
