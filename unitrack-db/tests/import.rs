//! Hipo import into an in-memory store

mod common;

use common::store;
use unitrack_core::hipo;
use unitrack_db::{import_records, ImportSummary};

const RECORDS: &str = r#"[
    {"name": "University of Toronto", "alpha_two_code": "ca", "state-province": "Ontario",
     "web_pages": ["https://www.utoronto.ca/"], "domains": ["utoronto.ca"], "country": "Canada"},
    {"name": "McGill University", "alpha_two_code": "CA", "state-province": null,
     "web_pages": ["https://www.mcgill.ca/"], "domains": ["mcgill.ca"], "country": "Canada"},
    {"name": "", "alpha_two_code": "CA", "web_pages": [], "domains": []},
    {"name": "Broken Code College", "alpha_two_code": "CAN", "web_pages": [], "domains": []}
]"#;

#[tokio::test]
async fn imports_and_counts() {
    let store = store().await;
    let records = hipo::read_records(RECORDS.as_bytes()).unwrap();

    let mut ticks = 0;
    let summary = import_records(&store.universities(), &records, |_| ticks += 1).await;

    assert_eq!(
        summary,
        ImportSummary {
            fetched: 4,
            upserted: 2,
            inserted: 2,
            skipped: 2,
            failed: 0,
        }
    );
    assert_eq!(ticks, 4);

    let toronto = store
        .universities()
        .get_by_domain("utoronto.ca")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(toronto.country_code, "CA");
    assert_eq!(toronto.state_province.as_deref(), Some("Ontario"));
    assert_eq!(toronto.website.as_deref(), Some("https://www.utoronto.ca/"));
    assert_eq!(toronto.city, None);
}

#[tokio::test]
async fn reimport_updates_in_place() {
    let store = store().await;
    let records = hipo::read_records(RECORDS.as_bytes()).unwrap();

    import_records(&store.universities(), &records, |_| {}).await;
    let again = import_records(&store.universities(), &records, |_| {}).await;

    assert_eq!(again.upserted, 2);
    assert_eq!(again.inserted, 0);
    assert_eq!(store.universities().list_ids().await.unwrap().len(), 2);
}

#[tokio::test]
async fn failing_record_does_not_stop_batch() {
    let store = store().await;
    sqlx::query(
        "CREATE TRIGGER reject_university BEFORE INSERT ON universities \
         WHEN NEW.name = 'Rejected University' \
         BEGIN SELECT RAISE(ABORT, 'rejected by test'); END",
    )
    .execute(store.pool())
    .await
    .unwrap();

    let batch = r#"[
        {"name": "Alpha University", "alpha_two_code": "US", "web_pages": [], "domains": ["alpha.edu"]},
        {"name": "Rejected University", "alpha_two_code": "US", "web_pages": [], "domains": []},
        {"name": "Delta College", "alpha_two_code": "US", "web_pages": [], "domains": ["delta.edu"]}
    ]"#;
    let records = hipo::read_records(batch.as_bytes()).unwrap();
    let summary = import_records(&store.universities(), &records, |_| {}).await;

    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.upserted, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 0);
    assert_eq!(store.universities().list_ids().await.unwrap().len(), 2);
}
