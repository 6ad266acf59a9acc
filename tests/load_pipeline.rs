//! End-to-end tests for reloading IP range datasets.
//!
//! These drive the public loader API against an in-memory SQLite database
//! and temporary snapshot files.

mod helpers;

use helpers::{
    country_rows, create_test_pool, snapshot_file, RecordingProgress, RecordingStore,
};
use ip_ranges::load::load_snapshot;
use ip_ranges::{
    run_loads, DatasetKind, Generation, IpFamily, LoadError, LoadOptions, LoadRequest,
    RangeStore, ReapOutcome, RunOptions, SqliteRangeStore,
};
use sqlx::Row;

async fn new_store() -> SqliteRangeStore {
    SqliteRangeStore::new(create_test_pool().await)
}

async fn rows_in(store: &SqliteRangeStore, kind: DatasetKind, family: IpFamily, generation: u32) -> u64 {
    store
        .count_rows(kind, family, Some(Generation::new(generation)))
        .await
        .expect("Failed to count rows")
}

#[tokio::test]
async fn test_reload_writes_next_generation_and_reaps_older() {
    let store = new_store().await;
    let first = snapshot_file(&country_rows(3));
    let second = snapshot_file(&country_rows(5));
    let options = LoadOptions::default();

    let summary = load_snapshot(
        &store,
        &LoadRequest::new(DatasetKind::Country, IpFamily::V4, first.path()),
        &options,
        &mut RecordingProgress::default(),
    )
    .await
    .expect("first load should succeed");
    assert_eq!(summary.generation, Generation::new(1));

    let summary = load_snapshot(
        &store,
        &LoadRequest::new(DatasetKind::Country, IpFamily::V4, second.path()),
        &options,
        &mut RecordingProgress::default(),
    )
    .await
    .expect("second load should succeed");

    assert_eq!(summary.generation, Generation::new(2));
    assert_eq!(summary.reap, ReapOutcome::Reaped { deleted: 3 });
    assert_eq!(rows_in(&store, DatasetKind::Country, IpFamily::V4, 1).await, 0);
    assert_eq!(rows_in(&store, DatasetKind::Country, IpFamily::V4, 2).await, 5);
    assert_eq!(
        store
            .count_rows(DatasetKind::Country, IpFamily::V4, None)
            .await
            .unwrap(),
        5
    );

    let published = store
        .published_generation(DatasetKind::Country, IpFamily::V4)
        .await
        .unwrap()
        .expect("generation should be published");
    assert_eq!(published.generation, Generation::new(2));
    assert_eq!(published.row_count, 5);
}

#[tokio::test]
async fn test_failed_publish_leaves_published_generation_intact() {
    let store = new_store().await;
    let first = snapshot_file(&country_rows(4));
    let second = snapshot_file(&country_rows(5));

    load_snapshot(
        &store,
        &LoadRequest::new(DatasetKind::Country, IpFamily::V4, first.path()),
        &LoadOptions::default(),
        &mut RecordingProgress::default(),
    )
    .await
    .expect("first load should succeed");

    sqlx::query(
        "CREATE TRIGGER freeze_marker BEFORE UPDATE ON dataset_generations
         BEGIN SELECT RAISE(ABORT, 'marker frozen'); END",
    )
    .execute(store.pool())
    .await
    .unwrap();

    let err = load_snapshot(
        &store,
        &LoadRequest::new(DatasetKind::Country, IpFamily::V4, second.path()),
        &LoadOptions::default(),
        &mut RecordingProgress::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LoadError::Reap { .. }));

    // Readers following the marker still find every row of generation 1
    let published = store
        .published_generation(DatasetKind::Country, IpFamily::V4)
        .await
        .unwrap()
        .expect("generation 1 stays published");
    assert_eq!(published.generation, Generation::new(1));
    assert_eq!(rows_in(&store, DatasetKind::Country, IpFamily::V4, 1).await, 4);
    assert_eq!(rows_in(&store, DatasetKind::Country, IpFamily::V4, 2).await, 5);
}

#[tokio::test]
async fn test_same_file_twice_yields_identical_rows_in_new_generation() {
    let store = new_store().await;
    let file = snapshot_file("1.0.0.0,1.0.0.255,13335,CLOUDFLARENET\n8.8.8.0,8.8.8.255,15169,GOOGLE\n");
    let request = LoadRequest::new(DatasetKind::Asn, IpFamily::V4, file.path());

    for _ in 0..2 {
        load_snapshot(&store, &request, &LoadOptions::default(), &mut RecordingProgress::default())
            .await
            .expect("load should succeed");
    }

    let rows = sqlx::query(
        "SELECT ip_start, asn_number, asn_organization, generation FROM ip_asn ORDER BY ip_start",
    )
    .fetch_all(store.pool())
    .await
    .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get::<String, _>("ip_start"), "1.0.0.0");
    assert_eq!(rows[0].get::<i64, _>("asn_number"), 13335);
    assert_eq!(rows[1].get::<String, _>("asn_organization"), "GOOGLE");
    assert!(rows.iter().all(|r| r.get::<i64, _>("generation") == 2));
}

#[tokio::test]
async fn test_batches_and_progress_for_2500_rows() {
    let store = RecordingStore::new(new_store().await);
    let file = snapshot_file(&country_rows(2500));
    let request = LoadRequest::new(DatasetKind::Country, IpFamily::V4, file.path());
    let mut progress = RecordingProgress::default();

    let summary = load_snapshot(&store, &request, &LoadOptions::default(), &mut progress)
        .await
        .expect("load should succeed");

    assert_eq!(summary.rows_written, 2500);
    assert_eq!(summary.batches, 3);
    assert_eq!(store.batch_sizes(), vec![1000, 1000, 500]);
    assert_eq!(progress.saved, vec![1000, 2000, 2500]);
}

#[tokio::test]
async fn test_exact_multiple_of_batch_size_has_no_empty_flush() {
    let store = RecordingStore::new(new_store().await);
    let file = snapshot_file(&country_rows(20));
    let request = LoadRequest::new(DatasetKind::Country, IpFamily::V4, file.path());
    let options = LoadOptions {
        batch_size: 10,
        ..Default::default()
    };
    let mut progress = RecordingProgress::default();

    load_snapshot(&store, &request, &options, &mut progress)
        .await
        .expect("load should succeed");

    assert_eq!(store.batch_sizes(), vec![10, 10]);
    assert_eq!(progress.saved, vec![10, 20]);
}

#[tokio::test]
async fn test_malformed_row_truncates_without_error() {
    let store = new_store().await;
    let mut contents = country_rows(10);
    contents.push_str("10.9.9.0,10.9.9.255\n");
    contents.push_str("10.9.10.0,10.9.10.255,ZZ\n");
    let file = snapshot_file(&contents);
    let request = LoadRequest::new(DatasetKind::Country, IpFamily::V4, file.path());

    let summary = load_snapshot(&store, &request, &LoadOptions::default(), &mut RecordingProgress::default())
        .await
        .expect("truncated load still succeeds");

    assert_eq!(summary.rows_written, 10);
    assert_eq!(summary.truncated_at_line, Some(11));
    assert_eq!(rows_in(&store, DatasetKind::Country, IpFamily::V4, 1).await, 10);
}

#[tokio::test]
async fn test_empty_snapshot_keeps_previous_rows_by_default() {
    let store = new_store().await;
    let full = snapshot_file(&country_rows(4));
    let empty = snapshot_file("");

    load_snapshot(
        &store,
        &LoadRequest::new(DatasetKind::Country, IpFamily::V4, full.path()),
        &LoadOptions::default(),
        &mut RecordingProgress::default(),
    )
    .await
    .unwrap();
    let summary = load_snapshot(
        &store,
        &LoadRequest::new(DatasetKind::Country, IpFamily::V4, empty.path()),
        &LoadOptions::default(),
        &mut RecordingProgress::default(),
    )
    .await
    .unwrap();

    assert_eq!(summary.rows_written, 0);
    assert_eq!(summary.reap, ReapOutcome::Skipped { rows: 0, threshold: 1 });
    assert_eq!(rows_in(&store, DatasetKind::Country, IpFamily::V4, 1).await, 4);
    assert_eq!(
        store
            .published_generation(DatasetKind::Country, IpFamily::V4)
            .await
            .unwrap()
            .map(|p| p.generation),
        Some(Generation::new(1))
    );
}

#[tokio::test]
async fn test_empty_snapshot_clears_lineage_when_reap_is_unconditional() {
    let store = new_store().await;
    let full = snapshot_file(&country_rows(4));
    let empty = snapshot_file("");
    let options = LoadOptions {
        min_rows_to_reap: 0,
        ..Default::default()
    };

    for file in [&full, &empty] {
        load_snapshot(
            &store,
            &LoadRequest::new(DatasetKind::Country, IpFamily::V4, file.path()),
            &options,
            &mut RecordingProgress::default(),
        )
        .await
        .unwrap();
    }

    assert_eq!(
        store
            .count_rows(DatasetKind::Country, IpFamily::V4, None)
            .await
            .unwrap(),
        0
    );
    let published = store
        .published_generation(DatasetKind::Country, IpFamily::V4)
        .await
        .unwrap()
        .expect("empty generation is still published");
    assert_eq!(published.generation, Generation::new(2));
    assert_eq!(published.row_count, 0);
}

#[tokio::test]
async fn test_first_load_of_lineage_is_generation_one() {
    let store = new_store().await;
    let file = snapshot_file(&country_rows(2));
    let request = LoadRequest::new(DatasetKind::Country, IpFamily::V6, file.path());

    let summary = load_snapshot(&store, &request, &LoadOptions::default(), &mut RecordingProgress::default())
        .await
        .unwrap();

    assert_eq!(summary.generation, Generation::FIRST);
}

#[tokio::test]
async fn test_city_unparseable_coordinates_become_zero() {
    let store = new_store().await;
    let file = snapshot_file(
        "1.0.0.0,1.0.0.255,AU,Australia,Queensland,Brisbane,4000,north,153.02,Australia/Brisbane\n",
    );
    let request = LoadRequest::new(DatasetKind::City, IpFamily::V4, file.path());

    load_snapshot(&store, &request, &LoadOptions::default(), &mut RecordingProgress::default())
        .await
        .expect("load should succeed");

    let row = sqlx::query("SELECT city_name, latitude, longitude, timezone FROM ip_city")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(row.get::<String, _>("city_name"), "Brisbane");
    assert_eq!(row.get::<f64, _>("latitude"), 0.0);
    assert_eq!(row.get::<f64, _>("longitude"), 153.02);
    assert_eq!(row.get::<String, _>("timezone"), "Australia/Brisbane");
}

#[tokio::test]
async fn test_city_non_finite_coordinates_become_zero() {
    let store = new_store().await;
    let file = snapshot_file(
        "1.0.0.0,1.0.0.255,AU,Australia,Queensland,Brisbane,4000,NaN,inf,Australia/Brisbane\n\
         1.0.1.0,1.0.1.255,AU,Australia,Victoria,Melbourne,3000,-inf,144.96,Australia/Melbourne\n",
    );
    let request = LoadRequest::new(DatasetKind::City, IpFamily::V4, file.path());

    let summary = load_snapshot(&store, &request, &LoadOptions::default(), &mut RecordingProgress::default())
        .await
        .expect("non-finite coordinates must not fail the load");
    assert_eq!(summary.rows_written, 2);

    let rows = sqlx::query("SELECT latitude, longitude FROM ip_city ORDER BY ip_start")
        .fetch_all(store.pool())
        .await
        .unwrap();
    assert_eq!(rows[0].get::<f64, _>("latitude"), 0.0);
    assert_eq!(rows[0].get::<f64, _>("longitude"), 0.0);
    assert_eq!(rows[1].get::<f64, _>("latitude"), 0.0);
    assert_eq!(rows[1].get::<f64, _>("longitude"), 144.96);
}

#[tokio::test]
async fn test_families_are_independent_lineages() {
    let store = new_store().await;
    let v4 = snapshot_file(&country_rows(3));
    let v6 = snapshot_file("2001:200::,2001:200:ffff:ffff:ffff:ffff:ffff:ffff,JP\n");

    let requests = vec![
        LoadRequest::new(DatasetKind::Country, IpFamily::V4, v4.path()),
        LoadRequest::new(DatasetKind::Country, IpFamily::V4, v4.path()),
        LoadRequest::new(DatasetKind::Country, IpFamily::V6, v6.path()),
    ];
    let report = run_loads(
        &store,
        &requests,
        &RunOptions::default(),
        &mut RecordingProgress::default(),
    )
    .await;

    assert!(report.is_success());
    // The v6 load starts its own lineage and leaves v4 rows alone
    assert_eq!(rows_in(&store, DatasetKind::Country, IpFamily::V4, 2).await, 3);
    assert_eq!(rows_in(&store, DatasetKind::Country, IpFamily::V6, 1).await, 1);
    let generations: Vec<_> = report.succeeded().map(|(_, s)| s.generation.value()).collect();
    assert_eq!(generations, vec![1, 2, 1]);
}

#[tokio::test]
async fn test_missing_file_is_reported_and_run_continues() {
    let store = new_store().await;
    let asn = snapshot_file("1.0.0.0,1.0.0.255,13335,CLOUDFLARENET\n");
    let requests = vec![
        LoadRequest::new(DatasetKind::Country, IpFamily::V4, "/nonexistent/country.csv"),
        LoadRequest::new(DatasetKind::Asn, IpFamily::V4, asn.path()),
    ];

    let report = run_loads(
        &store,
        &requests,
        &RunOptions::default(),
        &mut RecordingProgress::default(),
    )
    .await;

    assert!(!report.is_success());
    assert_eq!(report.not_attempted(), 0);
    let failed: Vec<_> = report.failed().collect();
    assert_eq!(failed.len(), 1);
    assert!(matches!(failed[0].1, LoadError::SourceOpen { .. }));
    assert_eq!(report.total_rows(), 1);
    assert_eq!(rows_in(&store, DatasetKind::Asn, IpFamily::V4, 1).await, 1);
}

#[tokio::test]
async fn test_stop_on_error_skips_remaining_requests() {
    let store = new_store().await;
    let asn = snapshot_file("1.0.0.0,1.0.0.255,13335,CLOUDFLARENET\n");
    let requests = vec![
        LoadRequest::new(DatasetKind::Country, IpFamily::V4, "/nonexistent/country.csv"),
        LoadRequest::new(DatasetKind::Asn, IpFamily::V4, asn.path()),
    ];
    let options = RunOptions {
        stop_on_error: true,
        ..Default::default()
    };

    let report = run_loads(&store, &requests, &options, &mut RecordingProgress::default()).await;

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.not_attempted(), 1);
    assert_eq!(
        store
            .count_rows(DatasetKind::Asn, IpFamily::V4, None)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_same_file_twice_keeps_both_generations_when_reap_is_skipped() {
    let store = new_store().await;
    let file = snapshot_file(&country_rows(3));
    let request = LoadRequest::new(DatasetKind::Country, IpFamily::V6, file.path());
    let options = LoadOptions {
        min_rows_to_reap: 100,
        ..Default::default()
    };

    for _ in 0..2 {
        load_snapshot(&store, &request, &options, &mut RecordingProgress::default())
            .await
            .expect("load should succeed");
    }

    // No de-duplication: each generation holds its own copy
    assert_eq!(rows_in(&store, DatasetKind::Country, IpFamily::V6, 1).await, 3);
    assert_eq!(rows_in(&store, DatasetKind::Country, IpFamily::V6, 2).await, 3);
}
