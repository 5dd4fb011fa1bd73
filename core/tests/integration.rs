//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every `Rumo`
//! operation over real HTTP. Validates that request building, the ureq
//! transport, and response parsing agree with the server's schema.

use std::time::Duration;

use rumo_core::{
    ApiError, Content, ContentOptions, InteractionOptions, InteractionType, RecommendationOptions,
    Rumo, SimilarOptions, ALGO_JACCARD, MAX_SUBMISSION_BATCH,
};

const KEY: &str = "integration-key";

/// Start the mock server on a random port and return its root URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            rumo_mock_server::run(listener, KEY).await
        })
        .unwrap();
    });

    format!("http://{addr}/")
}

fn catalog() -> Vec<Content> {
    vec![
        Content::new("1", "Alien")
            .with_category("genre", "scifi", 0.7)
            .with_category("genre", "horror", 0.3)
            .with_filter("year", 1979),
        Content::new("2", "Aliens")
            .with_category("genre", "scifi", 0.8)
            .with_category("genre", "action", 0.2),
        Content::new("3", "Amelie")
            .with_category("genre", "romance", 1.0)
            .with_category("mood", "light", 1.0),
    ]
}

#[test]
fn full_lifecycle() {
    let url = start_server();
    let rumo = Rumo::new(&url, KEY, "movies").unwrap();
    assert_eq!(rumo.base_url(), format!("{url}movies/"));

    // Step 1: empty catalog.
    let summary = rumo.get_catalog_summary().unwrap();
    assert_eq!(summary.count, 0);

    // Step 2: submit the catalog; the acknowledgement echoes the ids.
    let submission = rumo.submit_content(&catalog()).unwrap();
    assert_eq!(submission.source, "movies");
    assert_eq!(submission.content_ids().collect::<Vec<_>>(), ["1", "2", "3"]);

    let summary = rumo.get_catalog_summary().unwrap();
    assert_eq!(summary.count, 3);

    // Step 3: fetch one piece back.
    let content = rumo.get_content("1", &ContentOptions::default()).unwrap();
    assert_eq!(content, catalog()[0]);

    let content = rumo
        .get_content("1", &ContentOptions::default().at("2020-01-01"))
        .unwrap();
    assert_eq!(content.label, "Alien");

    // Step 4: similar content, best match first.
    let similar = rumo
        .get_similar_content("1", &SimilarOptions::default())
        .unwrap();
    assert_eq!(similar.id, "1");
    let ids: Vec<_> = similar.content.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["2", "3"]);

    let similar = rumo
        .get_similar_content("1", &SimilarOptions::default().take(1))
        .unwrap();
    assert_eq!(similar.content.len(), 1);

    // Step 5: user events.
    let event = rumo
        .submit_user_event("u1", InteractionType::Watch, "1")
        .unwrap();
    assert_eq!(event.interaction_type(), Some(InteractionType::Watch));
    assert_eq!(event.key.source, "movies");
    assert_eq!(event.key.user_id, "u1");
    rumo.submit_user_event("u1", InteractionType::RateLike, "3")
        .unwrap();

    let interactions = rumo
        .list_interactions("u1", &InteractionOptions::default())
        .unwrap();
    let kinds: Vec<_> = interactions.iter().map(|i| i.interaction_type).collect();
    assert_eq!(kinds, [InteractionType::Watch, InteractionType::RateLike]);

    let interactions = rumo
        .list_interactions("u1", &InteractionOptions::default().catalogs(["mood"]))
        .unwrap();
    assert_eq!(interactions.len(), 1);
    assert_eq!(interactions[0].content_id, "3");

    // Step 6: personalized recommendation skips seen content.
    let rec = rumo
        .get_personalized_recommendation("u1", &RecommendationOptions::default())
        .unwrap();
    assert_eq!(rec.id, "u1");
    assert_eq!(rec.content.len(), 1);
    assert_eq!(rec.content[0].id, "2");

    let rec = rumo
        .get_personalized_recommendation(
            "u1",
            &RecommendationOptions::default().algo(ALGO_JACCARD).take(-1),
        )
        .unwrap();
    assert!((rec.content[0].score - 1.0 / 3.0).abs() < 1e-12);

    // Step 7: errors carry the remote status.
    let err = rumo
        .get_content("missing", &ContentOptions::default())
        .unwrap_err();
    assert!(err.is_not_found(), "{err}");

    let err = rumo
        .submit_user_event("u1", InteractionType::Click, "missing")
        .unwrap_err();
    assert!(err.is_not_found(), "{err}");
}

#[test]
fn ids_with_reserved_characters_round_trip() {
    let url = start_server();
    let rumo = Rumo::new(&url, KEY, "odd").unwrap();
    rumo.submit_content(&[Content::new("a/b c", "slashed"), Content::new("é", "accent")])
        .unwrap();

    let content = rumo.get_content("a/b c", &ContentOptions::default()).unwrap();
    assert_eq!(content.label, "slashed");

    let event = rumo
        .submit_user_event("user one", InteractionType::Bookmark, "é")
        .unwrap();
    assert_eq!(event.key.user_id, "user one");
    assert_eq!(event.content_id, "é");
}

#[test]
fn batches_above_the_documented_limit_are_sent() {
    let url = start_server();
    let rumo = Rumo::new(&url, KEY, "bulk").unwrap();
    let content: Vec<Content> = (0..=MAX_SUBMISSION_BATCH)
        .map(|i| Content::new(i.to_string(), "bulk"))
        .collect();

    let submission = rumo.submit_content(&content).unwrap();
    assert_eq!(submission.content.len(), MAX_SUBMISSION_BATCH + 1);
}

#[test]
fn summary_of_a_large_catalog_is_read_in_full() {
    let url = start_server();
    let rumo = Rumo::new(&url, KEY, "archive").unwrap();
    let synopsis = "s".repeat(4096);
    for batch in 0..8 {
        let content: Vec<Content> = (0..400)
            .map(|i| {
                Content::new(format!("{batch}-{i}"), format!("{i} {synopsis}"))
                    .with_category("genre", "documentary", 1.0)
                    .with_filter("batch", batch)
            })
            .collect();
        let submission = rumo.submit_content(&content).unwrap();
        assert_eq!(submission.content.len(), 400);
    }

    // 3200 labels of 4 KiB put the body past 12 MiB.
    let summary = rumo.get_catalog_summary().unwrap();
    assert_eq!(summary.count, 3200);
    assert_eq!(summary.content.len(), 3200);
}

#[test]
fn wrong_api_key_is_a_remote_error() {
    let url = start_server();
    let rumo = Rumo::new(&url, "not-the-key", "movies").unwrap();
    let err = rumo.get_catalog_summary().unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 401, .. }), "{err}");
}

#[test]
fn unreachable_host_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let rumo = Rumo::new(&format!("http://127.0.0.1:{port}/"), KEY, "movies")
        .unwrap()
        .with_timeout(Duration::from_secs(5));
    assert_eq!(rumo.timeout(), Duration::from_secs(5));

    let err = rumo.get_catalog_summary().unwrap_err();
    assert!(
        matches!(err, ApiError::Transport(_) | ApiError::Timeout(_)),
        "{err}"
    );
}

#[test]
fn slow_server_times_out() {
    // Accepts the connection but never answers.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let held: Vec<_> = listener.incoming().take(1).collect();
        std::thread::sleep(Duration::from_secs(5));
        drop(held);
    });

    let rumo = Rumo::new(&format!("http://{addr}/"), KEY, "movies")
        .unwrap()
        .with_timeout(Duration::from_millis(200));
    let err = rumo.get_catalog_summary().unwrap_err();
    assert!(matches!(err, ApiError::Timeout(d) if d == Duration::from_millis(200)), "{err}");
}
