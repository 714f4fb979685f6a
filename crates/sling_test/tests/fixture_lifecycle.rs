//! End-to-end fixture lifecycle tests against a mock Sling server.
//!
//! These tests drive `SlingTest::run` over real HTTP and inspect the requests
//! the mock server received to verify what teardown sent, in which order and
//! as which identity.

use anyhow::Result;
use sling_test::sling_client::ContentRepository;
use sling_test::{FileUpload, FixtureError, Properties, SlingTest, TestConfig, User, init_logging};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const ADMIN_AUTH: &str = "Basic YWRtaW46YWRtaW4="; // admin:admin

/// A deletion request as seen by the server: the path and the identity used.
fn deletions(requests: &[Request]) -> Vec<(String, String)> {
    requests
        .iter()
        .filter(|r| {
            let body = String::from_utf8_lossy(&r.body);
            body.contains("%3Aoperation=delete") || r.url.path().ends_with(".delete.html")
        })
        .map(|r| {
            let auth = r
                .headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            (r.url.path().to_string(), auth)
        })
        .collect()
}

async fn accepting_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_run_cleans_up_everything_in_order() -> Result<()> {
    init_logging();
    let server = accepting_server().await;
    let config = TestConfig::for_server(server.uri());

    SlingTest::run(&config, async |t: &mut SlingTest| -> Result<()> {
        let mut properties = Properties::new();
        properties.insert("title".to_string(), "Parent".to_string());

        t.create_node("/content/a", &properties).await?;
        t.create_empty_node("/content/a/b").await?;
        t.create_file_node("/content/a/b", &FileUpload::new("file", "b.txt", "hello"))
            .await?;
        t.create_user("alice").await?;
        t.create_group("g-readers").await?;
        t.create_site("/sites", "Physics", "/physics").await?;

        // Act as a plain user for the rest of the body; teardown must not care
        t.repository().switch_user(&User::new("alice", "testuser"));
        t.create_empty_node("/content/alice-only").await?;
        Ok(())
    })
    .await?;

    let requests = server.received_requests().await.unwrap_or_default();
    let deletes = deletions(&requests);
    let paths: Vec<&str> = deletes.iter().map(|(p, _)| p.as_str()).collect();

    assert_eq!(
        paths,
        vec![
            "/content/alice-only",
            "/content/a/b",
            "/content/a",
            "/system/userManager/user/alice.delete.html",
            "/system/userManager/group/g-readers.delete.html",
            "/sites/physics",
        ]
    );
    assert!(deletes.iter().all(|(_, auth)| auth == ADMIN_AUTH));
    Ok(())
}

#[tokio::test]
async fn test_run_reports_refused_deletes_after_attempting_all() -> Result<()> {
    init_logging();
    let server = MockServer::start().await;

    // Mounted first so it takes precedence over the catch-all
    Mock::given(method("POST"))
        .and(path("/system/userManager/user/bob.delete.html"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = TestConfig::for_server(server.uri());

    let result = SlingTest::run(&config, async |t: &mut SlingTest| -> Result<()> {
        t.create_user("bob").await?;
        t.create_group("g-writers").await?;
        Ok(())
    })
    .await;

    let error = result.expect_err("refused delete must fail the test");
    match error.downcast_ref::<FixtureError>() {
        Some(FixtureError::Teardown(failures)) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].id, "bob");
        }
        other => panic!("expected a teardown error, got {other:?}"),
    }

    let requests = server.received_requests().await.unwrap_or_default();
    let paths: Vec<String> = deletions(&requests).into_iter().map(|(p, _)| p).collect();
    assert_eq!(
        paths,
        vec![
            "/system/userManager/user/bob.delete.html",
            "/system/userManager/group/g-writers.delete.html",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_run_fails_body_on_server_error_and_tracks_nothing() -> Result<()> {
    init_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/content/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = TestConfig::for_server(server.uri());

    let result = SlingTest::run(&config, async |t: &mut SlingTest| -> Result<()> {
        t.create_empty_node("/content/broken").await?;
        Ok(())
    })
    .await;

    let error = result.expect_err("a 500 on create must fail the test");
    assert_eq!(
        error.to_string(),
        "Expected node to be created: /content/broken"
    );

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(deletions(&requests).is_empty());
    Ok(())
}
