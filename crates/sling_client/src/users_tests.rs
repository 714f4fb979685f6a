use super::*;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn manager_for(server: &MockServer) -> UserManager {
    UserManager::new(SlingClient::new(&server.uri(), User::admin()).unwrap())
}

#[test]
fn test_admin_identity() {
    let admin = User::admin();

    assert_eq!(admin.name, "admin");
    assert_eq!(admin.password.expose_secret(), "admin");
}

#[test]
fn test_user_clone_and_equality() {
    let user = User::new("alice", "secret");
    let cloned = user.clone();

    assert_eq!(user, cloned);
    assert_ne!(user, User::new("alice", "other"));
}

#[test]
fn test_user_debug_hides_password() {
    let user = User::new("alice", "hunter2");

    let debug = format!("{user:?}");

    assert!(debug.contains("alice"));
    assert!(!debug.contains("hunter2"));
}

#[tokio::test]
async fn test_create_user_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/system/userManager/user.create.html"))
        .and(body_string_contains("%3Aname=alice"))
        .and(body_string_contains("pwd=testuser"))
        .and(body_string_contains("pwdConfirm=testuser"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager_for(&mock_server).await;

    let user = manager.create_user("alice").await.unwrap();

    assert_eq!(user, Some(User::new("alice", DEFAULT_USER_PASSWORD)));
}

#[tokio::test]
async fn test_create_user_refused() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/system/userManager/user.create.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let manager = manager_for(&mock_server).await;

    assert_eq!(manager.create_user("").await.unwrap(), None);
}

#[tokio::test]
async fn test_delete_user() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/system/userManager/user/alice.delete.html"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/system/userManager/user/bob.delete.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let manager = manager_for(&mock_server).await;

    assert!(manager.delete_user("alice").await.unwrap());
    assert!(!manager.delete_user("bob").await.unwrap());
}

#[tokio::test]
async fn test_delete_user_escapes_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/system/userManager/user/a%23b.delete.html"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager_for(&mock_server).await;

    assert!(manager.delete_user("a#b").await.unwrap());
}

#[tokio::test]
async fn test_create_group_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/system/userManager/group.create.html"))
        .and(body_string_contains("%3Aname=g-editors"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager_for(&mock_server).await;

    let group = manager.create_group("g-editors").await.unwrap();

    assert_eq!(group, Some(Group::new("g-editors")));
}

#[tokio::test]
async fn test_create_group_refused() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/system/userManager/group.create.html"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&mock_server)
        .await;

    let manager = manager_for(&mock_server).await;

    assert_eq!(manager.create_group("g-editors").await.unwrap(), None);
}

#[tokio::test]
async fn test_delete_group() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/system/userManager/group/g-editors.delete.html"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager_for(&mock_server).await;

    assert!(manager.delete_group("g-editors").await.unwrap());
}

#[tokio::test]
async fn test_delete_group_escapes_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/system/userManager/group/g%3Fx.delete.html"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager_for(&mock_server).await;

    assert!(manager.delete_group("g?x").await.unwrap());
}
