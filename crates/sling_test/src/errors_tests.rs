use super::*;

#[test]
fn test_creation_failed_names_the_resource() {
    let error = FixtureError::CreationFailed {
        kind: ResourceKind::User,
        id: "alice".to_string(),
    };

    assert_eq!(error.to_string(), "Expected user to be created: alice");
}

#[test]
fn test_teardown_error_lists_every_failure() {
    let error = FixtureError::Teardown(vec![
        DeletionFailure {
            kind: ResourceKind::Node,
            id: "/a/b".to_string(),
            reason: DeletionFailureReason::Refused,
        },
        DeletionFailure {
            kind: ResourceKind::Site,
            id: "/sites/foo1".to_string(),
            reason: DeletionFailureReason::Refused,
        },
    ]);

    assert_eq!(
        error.to_string(),
        "Teardown failed for 2 resource(s): \
         Expected node delete to succeed: /a/b (server refused the delete); \
         Expected site delete to succeed: /sites/foo1 (server refused the delete)"
    );
}

#[test]
fn test_resource_kind_display() {
    assert_eq!(ResourceKind::Node.to_string(), "node");
    assert_eq!(ResourceKind::User.to_string(), "user");
    assert_eq!(ResourceKind::Group.to_string(), "group");
    assert_eq!(ResourceKind::Site.to_string(), "site");
}

#[test]
fn test_error_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FixtureError>();
}
