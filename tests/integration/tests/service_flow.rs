//! Service-level integration tests over the file backend.
//!
//! These tests run the full stack below the CLI: key derivation, the
//! encryption service, the file store, and the audit trail, all rooted in
//! a temporary directory.

use std::collections::HashMap;

use controle_integration_tests::{audit_log_path, file_service, principal, TEST_PASSPHRASE};
use controle_secrets::{AppId, NewSecret, Role, SecretError, SecretType};
use tempfile::TempDir;

fn new_secret(label: &str, value: &str) -> NewSecret {
    NewSecret {
        app_id: AppId::new("billing-api"),
        secret_type: SecretType::ApiKey,
        label: label.to_string(),
        value: value.to_string(),
        metadata: HashMap::new(),
        expires_at: None,
    }
}

#[tokio::test]
async fn test_full_lifecycle_on_file_backend() {
    let dir = TempDir::new().unwrap();
    let service = file_service(dir.path(), TEST_PASSPHRASE);
    let admin = principal(Role::Admin);

    let listing = service
        .create(&admin, new_secret("stripe key", "super-secret-api-key-123"))
        .await
        .unwrap();

    let listed = service
        .list_for_app(&admin, &AppId::new("billing-api"))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].label, "stripe key");

    let revealed = service.reveal(&admin, listing.id).await.unwrap();
    assert_eq!(revealed.expose(), "super-secret-api-key-123");

    service
        .update_value(&admin, listing.id, "rotated-value")
        .await
        .unwrap();
    let revealed = service.reveal(&admin, listing.id).await.unwrap();
    assert_eq!(revealed.expose(), "rotated-value");

    service.delete(&admin, listing.id).await.unwrap();
    let listed = service
        .list_for_app(&admin, &AppId::new("billing-api"))
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_audit_trail_lands_on_disk() {
    let dir = TempDir::new().unwrap();
    let service = file_service(dir.path(), TEST_PASSPHRASE);
    let admin = principal(Role::Admin);

    let listing = service
        .create(&admin, new_secret("audited", "value-1"))
        .await
        .unwrap();
    service.reveal(&admin, listing.id).await.unwrap();
    service.delete(&admin, listing.id).await.unwrap();

    let raw = std::fs::read_to_string(audit_log_path(dir.path())).unwrap();
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 3);

    let actions: Vec<String> = lines
        .iter()
        .map(|line| {
            let entry: serde_json::Value = serde_json::from_str(line).unwrap();
            entry["action"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(actions, vec!["create", "view", "delete"]);

    // The trail must never contain the plaintext value.
    assert!(!raw.contains("value-1"));
}

#[tokio::test]
async fn test_same_passphrase_reopens_existing_secrets() {
    let dir = TempDir::new().unwrap();
    let admin = principal(Role::Admin);

    let id = {
        let service = file_service(dir.path(), TEST_PASSPHRASE);
        service
            .create(&admin, new_secret("persistent", "still-here"))
            .await
            .unwrap()
            .id
    };

    // A separate instance derives the same key from the same passphrase
    // and reads what the first one wrote.
    let reopened = file_service(dir.path(), TEST_PASSPHRASE);
    let revealed = reopened.reveal(&admin, id).await.unwrap();
    assert_eq!(revealed.expose(), "still-here");
}

#[tokio::test]
async fn test_wrong_passphrase_cannot_decrypt() {
    let dir = TempDir::new().unwrap();
    let admin = principal(Role::Admin);

    let id = {
        let service = file_service(dir.path(), TEST_PASSPHRASE);
        service
            .create(&admin, new_secret("locked", "value"))
            .await
            .unwrap()
            .id
    };

    let other = file_service(dir.path(), "a-different-passphrase-also-32-chars-min");
    let err = other.reveal(&admin, id).await.unwrap_err();
    assert!(err.is_integrity_failure());
}

#[tokio::test]
async fn test_role_boundaries_end_to_end() {
    let dir = TempDir::new().unwrap();
    let service = file_service(dir.path(), TEST_PASSPHRASE);
    let editor = principal(Role::Editor);
    let viewer = principal(Role::Viewer);
    let admin = principal(Role::Admin);

    let listing = service
        .create(&editor, new_secret("editor made", "editor-value"))
        .await
        .unwrap();

    // Any role lists; only admin reveals.
    let listed = service
        .list_for_app(&viewer, &AppId::new("billing-api"))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    assert!(matches!(
        service.reveal(&editor, listing.id).await,
        Err(SecretError::AccessDenied { .. })
    ));
    assert!(matches!(
        service.reveal(&viewer, listing.id).await,
        Err(SecretError::AccessDenied { .. })
    ));
    assert_eq!(
        service.reveal(&admin, listing.id).await.unwrap().expose(),
        "editor-value"
    );
}

#[tokio::test]
async fn test_expired_secret_stays_but_wont_reveal() {
    let dir = TempDir::new().unwrap();
    let service = file_service(dir.path(), TEST_PASSPHRASE);
    let admin = principal(Role::Admin);

    let mut params = new_secret("short lived", "value");
    params.expires_at = Some(chrono::Utc::now() - chrono::Duration::minutes(1));
    let listing = service.create(&admin, params).await.unwrap();

    assert!(matches!(
        service.reveal(&admin, listing.id).await,
        Err(SecretError::Expired)
    ));

    // The record remains listed until deleted explicitly.
    let listed = service
        .list_for_app(&admin, &AppId::new("billing-api"))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}
