//! End-to-end walk of the sharing lifecycle against a live server.
//!
//! Requires a running instance (DATABASE_URL, JWT_SECRET, ENCRYPTION_KEY
//! set) on 127.0.0.1:8000, so these tests are ignored by default:
//!
//! ```text
//! cargo test --test api_e2e -- --ignored
//! ```

use std::time::{SystemTime, UNIX_EPOCH};
use once_cell::sync::Lazy;
use serde_json::{json, Value};

static BASE_URL: Lazy<String> =
    Lazy::new(|| std::env::var("PADLOCK_TEST_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()));

struct TestUser {
    token: String,
    id: String,
    email: String,
}

fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

async fn register_user(client: &reqwest::Client, tag: &str) -> TestUser {
    let email = format!("{}_{}@example.com", tag, timestamp());
    let response = client
        .post(format!("{}/api/auth/register", *BASE_URL))
        .json(&json!({
            "email": email,
            "full_name": format!("Test {}", tag),
            "password": "correct horse battery"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.unwrap();
    let token = body["access_token"].as_str().unwrap().to_string();

    let me: Value = client
        .get(format!("{}/api/users/me", *BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    TestUser {
        token,
        id: me["id"].as_str().unwrap().to_string(),
        email,
    }
}

async fn create_credential(client: &reqwest::Client, user: &TestUser, secret: &str) -> String {
    let response = client
        .post(format!("{}/api/passwords", *BASE_URL))
        .bearer_auth(&user.token)
        .json(&json!({
            "title": "Wifi",
            "username": "admin",
            "secret": secret
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn share_revoke_lifecycle() {
    let client = reqwest::Client::new();
    let alice = register_user(&client, "alice").await;
    let bob = register_user(&client, "bob").await;

    let credential_id = create_credential(&client, &alice, "secret1").await;

    // Bob cannot decrypt before the share exists. 404, not 403.
    let denied = client
        .get(format!("{}/api/passwords/{}/decrypt", *BASE_URL, credential_id))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), 404);

    // Alice shares with Bob for an hour.
    let share = client
        .post(format!("{}/api/shared-credentials", *BASE_URL))
        .bearer_auth(&alice.token)
        .json(&json!({
            "credential_id": credential_id,
            "shared_with_id": bob.id,
            "expires_in_hours": 1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(share.status(), 200);
    let grant: Value = share.json().await.unwrap();
    let grant_id = grant["id"].as_str().unwrap();

    // expires_at - created_at is exactly the requested duration; both
    // timestamps come from the same clock instant.
    let created_at =
        chrono::DateTime::parse_from_rfc3339(grant["created_at"].as_str().unwrap()).unwrap();
    let expires_at =
        chrono::DateTime::parse_from_rfc3339(grant["expires_at"].as_str().unwrap()).unwrap();
    assert_eq!(expires_at - created_at, chrono::Duration::hours(1));

    // Bob can now decrypt.
    let allowed: Value = client
        .get(format!("{}/api/passwords/{}/decrypt", *BASE_URL, credential_id))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(allowed["secret"], "secret1");

    // The grant shows up in Bob's received listing.
    let received: Value = client
        .get(format!("{}/api/shared-credentials/received", *BASE_URL))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(received
        .as_array()
        .unwrap()
        .iter()
        .any(|g| g["credential_id"] == credential_id.as_str()));

    // Alice revokes; the very next request is denied.
    let revoke = client
        .post(format!("{}/api/shared-credentials/{}/revoke", *BASE_URL, grant_id))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(revoke.status(), 200);

    let denied_again = client
        .get(format!("{}/api/passwords/{}/decrypt", *BASE_URL, credential_id))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(denied_again.status(), 404);

    let received_after: Value = client
        .get(format!("{}/api/shared-credentials/received", *BASE_URL))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!received_after
        .as_array()
        .unwrap()
        .iter()
        .any(|g| g["credential_id"] == credential_id.as_str()));
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn already_expired_share_is_invisible() {
    let client = reqwest::Client::new();
    let alice = register_user(&client, "alice_exp").await;
    let bob = register_user(&client, "bob_exp").await;

    let credential_id = create_credential(&client, &alice, "secret1").await;

    // Negative duration: the grant is born expired, stored status stays active.
    let share = client
        .post(format!("{}/api/shared-credentials", *BASE_URL))
        .bearer_auth(&alice.token)
        .json(&json!({
            "credential_id": credential_id,
            "shared_with_id": bob.id,
            "expires_in_hours": -1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(share.status(), 200);
    let grant: Value = share.json().await.unwrap();
    assert_eq!(grant["status"], "active");

    let received: Value = client
        .get(format!("{}/api/shared-credentials/received", *BASE_URL))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!received
        .as_array()
        .unwrap()
        .iter()
        .any(|g| g["credential_id"] == credential_id.as_str()));

    let denied = client
        .get(format!("{}/api/passwords/{}/decrypt", *BASE_URL, credential_id))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), 404);

    // The owner's "shared by me" listing still shows the grant.
    let shared: Value = client
        .get(format!("{}/api/shared-credentials/shared", *BASE_URL))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(shared
        .as_array()
        .unwrap()
        .iter()
        .any(|g| g["credential_id"] == credential_id.as_str()));
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn duplicate_shares_dedup_to_latest() {
    let client = reqwest::Client::new();
    let alice = register_user(&client, "alice_dup").await;
    let bob = register_user(&client, "bob_dup").await;

    let credential_id = create_credential(&client, &alice, "secret1").await;

    for hours in [1, 24] {
        let share = client
            .post(format!("{}/api/shared-credentials", *BASE_URL))
            .bearer_auth(&alice.token)
            .json(&json!({
                "credential_id": credential_id,
                "shared_with_id": bob.id,
                "expires_in_hours": hours
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(share.status(), 200);
    }

    let received: Value = client
        .get(format!("{}/api/shared-credentials/received", *BASE_URL))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let matching: Vec<&Value> = received
        .as_array()
        .unwrap()
        .iter()
        .filter(|g| g["credential_id"] == credential_id.as_str())
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0]["expires_in_hours"], 24);
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn non_admin_cannot_list_users() {
    let client = reqwest::Client::new();
    let user = register_user(&client, "plain").await;
    let other = register_user(&client, "plain_other").await;

    let response = client
        .get(format!("{}/api/users", *BASE_URL))
        .bearer_auth(&user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // The by-email lookup stays open to any authenticated user.
    let lookup = client
        .get(format!("{}/api/users/by-email/{}", *BASE_URL, user.email))
        .bearer_auth(&user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(lookup.status(), 200);

    // By id: a non-admin may fetch themselves, but nobody else.
    let own = client
        .get(format!("{}/api/users/{}", *BASE_URL, user.id))
        .bearer_auth(&user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(own.status(), 200);
    let body: Value = own.json().await.unwrap();
    assert_eq!(body["email"], user.email.as_str());

    let someone_else = client
        .get(format!("{}/api/users/{}", *BASE_URL, other.id))
        .bearer_auth(&user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(someone_else.status(), 403);
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn owner_crud_and_stranger_isolation() {
    let client = reqwest::Client::new();
    let alice = register_user(&client, "alice_crud").await;
    let mallory = register_user(&client, "mallory").await;

    let credential_id = create_credential(&client, &alice, "secret1").await;

    // Owner sees, updates and decrypts.
    let fetched = client
        .get(format!("{}/api/passwords/{}", *BASE_URL, credential_id))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(fetched.status(), 200);

    let updated = client
        .put(format!("{}/api/passwords/{}", *BASE_URL, credential_id))
        .bearer_auth(&alice.token)
        .json(&json!({ "secret": "secret2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status(), 200);

    let revealed: Value = client
        .get(format!("{}/api/passwords/{}/decrypt", *BASE_URL, credential_id))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(revealed["secret"], "secret2");

    // A stranger gets 404 for get, update, delete and decrypt alike.
    for response in [
        client
            .get(format!("{}/api/passwords/{}", *BASE_URL, credential_id))
            .bearer_auth(&mallory.token)
            .send()
            .await
            .unwrap(),
        client
            .put(format!("{}/api/passwords/{}", *BASE_URL, credential_id))
            .bearer_auth(&mallory.token)
            .json(&json!({ "title": "stolen" }))
            .send()
            .await
            .unwrap(),
        client
            .delete(format!("{}/api/passwords/{}", *BASE_URL, credential_id))
            .bearer_auth(&mallory.token)
            .send()
            .await
            .unwrap(),
        client
            .get(format!("{}/api/passwords/{}/decrypt", *BASE_URL, credential_id))
            .bearer_auth(&mallory.token)
            .send()
            .await
            .unwrap(),
    ] {
        assert_eq!(response.status(), 404);
    }

    // Owner delete works and the credential is gone.
    let deleted = client
        .delete(format!("{}/api/passwords/{}", *BASE_URL, credential_id))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 200);

    let gone = client
        .get(format!("{}/api/passwords/{}", *BASE_URL, credential_id))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), 404);
}
