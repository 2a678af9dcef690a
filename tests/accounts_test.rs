//! Integration tests for photographer accounts together with the store.

mod common;

use assert_matches::assert_matches;
use common::{TestHarness, PNG};
use chrono::NaiveDate;
use ph_core::config::AuthConfig;
use ph_core::Error;
use ph_db::models::{PersonalDetails, User};
use photohub::{Accounts, SignupRequest};

fn accounts(h: &TestHarness) -> Accounts {
    Accounts::new(
        h.db.clone(),
        AuthConfig {
            bcrypt_cost: 4,
            min_password_len: 8,
        },
    )
}

fn request(username: &str, password: &str) -> SignupRequest {
    SignupRequest {
        username: username.to_string(),
        email: format!("{}@example.com", username.to_lowercase()),
        password: password.to_string(),
        details: PersonalDetails::default(),
    }
}

fn signup(accounts: &Accounts, username: &str, password: &str) -> ph_core::Result<User> {
    accounts.signup(&request(username, password))
}

#[test]
fn signed_up_photographer_can_upload() {
    let h = TestHarness::new();
    let accounts = accounts(&h);
    let cat = h.create_category("Wildlife");

    let user = signup(&accounts, "frans", "tree-frog-42").unwrap();
    let id = h.store.put(PNG, user.id, cat).unwrap();

    let profile = h.aggregation().photographer_profile(user.id).unwrap();
    assert_eq!(profile.username, "frans");
    assert_eq!(profile.categories[&cat].images[0].image_id, id);
}

#[test]
fn login_returns_same_user() {
    let h = TestHarness::new();
    let accounts = accounts(&h);

    let created = signup(&accounts, "steve", "afghan-girl").unwrap();
    let logged_in = accounts.login(" steve ", "afghan-girl").unwrap();
    assert_eq!(logged_in.id, created.id);
}

#[test]
fn usernames_are_case_sensitive() {
    let h = TestHarness::new();
    let accounts = accounts(&h);

    signup(&accounts, "Nan", "ballad-of-sexual").unwrap();
    let mut lower = request("nan", "ballad-of-sexual");
    lower.email = "nan.goldin@example.com".into();
    accounts.signup(&lower).unwrap();
    assert_matches!(
        accounts.login("NAN", "ballad-of-sexual"),
        Err(Error::Unauthorized(_))
    );
}

#[test]
fn duplicate_signup_leaves_original_credential() {
    let h = TestHarness::new();
    let accounts = accounts(&h);

    signup(&accounts, "cindy", "untitled-film").unwrap();
    assert_matches!(
        signup(&accounts, "cindy", "different-pass"),
        Err(Error::Conflict(_))
    );
    assert!(accounts.login("cindy", "untitled-film").is_ok());
    assert_eq!(h.count("users"), 1);
}

#[test]
fn password_hash_is_not_serialized() {
    let h = TestHarness::new();
    let user = signup(&accounts(&h), "walker", "let-us-now-praise").unwrap();

    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["username"], "walker");
    assert!(json.get("password_hash").is_none());
}

#[test]
fn usernames_differing_in_case_need_distinct_emails() {
    let h = TestHarness::new();
    let accounts = accounts(&h);

    accounts.signup(&request("Diane", "identical-twins")).unwrap();
    let mut again = request("diane", "identical-twins");
    again.email = "DIANE@example.com".into();
    assert_matches!(accounts.signup(&again), Err(Error::Conflict(msg)) if msg.contains("diane@example.com"));
    assert_eq!(h.count("users"), 1);
}

#[test]
fn profile_carries_personal_details() {
    let h = TestHarness::new();
    let accounts = accounts(&h);
    let cat = h.create_category("Street");

    let user = accounts
        .signup(&SignupRequest {
            details: PersonalDetails {
                first_name: Some("Garry".into()),
                surname: Some("Winogrand".into()),
                gender: Some("male".into()),
                date_of_birth: NaiveDate::from_ymd_opt(1928, 1, 14),
                location: Some("New York".into()),
                ..PersonalDetails::default()
            },
            ..request("garry", "women-are-beautiful")
        })
        .unwrap();
    h.store.put(PNG, user.id, cat).unwrap();

    let profile = h.aggregation().photographer_profile(user.id).unwrap();
    assert_eq!(profile.email, "garry@example.com");
    assert_eq!(profile.display_name.as_deref(), Some("Garry Winogrand"));
    assert_eq!(profile.details.location.as_deref(), Some("New York"));
    assert!(profile.age.is_some_and(|age| age >= 98));

    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["username"], "garry");
    assert_eq!(json["email"], "garry@example.com");
    assert_eq!(json["first_name"], "Garry");
    assert_eq!(json["surname"], "Winogrand");
    assert_eq!(json["middle_name"], serde_json::Value::Null);
    assert_eq!(json["date_of_birth"], "1928-01-14");
    assert_eq!(json["categories"][cat.to_string()]["images"][0]["mime_type"], "image/png");
    assert!(json.get("password_hash").is_none());
}
