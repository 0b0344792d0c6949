use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User record returned by the backend alongside the token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthRecord {
    pub id: String,
    #[serde(rename = "collectionId", default)]
    pub collection_id: String,
    #[serde(rename = "collectionName", default)]
    pub collection_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub verified: bool,
    /// Any custom fields of the auth collection.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default)]
struct AuthState {
    token: String,
    record: Option<AuthRecord>,
}

/// In-memory auth state owned by a backend client.
///
/// Mirrors the collaborator's client-side store: a token, the record it
/// belongs to and an `is_valid` check. Nothing is persisted.
#[derive(Debug, Default)]
pub struct AuthStore {
    state: RwLock<AuthState>,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, AuthState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AuthState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the stored token and record.
    pub fn save(&self, token: impl Into<String>, record: Option<AuthRecord>) {
        let mut state = self.write();
        state.token = token.into();
        state.record = record;
    }

    /// Drop the token and record.
    pub fn clear(&self) {
        *self.write() = AuthState::default();
    }

    /// Current token, empty when nobody is signed in.
    pub fn token(&self) -> String {
        self.read().token.clone()
    }

    pub fn record(&self) -> Option<AuthRecord> {
        self.read().record.clone()
    }

    /// True when the token is present and not expired.
    pub fn is_valid(&self) -> bool {
        !is_token_expired(&self.read().token)
    }

    /// The token, but only if the store currently holds a valid session.
    pub fn valid_token(&self) -> Option<String> {
        let state = self.read();
        if is_token_expired(&state.token) {
            None
        } else {
            Some(state.token.clone())
        }
    }
}

/// Decode the claims segment of a JWT without verifying it.
fn token_payload(token: &str) -> Option<Map<String, Value>> {
    let encoded = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded.trim_end_matches('='))
        .ok()?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(claims) => Some(claims),
        _ => None,
    }
}

/// A token is live when its payload decodes to a non-empty object whose
/// `exp` claim is unset or still in the future. `null`, `0`, `false` and
/// `""` all count as unset.
pub(crate) fn is_token_expired(token: &str) -> bool {
    let Some(claims) = token_payload(token) else {
        return true;
    };
    if claims.is_empty() {
        return true;
    }
    match claims.get("exp") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) if s.is_empty() => false,
        Some(exp) => match exp.as_f64() {
            Some(exp) if exp == 0.0 => false,
            Some(exp) => exp <= Utc::now().timestamp() as f64,
            None => true,
        },
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    /// Build an unsigned JWT carrying the given claims.
    pub(crate) fn make_token(claims: Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.signature")
    }

    pub(crate) fn live_token() -> String {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        make_token(json!({ "id": "u1", "type": "authRecord", "exp": exp }))
    }

    pub(crate) fn expired_token() -> String {
        let exp = (Utc::now() - Duration::minutes(5)).timestamp();
        make_token(json!({ "id": "u1", "type": "authRecord", "exp": exp }))
    }

    #[test]
    fn test_empty_store_is_invalid() {
        let store = AuthStore::new();
        assert!(!store.is_valid());
        assert_eq!(store.token(), "");
        assert_eq!(store.valid_token(), None);
    }

    #[test]
    fn test_live_token_is_valid() {
        let store = AuthStore::new();
        let token = live_token();
        store.save(token.clone(), None);
        assert!(store.is_valid());
        assert_eq!(store.valid_token(), Some(token));
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let store = AuthStore::new();
        store.save(expired_token(), None);
        assert!(!store.is_valid());
        assert_eq!(store.valid_token(), None);
    }

    #[test]
    fn test_token_without_exp_is_valid() {
        assert!(!is_token_expired(&make_token(json!({ "id": "u1" }))));
    }

    #[test]
    fn test_unset_exp_values_are_valid() {
        assert!(!is_token_expired(&make_token(json!({ "id": "u1", "exp": 0 }))));
        assert!(!is_token_expired(&make_token(json!({ "id": "u1", "exp": null }))));
        assert!(!is_token_expired(&make_token(json!({ "id": "u1", "exp": false }))));
        assert!(!is_token_expired(&make_token(json!({ "id": "u1", "exp": "" }))));
        assert!(is_token_expired(&make_token(json!({ "id": "u1", "exp": 1 }))));
    }

    #[test]
    fn test_malformed_tokens_are_expired() {
        assert!(is_token_expired("not-a-jwt"));
        assert!(is_token_expired("a.!!!.c"));
        assert!(is_token_expired(&make_token(json!({}))));
        assert!(is_token_expired(&make_token(json!(["list"]))));
        assert!(is_token_expired(&make_token(json!({ "exp": "soon" }))));
    }

    #[test]
    fn test_clear_drops_session() {
        let store = AuthStore::new();
        store.save(live_token(), None);
        store.clear();
        assert!(!store.is_valid());
        assert!(store.record().is_none());
    }

    #[test]
    fn test_record_keeps_custom_fields() {
        let record: AuthRecord = serde_json::from_value(json!({
            "id": "u1",
            "collectionId": "_pb_users_auth_",
            "collectionName": "users",
            "username": "alice",
            "email": "alice@example.com",
            "verified": true,
            "avatar": "a.png"
        }))
        .unwrap();
        assert_eq!(record.username.as_deref(), Some("alice"));
        assert_eq!(record.collection_name, "users");
        assert_eq!(record.extra.get("avatar"), Some(&json!("a.png")));
    }
}
