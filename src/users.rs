//! Sign-up and log-in against the identity provider's REST API.
//!
//! The provider owns credentials and issues the id token; this module only
//! turns its responses into a [`Session`] and its error codes into
//! [`AuthError`]. The session is passed explicitly to whatever needs the
//! signed-in user instead of living in shared state.

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use log::{debug, warn};
use thiserror::Error;

pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
	#[error("No account found with this email.")]
	UserNotFound,

	#[error("Invalid credentials provided.")]
	InvalidCredential,

	#[error("Invalid email address.")]
	InvalidEmail,

	#[error("Password should be at least 6 characters.")]
	WeakPassword,

	#[error("This email is already in use.")]
	EmailInUse,

	#[error("Session has expired, please log in again.")]
	SessionExpired,

	#[error("{0}")]
	Unknown(String),
}

impl AuthError {
	/// Maps a provider error code. Accepts both the REST form (`EMAIL_NOT_FOUND`,
	/// optionally followed by ` : detail`) and the SDK form (`auth/user-not-found`).
	pub fn from_code(message: &str) -> Self {
		let code = message.split(" : ").next().unwrap_or(message).trim();
		match code {
			"EMAIL_NOT_FOUND" | "auth/user-not-found" => AuthError::UserNotFound,
			"INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "auth/invalid-credential" | "auth/wrong-password" => {
				AuthError::InvalidCredential
			}
			"INVALID_EMAIL" | "auth/invalid-email" => AuthError::InvalidEmail,
			"WEAK_PASSWORD" | "auth/weak-password" => AuthError::WeakPassword,
			"EMAIL_EXISTS" | "auth/email-already-in-use" => AuthError::EmailInUse,
			_ => AuthError::Unknown(message.to_owned()),
		}
	}
}

/// A signed-in user.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
	pub user_id: String,
	pub email: String,
	pub id_token: String,
	pub refresh_token: Option<String>,
}

#[derive(serde::Deserialize, Debug)]
struct Claims {
	sub: String,
	#[serde(default)]
	user_id: Option<String>,
	#[serde(default)]
	email: Option<String>,
}

impl Session {
	/// Rebuilds a session from a stored id token. The signature is not checked
	/// here, the API server is the party that would verify it; only expiry is enforced.
	pub fn from_id_token(id_token: &str) -> Result<Self, AuthError> {
		let mut validation = Validation::new(Algorithm::RS256);
		validation.insecure_disable_signature_validation();

		let claims = decode::<Claims>(id_token, &DecodingKey::from_secret(&[]), &validation)
			.map_err(|e| match e.kind() {
				ErrorKind::ExpiredSignature => AuthError::SessionExpired,
				_ => AuthError::InvalidCredential,
			})?
			.claims;

		Ok(Session {
			user_id: claims.user_id.unwrap_or(claims.sub),
			email: claims.email.unwrap_or_default(),
			id_token: id_token.to_owned(),
			refresh_token: None,
		})
	}
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Credentials<'a> {
	email: &'a str,
	password: &'a str,
	return_secure_token: bool,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
	local_id: String,
	email: String,
	id_token: String,
	refresh_token: String,
}

#[derive(serde::Deserialize)]
struct ProviderError {
	error: ProviderErrorDetail,
}

#[derive(serde::Deserialize)]
struct ProviderErrorDetail {
	message: String,
}

#[derive(Clone)]
pub struct IdentityClient {
	http: reqwest::Client,
	base_url: String,
	api_key: String,
}

impl IdentityClient {
	pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
		Self {
			http: reqwest::Client::new(),
			base_url: base_url.into(),
			api_key: api_key.into(),
		}
	}

	/// Client for the hosted provider at [`DEFAULT_IDENTITY_URL`].
	pub fn google(api_key: impl Into<String>) -> Self {
		Self::new(DEFAULT_IDENTITY_URL, api_key)
	}

	pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
		self.accounts("signUp", email, password).await
	}

	pub async fn log_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
		self.accounts("signInWithPassword", email, password).await
	}

	async fn accounts(&self, action: &str, email: &str, password: &str) -> Result<Session, AuthError> {
		let url = format!("{}/v1/accounts:{}", self.base_url.trim_end_matches('/'), action);
		let credentials = Credentials {
			email,
			password,
			return_secure_token: true,
		};

		let response = self
			.http
			.post(url)
			.query(&[("key", self.api_key.as_str())])
			.json(&credentials)
			.send()
			.await
			.map_err(|e| AuthError::Unknown(e.to_string()))?;

		if response.status().is_success() {
			let body: SignInResponse = response.json().await.map_err(|e| AuthError::Unknown(e.to_string()))?;
			debug!("{} succeeded for {}", action, body.email);
			return Ok(Session {
				user_id: body.local_id,
				email: body.email,
				id_token: body.id_token,
				refresh_token: Some(body.refresh_token),
			});
		}

		let status = response.status();
		let err = match response.json::<ProviderError>().await {
			Ok(body) => AuthError::from_code(&body.error.message),
			Err(_) => AuthError::Unknown(format!("identity provider returned {}", status)),
		};
		warn!("{} failed for {}: {}", action, email, err);
		Err(err)
	}
}

#[cfg(test)]
mod tests {
	use axum::{http::Uri, Json, Router};
	use chrono::Utc;
	use hyper::StatusCode;
	use jsonwebtoken::{encode, EncodingKey, Header};
	use serde_json::{json, Value};
	use tokio::net::TcpListener;

	use super::*;

	async fn provider_stub(uri: Uri, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
		let email = body["email"].as_str().unwrap_or_default().to_owned();
		let password = body["password"].as_str().unwrap_or_default();
		let error = |message: &str| (StatusCode::BAD_REQUEST, Json(json!({"error": {"code": 400, "message": message}})));

		if uri.query() != Some("key=test-key") {
			return error("API key not valid. Please pass a valid API key.");
		}
		if uri.path().ends_with(":signUp") {
			if password.len() < 6 {
				return error("WEAK_PASSWORD : Password should be at least 6 characters");
			}
			if email == "taken@example.com" {
				return error("EMAIL_EXISTS");
			}
		} else {
			if email == "nobody@example.com" {
				return error("EMAIL_NOT_FOUND");
			}
			if password != "hunter22" {
				return error("INVALID_LOGIN_CREDENTIALS");
			}
		}

		(
			StatusCode::OK,
			Json(json!({
				"localId": "uid-1",
				"email": email,
				"idToken": "id-token",
				"refreshToken": "refresh-token",
				"expiresIn": "3600"
			})),
		)
	}

	async fn spawn_provider() -> String {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let address = listener.local_addr().unwrap();
		tokio::spawn(async move {
			axum::serve(listener, Router::new().fallback(provider_stub)).await.unwrap();
		});
		format!("http://{}", address)
	}

	#[test]
	fn test_error_codes_map_to_kinds() {
		assert_eq!(AuthError::from_code("EMAIL_NOT_FOUND"), AuthError::UserNotFound);
		assert_eq!(AuthError::from_code("INVALID_LOGIN_CREDENTIALS"), AuthError::InvalidCredential);
		assert_eq!(AuthError::from_code("auth/invalid-credential"), AuthError::InvalidCredential);
		assert_eq!(AuthError::from_code("INVALID_EMAIL"), AuthError::InvalidEmail);
		assert_eq!(
			AuthError::from_code("WEAK_PASSWORD : Password should be at least 6 characters"),
			AuthError::WeakPassword
		);
		assert_eq!(AuthError::from_code("auth/email-already-in-use"), AuthError::EmailInUse);
		assert_eq!(
			AuthError::from_code("TOO_MANY_ATTEMPTS_TRY_LATER"),
			AuthError::Unknown("TOO_MANY_ATTEMPTS_TRY_LATER".to_owned())
		);
	}

	#[tokio::test]
	async fn test_log_in_and_sign_up() {
		let client = IdentityClient::new(spawn_provider().await, "test-key");

		let session = client.log_in("rider@example.com", "hunter22").await.unwrap();
		assert_eq!(session.user_id, "uid-1");
		assert_eq!(session.email, "rider@example.com");
		assert_eq!(session.refresh_token.as_deref(), Some("refresh-token"));

		assert_eq!(client.log_in("nobody@example.com", "hunter22").await, Err(AuthError::UserNotFound));
		assert_eq!(client.log_in("rider@example.com", "wrong").await, Err(AuthError::InvalidCredential));
		assert_eq!(client.sign_up("new@example.com", "123").await, Err(AuthError::WeakPassword));
		assert_eq!(client.sign_up("taken@example.com", "hunter22").await, Err(AuthError::EmailInUse));
		assert!(client.sign_up("new@example.com", "hunter22").await.is_ok());
	}

	#[test]
	fn test_google_client_targets_hosted_provider() {
		let client = IdentityClient::google("prod-key");
		assert_eq!(client.base_url, "https://identitytoolkit.googleapis.com");
		assert_eq!(client.api_key, "prod-key");
	}

	#[tokio::test]
	async fn test_wrong_api_key_is_unknown() {
		let client = IdentityClient::new(spawn_provider().await, "other-key");
		assert!(matches!(client.log_in("rider@example.com", "hunter22").await, Err(AuthError::Unknown(_))));
	}

	#[test]
	fn test_session_from_id_token() {
		let claims = json!({
			"sub": "uid-42",
			"user_id": "uid-42",
			"email": "rider@example.com",
			"exp": Utc::now().timestamp() + 3600,
		});
		let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"unused")).unwrap();

		let session = Session::from_id_token(&token).unwrap();
		assert_eq!(session.user_id, "uid-42");
		assert_eq!(session.email, "rider@example.com");
		assert_eq!(session.id_token, token);
	}

	#[test]
	fn test_expired_token_is_rejected() {
		let claims = json!({ "sub": "uid-42", "exp": Utc::now().timestamp() - 3600 });
		let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"unused")).unwrap();

		assert_eq!(Session::from_id_token(&token), Err(AuthError::SessionExpired));
		assert_eq!(Session::from_id_token("not-a-token"), Err(AuthError::InvalidCredential));
	}
}
