//! Bearer token resolution with delegated passthrough and cached client-credential exchanges.
//!
//! A [`TokenManager`] picks its path once, at construction:
//!
//! - with a delegated token, [`TokenManager::token`] returns it verbatim and never touches the
//!   network;
//! - otherwise it runs the `client_credentials` grant against the tenant's token endpoint and
//!   reuses the result until `now + skew_buffer` reaches the token's expiry.
//!
//! The cache check, exchange, and store run under one async mutex, so concurrent callers that
//! miss the cache share a single exchange instead of stampeding the identity provider.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, Secret},
	endpoint::GraphEndpoints,
	error::AuthError,
	http::{GraphHttpClient, ResponseSnapshot},
	obs::{self, OpKind, OpOutcome},
};

/// Refresh margin applied before a cached token's expiry.
pub const DEFAULT_SKEW_BUFFER: Duration = Duration::seconds(60);
/// Timeout applied to token endpoint requests.
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::seconds(15);

/// Access token obtained from an exchange, with its absolute expiry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedToken {
	/// Bearer token value.
	pub token: Secret,
	/// Instant the identity provider stops honoring the token.
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Returns `true` while `now + skew` is still strictly before the expiry.
	pub fn is_fresh_at(&self, now: OffsetDateTime, skew: Duration) -> bool {
		now.checked_add(skew).is_some_and(|horizon| horizon < self.expires_at)
	}
}

#[derive(Clone)]
enum TokenSource {
	Delegated(Secret),
	ClientCredentials { tenant_id: String, client_id: String, client_secret: Secret },
	Incomplete { missing: Vec<&'static str> },
}

/// Resolves bearer tokens for Graph calls.
pub struct TokenManager {
	source: TokenSource,
	http_client: GraphHttpClient,
	endpoints: GraphEndpoints,
	skew_buffer: Duration,
	timeout: Duration,
	cache: AsyncMutex<Option<CachedToken>>,
}
impl TokenManager {
	/// Builds a manager for `credentials`.
	///
	/// Incomplete client credentials are accepted here and reported by the first
	/// [`TokenManager::token`] call.
	pub fn new(
		credentials: Credentials,
		endpoints: GraphEndpoints,
		http_client: GraphHttpClient,
	) -> Self {
		let source = match credentials {
			Credentials { delegated_token: Some(token), .. } => TokenSource::Delegated(token),
			Credentials {
				tenant_id: Some(tenant_id),
				client_id: Some(client_id),
				client_secret: Some(client_secret),
				delegated_token: None,
			} => TokenSource::ClientCredentials { tenant_id, client_id, client_secret },
			incomplete => TokenSource::Incomplete { missing: incomplete.missing_client_fields() },
		};

		Self {
			source,
			http_client,
			endpoints,
			skew_buffer: DEFAULT_SKEW_BUFFER,
			timeout: DEFAULT_EXCHANGE_TIMEOUT,
			cache: AsyncMutex::new(None),
		}
	}

	/// Overrides the refresh margin (defaults to 60 seconds); negative values clamp to zero.
	pub fn with_skew_buffer(mut self, skew: Duration) -> Self {
		self.skew_buffer = if skew.is_negative() { Duration::ZERO } else { skew };

		self
	}

	/// Overrides the token endpoint timeout (defaults to 15 seconds).
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Returns `true` when this manager passes a delegated token through.
	pub fn is_delegated(&self) -> bool {
		matches!(self.source, TokenSource::Delegated(_))
	}

	/// Returns a bearer token valid at the current instant.
	pub async fn token(&self) -> Result<Secret, AuthError> {
		self.token_at(OffsetDateTime::now_utc()).await
	}

	/// Returns a bearer token valid at `now`, exchanging credentials when the cache is empty or
	/// within the skew buffer of expiry.
	pub async fn token_at(&self, now: OffsetDateTime) -> Result<Secret, AuthError> {
		obs::observe(OpKind::Token, "token", self.resolve(now)).await
	}

	/// Returns the cached token, if any, without validating its freshness.
	pub async fn cached(&self) -> Option<CachedToken> {
		self.cache.lock().await.clone()
	}

	/// Drops the cached token so the next call exchanges again.
	pub async fn invalidate(&self) {
		self.cache.lock().await.take();
	}

	async fn resolve(&self, now: OffsetDateTime) -> Result<(Secret, OpOutcome), AuthError> {
		let (tenant_id, client_id, client_secret) = match &self.source {
			TokenSource::Delegated(token) => {
				obs::event!(debug, "Using delegated Microsoft Graph token.");

				return Ok((token.clone(), OpOutcome::Skipped));
			},
			TokenSource::Incomplete { missing } =>
				return Err(AuthError::MissingCredentials { missing: missing.clone() }),
			TokenSource::ClientCredentials { tenant_id, client_id, client_secret } =>
				(tenant_id, client_id, client_secret),
		};
		let mut cache = self.cache.lock().await;

		if let Some(cached) = cache.as_ref().filter(|cached| cached.is_fresh_at(now, self.skew_buffer))
		{
			obs::event!(debug, "Reusing cached Microsoft Graph token.");

			return Ok((cached.token.clone(), OpOutcome::Skipped));
		}

		let fetched = self.exchange(tenant_id, client_id, client_secret, now).await?;
		let token = fetched.token.clone();

		obs::event!(
			info,
			expires_at = %fetched.expires_at,
			"Fetched new Microsoft Graph access token."
		);

		*cache = Some(fetched);

		Ok((token, OpOutcome::Success))
	}

	async fn exchange(
		&self,
		tenant_id: &str,
		client_id: &str,
		client_secret: &Secret,
		now: OffsetDateTime,
	) -> Result<CachedToken, AuthError> {
		let url = self.endpoints.token_url(tenant_id)?;
		let form = [
			("client_id", client_id),
			("client_secret", client_secret.expose()),
			("grant_type", "client_credentials"),
			("scope", self.endpoints.scope.as_str()),
		];
		let response = self
			.http_client
			.post(url)
			.form(&form)
			.timeout(self.timeout.unsigned_abs())
			.send()
			.await
			.map_err(|e| {
				obs::event!(error, error = %e, "Error contacting token endpoint.");

				AuthError::transport(e)
			})?;
		let snapshot = ResponseSnapshot::read(response).await.map_err(AuthError::transport)?;

		if !snapshot.status.is_success() {
			obs::event!(
				error,
				status = snapshot.status.as_u16(),
				body = %snapshot.body,
				"Token endpoint rejected the exchange."
			);

			return Err(AuthError::Rejected { status: snapshot.status.as_u16(), body: snapshot.body });
		}

		parse_token_response(&snapshot.body, now)
	}
}
impl Debug for TokenManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let source = match &self.source {
			TokenSource::Delegated(_) => "delegated",
			TokenSource::ClientCredentials { .. } => "client_credentials",
			TokenSource::Incomplete { .. } => "incomplete",
		};

		f.debug_struct("TokenManager")
			.field("source", &source)
			.field("endpoints", &self.endpoints)
			.field("skew_buffer", &self.skew_buffer)
			.field("timeout", &self.timeout)
			.finish()
	}
}

#[derive(Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	expires_in: Option<ExpiresIn>,
}

// Entra endpoints have emitted `expires_in` as an integer, a float, and a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
	Seconds(i64),
	Fractional(f64),
	Text(String),
}
impl ExpiresIn {
	fn seconds(&self) -> Option<i64> {
		match self {
			Self::Seconds(secs) => Some(*secs),
			Self::Fractional(secs) => whole_seconds(*secs),
			Self::Text(raw) => {
				let raw = raw.trim();

				raw.parse::<i64>().ok().or_else(|| raw.parse::<f64>().ok().and_then(whole_seconds))
			},
		}
	}
}

fn whole_seconds(secs: f64) -> Option<i64> {
	let secs = secs.trunc();

	(secs.is_finite() && secs >= i64::MIN as f64 && secs <= i64::MAX as f64).then_some(secs as i64)
}

fn parse_token_response(body: &str, now: OffsetDateTime) -> Result<CachedToken, AuthError> {
	let de = &mut serde_json::Deserializer::from_str(body);
	let response: TokenResponse = serde_path_to_error::deserialize(de)
		.map_err(|source| AuthError::MalformedResponse { source })?;
	let token = response
		.access_token
		.filter(|token| !token.is_empty())
		.ok_or(AuthError::InvalidResponse { reason: "is missing access_token" })?;
	let expires_in = response
		.expires_in
		.ok_or(AuthError::InvalidResponse { reason: "is missing expires_in" })?
		.seconds()
		.filter(|secs| *secs > 0)
		.ok_or(AuthError::InvalidResponse { reason: "has a non-positive or unparseable expires_in" })?;
	let expires_at = now
		.checked_add(Duration::seconds(expires_in))
		.ok_or(AuthError::InvalidResponse { reason: "has an out-of-range expires_in" })?;

	Ok(CachedToken { token: Secret::new(token), expires_at })
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	const NOW: OffsetDateTime = datetime!(2025-11-10 12:00 UTC);

	fn http_client() -> GraphHttpClient {
		GraphHttpClient::new().expect("HTTP client should build.")
	}

	#[test]
	fn freshness_honors_skew_buffer() {
		let cached = CachedToken { token: Secret::new("t"), expires_at: NOW + Duration::hours(1) };

		assert!(cached.is_fresh_at(NOW, DEFAULT_SKEW_BUFFER));
		assert!(cached.is_fresh_at(NOW + Duration::seconds(3539), DEFAULT_SKEW_BUFFER));
		assert!(!cached.is_fresh_at(NOW + Duration::seconds(3540), DEFAULT_SKEW_BUFFER));
		assert!(cached.is_fresh_at(NOW + Duration::seconds(3599), Duration::ZERO));
		assert!(!cached.is_fresh_at(NOW + Duration::hours(1), Duration::ZERO));
	}

	#[test]
	fn token_response_accepts_numeric_and_string_lifetimes() {
		let numeric = parse_token_response("{\"access_token\":\"T\",\"expires_in\":3600}", NOW)
			.expect("Numeric expires_in should parse.");
		let text = parse_token_response(
			"{\"token_type\":\"Bearer\",\"access_token\":\"T\",\"expires_in\":\"3599\"}",
			NOW,
		)
		.expect("String expires_in should parse.");

		assert_eq!(numeric.token.expose(), "T");
		assert_eq!(numeric.expires_at, NOW + Duration::seconds(3600));
		assert_eq!(text.expires_at, NOW + Duration::seconds(3599));

		let fractional =
			parse_token_response("{\"access_token\":\"T\",\"expires_in\":3599.0}", NOW)
				.expect("Float expires_in should parse.");
		let truncated =
			parse_token_response("{\"access_token\":\"T\",\"expires_in\":\"1799.9\"}", NOW)
				.expect("Fractional string expires_in should parse.");

		assert_eq!(fractional.expires_at, NOW + Duration::seconds(3599));
		assert_eq!(truncated.expires_at, NOW + Duration::seconds(1799));
	}

	#[test]
	fn token_response_requires_token_and_lifetime() {
		let cases = [
			("{\"expires_in\":3600}", "is missing access_token"),
			("{\"access_token\":\"\",\"expires_in\":3600}", "is missing access_token"),
			("{\"access_token\":\"T\"}", "is missing expires_in"),
			("{\"access_token\":\"T\",\"expires_in\":0}", "has a non-positive or unparseable expires_in"),
			("{\"access_token\":\"T\",\"expires_in\":\"soon\"}", "has a non-positive or unparseable expires_in"),
		];

		for (body, expected) in cases {
			let err = parse_token_response(body, NOW).expect_err("Incomplete response should fail.");

			assert!(
				matches!(err, AuthError::InvalidResponse { reason } if reason == expected),
				"Unexpected error for {body}: {err:?}."
			);
		}
	}

	#[test]
	fn token_response_rejects_non_json() {
		let err = parse_token_response("<html>oops</html>", NOW).expect_err("HTML should fail.");

		assert!(matches!(err, AuthError::MalformedResponse { .. }));
	}

	#[tokio::test]
	async fn incomplete_credentials_fail_on_first_use() {
		let manager = TokenManager::new(
			Credentials { tenant_id: Some("t".into()), ..Default::default() },
			GraphEndpoints::default(),
			http_client(),
		);
		let err = manager.token().await.expect_err("Incomplete credentials should fail lazily.");

		assert!(matches!(
			err,
			AuthError::MissingCredentials { ref missing } if missing == &["client_id", "client_secret"]
		));
	}

	#[tokio::test]
	async fn delegated_token_takes_priority_over_client_credentials() {
		let mut credentials = Credentials::client("t", "c", "s");

		credentials.delegated_token = Some(Secret::new("delegated"));

		let manager =
			TokenManager::new(credentials, GraphEndpoints::default(), http_client());

		assert!(manager.is_delegated());
		assert_eq!(manager.token().await.expect("Delegated token should resolve.").expose(), "delegated");
		assert!(manager.cached().await.is_none());
	}

	#[test]
	fn negative_skew_clamps_to_zero() {
		let manager = TokenManager::new(
			Credentials::delegated("d"),
			GraphEndpoints::default(),
			http_client(),
		)
		.with_skew_buffer(Duration::seconds(-5));

		assert_eq!(manager.skew_buffer, Duration::ZERO);
	}
}
