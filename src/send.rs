//! Send orchestration: validate, load settings, resolve a token, and call `sendMail`.
//!
//! [`Mailer::send`] runs the steps in order and stops at the first failure:
//!
//! 1. validate the draft ([`Error::InvalidRequest`], no I/O);
//! 2. load settings through the cell ([`Error::Config`]);
//! 3. build the wire payload and resolve the sender;
//! 4. for dry runs, return a preview without resolving a token;
//! 5. resolve a bearer token ([`Error::Auth`]);
//! 6. POST to the per-user or `/me` endpoint ([`Error::Provider`] or [`Error::Network`]).
//!
//! Calls without credential overrides share one process-wide [`TokenManager`] so cached
//! client-credential tokens are reused across invocations. Calls with overrides get a fresh
//! manager whose credentials are layered over the environment.

// crates.io
use reqwest::Response;
// self
use crate::{
	_prelude::*,
	auth::{
		CredentialOverrides, Credentials, DEFAULT_EXCHANGE_TIMEOUT, DEFAULT_SKEW_BUFFER,
		TokenManager,
	},
	config::{Settings, SettingsCell},
	endpoint::GraphEndpoints,
	error::TransportError,
	http::{GraphHttpClient, ResponseSnapshot},
	mail::{SendMailDraft, SendMailRequest, wire},
	obs::{self, OpKind, OpOutcome},
};

/// Timeout applied to `sendMail` requests.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::seconds(20);

/// Tunables applied to every call a [`Mailer`] makes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MailerOptions {
	/// Timeout for the `sendMail` request.
	pub send_timeout: Duration,
	/// Timeout for token endpoint requests.
	pub token_timeout: Duration,
	/// Refresh margin before cached token expiry.
	pub skew_buffer: Duration,
}
impl MailerOptions {
	/// Overrides the `sendMail` timeout.
	pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
		self.send_timeout = timeout;

		self
	}

	/// Overrides the token endpoint timeout.
	pub fn with_token_timeout(mut self, timeout: Duration) -> Self {
		self.token_timeout = timeout;

		self
	}

	/// Overrides the token refresh margin.
	pub fn with_skew_buffer(mut self, skew: Duration) -> Self {
		self.skew_buffer = skew;

		self
	}
}
impl Default for MailerOptions {
	fn default() -> Self {
		Self {
			send_timeout: DEFAULT_SEND_TIMEOUT,
			token_timeout: DEFAULT_EXCHANGE_TIMEOUT,
			skew_buffer: DEFAULT_SKEW_BUFFER,
		}
	}
}

/// Sends mail through Microsoft Graph.
///
/// A `Mailer` is `Send + Sync`; hosts typically build one at startup and share it behind an
/// [`Arc`].
pub struct Mailer {
	settings: SettingsCell,
	endpoints: GraphEndpoints,
	http_client: GraphHttpClient,
	options: MailerOptions,
	shared_tokens: RwLock<Option<Arc<TokenManager>>>,
}
impl Mailer {
	/// Creates a mailer that loads settings from the environment on first use and talks to the
	/// public-cloud endpoints.
	pub fn from_env() -> Result<Self> {
		Self::new(SettingsCell::from_env(), GraphEndpoints::default())
	}

	/// Creates a mailer with its own redirect-free HTTP client and default options.
	pub fn new(settings: SettingsCell, endpoints: GraphEndpoints) -> Result<Self> {
		let http_client = GraphHttpClient::new()?;

		Ok(Self::with_http_client(settings, endpoints, http_client, MailerOptions::default()))
	}

	/// Creates a mailer that reuses the caller-provided transport.
	pub fn with_http_client(
		settings: SettingsCell,
		endpoints: GraphEndpoints,
		http_client: GraphHttpClient,
		options: MailerOptions,
	) -> Self {
		Self { settings, endpoints, http_client, options, shared_tokens: RwLock::new(None) }
	}

	/// Returns the endpoints this mailer targets.
	pub fn endpoints(&self) -> &GraphEndpoints {
		&self.endpoints
	}

	/// Parses `raw` as a [`SendMailDraft`] and sends it.
	pub async fn send_json(&self, raw: Value, overrides: &CredentialOverrides) -> Result<String> {
		let draft = SendMailDraft::from_value(raw)?;

		self.send(draft, overrides).await
	}

	/// Validates `draft` and sends it, returning a confirmation or a dry-run preview.
	pub async fn send(&self, draft: SendMailDraft, overrides: &CredentialOverrides) -> Result<String> {
		obs::observe(OpKind::SendMail, "send", self.dispatch(draft, overrides)).await
	}

	async fn dispatch(
		&self,
		draft: SendMailDraft,
		overrides: &CredentialOverrides,
	) -> Result<(String, OpOutcome)> {
		let request = draft.validate().inspect_err(|e| {
			obs::event!(error, error = %e, "Invalid email payload.");
		})?;

		obs::event!(
			info,
			subject = %request.subject,
			to_count = request.to.len(),
			dry_run = request.dry_run,
			"Preparing sendMail request."
		);

		let settings = self.settings.get().inspect_err(|e| {
			obs::event!(error, error = %e, "Configuration error.");
		})?;
		let default_sender = settings.default_sender.as_deref();
		let payload = request.to_wire_payload(default_sender);
		let sender = request.resolve_sender(default_sender);

		if request.dry_run {
			obs::event!(
				info,
				subject = %request.subject,
				to_count = request.to.len(),
				"Dry run prepared."
			);

			return Ok((wire::render_preview(sender, payload), OpOutcome::Skipped));
		}

		let tokens = self.token_manager(&settings, overrides);
		let token = tokens.token().await.inspect_err(|e| {
			obs::event!(error, error = %e, "Failed to acquire access token.");
		})?;
		let url = self.endpoints.send_mail_url(sender)?;
		let response = self
			.http_client
			.post(url)
			.bearer_auth(token.expose())
			.json(&payload)
			.timeout(self.options.send_timeout.unsigned_abs())
			.send()
			.await
			.map_err(|e| {
				obs::event!(error, error = %e, "Network error calling Microsoft Graph.");

				TransportError::from(e)
			})?;

		if !response.status().is_success() {
			if response.status() == StatusCode::UNAUTHORIZED {
				tokens.invalidate().await;
			}

			return Err(provider_error(response).await);
		}

		obs::event!(
			info,
			subject = %request.subject,
			to_count = request.to.len(),
			"Microsoft Graph accepted message."
		);

		Ok((accepted_message(&request), OpOutcome::Success))
	}

	fn token_manager(&self, settings: &Settings, overrides: &CredentialOverrides) -> Arc<TokenManager> {
		if overrides.is_empty() {
			return self.shared_token_manager(settings);
		}

		Arc::new(self.build_token_manager(Credentials::from_settings(settings).overlay(overrides)))
	}

	fn shared_token_manager(&self, settings: &Settings) -> Arc<TokenManager> {
		if let Some(manager) = self.shared_tokens.read().as_ref() {
			return manager.clone();
		}

		self.shared_tokens
			.write()
			.get_or_insert_with(|| {
				Arc::new(self.build_token_manager(Credentials::from_settings(settings)))
			})
			.clone()
	}

	fn build_token_manager(&self, credentials: Credentials) -> TokenManager {
		TokenManager::new(credentials, self.endpoints.clone(), self.http_client.clone())
			.with_skew_buffer(self.options.skew_buffer)
			.with_timeout(self.options.token_timeout)
	}
}
impl Debug for Mailer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Mailer")
			.field("settings", &self.settings)
			.field("endpoints", &self.endpoints)
			.field("options", &self.options)
			.finish()
	}
}

/// Success message returned after Graph accepts a message.
pub fn accepted_message(request: &SendMailRequest) -> String {
	format!("Microsoft Graph accepted the message for {} recipient(s).", request.to.len())
}

#[derive(Deserialize)]
struct GraphErrorBody {
	#[serde(default)]
	error: Option<GraphErrorDetail>,
	#[serde(default)]
	message: Option<String>,
}

#[derive(Deserialize)]
struct GraphErrorDetail {
	#[serde(default)]
	message: Option<String>,
}

/// Extracts the human-readable message from a Graph error body: `error.message`, then a
/// top-level `message`, then the raw body, then the status reason for empty bodies.
pub fn provider_message(status: StatusCode, body: &str) -> String {
	serde_json::from_str::<GraphErrorBody>(body)
		.ok()
		.and_then(|parsed| parsed.error.and_then(|detail| detail.message).or(parsed.message))
		.filter(|message| !message.trim().is_empty())
		.unwrap_or_else(|| {
			if body.trim().is_empty() {
				status.canonical_reason().unwrap_or("empty response body").to_owned()
			} else {
				body.to_owned()
			}
		})
}

async fn provider_error(response: Response) -> Error {
	let status = response.status();
	let body = ResponseSnapshot::read(response).await.map(|snapshot| snapshot.body).unwrap_or_default();
	let message = provider_message(status, &body);

	obs::event!(
		warn,
		status = status.as_u16(),
		detail = %body,
		"Graph sendMail HTTP error."
	);

	Error::Provider { status: status.as_u16(), message }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn provider_message_prefers_nested_error() {
		let body = "{\"error\":{\"code\":\"ErrorInvalidRecipients\",\"message\":\"Recipient rejected.\"}}";

		assert_eq!(provider_message(StatusCode::BAD_REQUEST, body), "Recipient rejected.");
	}

	#[test]
	fn provider_message_falls_back_to_top_level_then_raw_body() {
		assert_eq!(
			provider_message(StatusCode::FORBIDDEN, "{\"message\":\"Access denied.\"}"),
			"Access denied."
		);
		assert_eq!(
			provider_message(StatusCode::BAD_GATEWAY, "upstream timed out"),
			"upstream timed out"
		);
		assert_eq!(
			provider_message(StatusCode::BAD_REQUEST, "{\"error\":\"invalid_request\"}"),
			"{\"error\":\"invalid_request\"}"
		);
	}

	#[test]
	fn provider_message_uses_status_reason_for_empty_bodies() {
		assert_eq!(provider_message(StatusCode::SERVICE_UNAVAILABLE, ""), "Service Unavailable");
	}

	#[test]
	fn default_options_match_documented_timeouts() {
		let options = MailerOptions::default();

		assert_eq!(options.send_timeout, Duration::seconds(20));
		assert_eq!(options.token_timeout, Duration::seconds(15));
		assert_eq!(options.skew_buffer, Duration::seconds(60));
	}
}
