//! Environment-sourced Graph settings and the load-once cell that owns them.
//!
//! [`Settings`] is an immutable snapshot of the five `GRAPH_*` variables. Values are trimmed and
//! blank values count as unset. A snapshot is only valid when it carries a delegated token or a
//! complete client-credential triple (tenant, client id, client secret).
//!
//! [`SettingsCell`] replaces a process-global cache: the orchestrator owns one cell, the first
//! successful load is memoized for the cell's lifetime, and failed loads are retried on the next
//! call.

// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Environment variable carrying the Entra tenant identifier.
pub const TENANT_ID_VAR: &str = "GRAPH_TENANT_ID";
/// Environment variable carrying the app registration client identifier.
pub const CLIENT_ID_VAR: &str = "GRAPH_CLIENT_ID";
/// Environment variable carrying the app registration client secret.
pub const CLIENT_SECRET_VAR: &str = "GRAPH_CLIENT_SECRET";
/// Environment variable carrying the mailbox used when a request names no sender.
pub const DEFAULT_SENDER_VAR: &str = "GRAPH_DEFAULT_SENDER";
/// Environment variable carrying a delegated user access token.
pub const DELEGATED_TOKEN_VAR: &str = "GRAPH_USER_ACCESS_TOKEN";

type SettingsLoader = Box<dyn Fn() -> Result<Settings, ConfigError> + Send + Sync>;

/// Immutable Microsoft Graph configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settings {
	/// Entra tenant identifier used for the client-credential exchange.
	pub tenant_id: Option<String>,
	/// App registration client identifier.
	pub client_id: Option<String>,
	/// App registration client secret.
	pub client_secret: Option<Secret>,
	/// Mailbox used when a request does not override the sender.
	pub default_sender: Option<String>,
	/// Delegated user token that bypasses the client-credential exchange.
	pub delegated_token: Option<Secret>,
}
impl Settings {
	/// Returns a builder that applies the same trimming rules as [`Settings::from_env`].
	pub fn builder() -> SettingsBuilder {
		SettingsBuilder::default()
	}

	/// Loads settings from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads settings through an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut builder = Self::builder();

		if let Some(value) = lookup(TENANT_ID_VAR) {
			builder = builder.tenant_id(value);
		}
		if let Some(value) = lookup(CLIENT_ID_VAR) {
			builder = builder.client_id(value);
		}
		if let Some(value) = lookup(CLIENT_SECRET_VAR) {
			builder = builder.client_secret(value);
		}
		if let Some(value) = lookup(DEFAULT_SENDER_VAR) {
			builder = builder.default_sender(value);
		}
		if let Some(value) = lookup(DELEGATED_TOKEN_VAR) {
			builder = builder.delegated_token(value);
		}

		builder.build()
	}

	/// Returns `true` when all three client-credential values are present.
	pub fn has_client_credentials(&self) -> bool {
		self.missing_client_credentials().is_empty()
	}

	/// Names the unset client-credential variables, in declaration order.
	pub fn missing_client_credentials(&self) -> Vec<&'static str> {
		[
			(TENANT_ID_VAR, self.tenant_id.is_some()),
			(CLIENT_ID_VAR, self.client_id.is_some()),
			(CLIENT_SECRET_VAR, self.client_secret.is_some()),
		]
		.into_iter()
		.filter_map(|(name, present)| (!present).then_some(name))
		.collect()
	}
}

/// Builder for [`Settings`].
#[derive(Clone, Debug, Default)]
pub struct SettingsBuilder(Settings);
impl SettingsBuilder {
	/// Sets the tenant identifier.
	pub fn tenant_id(mut self, value: impl AsRef<str>) -> Self {
		self.0.tenant_id = non_blank(value);

		self
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, value: impl AsRef<str>) -> Self {
		self.0.client_id = non_blank(value);

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, value: impl AsRef<str>) -> Self {
		self.0.client_secret = non_blank(value).map(Secret::new);

		self
	}

	/// Sets the default sender mailbox.
	pub fn default_sender(mut self, value: impl AsRef<str>) -> Self {
		self.0.default_sender = non_blank(value);

		self
	}

	/// Sets the delegated user token.
	pub fn delegated_token(mut self, value: impl AsRef<str>) -> Self {
		self.0.delegated_token = non_blank(value).map(Secret::new);

		self
	}

	/// Validates the credential invariant and returns the settings.
	pub fn build(self) -> Result<Settings, ConfigError> {
		let settings = self.0;
		let names = settings.missing_client_credentials();

		if !names.is_empty() && settings.delegated_token.is_none() {
			return Err(ConfigError::MissingVariables { names });
		}

		Ok(settings)
	}
}

/// Load-once holder for [`Settings`].
pub struct SettingsCell {
	loader: SettingsLoader,
	slot: RwLock<Option<Arc<Settings>>>,
}
impl SettingsCell {
	/// Creates a cell that lazily loads from the process environment.
	pub fn from_env() -> Self {
		Self::with_loader(Settings::from_env)
	}

	/// Creates a cell that lazily runs `loader` until it succeeds once.
	pub fn with_loader<F>(loader: F) -> Self
	where
		F: 'static + Send + Sync + Fn() -> Result<Settings, ConfigError>,
	{
		Self { loader: Box::new(loader), slot: RwLock::new(None) }
	}

	/// Creates a cell around settings that were already loaded.
	pub fn ready(settings: Settings) -> Self {
		let settings = Arc::new(settings);
		let cached = settings.clone();

		Self {
			loader: Box::new(move || Ok(Settings::clone(&cached))),
			slot: RwLock::new(Some(settings)),
		}
	}

	/// Returns the memoized settings, loading them on first use.
	///
	/// Concurrent first calls may each run the loader; the first value stored wins and every
	/// caller receives it.
	pub fn get(&self) -> Result<Arc<Settings>, ConfigError> {
		if let Some(settings) = self.slot.read().as_ref() {
			return Ok(settings.clone());
		}

		let loaded = Arc::new((self.loader)()?);
		let mut slot = self.slot.write();

		Ok(slot.get_or_insert(loaded).clone())
	}

	/// Returns `true` once a load has succeeded.
	pub fn is_loaded(&self) -> bool {
		self.slot.read().is_some()
	}
}
impl Debug for SettingsCell {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SettingsCell").field("loaded", &self.is_loaded()).finish()
	}
}

fn non_blank(value: impl AsRef<str>) -> Option<String> {
	let trimmed = value.as_ref().trim();

	(!trimmed.is_empty()).then(|| trimmed.to_owned())
}
