//! Credential sets and per-call overrides layered over environment settings.

// self
use crate::{_prelude::*, auth::Secret, config::Settings};

/// Credentials a token manager is built from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
	/// Entra tenant identifier.
	pub tenant_id: Option<String>,
	/// App registration client identifier.
	pub client_id: Option<String>,
	/// App registration client secret.
	pub client_secret: Option<Secret>,
	/// Delegated user token; when present, the client-credential fields are ignored.
	pub delegated_token: Option<Secret>,
}
impl Credentials {
	/// Delegated-token credentials.
	pub fn delegated(token: impl Into<Secret>) -> Self {
		Self { delegated_token: Some(token.into()), ..Default::default() }
	}

	/// Client-credential triple.
	pub fn client(
		tenant_id: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<Secret>,
	) -> Self {
		Self {
			tenant_id: Some(tenant_id.into()),
			client_id: Some(client_id.into()),
			client_secret: Some(client_secret.into()),
			delegated_token: None,
		}
	}

	/// Copies the credential fields out of `settings`.
	pub fn from_settings(settings: &Settings) -> Self {
		Self {
			tenant_id: settings.tenant_id.clone(),
			client_id: settings.client_id.clone(),
			client_secret: settings.client_secret.clone(),
			delegated_token: settings.delegated_token.clone(),
		}
	}

	/// Applies `overrides` field by field; a set override beats the current value.
	pub fn overlay(mut self, overrides: &CredentialOverrides) -> Self {
		if let Some(value) = overrides.tenant_id() {
			self.tenant_id = Some(value.to_owned());
		}
		if let Some(value) = overrides.client_id() {
			self.client_id = Some(value.to_owned());
		}
		if let Some(value) = overrides.client_secret() {
			self.client_secret = Some(Secret::new(value));
		}
		if let Some(value) = overrides.access_token() {
			self.delegated_token = Some(Secret::new(value));
		}

		self
	}

	/// Names the missing client-credential fields, in declaration order.
	pub fn missing_client_fields(&self) -> Vec<&'static str> {
		[
			("tenant_id", self.tenant_id.is_some()),
			("client_id", self.client_id.is_some()),
			("client_secret", self.client_secret.is_some()),
		]
		.into_iter()
		.filter_map(|(name, present)| (!present).then_some(name))
		.collect()
	}
}

/// Credentials supplied with a single call; blank strings count as unset.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CredentialOverrides {
	/// Entra tenant identifier.
	#[serde(default)]
	pub tenant_id: Option<String>,
	/// App registration client identifier.
	#[serde(default)]
	pub client_id: Option<String>,
	/// App registration client secret.
	#[serde(default)]
	pub client_secret: Option<String>,
	/// Delegated user token.
	#[serde(default)]
	pub access_token: Option<String>,
}
impl CredentialOverrides {
	/// Returns the tenant override, if set and non-blank.
	pub fn tenant_id(&self) -> Option<&str> {
		non_blank(&self.tenant_id)
	}

	/// Returns the client id override, if set and non-blank.
	pub fn client_id(&self) -> Option<&str> {
		non_blank(&self.client_id)
	}

	/// Returns the client secret override, if set and non-blank.
	pub fn client_secret(&self) -> Option<&str> {
		non_blank(&self.client_secret)
	}

	/// Returns the delegated token override, if set and non-blank.
	pub fn access_token(&self) -> Option<&str> {
		non_blank(&self.access_token)
	}

	/// Returns `true` when no override is set.
	pub fn is_empty(&self) -> bool {
		self.tenant_id().is_none()
			&& self.client_id().is_none()
			&& self.client_secret().is_none()
			&& self.access_token().is_none()
	}

	/// Returns `true` when the overrides alone can authenticate a call.
	pub fn is_complete(&self) -> bool {
		self.access_token().is_some()
			|| (self.tenant_id().is_some()
				&& self.client_id().is_some()
				&& self.client_secret().is_some())
	}
}
impl Debug for CredentialOverrides {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialOverrides")
			.field("tenant_id", &self.tenant_id())
			.field("client_id", &self.client_id())
			.field("client_secret_set", &self.client_secret().is_some())
			.field("access_token_set", &self.access_token().is_some())
			.finish()
	}
}

fn non_blank(value: &Option<String>) -> Option<&str> {
	value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}
