//! Identity-provider and Graph endpoint bases plus the URL builders derived from them.
//!
//! Bases are kept as strings and parsed on use, so a bad override surfaces as a
//! [`ConfigError`] on the call that needs it instead of at construction.

// self
use crate::{_prelude::*, error::ConfigError};

/// Public-cloud identity platform authority.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/";
/// Public-cloud Graph v1.0 base.
pub const DEFAULT_GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0/";
/// Scope requested by the client-credential exchange.
pub const DEFAULT_GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Endpoint set used by the token manager and the orchestrator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphEndpoints {
	/// Authority base; the tenant token path is appended to it.
	pub authority: String,
	/// Graph API base; mailbox paths are appended to it.
	pub graph: String,
	/// Scope sent with client-credential exchanges.
	pub scope: String,
}
impl GraphEndpoints {
	/// Overrides the authority base (sovereign clouds, mock servers).
	pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
		self.authority = authority.into();

		self
	}

	/// Overrides the Graph API base.
	pub fn with_graph(mut self, graph: impl Into<String>) -> Self {
		self.graph = graph.into();

		self
	}

	/// Overrides the exchange scope.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// `{authority}/{tenant_id}/oauth2/v2.0/token`, with the tenant escaped as one segment.
	pub fn token_url(&self, tenant_id: &str) -> Result<Url, ConfigError> {
		append_segments(&self.authority, &[tenant_id, "oauth2", "v2.0", "token"])
	}

	/// `{graph}/users/{sender}/sendMail` when a sender resolves, else `{graph}/me/sendMail`.
	pub fn send_mail_url(&self, sender: Option<&str>) -> Result<Url, ConfigError> {
		match sender {
			Some(sender) => append_segments(&self.graph, &["users", sender, "sendMail"]),
			None => append_segments(&self.graph, &["me", "sendMail"]),
		}
	}
}
impl Default for GraphEndpoints {
	fn default() -> Self {
		Self {
			authority: DEFAULT_AUTHORITY.into(),
			graph: DEFAULT_GRAPH_BASE.into(),
			scope: DEFAULT_GRAPH_SCOPE.into(),
		}
	}
}

fn append_segments(base: &str, segments: &[&str]) -> Result<Url, ConfigError> {
	let mut url = Url::parse(base).map_err(|source| ConfigError::InvalidEndpoint { source })?;

	url.path_segments_mut()
		.map_err(|_| ConfigError::CannotBeABase { base: base.to_owned() })?
		.pop_if_empty()
		.extend(segments);

	Ok(url)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_urls_match_public_cloud() {
		let endpoints = GraphEndpoints::default();

		assert_eq!(
			endpoints.token_url("contoso").expect("Token URL should build.").as_str(),
			"https://login.microsoftonline.com/contoso/oauth2/v2.0/token"
		);
		assert_eq!(
			endpoints.send_mail_url(None).expect("Self URL should build.").as_str(),
			"https://graph.microsoft.com/v1.0/me/sendMail"
		);
		assert_eq!(
			endpoints
				.send_mail_url(Some("ops@contoso.com"))
				.expect("Per-user URL should build.")
				.as_str(),
			"https://graph.microsoft.com/v1.0/users/ops@contoso.com/sendMail"
		);
	}

	#[test]
	fn sender_is_escaped_as_a_single_segment() {
		let url = GraphEndpoints::default()
			.send_mail_url(Some("ops/team lead@contoso.com"))
			.expect("Escaped URL should build.");

		assert_eq!(url.path(), "/v1.0/users/ops%2Fteam%20lead@contoso.com/sendMail");
	}

	#[test]
	fn bases_without_trailing_slash_are_accepted() {
		let endpoints = GraphEndpoints::default()
			.with_authority("http://127.0.0.1:8080")
			.with_graph("http://127.0.0.1:8080/v1.0");

		assert_eq!(
			endpoints.token_url("t").expect("Token URL should build.").as_str(),
			"http://127.0.0.1:8080/t/oauth2/v2.0/token"
		);
		assert_eq!(
			endpoints.send_mail_url(None).expect("Self URL should build.").as_str(),
			"http://127.0.0.1:8080/v1.0/me/sendMail"
		);
	}

	#[test]
	fn invalid_base_is_a_config_error() {
		let err = GraphEndpoints::default()
			.with_graph("not a url")
			.send_mail_url(None)
			.expect_err("Unparseable base should fail.");

		assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));

		let err = GraphEndpoints::default()
			.with_graph("mailto:ops@contoso.com")
			.send_mail_url(None)
			.expect_err("Opaque base should fail.");

		assert!(matches!(err, ConfigError::CannotBeABase { .. }));
	}
}
