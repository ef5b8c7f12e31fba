//! Send mail through Microsoft Graph from a tool-invocation server: validated requests,
//! cached client-credential tokens, and a small error taxonomy the host can map onto its
//! protocol.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod mail;
pub mod obs;
pub mod send;
pub mod tool;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::Secret,
		config::{Settings, SettingsCell},
		endpoint::GraphEndpoints,
		http::GraphHttpClient,
		send::{Mailer, MailerOptions},
	};

	/// Builds endpoints that route both the identity provider and Graph to `base`, typically the
	/// URL of an `httpmock` server.
	pub fn test_endpoints(base: &str) -> GraphEndpoints {
		let base = base.trim_end_matches('/');

		GraphEndpoints::default()
			.with_authority(format!("{base}/"))
			.with_graph(format!("{base}/v1.0/"))
	}

	/// Builds the redirect-free client used in production.
	pub fn test_http_client() -> GraphHttpClient {
		GraphHttpClient::new().expect("Test HTTP client should build.")
	}

	/// Builds a [`Mailer`] whose settings are already loaded and whose endpoints point at `base`.
	pub fn build_test_mailer(base: &str, settings: Settings) -> Mailer {
		Mailer::with_http_client(
			SettingsCell::ready(settings),
			test_endpoints(base),
			test_http_client(),
			MailerOptions::default(),
		)
	}

	/// Settings carrying only client credentials.
	pub fn client_credential_settings() -> Settings {
		Settings {
			tenant_id: Some("tenant-test".into()),
			client_id: Some("client-test".into()),
			client_secret: Some(Secret::new("secret-test")),
			..Default::default()
		}
	}

	/// Settings carrying only a delegated token.
	pub fn delegated_settings(token: &str) -> Settings {
		Settings { delegated_token: Some(Secret::new(token)), ..Default::default() }
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashSet},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, StatusCode};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {httpmock as _, temp_env as _};
