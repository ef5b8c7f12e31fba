//! Shared reqwest transport for the token exchange and the mail-send call.

// std
use std::ops::Deref;
// crates.io
use reqwest::{Response, redirect::Policy};
// self
use crate::{_prelude::*, error::ConfigError};

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Neither the token endpoint nor `sendMail` should be followed through redirects, since a
/// redirect would replay credentials against another host. [`GraphHttpClient::new`] disables
/// them; callers supplying their own client through [`GraphHttpClient::with_client`] should do
/// the same.
#[derive(Clone, Debug)]
pub struct GraphHttpClient(pub ReqwestClient);
impl GraphHttpClient {
	/// Builds a client with redirects disabled.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
impl AsRef<ReqwestClient> for GraphHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for GraphHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Status and body of a response, read eagerly so error paths can quote them.
#[derive(Clone, Debug)]
pub(crate) struct ResponseSnapshot {
	pub status: StatusCode,
	pub body: String,
}
impl ResponseSnapshot {
	/// Drains `response`, failing only when the body stream breaks.
	pub(crate) async fn read(response: Response) -> Result<Self, ReqwestError> {
		let status = response.status();
		let body = response.text().await?;

		Ok(Self { status, body })
	}
}
