// crates.io
use httpmock::prelude::*;
use time::macros::datetime;
// self
use graph_mailer::{
	_preludet::*,
	auth::{Credentials, Secret, TokenManager},
	error::AuthError,
};

const TOKEN_PATH: &str = "/tenant-test/oauth2/v2.0/token";
const NOW: OffsetDateTime = datetime!(2025-11-10 12:00 UTC);

fn build_manager(server: &MockServer) -> TokenManager {
	TokenManager::new(
		Credentials::client("tenant-test", "client-test", "secret-test"),
		test_endpoints(&server.base_url()),
		test_http_client(),
	)
}

#[tokio::test]
async fn delegated_token_never_contacts_identity_provider() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).body("{\"access_token\":\"unused\",\"expires_in\":3600}");
		})
		.await;
	let manager = TokenManager::new(
		Credentials::delegated("delegated-token"),
		test_endpoints(&server.base_url()),
		test_http_client(),
	);
	let token = manager.token().await.expect("Delegated token should resolve.");

	assert_eq!(token.expose(), "delegated-token");

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn client_credentials_reuse_cached_token_until_skew_window() {
	let server = MockServer::start_async().await;
	let manager = build_manager(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"T\",\"expires_in\":3600}");
		})
		.await;
	let first = manager.token_at(NOW).await.expect("Initial exchange should succeed.");
	let second = manager.token_at(NOW).await.expect("Cached token should be reused.");

	assert_eq!(first.expose(), "T");
	assert_eq!(second.expose(), "T");

	mock.assert_calls_async(1).await;

	let cached = manager.cached().await.expect("Exchanged token should be cached.");

	assert_eq!(cached.expires_at, NOW + Duration::seconds(3600));

	manager
		.token_at(NOW + Duration::seconds(3539))
		.await
		.expect("Token just outside the skew window should be reused.");

	mock.assert_calls_async(1).await;

	manager
		.token_at(NOW + Duration::seconds(3540))
		.await
		.expect("Token inside the skew window should be refreshed.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn concurrent_misses_share_one_exchange() {
	let server = MockServer::start_async().await;
	let manager = build_manager(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"guard-token\",\"expires_in\":900}");
		})
		.await;
	let (first, second): (Result<Secret, AuthError>, Result<Secret, AuthError>) =
		tokio::join!(manager.token(), manager.token());

	assert_eq!(first.expect("First concurrent call should succeed.").expose(), "guard-token");
	assert_eq!(second.expect("Second concurrent call should succeed.").expose(), "guard-token");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn rejected_exchange_carries_status_and_body() {
	let server = MockServer::start_async().await;
	let manager = build_manager(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\"}");
		})
		.await;
	let err = manager.token().await.expect_err("Rejected exchange should fail.");

	assert!(
		matches!(
			err,
			AuthError::Rejected { status: 401, ref body } if body == "{\"error\":\"invalid_client\"}"
		),
		"Unexpected error: {err:?}."
	);
	assert!(manager.cached().await.is_none());

	mock.assert_async().await;
}

#[tokio::test]
async fn incomplete_response_is_not_cached() {
	let server = MockServer::start_async().await;
	let manager = build_manager(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body("{\"expires_in\":3600}");
		})
		.await;
	let err = manager.token().await.expect_err("Response without a token should fail.");

	assert!(matches!(err, AuthError::InvalidResponse { reason: "is missing access_token" }));
	assert!(manager.cached().await.is_none());

	manager.token().await.expect_err("Failed exchanges should not be cached.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn invalidate_forces_a_new_exchange() {
	let server = MockServer::start_async().await;
	let manager = build_manager(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"T\",\"expires_in\":\"3600\"}");
		})
		.await;

	manager.token().await.expect("Initial exchange should succeed.");
	manager.invalidate().await;
	manager.token().await.expect("Exchange after invalidation should succeed.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn fractional_lifetime_is_truncated_to_whole_seconds() {
	let server = MockServer::start_async().await;
	let manager = build_manager(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"T\",\"expires_in\":3599.0}");
		})
		.await;
	let token = manager.token_at(NOW).await.expect("Float expires_in should be accepted.");
	let cached = manager.cached().await.expect("Exchanged token should be cached.");

	assert_eq!(token.expose(), "T");
	assert_eq!(cached.expires_at, NOW + Duration::seconds(3599));

	mock.assert_async().await;
}
