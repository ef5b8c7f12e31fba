//! The `send_outlook_mail` tool: flat argument shape, schema, and invocation entry point.

// self
use crate::{
	_prelude::*,
	auth::CredentialOverrides,
	mail::{AttachmentDraft, BodyDraft, RecipientInput, SendMailDraft, ValidationError},
	send::Mailer,
};

/// Name the tool is registered under.
pub const TOOL_NAME: &str = "send_outlook_mail";

const TOOL_DESCRIPTION: &str = "Send email via Microsoft Graph. Authenticate with a delegated \
	access_token or with tenant_id, client_id and client_secret; server-side environment \
	variables fill in whatever the call omits. Set dry_run to preview the payload without sending.";

/// Flat arguments accepted by the tool.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMailArgs {
	/// Subject line.
	#[serde(default)]
	pub subject: Option<String>,
	/// Body content.
	#[serde(default)]
	pub body: Option<String>,
	/// Primary recipients.
	#[serde(default)]
	pub to: RecipientInput,
	/// Carbon-copy recipients.
	#[serde(default)]
	pub cc: RecipientInput,
	/// Blind carbon-copy recipients.
	#[serde(default)]
	pub bcc: RecipientInput,
	/// `Text` or `HTML`, case-insensitive.
	#[serde(default = "default_body_type")]
	pub body_type: String,
	/// Inline file attachments.
	#[serde(default)]
	pub attachments: Option<Vec<AttachmentDraft>>,
	/// Whether Graph keeps a copy in Sent Items.
	#[serde(default = "default_save_to_sent_items")]
	pub save_to_sent_items: bool,
	/// Mailbox to send from instead of the configured default.
	#[serde(default)]
	pub sender: Option<String>,
	/// Build and return the payload without sending.
	#[serde(default)]
	pub dry_run: bool,
	/// Tenant override.
	#[serde(default)]
	pub tenant_id: Option<String>,
	/// Client id override.
	#[serde(default)]
	pub client_id: Option<String>,
	/// Client secret override.
	#[serde(default)]
	pub client_secret: Option<String>,
	/// Delegated token override.
	#[serde(default)]
	pub access_token: Option<String>,
}
impl SendMailArgs {
	/// Deserializes tool arguments, reporting shape mismatches with their JSON path.
	pub fn from_value(raw: Value) -> Result<Self, ValidationError> {
		serde_path_to_error::deserialize(raw).map_err(|e| {
			let path = e.path().to_string();

			ValidationError::single(path, e.into_inner().to_string())
		})
	}

	/// Splits the flat arguments into a request draft and the per-call credential overrides.
	pub fn into_parts(self) -> (SendMailDraft, CredentialOverrides) {
		let draft = SendMailDraft {
			subject: self.subject,
			body: self.body.map(|content| BodyDraft {
				content: Some(content),
				content_type: Some(self.body_type),
			}),
			to: self.to,
			cc: self.cc,
			bcc: self.bcc,
			attachments: self.attachments,
			save_to_sent_items: Some(self.save_to_sent_items),
			sender_override: self.sender,
			dry_run: Some(self.dry_run),
		};
		let overrides = CredentialOverrides {
			tenant_id: self.tenant_id,
			client_id: self.client_id,
			client_secret: self.client_secret,
			access_token: self.access_token,
		};

		(draft, overrides)
	}
}

fn default_body_type() -> String {
	"Text".into()
}

fn default_save_to_sent_items() -> bool {
	true
}

/// Registration record for hosting frameworks.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolDefinition {
	/// Tool name.
	pub name: &'static str,
	/// Human-readable summary shown to callers.
	pub description: &'static str,
	/// JSON Schema of the accepted arguments.
	pub input_schema: Value,
}

/// Describes the tool and its argument schema.
pub fn definition() -> ToolDefinition {
	let address_list = serde_json::json!({
		"type": "array",
		"items": { "type": "string", "format": "email" },
	});

	ToolDefinition {
		name: TOOL_NAME,
		description: TOOL_DESCRIPTION,
		input_schema: serde_json::json!({
			"type": "object",
			"additionalProperties": false,
			"required": ["subject", "body", "to"],
			"properties": {
				"subject": { "type": "string", "description": "Email subject line." },
				"body": { "type": "string", "description": "Email body content." },
				"to": address_list,
				"cc": address_list,
				"bcc": address_list,
				"body_type": {
					"type": "string",
					"enum": ["Text", "HTML"],
					"default": "Text",
				},
				"attachments": {
					"type": "array",
					"items": {
						"type": "object",
						"required": ["name", "content_bytes"],
						"properties": {
							"name": { "type": "string" },
							"content_bytes": { "type": "string", "contentEncoding": "base64" },
							"content_type": { "type": "string" },
						},
					},
				},
				"save_to_sent_items": { "type": "boolean", "default": true },
				"sender": {
					"type": "string",
					"format": "email",
					"description": "Mailbox to send from; defaults to the configured sender.",
				},
				"dry_run": {
					"type": "boolean",
					"default": false,
					"description": "Return the payload instead of sending it.",
				},
				"tenant_id": { "type": "string" },
				"client_id": { "type": "string" },
				"client_secret": { "type": "string" },
				"access_token": {
					"type": "string",
					"description": "Delegated Graph token; takes priority over client credentials.",
				},
			},
		}),
	}
}

/// Runs one tool call against `mailer`.
pub async fn invoke(mailer: &Mailer, raw: Value) -> Result<String> {
	let (draft, overrides) = SendMailArgs::from_value(raw)?.into_parts();

	mailer.send(draft, &overrides).await
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn args_apply_defaults_and_split_overrides() {
		let args = SendMailArgs::from_value(serde_json::json!({
			"subject": "Status",
			"body": "<p>Green</p>",
			"to": ["ops@example.com"],
			"access_token": "delegated",
		}))
		.expect("Minimal arguments should deserialize.");

		assert_eq!(args.body_type, "Text");
		assert!(args.save_to_sent_items);
		assert!(!args.dry_run);

		let (draft, overrides) = args.into_parts();
		let request = draft.validate().expect("Draft should validate.");

		assert_eq!(request.body.content, "<p>Green</p>");
		assert_eq!(overrides.access_token(), Some("delegated"));
		assert!(overrides.tenant_id().is_none());
	}

	#[test]
	fn unknown_arguments_are_rejected() {
		let err = SendMailArgs::from_value(serde_json::json!({
			"subject": "Status",
			"body": "Hi",
			"to": ["ops@example.com"],
			"priority": "high",
		}))
		.expect_err("Unknown field should fail.");

		assert!(err.to_string().contains("priority"), "{err}");
	}

	#[test]
	fn missing_body_surfaces_as_validation_violation() {
		let (draft, _) = SendMailArgs::from_value(serde_json::json!({
			"subject": "Status",
			"to": ["ops@example.com"],
		}))
		.expect("Missing body should deserialize.")
		.into_parts();
		let err = draft.validate().expect_err("Missing body should fail validation.");

		assert!(err.has_field("body"), "{err}");
	}

	#[test]
	fn definition_lists_required_arguments() {
		let definition = definition();

		assert_eq!(definition.name, "send_outlook_mail");
		assert_eq!(definition.input_schema["required"], serde_json::json!(["subject", "body", "to"]));
		assert_eq!(definition.input_schema["properties"]["body_type"]["default"], "Text");
	}
}
