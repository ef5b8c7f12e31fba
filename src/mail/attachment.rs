//! File attachments carried inline as base64.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, mail::validation::Violations};

/// Content type applied when an attachment names none.
pub const DEFAULT_ATTACHMENT_CONTENT_TYPE: &str = "application/octet-stream";
/// Graph type discriminator for inline file attachments.
pub const FILE_ATTACHMENT_ODATA_TYPE: &str = "#microsoft.graph.fileAttachment";

/// Unvalidated attachment as received.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDraft {
	/// File name shown to recipients.
	#[serde(default)]
	pub name: Option<String>,
	/// Base64-encoded file content.
	#[serde(default)]
	pub content_bytes: Option<String>,
	/// MIME type.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content_type: Option<String>,
}

/// Validated inline attachment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileAttachment {
	/// File name shown to recipients.
	pub name: String,
	/// Base64-encoded file content, passed through untouched.
	pub content_bytes: String,
	/// MIME type.
	pub content_type: String,
}
impl FileAttachment {
	/// Renders the Graph `fileAttachment` shape.
	pub fn to_wire(&self) -> Value {
		serde_json::json!({
			"@odata.type": FILE_ATTACHMENT_ODATA_TYPE,
			"name": self.name,
			"contentType": self.content_type,
			"contentBytes": self.content_bytes,
		})
	}
}

/// Validates `drafts`, recording failures under `attachments[idx].<field>`.
pub(crate) fn collect(drafts: Vec<AttachmentDraft>, violations: &mut Violations) -> Vec<FileAttachment> {
	let mut attachments = Vec::with_capacity(drafts.len());

	for (idx, draft) in drafts.into_iter().enumerate() {
		let before = violations.len();
		let name = draft.name.unwrap_or_default();

		if name.trim().is_empty() {
			violations.push(format!("attachments[{idx}].name"), "must not be empty");
		}

		let content_bytes = match draft.content_bytes {
			Some(content) if STANDARD.decode(content.as_bytes()).is_ok() => content,
			Some(_) => {
				violations.push(format!("attachments[{idx}].content_bytes"), "must be base64 encoded");

				String::new()
			},
			None => {
				violations.push(format!("attachments[{idx}].content_bytes"), "field required");

				String::new()
			},
		};

		if violations.len() == before {
			let content_type = draft
				.content_type
				.map(|value| value.trim().to_owned())
				.filter(|value| !value.is_empty())
				.unwrap_or_else(|| DEFAULT_ATTACHMENT_CONTENT_TYPE.into());

			attachments.push(FileAttachment { name, content_bytes, content_type });
		}
	}

	attachments
}
