//! Send-mail drafts, validated requests, sender resolution, and the wire payload.

// self
use crate::{
	_prelude::*,
	mail::{
		AttachmentDraft, BodyDraft, BodyType, FileAttachment, MessageBody, Recipient,
		RecipientInput, ValidationError, attachment,
		recipient::{self, address_object},
		validation::Violations,
	},
};

/// Unvalidated request as received from a caller.
///
/// Every field is optional or lenient so [`SendMailDraft::validate`] can report all problems at
/// once instead of stopping at the first shape mismatch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SendMailDraft {
	/// Subject line.
	#[serde(default)]
	pub subject: Option<String>,
	/// Message body.
	#[serde(default)]
	pub body: Option<BodyDraft>,
	/// Primary recipients.
	#[serde(default)]
	pub to: RecipientInput,
	/// Carbon-copy recipients.
	#[serde(default)]
	pub cc: RecipientInput,
	/// Blind carbon-copy recipients.
	#[serde(default)]
	pub bcc: RecipientInput,
	/// Inline file attachments.
	#[serde(default)]
	pub attachments: Option<Vec<AttachmentDraft>>,
	/// Whether Graph keeps a copy in Sent Items; defaults to `true`.
	#[serde(default)]
	pub save_to_sent_items: Option<bool>,
	/// Mailbox to send from instead of the configured default.
	#[serde(default)]
	pub sender_override: Option<String>,
	/// Build and return the payload without sending; defaults to `false`.
	#[serde(default)]
	pub dry_run: Option<bool>,
}
impl SendMailDraft {
	/// Deserializes a draft, reporting shape mismatches with their JSON path.
	pub fn from_value(raw: Value) -> Result<Self, ValidationError> {
		serde_path_to_error::deserialize(raw).map_err(|e| {
			let path = e.path().to_string();

			ValidationError::single(path, e.into_inner().to_string())
		})
	}

	/// Validates and normalizes the draft, collecting every violation.
	pub fn validate(self) -> Result<SendMailRequest, ValidationError> {
		let mut violations = Violations::default();
		let subject = self.subject.unwrap_or_default();

		if subject.is_empty() {
			violations.push("subject", "must not be empty");
		}

		let body = match self.body {
			Some(draft) => validate_body(draft, &mut violations),
			None => {
				violations.push("body", "field required");

				MessageBody { content: String::new(), content_type: BodyType::default() }
			},
		};
		let to_is_empty = matches!(&self.to, RecipientInput::Empty)
			|| matches!(&self.to, RecipientInput::Many(entries) if entries.is_empty());

		if to_is_empty {
			violations.push("to", "must contain at least one recipient");
		}

		let to = recipient::collect("to", self.to, &mut violations);
		let cc = recipient::collect("cc", self.cc, &mut violations);
		let bcc = recipient::collect("bcc", self.bcc, &mut violations);
		let attachments = attachment::collect(self.attachments.unwrap_or_default(), &mut violations);
		let sender_override = match self.sender_override.as_deref().map(str::trim) {
			None | Some("") => None,
			Some(sender) => match Recipient::parse(sender) {
				Ok(sender) => Some(sender),
				Err(e) => {
					violations.push("sender_override", e);

					None
				},
			},
		};

		violations.finish(SendMailRequest {
			subject,
			body,
			to,
			cc,
			bcc,
			attachments,
			save_to_sent_items: self.save_to_sent_items.unwrap_or(true),
			sender_override,
			dry_run: self.dry_run.unwrap_or(false),
		})
	}
}

/// Validated, normalized send-mail request.
///
/// `to` is never empty and `to`/`cc`/`bcc` each hold case-insensitively unique addresses in
/// first-seen order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendMailRequest {
	/// Subject line.
	pub subject: String,
	/// Message body.
	pub body: MessageBody,
	/// Primary recipients.
	pub to: Vec<Recipient>,
	/// Carbon-copy recipients.
	pub cc: Vec<Recipient>,
	/// Blind carbon-copy recipients.
	pub bcc: Vec<Recipient>,
	/// Inline file attachments.
	pub attachments: Vec<FileAttachment>,
	/// Whether Graph keeps a copy in Sent Items.
	pub save_to_sent_items: bool,
	/// Mailbox to send from instead of the configured default.
	pub sender_override: Option<Recipient>,
	/// Build and return the payload without sending.
	pub dry_run: bool,
}
impl SendMailRequest {
	/// Sender precedence: explicit override, then `default_sender`, then none (the
	/// authenticated identity's own mailbox).
	pub fn resolve_sender<'a>(&'a self, default_sender: Option<&'a str>) -> Option<&'a str> {
		self.sender_override.as_ref().map(Recipient::address).or(default_sender)
	}

	/// Renders the `sendMail` request body.
	///
	/// `ccRecipients`, `bccRecipients`, and `attachments` are omitted when empty; `from` is only
	/// present when a sender resolves.
	pub fn to_wire_payload(&self, default_sender: Option<&str>) -> Value {
		let mut message = serde_json::Map::new();

		message.insert("subject".into(), Value::String(self.subject.clone()));
		message.insert("body".into(), self.body.to_wire());
		message.insert("toRecipients".into(), wire_list(&self.to, Recipient::to_wire));

		if !self.cc.is_empty() {
			message.insert("ccRecipients".into(), wire_list(&self.cc, Recipient::to_wire));
		}
		if !self.bcc.is_empty() {
			message.insert("bccRecipients".into(), wire_list(&self.bcc, Recipient::to_wire));
		}
		if !self.attachments.is_empty() {
			message.insert("attachments".into(), wire_list(&self.attachments, FileAttachment::to_wire));
		}
		if let Some(sender) = self.resolve_sender(default_sender) {
			message.insert("from".into(), address_object(sender));
		}

		serde_json::json!({
			"message": Value::Object(message),
			"saveToSentItems": self.save_to_sent_items,
		})
	}
}

fn validate_body(draft: BodyDraft, violations: &mut Violations) -> MessageBody {
	let content = draft.content.unwrap_or_else(|| {
		violations.push("body.content", "field required");

		String::new()
	});
	let content_type = match draft.content_type.as_deref().map(str::parse::<BodyType>) {
		None => BodyType::default(),
		Some(Ok(content_type)) => content_type,
		Some(Err(e)) => {
			violations.push("body.content_type", e);

			BodyType::default()
		},
	};

	MessageBody { content, content_type }
}

fn wire_list<T>(items: &[T], render: fn(&T) -> Value) -> Value {
	Value::Array(items.iter().map(render).collect())
}
