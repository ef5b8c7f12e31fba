//! Message body content and its content type.

// self
use crate::_prelude::*;

/// Body content types Graph accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BodyType {
	/// Plain text.
	#[default]
	Text,
	/// HTML markup.
	Html,
}
impl BodyType {
	/// Returns the value Graph expects in `body.contentType`.
	pub const fn as_str(self) -> &'static str {
		match self {
			BodyType::Text => "Text",
			BodyType::Html => "HTML",
		}
	}
}
impl Display for BodyType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for BodyType {
	type Err = UnknownBodyType;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			value if value.eq_ignore_ascii_case("text") => Ok(Self::Text),
			value if value.eq_ignore_ascii_case("html") => Ok(Self::Html),
			value => Err(UnknownBodyType(value.to_owned())),
		}
	}
}

/// Body type outside the two recognized values.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("must be one of Text, HTML (got `{0}`)")]
pub struct UnknownBodyType(pub String);

/// Unvalidated body as received.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct BodyDraft {
	/// Body text or markup.
	#[serde(default)]
	pub content: Option<String>,
	/// Raw content type; defaults to Text when absent.
	#[serde(default)]
	pub content_type: Option<String>,
}

/// Validated message body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageBody {
	/// Body text or markup.
	pub content: String,
	/// Content type.
	pub content_type: BodyType,
}
impl MessageBody {
	/// Renders the Graph `itemBody` shape.
	pub fn to_wire(&self) -> Value {
		serde_json::json!({ "contentType": self.content_type.as_str(), "content": self.content })
	}
}
