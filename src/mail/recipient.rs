//! Recipient addresses, the loose list shapes callers send, and case-insensitive dedup.

// crates.io
use validator::ValidateEmail;
// self
use crate::{_prelude::*, mail::validation::Violations};

/// Address that failed email syntax validation.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("`{0}` is not a valid email address")]
pub struct AddressError(pub String);

/// A syntactically valid mailbox address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Recipient {
	address: String,
}
impl Recipient {
	/// Validates `address` after trimming surrounding whitespace.
	///
	/// Local parts are limited to the ASCII atom characters of RFC 5322; internationalized local
	/// parts such as `straße@example.com` are rejected. Domains may be internationalized.
	pub fn parse(address: impl AsRef<str>) -> Result<Self, AddressError> {
		let address = address.as_ref().trim().to_owned();

		if address.validate_email() { Ok(Self { address }) } else { Err(AddressError(address)) }
	}

	/// Returns the address exactly as supplied (after trimming).
	pub fn address(&self) -> &str {
		&self.address
	}

	/// Key used for case-insensitive equality.
	///
	/// Unicode lowercasing; with ASCII-only local parts it only differs from full case folding
	/// inside internationalized domains.
	pub fn folded(&self) -> String {
		self.address.to_lowercase()
	}

	/// Renders the Graph `recipient` shape: `{"emailAddress": {"address": ...}}`.
	pub fn to_wire(&self) -> Value {
		address_object(&self.address)
	}
}
impl Display for Recipient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.address)
	}
}
impl FromStr for Recipient {
	type Err = AddressError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

/// One entry of a recipient list: a bare address or an `{"address": ...}` object.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecipientEntry {
	/// Bare address string.
	Address(String),
	/// Object carrying the address.
	Object {
		/// Mailbox address.
		address: String,
	},
}
impl RecipientEntry {
	/// Returns the raw, unvalidated address.
	pub fn as_str(&self) -> &str {
		match self {
			Self::Address(address) | Self::Object { address } => address,
		}
	}
}
impl From<&str> for RecipientEntry {
	fn from(value: &str) -> Self {
		Self::Address(value.to_owned())
	}
}
impl From<String> for RecipientEntry {
	fn from(value: String) -> Self {
		Self::Address(value)
	}
}

/// Any recipient-list shape accepted on input; `null` and absent both mean empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecipientInput {
	/// No recipients.
	#[default]
	Empty,
	/// An ordered list.
	Many(Vec<RecipientEntry>),
	/// A single address or object, coerced to a one-element list.
	One(RecipientEntry),
}
impl RecipientInput {
	/// Flattens the input into an ordered list of entries.
	pub fn into_entries(self) -> Vec<RecipientEntry> {
		match self {
			Self::Empty => Vec::new(),
			Self::One(entry) => vec![entry],
			Self::Many(entries) => entries,
		}
	}
}
impl<T> From<Vec<T>> for RecipientInput
where
	T: Into<RecipientEntry>,
{
	fn from(values: Vec<T>) -> Self {
		Self::Many(values.into_iter().map(Into::into).collect())
	}
}
impl From<Option<Vec<String>>> for RecipientInput {
	fn from(values: Option<Vec<String>>) -> Self {
		values.map(Self::from).unwrap_or_default()
	}
}

/// Keeps the first occurrence of each case-insensitively equal address, preserving order.
pub fn dedupe(recipients: Vec<Recipient>) -> Vec<Recipient> {
	let mut seen = HashSet::new();

	recipients.into_iter().filter(|recipient| seen.insert(recipient.folded())).collect()
}

/// Validates every entry of `input`, recording failures under `field[idx]`, then dedupes.
pub(crate) fn collect(
	field: &str,
	input: RecipientInput,
	violations: &mut Violations,
) -> Vec<Recipient> {
	let mut recipients = Vec::new();

	for (idx, entry) in input.into_entries().into_iter().enumerate() {
		match Recipient::parse(entry.as_str()) {
			Ok(recipient) => recipients.push(recipient),
			Err(e) => violations.push(format!("{field}[{idx}]"), e),
		}
	}

	dedupe(recipients)
}

pub(crate) fn address_object(address: &str) -> Value {
	serde_json::json!({ "emailAddress": { "address": address } })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn recipients(addresses: &[&str]) -> Vec<Recipient> {
		addresses
			.iter()
			.map(|address| Recipient::parse(address).expect("Fixture address should be valid."))
			.collect()
	}

	#[test]
	fn dedupe_keeps_first_casing_and_order() {
		let deduped = dedupe(recipients(&["A@x.com", "a@x.com", "b@x.com", "B@X.COM", "c@x.com"]));
		let addresses = deduped.iter().map(Recipient::address).collect::<Vec<_>>();

		assert_eq!(addresses, ["A@x.com", "b@x.com", "c@x.com"]);
	}

	#[test]
	fn non_ascii_local_part_is_rejected() {
		assert_eq!(
			Recipient::parse("straße@example.com"),
			Err(AddressError("straße@example.com".into()))
		);

		let folded = recipients(&["Ops@Example.COM", "ops@example.com"])
			.iter()
			.map(Recipient::folded)
			.collect::<HashSet<_>>();

		assert_eq!(folded.len(), 1);
	}

	#[test]
	fn parse_trims_and_rejects_invalid_syntax() {
		assert_eq!(
			Recipient::parse("  user@example.com ").expect("Padded address should parse.").address(),
			"user@example.com"
		);
		assert_eq!(
			Recipient::parse("not-an-email"),
			Err(AddressError("not-an-email".into()))
		);
		assert!(Recipient::parse("").is_err());
		assert!(Recipient::parse("two@@example.com").is_err());
	}

	#[test]
	fn input_shapes_coerce_to_lists() {
		let one: RecipientInput =
			serde_json::from_str("\"solo@example.com\"").expect("String input should deserialize.");
		let object: RecipientInput = serde_json::from_str("{\"address\":\"obj@example.com\"}")
			.expect("Object input should deserialize.");
		let many: RecipientInput = serde_json::from_str("[\"a@example.com\",{\"address\":\"b@example.com\"}]")
			.expect("List input should deserialize.");
		let null: RecipientInput = serde_json::from_str("null").expect("Null input should deserialize.");

		assert_eq!(one.into_entries(), vec![RecipientEntry::from("solo@example.com")]);
		assert_eq!(
			object.into_entries(),
			vec![RecipientEntry::Object { address: "obj@example.com".into() }]
		);
		assert_eq!(
			many.into_entries().iter().map(RecipientEntry::as_str).collect::<Vec<_>>(),
			["a@example.com", "b@example.com"]
		);
		assert!(null.into_entries().is_empty());
	}

	#[test]
	fn collect_reports_indexed_paths() {
		let mut violations = Violations::default();
		let collected = collect(
			"cc",
			RecipientInput::from(vec!["ok@example.com", "broken", "OK@example.com"]),
			&mut violations,
		);

		assert_eq!(collected.len(), 1);

		let err = violations.finish(()).expect_err("Broken address should be recorded.");

		assert!(err.has_field("cc[1]"));
	}

	#[test]
	fn wire_shape_nests_email_address() {
		let recipient = Recipient::parse("user@example.com").expect("Fixture should parse.");

		assert_eq!(
			recipient.to_wire(),
			serde_json::json!({ "emailAddress": { "address": "user@example.com" } })
		);
	}
}
