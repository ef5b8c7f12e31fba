//! Field-level violations collected while validating a draft.

// self
use crate::_prelude::*;

/// One invalid field, addressed by a dotted/indexed path such as `to[1]` or `body.content`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
	/// Path of the offending field.
	pub field: String,
	/// Human-readable description of the problem.
	pub message: String,
}
impl Display for FieldViolation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}: {}", self.field, self.message)
	}
}

/// Every violation found in a request; never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
	violations: Vec<FieldViolation>,
}
impl ValidationError {
	/// Wraps a single violation.
	pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self { violations: vec![FieldViolation { field: field.into(), message: message.into() }] }
	}

	/// Returns the collected violations in discovery order.
	pub fn violations(&self) -> &[FieldViolation] {
		&self.violations
	}

	/// Returns `true` when some violation targets `field`.
	pub fn has_field(&self, field: &str) -> bool {
		self.violations.iter().any(|violation| violation.field == field)
	}
}
impl Display for ValidationError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let count = self.violations.len();

		write!(f, "{count} validation error{} for send-mail request", if count == 1 { "" } else { "s" })?;

		for (idx, violation) in self.violations.iter().enumerate() {
			f.write_str(if idx == 0 { ": " } else { "; " })?;

			Display::fmt(violation, f)?;
		}

		Ok(())
	}
}
impl StdError for ValidationError {}

/// Accumulates violations while a draft is walked.
#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<FieldViolation>);
impl Violations {
	pub(crate) fn push(&mut self, field: impl Into<String>, message: impl Display) {
		self.0.push(FieldViolation { field: field.into(), message: message.to_string() });
	}

	pub(crate) fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `value` when nothing was recorded.
	pub(crate) fn finish<T>(self, value: T) -> Result<T, ValidationError> {
		if self.0.is_empty() { Ok(value) } else { Err(ValidationError { violations: self.0 }) }
	}
}
