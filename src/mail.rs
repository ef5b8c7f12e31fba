//! Send-mail request model: lenient drafts, validated requests, and the Graph wire payload.
//!
//! Inputs arrive as a [`SendMailDraft`], which accepts the loose shapes callers send (a single
//! address instead of a list, `null` for an empty list, mixed casing in the body type).
//! [`SendMailDraft::validate`] turns a draft into a [`SendMailRequest`] or a [`ValidationError`]
//! listing every violation it found. Requests render to the exact `sendMail` JSON body through
//! [`SendMailRequest::to_wire_payload`].

pub mod attachment;
pub mod body;
pub mod recipient;
pub mod request;
pub mod validation;
pub mod wire;

pub use attachment::*;
pub use body::*;
pub use recipient::*;
pub use request::*;
pub use validation::*;

// self
use crate::_prelude::*;

/// Parses and normalizes a raw JSON request.
///
/// Shape errors the draft cannot represent (a number where a list belongs, for instance) are
/// reported as a single violation naming the offending JSON path.
pub fn parse(raw: Value) -> Result<SendMailRequest, ValidationError> {
	SendMailDraft::from_value(raw)?.validate()
}
