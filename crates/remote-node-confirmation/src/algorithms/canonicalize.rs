//! # Response Canonicalization
//!
//! Strips the fields that legitimately differ between honest nodes and
//! serializes the rest with sorted keys, so that two responses are
//! equivalent iff their canonical strings are equal.
//!
//! The input is never mutated; all stripping happens on a private copy.

use serde_json::{Map, Value};

use crate::domain::{AttachmentKind, ConfirmationError, GET_BLOCK_REQUEST};

/// Top-level fields that vary per node or per request.
pub const VOLATILE_FIELDS: [&str; 2] = ["requestProcessingTime", "confirmations"];

/// Forward link of a block; only known once a successor exists.
pub const NEXT_BLOCK_FIELD: &str = "nextBlock";

/// Transaction list field.
pub const TRANSACTIONS_FIELD: &str = "transactions";

/// Per-transaction confirmation count.
pub const TX_CONFIRMATIONS_FIELD: &str = "confirmations";

/// Per-transaction attachment object.
pub const ATTACHMENT_FIELD: &str = "attachment";

/// Produce the comparable form of `response` for `request_type`.
///
/// # Errors
/// - `MalformedResponse` if the response is not a JSON object or carries a
///   `transactions` field that is not a list
pub fn canonicalize(response: &Value, request_type: &str) -> Result<String, ConfirmationError> {
    let mut copy = response.clone();
    let object = copy.as_object_mut().ok_or_else(|| {
        ConfirmationError::MalformedResponse(format!(
            "{} response is not a JSON object",
            request_type
        ))
    })?;

    for field in VOLATILE_FIELDS {
        object.remove(field);
    }
    if request_type == GET_BLOCK_REQUEST {
        object.remove(NEXT_BLOCK_FIELD);
    }
    if let Some(transactions) = object.get_mut(TRANSACTIONS_FIELD) {
        let transactions = transactions.as_array_mut().ok_or_else(|| {
            ConfirmationError::MalformedResponse(format!(
                "{} response has a non-list transactions field",
                request_type
            ))
        })?;
        // Entries may also be bare transaction ids; those are compared as-is.
        for transaction in transactions.iter_mut().filter_map(Value::as_object_mut) {
            transaction.remove(TX_CONFIRMATIONS_FIELD);
            if let Some(Value::Object(attachment)) = transaction.get_mut(ATTACHMENT_FIELD) {
                normalize_prunable_attachment(attachment);
            }
        }
    }

    let mut out = String::new();
    write_canonical(&copy, &mut out);
    Ok(out)
}

/// Kinds announced by the attachment's `version.<Kind>` keys.
pub fn attachment_kinds(attachment: &Map<String, Value>) -> Vec<AttachmentKind> {
    attachment
        .keys()
        .filter_map(|key| AttachmentKind::from_version_key(key))
        .collect()
}

/// Keep only `*hash` fields of a prunable attachment. Other attachments
/// are left untouched.
fn normalize_prunable_attachment(attachment: &mut Map<String, Value>) {
    let prunable = attachment_kinds(attachment)
        .into_iter()
        .any(AttachmentKind::is_prunable);
    if !prunable {
        return;
    }
    attachment.retain(|key, _| is_hash_field(key));
}

fn is_hash_field(key: &str) -> bool {
    key.len() >= 4
        && key
            .get(key.len() - 4..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case("hash"))
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::from(key.as_str()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
