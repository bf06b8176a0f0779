//! Plan assertion layer.
//!
//! Containment checks run against the flattened textual rendering of the
//! plan; structural checks run against the address-indexed representation.
//! Every failure carries the expected literal and a bounded excerpt of the
//! observed content so it stays debuggable from CI logs alone.

use serde_json::Value;
use thiserror::Error;

use crate::result::{excerpt, excerpt_around, PlanResult};
use crate::structured::StructuredPlan;

/// Result type alias for assertions.
pub type AssertResult = Result<(), AssertionError>;

/// An assertion over a plan result that did not hold.
#[derive(Error, Debug)]
pub enum AssertionError {
    #[error("plan output does not contain `{expected}`\n--- observed (excerpt) ---\n{excerpt}")]
    MissingLiteral { expected: String, excerpt: String },

    #[error("plan output contains forbidden `{expected}`\n--- observed (excerpt) ---\n{excerpt}")]
    ForbiddenLiteral { expected: String, excerpt: String },

    #[error("plan does not include resource type `{expected}`\n--- observed (excerpt) ---\n{excerpt}")]
    MissingResource { expected: String, excerpt: String },

    #[error("resource `{address}` not present in structured plan; planned addresses: {known}")]
    UnknownAddress { address: String, known: String },

    #[error("attribute `{path}` on `{address}` is `{observed}`, expected `{expected}`")]
    AttributeMismatch {
        address: String,
        path: String,
        expected: String,
        observed: String,
    },

    #[error("attribute `{path}` on `{address}` should be absent but is `{observed}`")]
    UnexpectedAttribute {
        address: String,
        path: String,
        observed: String,
    },
}

/// Assert the plan text contains a literal.
pub fn assert_contains(result: &PlanResult, literal: &str) -> AssertResult {
    if result.text().contains(literal) {
        Ok(())
    } else {
        Err(AssertionError::MissingLiteral {
            expected: literal.to_string(),
            excerpt: excerpt(result.text()),
        })
    }
}

/// Assert the plan text does not contain a forbidden literal.
pub fn assert_not_contains(result: &PlanResult, literal: &str) -> AssertResult {
    match result.text().find(literal) {
        None => Ok(()),
        Some(position) => Err(AssertionError::ForbiddenLiteral {
            expected: literal.to_string(),
            excerpt: excerpt_around(result.text(), position),
        }),
    }
}

/// Assert a resource type shows up in the plan text.
pub fn assert_resource_present(result: &PlanResult, resource_type: &str) -> AssertResult {
    if result.text().contains(resource_type) {
        Ok(())
    } else {
        Err(AssertionError::MissingResource {
            expected: resource_type.to_string(),
            excerpt: excerpt(result.text()),
        })
    }
}

/// Assert a planned attribute equals an expected value.
///
/// `path` is a JSON pointer into the resource's planned values
/// (e.g. `/settings/0/tier`).
pub fn assert_attribute(
    plan: &StructuredPlan,
    address: &str,
    path: &str,
    expected: &Value,
) -> AssertResult {
    let resource = plan.resource(address).ok_or_else(|| unknown_address(plan, address))?;

    match resource.attribute(path) {
        Some(observed) if observed == expected => Ok(()),
        observed => Err(AssertionError::AttributeMismatch {
            address: address.to_string(),
            path: path.to_string(),
            expected: expected.to_string(),
            observed: observed.map_or_else(|| "<absent>".to_string(), Value::to_string),
        }),
    }
}

/// Assert a planned attribute is absent. A missing pointer, a null, and an
/// empty list all count as absent, matching how the tool renders omitted
/// blocks.
pub fn assert_attribute_absent(plan: &StructuredPlan, address: &str, path: &str) -> AssertResult {
    let resource = plan.resource(address).ok_or_else(|| unknown_address(plan, address))?;

    match resource.attribute(path) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Array(items)) if items.is_empty() => Ok(()),
        Some(observed) => Err(AssertionError::UnexpectedAttribute {
            address: address.to_string(),
            path: path.to_string(),
            observed: observed.to_string(),
        }),
    }
}

fn unknown_address(plan: &StructuredPlan, address: &str) -> AssertionError {
    let known: Vec<&str> = plan.resources().map(|r| r.address.as_str()).collect();
    AssertionError::UnknownAddress {
        address: address.to_string(),
        known: known.join(", "),
    }
}
