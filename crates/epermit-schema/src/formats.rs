//! # Custom Formats
//!
//! Phone numbers on permit applications are split into an area code and a
//! seven-digit number. Both are declared with custom `format` keywords:
//!
//! - `areaCodeFormat`: exactly 3 digits
//! - `phoneNumberFormat`: exactly 7 digits
//!
//! The string checks are registered with the `jsonschema` validator. That
//! crate only runs format checks on string instances, and the application
//! schemas declare these fields as numbers, so [`numeric_format_failures`]
//! applies the same digit checks to numeric instances.

use serde_json::Value;

use crate::failure::{instance_property, FailureArgument, FailureKind, RawValidationFailure};
use crate::node::{Edge, SchemaNode, SchemaVisitor};

/// Format name for three-digit area codes.
pub const AREA_CODE_FORMAT: &str = "areaCodeFormat";

/// Format name for seven-digit phone numbers.
pub const PHONE_NUMBER_FORMAT: &str = "phoneNumberFormat";

/// True if `input` consists of exactly `digits` ASCII digits.
pub fn digit_check(input: &str, digits: usize) -> bool {
    input.len() == digits && input.bytes().all(|b| b.is_ascii_digit())
}

/// `areaCodeFormat` check.
pub fn area_code_format(input: &str) -> bool {
    digit_check(input, 3)
}

/// `phoneNumberFormat` check.
pub fn phone_number_format(input: &str) -> bool {
    digit_check(input, 7)
}

fn required_digits(format: &str) -> Option<usize> {
    match format {
        AREA_CODE_FORMAT => Some(3),
        PHONE_NUMBER_FORMAT => Some(7),
        _ => None,
    }
}

/// Message used for a failed `format` check.
pub fn format_message(format: &str) -> String {
    format!("does not conform to the \"{format}\" format")
}

/// Check numeric instances against the digit formats declared in `schema`.
///
/// Follows `allOf` and `properties` wherever the instance has a value.
/// `oneOf` alternatives are skipped: which one applies is the validator's
/// call, and it reports a mismatch there on its own.
pub fn numeric_format_failures(schema: &Value, instance: &Value) -> Vec<RawValidationFailure> {
    let mut sweep = NumericFormatSweep {
        instance,
        failures: Vec::new(),
    };
    SchemaNode::parse(schema).walk(&mut sweep);
    sweep.failures
}

struct NumericFormatSweep<'i> {
    instance: &'i Value,
    failures: Vec<RawValidationFailure>,
}

/// Decimal text of a number as a form field would submit it: integral
/// floats such as `555.0` print as `555`.
fn number_digits(number: &serde_json::Number) -> String {
    match number.as_f64() {
        Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
            format!("{float:.0}")
        }
        _ => number.to_string(),
    }
}

fn value_at<'i>(instance: &'i Value, path: &[&str]) -> Option<&'i Value> {
    path.iter()
        .try_fold(instance, |value, segment| value.get(*segment))
}

impl<'s> SchemaVisitor<'s> for NumericFormatSweep<'_> {
    fn visit(&mut self, path: &[&'s str], node: &SchemaNode<'s>) {
        let Some(format) = node.keyword_str("format") else {
            return;
        };
        let Some(digits) = required_digits(format) else {
            return;
        };
        let Some(Value::Number(number)) = value_at(self.instance, path) else {
            return;
        };
        if !digit_check(&number_digits(number), digits) {
            self.failures.push(
                RawValidationFailure::new(
                    instance_property(path),
                    FailureKind::Format,
                    FailureArgument::Text(format.to_string()),
                    format_message(format),
                )
                .with_schema(node.fragment().clone()),
            );
        }
    }

    fn follow(&mut self, path: &[&'s str], edge: Edge<'s>, _child: &SchemaNode<'s>) -> bool {
        match edge {
            Edge::AllOf => true,
            Edge::OneOf => false,
            Edge::Property(name) => value_at(self.instance, path)
                .is_some_and(|value| value.get(name).is_some()),
        }
    }
}
