//! Required-field expansion.
//!
//! When a whole object is missing from a submission, the validator only
//! reports the object itself. Applicants want to know everything they
//! have to fill in, so the translator expands the failure into every
//! field the object's schema requires, including those required by
//! `allOf` branches and inside required sub-objects.

use serde_json::Value;

use epermit_schema::{Edge, SchemaNode, SchemaVisitor};

use crate::locate::find_field;
use crate::path::{combine_prop_argument, segments};

/// Every field required at or below `field`, as dotted paths prefixed
/// with `field`.
///
/// Each call owns its accumulator. Descent into `properties` only follows
/// children that are themselves required, so the result lists exactly
/// the fields that must be present once `field` is. `oneOf` alternatives
/// are not followed: none of them is required on its own. Duplicates are
/// dropped and declaration order is kept.
pub fn collect_required(schema: &Value, field: &str) -> Vec<String> {
    let mut found = Vec::new();
    find_field(schema, &segments(field), |node| {
        node.walk(&mut RequiredCollector { found: &mut found });
    });
    found
        .into_iter()
        .map(|relative| combine_prop_argument(field, &relative))
        .collect()
}

/// Collects required names relative to the walk root.
struct RequiredCollector<'a> {
    found: &'a mut Vec<String>,
}

impl<'s> SchemaVisitor<'s> for RequiredCollector<'_> {
    fn visit(&mut self, path: &[&'s str], node: &SchemaNode<'s>) {
        let prefix = path.join(".");
        for name in node.required() {
            let qualified = combine_prop_argument(&prefix, name);
            if !self.found.contains(&qualified) {
                self.found.push(qualified);
            }
        }
    }

    fn follow(&mut self, path: &[&'s str], edge: Edge<'s>, _child: &SchemaNode<'s>) -> bool {
        match edge {
            Edge::AllOf => true,
            Edge::OneOf => false,
            Edge::Property(name) => {
                let qualified = combine_prop_argument(&path.join("."), name);
                self.found.contains(&qualified)
            }
        }
    }
}
