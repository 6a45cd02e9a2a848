//! Locating a field's sub-schema by path.

use serde_json::Value;

use epermit_schema::{Edge, SchemaNode, SchemaVisitor};

/// Run `transform` on every sub-schema of `schema` found at `target`.
///
/// The walk descends through `properties` entries matching the next
/// target segment and through every `allOf` and `oneOf` branch on the
/// way, so a field declared in several branches is visited once per
/// declaration. Nothing below a match is searched. An empty `target`
/// matches the root.
pub fn find_field<'s, F>(schema: &'s Value, target: &[&str], transform: F)
where
    F: FnMut(&SchemaNode<'s>),
{
    let mut locator = FieldLocator { target, transform };
    SchemaNode::parse(schema).walk(&mut locator);
}

struct FieldLocator<'t, F> {
    target: &'t [&'t str],
    transform: F,
}

impl<'t, F> FieldLocator<'t, F> {
    fn is_target(&self, path: &[&str]) -> bool {
        path.len() == self.target.len() && path.iter().zip(self.target).all(|(a, b)| a == b)
    }
}

impl<'s, F> SchemaVisitor<'s> for FieldLocator<'_, F>
where
    F: FnMut(&SchemaNode<'s>),
{
    fn visit(&mut self, path: &[&'s str], node: &SchemaNode<'s>) {
        if self.is_target(path) {
            (self.transform)(node);
        }
    }

    fn follow(&mut self, path: &[&'s str], edge: Edge<'s>, _child: &SchemaNode<'s>) -> bool {
        if path.len() >= self.target.len() {
            return false;
        }
        match edge {
            Edge::AllOf | Edge::OneOf => true,
            Edge::Property(name) => self.target[path.len()] == name,
        }
    }
}
