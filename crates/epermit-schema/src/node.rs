//! # Schema Composition Model
//!
//! A typed view over the parts of a JSON schema that shape *where* fields
//! live: `allOf` and `oneOf` composition, and `properties` nesting. Every
//! traversal the intake layer needs (finding a field, expanding required
//! fields, discovering file slots, sweeping numeric formats) is a
//! [`SchemaVisitor`] driven by the one walk in [`SchemaNode::walk`].
//!
//! A node borrows the fragment it was parsed from, so keywords the model
//! does not lift out (`type`, `format`, `required`, ...) stay reachable
//! through [`SchemaNode::fragment`].

use serde_json::Value;

/// One schema fragment and the composition branches below it.
#[derive(Debug, Clone)]
pub struct SchemaNode<'s> {
    fragment: &'s Value,
    branches: Vec<Branch<'s>>,
}

/// A composition keyword and the nodes it holds.
#[derive(Debug, Clone)]
pub enum Branch<'s> {
    /// Every child applies.
    AllOf(Vec<SchemaNode<'s>>),
    /// Exactly one child applies.
    OneOf(Vec<SchemaNode<'s>>),
    /// Named child fields.
    Properties(Vec<(&'s str, SchemaNode<'s>)>),
}

/// How the walk moves from a node to a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge<'s> {
    /// Into an `allOf` alternative; the field path is unchanged.
    AllOf,
    /// Into a `oneOf` alternative; the field path is unchanged.
    OneOf,
    /// Into a named property; the name is appended to the field path.
    Property(&'s str),
}

/// Callbacks for [`SchemaNode::walk`].
///
/// `path` holds the property names from the walk root to the node, so
/// `allOf`/`oneOf` children share their parent's path.
pub trait SchemaVisitor<'s> {
    /// Called once for every node reached.
    fn visit(&mut self, path: &[&'s str], node: &SchemaNode<'s>);

    /// Decide whether the walk descends along `edge` into `child`.
    fn follow(&mut self, path: &[&'s str], edge: Edge<'s>, child: &SchemaNode<'s>) -> bool;
}

impl<'s> SchemaNode<'s> {
    /// Parse a schema fragment into its composition tree.
    ///
    /// Branches are stored in a fixed order (`allOf`, `oneOf`,
    /// `properties`) regardless of key order in the document, so visitors
    /// see composed constraints before they descend into fields.
    pub fn parse(fragment: &'s Value) -> Self {
        let mut branches = Vec::new();
        if let Some(object) = fragment.as_object() {
            if let Some(children) = object.get("allOf").and_then(Value::as_array) {
                branches.push(Branch::AllOf(children.iter().map(SchemaNode::parse).collect()));
            }
            if let Some(children) = object.get("oneOf").and_then(Value::as_array) {
                branches.push(Branch::OneOf(children.iter().map(SchemaNode::parse).collect()));
            }
            if let Some(properties) = object.get("properties").and_then(Value::as_object) {
                branches.push(Branch::Properties(
                    properties
                        .iter()
                        .map(|(name, child)| (name.as_str(), SchemaNode::parse(child)))
                        .collect(),
                ));
            }
        }
        Self { fragment, branches }
    }

    /// The raw schema fragment.
    pub fn fragment(&self) -> &'s Value {
        self.fragment
    }

    /// Composition branches below this node.
    pub fn branches(&self) -> &[Branch<'s>] {
        &self.branches
    }

    /// True if the node has no composition branches.
    pub fn is_leaf(&self) -> bool {
        self.branches.is_empty()
    }

    /// A string-valued keyword of the fragment.
    pub fn keyword_str(&self, keyword: &str) -> Option<&'s str> {
        self.fragment.get(keyword).and_then(Value::as_str)
    }

    /// The declared `type`, when it is a single type name.
    pub fn declared_type(&self) -> Option<&'s str> {
        self.keyword_str("type")
    }

    /// Field names listed in this fragment's own `required` keyword.
    pub fn required(&self) -> impl Iterator<Item = &'s str> + 's {
        self.fragment
            .get("required")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    /// The child node of a directly declared property.
    pub fn property(&self, name: &str) -> Option<&SchemaNode<'s>> {
        self.branches.iter().find_map(|branch| match branch {
            Branch::Properties(properties) => properties
                .iter()
                .find(|(property, _)| *property == name)
                .map(|(_, child)| child),
            _ => None,
        })
    }

    /// Walk the tree depth-first, visiting this node first.
    pub fn walk<V>(&self, visitor: &mut V)
    where
        V: SchemaVisitor<'s> + ?Sized,
    {
        let mut path = Vec::new();
        self.walk_at(&mut path, visitor);
    }

    fn walk_at<V>(&self, path: &mut Vec<&'s str>, visitor: &mut V)
    where
        V: SchemaVisitor<'s> + ?Sized,
    {
        visitor.visit(path, self);
        for branch in &self.branches {
            match branch {
                Branch::AllOf(children) => {
                    for child in children {
                        if visitor.follow(path, Edge::AllOf, child) {
                            child.walk_at(path, visitor);
                        }
                    }
                }
                Branch::OneOf(children) => {
                    for child in children {
                        if visitor.follow(path, Edge::OneOf, child) {
                            child.walk_at(path, visitor);
                        }
                    }
                }
                Branch::Properties(properties) => {
                    for (name, child) in properties {
                        if visitor.follow(path, Edge::Property(*name), child) {
                            path.push(*name);
                            child.walk_at(path, visitor);
                            path.pop();
                        }
                    }
                }
            }
        }
    }
}
