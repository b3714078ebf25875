//! Nested value trees with dotted-path addressing and deep merge

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value as YamlValue;
use std::path::Path;

use crate::error::{CoreError, Result};

/// A single node of a [`ValueTree`]
///
/// Mappings always become [`ValueNode::Subtree`]; everything else (strings,
/// numbers, booleans, null, sequences) is a [`ValueNode::Literal`] and is
/// replaced wholesale on merge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValueNode {
    Literal(YamlValue),
    Subtree(ValueTree),
}

impl ValueNode {
    /// The string held by this node, if it is a string literal
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ValueNode::Literal(YamlValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// The nested tree held by this node, if it is a subtree
    pub fn as_tree(&self) -> Option<&ValueTree> {
        match self {
            ValueNode::Subtree(tree) => Some(tree),
            ValueNode::Literal(_) => None,
        }
    }

    pub fn is_subtree(&self) -> bool {
        matches!(self, ValueNode::Subtree(_))
    }
}

impl From<YamlValue> for ValueNode {
    fn from(value: YamlValue) -> Self {
        match value {
            YamlValue::Mapping(mapping) => ValueNode::Subtree(ValueTree::from_mapping(mapping)),
            YamlValue::Tagged(tagged) => ValueNode::from(tagged.value),
            other => ValueNode::Literal(other),
        }
    }
}

impl From<&str> for ValueNode {
    fn from(value: &str) -> Self {
        ValueNode::Literal(YamlValue::String(value.to_string()))
    }
}

impl From<String> for ValueNode {
    fn from(value: String) -> Self {
        ValueNode::Literal(YamlValue::String(value))
    }
}

impl From<ValueTree> for ValueNode {
    fn from(tree: ValueTree) -> Self {
        ValueNode::Subtree(tree)
    }
}

impl<'de> Deserialize<'de> for ValueNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        YamlValue::deserialize(deserializer).map(ValueNode::from)
    }
}

/// Ordered mapping from key to [`ValueNode`]
///
/// This is the representation of values at every stage of resolution: loaded
/// files, expanded inline entries and the final merged result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValueTree(IndexMap<String, ValueNode>);

impl ValueTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Load a tree from a YAML file
    ///
    /// An empty file yields an empty tree.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path).map_err(|source| CoreError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(path.display().to_string(), &content)
    }

    /// Parse a tree from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_slice("inline YAML", yaml.as_bytes())
    }

    /// Parse a tree from raw YAML bytes, naming `origin` in parse errors
    pub fn from_slice(origin: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let origin = origin.into();
        let value: YamlValue =
            serde_yaml::from_slice(bytes).map_err(|e| CoreError::parse(origin.clone(), e))?;
        tree_from_yaml(value).map_err(|message| CoreError::parse(origin, message))
    }

    fn from_mapping(mapping: serde_yaml::Mapping) -> Self {
        Self(
            mapping
                .into_iter()
                .map(|(key, value)| (key_to_string(key), ValueNode::from(value)))
                .collect(),
        )
    }

    fn singleton(key: &str, node: ValueNode) -> Self {
        let mut map = IndexMap::with_capacity(1);
        map.insert(key.to_string(), node);
        Self(map)
    }

    /// Get the node at a dotted path (e.g. "ingress.host")
    pub fn get(&self, path: &str) -> Option<&ValueNode> {
        let mut segments = path.split('.');
        let mut node = self.0.get(segments.next()?)?;
        for segment in segments {
            node = node.as_tree()?.0.get(segment)?;
        }
        Some(node)
    }

    /// Get the string at a dotted path
    ///
    /// Returns `None` when a segment is missing, when an intermediate segment
    /// is not a subtree, or when the path does not end on a string leaf.
    pub fn lookup(&self, path: &str) -> Option<&str> {
        self.get(path)?.as_str()
    }

    /// Whether [`ValueTree::lookup`] finds a string at `path`
    pub fn contains_key(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Deep merge `overlay` into this tree
    ///
    /// Rules:
    /// - Both sides subtrees: recursive merge
    /// - Anything else: overlay replaces base
    /// - Keys only present in the base are kept
    pub fn merge(&mut self, overlay: &ValueTree) {
        for (key, value) in &overlay.0 {
            if let (Some(ValueNode::Subtree(base)), ValueNode::Subtree(nested)) =
                (self.0.get_mut(key), value)
            {
                base.merge(nested);
                continue;
            }
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Top-level node for `key`, without path splitting
    pub fn get_key(&self, key: &str) -> Option<&ValueNode> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for ValueTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = YamlValue::deserialize(deserializer)?;
        tree_from_yaml(value).map_err(serde::de::Error::custom)
    }
}

fn tree_from_yaml(value: YamlValue) -> std::result::Result<ValueTree, String> {
    match value {
        YamlValue::Null => Ok(ValueTree::new()),
        YamlValue::Mapping(mapping) => Ok(ValueTree::from_mapping(mapping)),
        YamlValue::Tagged(tagged) => tree_from_yaml(tagged.value),
        other => Err(format!("expected a mapping at the top level, found {}", kind_of(&other))),
    }
}

fn kind_of(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "a boolean",
        YamlValue::Number(_) => "a number",
        YamlValue::String(_) => "a string",
        YamlValue::Sequence(_) => "a sequence",
        YamlValue::Mapping(_) => "a mapping",
        YamlValue::Tagged(_) => "a tagged value",
    }
}

/// Mapping keys are always strings in a value tree
fn key_to_string(key: YamlValue) -> String {
    match key {
        YamlValue::String(s) => s,
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Turn a dotted key into a single-branch tree holding `value` at its end
///
/// Segments are not validated: `"a..b"` produces an empty intermediate key.
pub fn expand(path: &str, value: impl Into<ValueNode>) -> ValueTree {
    let mut segments = path.rsplit('.');
    let last = segments.next().unwrap_or_default();
    let mut tree = ValueTree::singleton(last, value.into());
    for segment in segments {
        tree = ValueTree::singleton(segment, ValueNode::Subtree(tree));
    }
    tree
}

/// Merge `from` over `onto`, returning a new tree
///
/// Neither input is modified.
pub fn merge(from: &ValueTree, onto: &ValueTree) -> ValueTree {
    let mut result = onto.clone();
    result.merge(from);
    result
}
