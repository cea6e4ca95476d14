use indexmap::IndexMap;
use serde::{ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, path::Path, str::FromStr};

use super::Outline;
use crate::{
    error::{Result, SchemaError},
    load::{Loader, RawValue},
};

/// Child entries keyed by slug, in display order.
pub type Children = IndexMap<String, Node>;

/// A single entry in the table of contents.
#[derive(Debug, Clone, Eq)]
pub struct Node {
    /// The display label of the entry.
    pub name: String,
    /// Entries nested below this one. `None` when the entry was authored without `children`.
    pub children: Option<Children>,
}

impl Node {
    pub fn new(name: impl Into<String>, children: Children) -> Self {
        Self {
            name: name.into(),
            children: Some(children),
        }
    }

    /// The normalized form of a child written as a bare string.
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(|children| children.is_empty())
    }

    /// Iterate over the direct children of this node in display order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> + '_ {
        self.children
            .iter()
            .flat_map(|children| children.iter())
            .map(|(slug, node)| (slug.as_str(), node))
    }

    pub fn get(&self, slug: &str) -> Option<&Node> {
        self.children.as_ref()?.get(slug)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        if self.name != other.name {
            return false;
        }

        match (&self.children, &other.children) {
            (Some(left), Some(right)) => ordered_eq(left, right),
            (None, None) => true,
            _ => false,
        }
    }
}

// NOTE: IndexMap equality ignores insertion order, display order is part of the value here.
fn ordered_eq(left: &Children, right: &Children) -> bool {
    left.len() == right.len() && left.iter().eq(right.iter())
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.children.is_some() { 2 } else { 1 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("name", &self.name)?;

        if let Some(ref children) = self.children {
            map.serialize_entry("children", &ChildrenRef(children))?;
        }

        map.end()
    }
}

/// Writes a child without `children` back out as the bare string shorthand.
struct ChildRef<'a>(&'a Node);

impl Serialize for ChildRef<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0.children {
            None => serializer.serialize_str(&self.0.name),
            Some(_) => self.0.serialize(serializer),
        }
    }
}

struct ChildrenRef<'a>(&'a Children);

impl Serialize for ChildrenRef<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.0.iter().map(|(slug, node)| (slug, ChildRef(node))))
    }
}

/// The table of contents of a documentation site: top-level sections keyed by slug, in
/// display order.
#[derive(Debug, Clone, Default, Eq)]
pub struct TableOfContents {
    pub sections: IndexMap<String, Node>,
}

impl TableOfContents {
    pub fn new(sections: IndexMap<String, Node>) -> Self {
        Self { sections }
    }

    /// Load and validate the table of contents at `path` with the default options.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Loader::default().load(path)
    }

    /// Look up a node by its `/` separated slug path, e.g. `getting_started/installation`.
    pub fn get(&self, slug_path: &str) -> Option<&Node> {
        let mut slugs = slug_path.split('/');
        let section = self.sections.get(slugs.next()?)?;

        slugs.try_fold(section, |node, slug| node.get(slug))
    }

    /// Iterate over the top-level sections in display order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Node)> + '_ {
        self.sections
            .iter()
            .map(|(slug, node)| (slug.as_str(), node))
    }

    /// Depth-first, pre-order walk over every node, yielding each node with its key path.
    pub fn walk(&self) -> Walk<'_> {
        let stack = self
            .sections
            .iter()
            .rev()
            .map(|(slug, node)| (KeyPath::root().join(slug.as_str()), node))
            .collect();

        Walk { stack }
    }

    /// The number of nodes in the tree, counting sections and all of their descendants.
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// The deepest nesting level present, where top-level sections are level 1.
    pub fn depth(&self) -> usize {
        self.walk().map(|(path, _)| path.len()).max().unwrap_or(0)
    }

    pub fn outline(&self) -> Outline<'_> {
        Outline::new(self)
    }
}

impl PartialEq for TableOfContents {
    fn eq(&self, other: &Self) -> bool {
        ordered_eq(&self.sections, &other.sections)
    }
}

impl FromStr for TableOfContents {
    type Err = SchemaError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Loader::default().parse(source)
    }
}

impl Serialize for TableOfContents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.sections.iter())
    }
}

impl<'de> Deserialize<'de> for TableOfContents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let raw = RawValue::deserialize(deserializer)?;

        Loader::default().validate(raw).map_err(D::Error::custom)
    }
}

pub struct Walk<'a> {
    stack: Vec<(KeyPath, &'a Node)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (KeyPath, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;

        if let Some(ref children) = node.children {
            for (slug, child) in children.iter().rev() {
                self.stack.push((path.join(slug.as_str()), child));
            }
        }

        Some((path, node))
    }
}

/// The slugs leading from the root of the table of contents to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn join(&self, slug: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(slug.into());

        Self(segments)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// The URL form of the path, e.g. `getting_started/installation`.
    pub fn slug(&self) -> String {
        self.0.join("/")
    }
}

impl<S> FromIterator<S> for KeyPath
where
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Formats the path the way it is spelled in the source file: `start.children.install`.
impl fmt::Display for KeyPath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return formatter.write_str("<root>");
        }

        for (index, segment) in self.0.iter().enumerate() {
            if index > 0 {
                formatter.write_str(".children.")?;
            }

            let needs_quotes = segment.is_empty()
                || segment.contains(|c: char| c == '.' || c == '"' || c.is_whitespace());

            if needs_quotes {
                write!(formatter, "{segment:?}")?;
            } else {
                formatter.write_str(segment)?;
            }
        }

        Ok(())
    }
}
