//! Parsing and validation of table of contents files.

mod raw;

use anyhow::Context;
use indexmap::IndexMap;
use log::{debug, trace};
use std::{fs, path::Path};

pub use raw::{RawValue, JSON_NESTING_LIMIT};

use crate::{
    error::{Result, SchemaError, SchemaErrorKind},
    model::toc::{Children, KeyPath, Node, TableOfContents},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Reject nodes nested deeper than this, top-level sections being level 1.
    pub max_depth: Option<usize>,
    /// Reject section fields other than `name` and `children`.
    pub deny_unknown_fields: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            deny_unknown_fields: true,
        }
    }
}

/// Reads a table of contents and checks it against the expected shape, normalizing bare string
/// children into leaf nodes along the way.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    options: LoadOptions,
}

impl Loader {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<TableOfContents> {
        let path = path.as_ref();
        debug!("Loading table of contents from {}", path.display());

        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let toc = self
            .parse(&source)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(toc)
    }

    pub fn parse(&self, source: &str) -> Result<TableOfContents, SchemaError> {
        let raw = RawValue::parse(source)?;

        self.validate(raw)
    }

    pub fn validate(&self, raw: RawValue) -> Result<TableOfContents, SchemaError> {
        let root = KeyPath::root();
        let entries = match raw {
            RawValue::Object(entries) => entries,
            other => {
                let kind = SchemaErrorKind::RootNotObject {
                    found: other.kind(),
                };
                return Err(SchemaError::new(root, kind));
            }
        };

        let sections = collect_entries(&root, entries, |path, value| {
            self.validate_section(path, value, 1)
        })?;
        let toc = TableOfContents::new(sections);
        debug!(
            "Loaded {} sections containing {} nodes",
            toc.sections.len(),
            toc.len()
        );

        Ok(toc)
    }

    fn validate_section(
        &self,
        path: KeyPath,
        value: RawValue,
        depth: usize,
    ) -> Result<Node, SchemaError> {
        self.check_depth(&path, depth)?;

        match value {
            RawValue::Object(fields) => self.validate_fields(path, fields, depth),
            other => {
                let kind = SchemaErrorKind::ExpectedSection {
                    found: other.kind(),
                };
                Err(SchemaError::new(path, kind))
            }
        }
    }

    fn validate_child(
        &self,
        path: KeyPath,
        value: RawValue,
        depth: usize,
    ) -> Result<Node, SchemaError> {
        self.check_depth(&path, depth)?;

        match value {
            RawValue::String(name) => {
                trace!("Validated {} ({})", path, name);
                Ok(Node::leaf(name))
            }
            RawValue::Object(fields) => self.validate_fields(path, fields, depth),
            other => {
                let kind = SchemaErrorKind::InvalidChild {
                    found: other.kind(),
                };
                Err(SchemaError::new(path, kind))
            }
        }
    }

    fn validate_fields(
        &self,
        path: KeyPath,
        fields: Vec<(String, RawValue)>,
        depth: usize,
    ) -> Result<Node, SchemaError> {
        let mut name = None;
        let mut children = None;

        for (field, value) in fields {
            match field.as_str() {
                "name" => {
                    if name.is_some() {
                        return Err(SchemaError::new(path, SchemaErrorKind::DuplicateKey(field)));
                    }

                    match value {
                        RawValue::String(value) => name = Some(value),
                        other => {
                            let kind = SchemaErrorKind::InvalidName {
                                found: other.kind(),
                            };
                            return Err(SchemaError::new(path, kind));
                        }
                    }
                }
                "children" => {
                    if children.is_some() {
                        return Err(SchemaError::new(path, SchemaErrorKind::DuplicateKey(field)));
                    }

                    match value {
                        RawValue::Object(entries) => {
                            let nodes = collect_entries(&path, entries, |child_path, child| {
                                self.validate_child(child_path, child, depth + 1)
                            })?;
                            children = Some(nodes);
                        }
                        other => {
                            let kind = SchemaErrorKind::InvalidChildren {
                                found: other.kind(),
                            };
                            return Err(SchemaError::new(path, kind));
                        }
                    }
                }
                _ if self.options.deny_unknown_fields => {
                    return Err(SchemaError::new(path, SchemaErrorKind::UnknownField(field)));
                }
                _ => debug!("Ignoring unknown field `{}` at {}", field, path),
            }
        }

        let Some(name) = name else {
            return Err(SchemaError::new(path, SchemaErrorKind::MissingName));
        };
        trace!("Validated {} ({})", path, name);

        Ok(Node { name, children })
    }

    fn check_depth(&self, path: &KeyPath, depth: usize) -> Result<(), SchemaError> {
        match self.options.max_depth {
            Some(max) if depth > max => Err(SchemaError::new(
                path.clone(),
                SchemaErrorKind::DepthExceeded { max },
            )),
            _ => Ok(()),
        }
    }
}

/// Collects `(slug, value)` entries into an ordered map, rejecting empty and repeated slugs.
fn collect_entries<F>(
    parent: &KeyPath,
    entries: Vec<(String, RawValue)>,
    mut validate: F,
) -> Result<Children, SchemaError>
where
    F: FnMut(KeyPath, RawValue) -> Result<Node, SchemaError>,
{
    let mut nodes = IndexMap::with_capacity(entries.len());

    for (slug, value) in entries {
        if slug.is_empty() {
            return Err(SchemaError::new(parent.clone(), SchemaErrorKind::EmptyKey));
        }

        if slug.contains('/') {
            return Err(SchemaError::new(
                parent.clone(),
                SchemaErrorKind::SlashInKey(slug),
            ));
        }

        if nodes.contains_key(&slug) {
            return Err(SchemaError::new(
                parent.clone(),
                SchemaErrorKind::DuplicateKey(slug),
            ));
        }

        let node = validate(parent.join(slug.as_str()), value)?;
        nodes.insert(slug, node);
    }

    Ok(nodes)
}
