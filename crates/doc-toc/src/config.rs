use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use toml::{value::Table, Value};

use crate::{
    error::{Error, Result},
    load::LoadOptions,
};

/// The contents of `toc.toml`: the `[toc]` table this crate reads, plus every other table,
/// kept untouched for sidebar renderers and other consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub toc: TocConfig,
    consumers: Table,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).with_context(|| {
            format!(
                "Failed to read table of contents settings from {}",
                path.display()
            )
        })?;

        source.parse()
    }

    /// Deserialize a table not owned by this crate, such as a renderer's settings.
    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let value = self
            .consumers
            .get(key)
            .with_context(|| format!("Missing configuration table `{key}`"))?;

        value
            .clone()
            .try_into()
            .with_context(|| format!("Invalid configuration table `{key}`"))
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            max_depth: self.toc.max_depth,
            deny_unknown_fields: self.toc.deny_unknown_fields,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            toc: TocConfig::default(),
            consumers: Table::new(),
        }
    }
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let mut consumers = match Value::deserialize(deserializer)? {
            Value::Table(table) => table,
            other => {
                return Err(D::Error::custom(format!(
                    "table of contents settings must be a table of tables, found {}",
                    other.type_str()
                )))
            }
        };

        let toc = match consumers.remove("toc") {
            Some(toc) => toc
                .try_into()
                .map_err(|error| D::Error::custom(format!("invalid [toc] table: {error}")))?,
            None => TocConfig::default(),
        };

        Ok(Config { toc, consumers })
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        toml::from_str(source).with_context(|| "Invalid table of contents settings")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct TocConfig {
    /// Path to the table of contents, relative to the configuration file.
    pub source: PathBuf,
    /// Optional limit on how deeply entries may be nested.
    pub max_depth: Option<usize>,
    /// Whether sections may carry fields other than `name` and `children`.
    pub deny_unknown_fields: bool,
    /// Indent width used when formatting the table of contents.
    pub indent: usize,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("toc.json"),
            max_depth: None,
            deny_unknown_fields: true,
            indent: 2,
        }
    }
}
