use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::Path,
};

use serde::Deserialize;

use crate::{Error, Result, dsn, profiles::normalize_type_key};

pub const DEFINITIONS_FILE: &str = "definitions.json";

const BUNDLED_DEFINITIONS: &str = include_str!("../data/definitions.json");

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DatabaseTypeDefinition {
    /// Catalog key; filled in from the map key when loading.
    #[serde(skip)]
    pub key: String,
    pub display_name: String,
    /// Driver packages that must be available before a connection can be tested.
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    pub connection_string: String,
    #[serde(default)]
    pub supports_schema: bool,
}

/// Every known database type, keyed by normalized type string.
#[derive(Clone, Debug)]
pub struct DefinitionCatalog {
    definitions: BTreeMap<String, DatabaseTypeDefinition>,
}

impl DefinitionCatalog {
    /// The definitions shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json("bundled definitions.json", BUNDLED_DEFINITIONS)
    }

    /// Reads `definitions.json` from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(DEFINITIONS_FILE);
        let contents = fs::read_to_string(&path).map_err(|err| Error::io(&path, err))?;
        Self::from_json(&path.display().to_string(), &contents)
    }

    pub fn from_json(origin: &str, contents: &str) -> Result<Self> {
        let raw: BTreeMap<String, DatabaseTypeDefinition> =
            serde_json::from_str(contents).map_err(|err| Error::catalog(origin, err))?;

        let mut definitions = BTreeMap::new();
        for (name, mut definition) in raw {
            let key = normalize_type_key(&name);
            if key.is_empty() {
                return Err(Error::catalog(origin, "empty type key"));
            }
            if definition.display_name.trim().is_empty() {
                return Err(Error::catalog(
                    origin,
                    format!("type '{name}' has no display name"),
                ));
            }
            dsn::check(&definition.connection_string).map_err(|err| {
                Error::catalog(origin, format!("connection string of '{name}': {err}"))
            })?;
            definition.key.clone_from(&key);
            if definitions.insert(key, definition).is_some() {
                return Err(Error::catalog(
                    origin,
                    format!("type '{name}' is defined more than once"),
                ));
            }
        }

        if definitions.is_empty() {
            return Err(Error::catalog(origin, "no database types defined"));
        }
        tracing::debug!(origin, types = definitions.len(), "loaded type definitions");
        Ok(Self { definitions })
    }

    pub fn definitions(&self) -> &BTreeMap<String, DatabaseTypeDefinition> {
        &self.definitions
    }

    pub fn get(&self, key: &str) -> Option<&DatabaseTypeDefinition> {
        self.definitions.get(&normalize_type_key(key))
    }

    /// Looks a type up by key or display name.
    pub fn resolve(&self, name: &str) -> Result<&DatabaseTypeDefinition> {
        let wanted = normalize_type_key(name);
        self.definitions
            .get(&wanted)
            .or_else(|| {
                self.definitions
                    .values()
                    .find(|definition| normalize_type_key(&definition.display_name) == wanted)
            })
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    /// Display names in alphabetical order.
    pub fn display_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .definitions
            .values()
            .map(|definition| definition.display_name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Display name of `key`, or `key` itself for types the catalog lacks.
    pub fn display_name_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key)
            .map(|definition| definition.display_name.as_str())
            .unwrap_or(key)
    }
}
