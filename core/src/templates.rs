use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;

use crate::{Error, Result, profiles::normalize_type_key};

pub const TEMPLATES_DIR: &str = "templates";

const BUNDLED_TEMPLATES: [(&str, &str); 5] = [
    (
        "microsoftsqlserver",
        include_str!("../data/templates/microsoftsqlserver.json"),
    ),
    ("mysql", include_str!("../data/templates/mysql.json")),
    ("oracle", include_str!("../data/templates/oracle.json")),
    ("postgresql", include_str!("../data/templates/postgresql.json")),
    ("snowflake", include_str!("../data/templates/snowflake.json")),
];

/// Example values shown as placeholders for a database type.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct FieldTemplate {
    pub host: String,
    pub port: String,
    pub username: String,
    pub password: String,
    pub database: String,
    #[serde(default)]
    pub schema: Option<String>,
}

impl Default for FieldTemplate {
    fn default() -> Self {
        Self {
            host: "db.example.com".into(),
            port: "5432".into(),
            username: "user".into(),
            password: "password".into(),
            database: "mydatabase".into(),
            schema: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TemplateStore {
    templates: BTreeMap<String, FieldTemplate>,
    fallback: FieldTemplate,
}

impl TemplateStore {
    pub fn bundled() -> Result<Self> {
        Self::from_entries(BUNDLED_TEMPLATES.iter().map(|(key, contents)| {
            (format!("bundled templates/{key}.json"), key.to_string(), *contents)
        }))
    }

    /// Reads every `*.json` file under `dir/templates`. The part of the file
    /// name before the first dot is the type key.
    pub fn load(dir: &Path) -> Result<Self> {
        let templates_dir = dir.join(TEMPLATES_DIR);
        let entries = fs::read_dir(&templates_dir).map_err(|err| Error::io(&templates_dir, err))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| Error::io(&templates_dir, err))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.split('.').next())
            else {
                continue;
            };
            let key = stem.to_string();
            let contents = fs::read_to_string(&path).map_err(|err| Error::io(&path, err))?;
            files.push((path.display().to_string(), key, contents));
        }
        files.sort_by(|a, b| a.1.cmp(&b.1));

        Self::from_entries(
            files
                .iter()
                .map(|(origin, key, contents)| (origin.clone(), key.clone(), contents.as_str())),
        )
    }

    /// Builds a store from `(origin, type key, json)` triples.
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = (String, String, &'a str)>,
    ) -> Result<Self> {
        let mut templates = BTreeMap::new();
        for (origin, key, contents) in entries {
            let template: FieldTemplate =
                serde_json::from_str(contents).map_err(|err| Error::catalog(&origin, err))?;
            let key = normalize_type_key(&key);
            if templates.insert(key.clone(), template).is_some() {
                return Err(Error::catalog(
                    origin,
                    format!("duplicate template for '{key}'"),
                ));
            }
        }
        tracing::debug!(templates = templates.len(), "loaded field templates");
        Ok(Self {
            templates,
            fallback: FieldTemplate::default(),
        })
    }

    /// Template for `key`, or the generic default when the type has none.
    pub fn template_for(&self, key: &str) -> &FieldTemplate {
        self.templates
            .get(&normalize_type_key(key))
            .unwrap_or(&self.fallback)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(&normalize_type_key(key))
    }
}
