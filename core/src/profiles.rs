use crate::catalog::DatabaseTypeDefinition;

pub type ProfileId = String;

/// Prefix of generated profile ids (`connection_1`, `connection_2`, ...).
pub const GENERATED_ID_PREFIX: &str = "connection_";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionProfile {
    pub id: ProfileId,
    /// Normalized catalog key, e.g. `microsoftsqlserver`.
    pub kind: String,
    pub host: String,
    pub port: String,
    pub username: String,
    pub password: String,
    pub database: String,
    pub schema: Option<String>,
}

impl ConnectionProfile {
    pub fn new(
        kind: &str,
        host: impl Into<String>,
        port: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            id: ProfileId::new(),
            kind: normalize_type_key(kind),
            host: host.into(),
            port: port.into(),
            username: username.into(),
            password: password.into(),
            database: database.into(),
            schema: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<ProfileId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn schema_or_empty(&self) -> &str {
        self.schema.as_deref().unwrap_or_default()
    }

    /// Aligns the profile with its type definition: the type becomes the
    /// catalog key and the schema is kept only when the type supports one.
    pub fn normalize_for(&mut self, definition: &DatabaseTypeDefinition) {
        self.kind.clone_from(&definition.key);
        let keep_schema = definition.supports_schema
            && self.schema.as_deref().is_some_and(|schema| !schema.is_empty());
        if !keep_schema {
            self.schema = None;
        }
    }
}

/// Lowercases a type name and strips whitespace, so both `Microsoft SQL Server`
/// and `microsoftsqlserver` map to the same catalog key.
pub fn normalize_type_key(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_display_names_to_keys() {
        assert_eq!(normalize_type_key("Microsoft SQL Server"), "microsoftsqlserver");
        assert_eq!(normalize_type_key("  MySQL "), "mysql");
        assert_eq!(normalize_type_key("postgresql"), "postgresql");
    }

    #[test]
    fn normalize_for_drops_schema_on_types_without_one() {
        let definition = DatabaseTypeDefinition {
            key: "postgresql".into(),
            display_name: "Postgresql".into(),
            dependencies: Default::default(),
            connection_string: "postgres://{host}".into(),
            supports_schema: false,
        };
        let mut profile =
            ConnectionProfile::new("Postgresql", "h", "1", "u", "p", "d").with_schema("public");
        profile.normalize_for(&definition);
        assert_eq!(profile.kind, "postgresql");
        assert_eq!(profile.schema, None);
    }

    #[test]
    fn normalize_for_keeps_non_empty_schema_when_supported() {
        let definition = DatabaseTypeDefinition {
            key: "snowflake".into(),
            display_name: "Snowflake".into(),
            dependencies: Default::default(),
            connection_string: "snowflake://{host}/{schema}".into(),
            supports_schema: true,
        };
        let mut kept = ConnectionProfile::new("snowflake", "h", "1", "u", "p", "d")
            .with_schema("PUBLIC");
        kept.normalize_for(&definition);
        assert_eq!(kept.schema.as_deref(), Some("PUBLIC"));

        let mut cleared =
            ConnectionProfile::new("snowflake", "h", "1", "u", "p", "d").with_schema("");
        cleared.normalize_for(&definition);
        assert_eq!(cleared.schema, None);
    }
}
