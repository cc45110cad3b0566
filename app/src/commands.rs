use nocdc_core::{
    ConnectionProfile, DatabaseTypeDefinition, DefinitionCatalog, Result, TemplateStore,
    normalize_type_key, search::search, validate,
};
use nocdc_db::{ConnectivityTester, DriverEnvironment, DriverRegistry, TestOutcome};
use nocdc_storage::ProfileStore;

use crate::{
    FieldArgs,
    config::Settings,
    prompt::{self, StdinPrompt},
};

const PASSWORD_MASK: &str = "********";

/// The commands of the CLI, run against one connections file.
pub struct ConnectionsApp {
    settings: Settings,
    catalog: DefinitionCatalog,
    templates: TemplateStore,
    store: ProfileStore,
    drivers: DriverRegistry,
}

impl ConnectionsApp {
    pub fn new(settings: Settings, catalog: DefinitionCatalog, templates: TemplateStore) -> Self {
        let store = ProfileStore::new(settings.connections.clone());
        Self {
            settings,
            catalog,
            templates,
            store,
            drivers: DriverRegistry::with_defaults(),
        }
    }

    pub fn types(&self) -> Result<()> {
        let mut definitions: Vec<&DatabaseTypeDefinition> =
            self.catalog.definitions().values().collect();
        definitions.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        for definition in definitions {
            let dependencies = definition
                .dependencies
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "{} ({})  schema: {}  dependencies: {}",
                definition.display_name,
                definition.key,
                if definition.supports_schema { "yes" } else { "no" },
                if dependencies.is_empty() { "-" } else { dependencies.as_str() },
            );
        }
        Ok(())
    }

    pub fn template(&self, kind: &str) -> Result<()> {
        let key = self
            .catalog
            .resolve(kind)
            .map(|definition| definition.key.clone())
            .unwrap_or_else(|_| normalize_type_key(kind));
        let template = self.templates.template_for(&key);
        println!("host      {}", template.host);
        println!("port      {}", template.port);
        println!("username  {}", template.username);
        println!("password  {}", template.password);
        println!("database  {}", template.database);
        if let Some(schema) = &template.schema {
            println!("schema    {schema}");
        }
        Ok(())
    }

    pub fn list(&self, query: Option<&str>) -> Result<()> {
        let profiles = self.store.list()?;
        let matches = search(&profiles, &self.catalog, query.unwrap_or_default());
        if matches.is_empty() {
            match query {
                Some(query) if !query.is_empty() => {
                    println!("No connections match '{query}'.")
                }
                _ => println!("No connections saved."),
            }
            return Ok(());
        }

        let rows: Vec<[&str; 4]> = matches
            .iter()
            .map(|profile| {
                [
                    profile.id.as_str(),
                    self.catalog.display_name_for(&profile.kind),
                    profile.host.as_str(),
                    profile.database.as_str(),
                ]
            })
            .collect();
        print!("{}", format_table(["ID", "TYPE", "HOST", "DATABASE"], &rows));
        Ok(())
    }

    pub fn show(&self, id: &str, reveal: bool) -> Result<()> {
        let profile = self.store.get(id)?;
        println!("id        {}", profile.id);
        println!(
            "type      {} ({})",
            self.catalog.display_name_for(&profile.kind),
            profile.kind
        );
        println!("host      {}", profile.host);
        println!("port      {}", profile.port);
        println!("username  {}", profile.username);
        println!(
            "password  {}",
            if reveal { profile.password.as_str() } else { PASSWORD_MASK }
        );
        println!("database  {}", profile.database);
        if let Some(schema) = &profile.schema {
            println!("schema    {schema}");
        }
        Ok(())
    }

    pub fn add(&self, id: Option<String>, fields: &FieldArgs) -> Result<()> {
        let mut profile = ConnectionProfile {
            id: id.map(|id| id.trim().to_string()).unwrap_or_default(),
            ..ConnectionProfile::default()
        };
        apply_fields(&mut profile, fields);
        let id = self.save(profile, true)?;
        println!("Connection '{id}' has been saved.");
        Ok(())
    }

    pub fn edit(&self, id: &str, fields: &FieldArgs) -> Result<()> {
        let mut profile = self.store.get(id)?;
        apply_fields(&mut profile, fields);
        let id = self.save(profile, false)?;
        println!("Connection '{id}' has been saved.");
        Ok(())
    }

    pub fn delete(&self, id: &str, yes: bool) -> Result<()> {
        let profile = self.store.get(id)?;
        if !yes && !prompt::confirm(&format!("Delete connection '{}'?", profile.id)) {
            println!("Deletion cancelled.");
            return Ok(());
        }
        self.store.delete(&profile.id)?;
        println!("Connection '{}' has been deleted.", profile.id);
        Ok(())
    }

    /// Tests a saved connection, or the fields alone when no id is given.
    /// Fields given alongside an id override the stored values for this test
    /// only.
    pub fn test(&self, id: Option<&str>, fields: &FieldArgs, yes: bool) -> Result<()> {
        let mut profile = match id {
            Some(id) => self.store.get(id)?,
            None => ConnectionProfile::default(),
        };
        apply_fields(&mut profile, fields);
        let definition = self.catalog.resolve(&profile.kind)?;
        profile.normalize_for(definition);
        validate(&profile, definition.supports_schema)?;

        let environment = DriverEnvironment::new(&self.drivers, self.settings.installer.clone());
        let prompt = StdinPrompt { assume_yes: yes };
        let tester = ConnectivityTester::new(&self.catalog, &self.drivers)
            .with_timeout(self.settings.timeout);
        match tester.test(&profile, &environment, &prompt)? {
            TestOutcome::Success => println!("Connection successful!"),
            TestOutcome::Cancelled => println!("Connection test cancelled."),
        }
        Ok(())
    }

    fn save(&self, mut profile: ConnectionProfile, is_new: bool) -> Result<String> {
        let definition = self.catalog.resolve(&profile.kind)?;
        profile.normalize_for(definition);
        validate(&profile, definition.supports_schema)?;
        self.store.save(&profile, is_new)
    }
}

/// Overwrites the fields of `profile` that were given on the command line.
fn apply_fields(profile: &mut ConnectionProfile, fields: &FieldArgs) {
    let value = |field: &Option<String>| field.as_deref().map(|value| value.trim().to_string());
    if let Some(kind) = &fields.kind {
        profile.kind = kind.trim().to_string();
    }
    let targets = [
        (&fields.host, &mut profile.host),
        (&fields.port, &mut profile.port),
        (&fields.username, &mut profile.username),
        (&fields.password, &mut profile.password),
        (&fields.database, &mut profile.database),
    ];
    for (field, target) in targets {
        if let Some(new_value) = value(field) {
            *target = new_value;
        }
    }
    if let Some(schema) = value(&fields.schema) {
        profile.schema = Some(schema);
    }
}

fn format_table<const N: usize>(header: [&str; N], rows: &[[&str; N]]) -> String {
    let mut widths = header.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&header).chain(rows) {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use std::{fs, time::Duration};

    use nocdc_core::{Error, Field, ValidationError};
    use tempfile::TempDir;

    use super::*;

    fn app(dir: &TempDir) -> ConnectionsApp {
        let settings = Settings {
            connections: dir.path().join("connections.ini"),
            catalog_dir: None,
            timeout: Duration::from_secs(1),
            installer: None,
        };
        ConnectionsApp::new(
            settings,
            DefinitionCatalog::bundled().unwrap(),
            TemplateStore::bundled().unwrap(),
        )
    }

    fn fields(kind: &str) -> FieldArgs {
        FieldArgs {
            kind: Some(kind.into()),
            host: Some("db.example.com".into()),
            port: Some("5432".into()),
            username: Some("user".into()),
            password: Some("pw".into()),
            database: Some("mydb".into()),
            schema: None,
        }
    }

    #[test]
    fn add_accepts_display_names_and_stores_the_key() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        app.add(None, &fields("Microsoft SQL Server")).unwrap();

        let stored = app.store.get("connection_1").unwrap();
        assert_eq!(stored.kind, "microsoftsqlserver");
        assert_eq!(stored.host, "db.example.com");
    }

    #[test]
    fn add_without_type_is_rejected() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let mut args = fields("postgresql");
        args.kind = None;

        let err = app.add(None, &args).unwrap_err();
        assert!(matches!(err, Error::UnknownType(name) if name.is_empty()));
        assert!(!dir.path().join("connections.ini").exists());
    }

    #[test]
    fn add_requires_a_schema_for_snowflake() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let err = app.add(None, &fields("snowflake")).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::Missing(Field::Schema))
        ));

        let mut args = fields("snowflake");
        args.schema = Some("PUBLIC".into());
        app.add(Some("warehouse".into()), &args).unwrap();
        assert_eq!(
            app.store.get("warehouse").unwrap().schema.as_deref(),
            Some("PUBLIC")
        );
    }

    #[test]
    fn edit_keeps_unspecified_fields() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        app.add(None, &fields("postgresql")).unwrap();

        let change = FieldArgs {
            host: Some(" other.example.com ".into()),
            ..FieldArgs::default()
        };
        app.edit("connection_1", &change).unwrap();

        let stored = app.store.get("connection_1").unwrap();
        assert_eq!(stored.host, "other.example.com");
        assert_eq!(stored.database, "mydb");
        assert_eq!(stored.password, "pw");
    }

    #[test]
    fn switching_type_drops_an_unsupported_schema() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let mut args = fields("snowflake");
        args.schema = Some("PUBLIC".into());
        app.add(None, &args).unwrap();

        let change = FieldArgs {
            kind: Some("mysql".into()),
            ..FieldArgs::default()
        };
        app.edit("connection_1", &change).unwrap();

        let contents = fs::read_to_string(dir.path().join("connections.ini")).unwrap();
        assert!(contents.contains("type = mysql"));
        assert!(!contents.contains("schema"));
    }

    #[test]
    fn edit_and_delete_of_missing_ids_are_not_found() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        assert!(matches!(
            app.edit("ghost", &FieldArgs::default()),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(app.delete("ghost", true), Err(Error::NotFound(_))));
    }

    #[test]
    fn delete_with_yes_removes_the_profile() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        app.add(None, &fields("postgresql")).unwrap();
        app.delete("connection_1", true).unwrap();
        assert!(app.store.list().unwrap().is_empty());
    }

    #[test]
    fn test_validates_before_connecting() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let mut args = fields("postgresql");
        args.password = None;

        let err = app.test(None, &args, true).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::Missing(Field::Password))
        ));
    }

    #[test]
    fn test_rejects_unknown_types() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let err = app.test(None, &fields("foobase"), true).unwrap_err();
        assert!(matches!(err, Error::UnknownType(name) if name == "foobase"));
    }

    #[test]
    fn tables_pad_columns_to_the_widest_cell() {
        let table = format_table(
            ["ID", "HOST"],
            &[["connection_1", "localhost"], ["x", "db.example.com"]],
        );
        assert_eq!(
            table,
            "ID            HOST\n\
             connection_1  localhost\n\
             x             db.example.com\n"
        );
    }
}
