use std::fmt;

use thiserror::Error;

use crate::{Result, catalog::DefinitionCatalog, profiles::ConnectionProfile};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Id,
    Type,
    Host,
    Port,
    Username,
    Password,
    Database,
    Schema,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Type => "type",
            Field::Host => "host",
            Field::Port => "port",
            Field::Username => "username",
            Field::Password => "password",
            Field::Database => "database",
            Field::Schema => "schema",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in the {0} field.")]
    Missing(Field),
    #[error("The {0} field cannot contain line breaks.")]
    LineBreak(Field),
    #[error("The {0} field cannot start or end with spaces.")]
    Padded(Field),
    #[error("Connection id '{0}' cannot contain '[' or ']' or start or end with spaces.")]
    InvalidId(String),
    #[error("A connection with id '{0}' already exists.")]
    DuplicateId(String),
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::Missing(field)
            | ValidationError::LineBreak(field)
            | ValidationError::Padded(field) => *field,
            ValidationError::InvalidId(_) | ValidationError::DuplicateId(_) => Field::Id,
        }
    }
}

/// Checks the required fields of `profile`, stopping at the first problem.
///
/// Type, host, port, username, password and database must hold more than
/// whitespace, and so must the schema when `schema_required`. Values must fit
/// on one line without surrounding spaces, which the section file would trim.
/// An empty id is allowed (the store assigns one); any other id must be a
/// valid section name.
pub fn validate(
    profile: &ConnectionProfile,
    schema_required: bool,
) -> std::result::Result<(), ValidationError> {
    let required = [
        (Field::Type, profile.kind.as_str()),
        (Field::Host, profile.host.as_str()),
        (Field::Port, profile.port.as_str()),
        (Field::Username, profile.username.as_str()),
        (Field::Password, profile.password.as_str()),
        (Field::Database, profile.database.as_str()),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(ValidationError::Missing(*field));
    }
    if schema_required && profile.schema_or_empty().trim().is_empty() {
        return Err(ValidationError::Missing(Field::Schema));
    }

    let values = [
        (Field::Type, profile.kind.as_str()),
        (Field::Host, profile.host.as_str()),
        (Field::Port, profile.port.as_str()),
        (Field::Username, profile.username.as_str()),
        (Field::Password, profile.password.as_str()),
        (Field::Database, profile.database.as_str()),
        (Field::Schema, profile.schema_or_empty()),
    ];
    if profile.id.contains(['\n', '\r']) {
        return Err(ValidationError::LineBreak(Field::Id));
    }
    if let Some((field, _)) = values
        .iter()
        .find(|(_, value)| value.contains(['\n', '\r']))
    {
        return Err(ValidationError::LineBreak(*field));
    }

    if profile.id.contains(['[', ']']) || profile.id.trim() != profile.id {
        return Err(ValidationError::InvalidId(profile.id.clone()));
    }
    if let Some((field, _)) = values.iter().find(|(_, value)| value.trim() != *value) {
        return Err(ValidationError::Padded(*field));
    }
    Ok(())
}

/// Validates `profile` against the schema rule of its catalog type.
pub fn validate_for(profile: &ConnectionProfile, catalog: &DefinitionCatalog) -> Result<()> {
    let definition = catalog.resolve(&profile.kind)?;
    validate(profile, definition.supports_schema)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn complete() -> ConnectionProfile {
        ConnectionProfile::new("postgresql", "db.example.com", "5432", "user", "pw", "mydb")
    }

    #[test]
    fn accepts_complete_profile() {
        assert_eq!(validate(&complete(), false), Ok(()));
    }

    #[test]
    fn each_required_field_is_enforced() {
        let cases: [(Field, fn(&mut ConnectionProfile)); 6] = [
            (Field::Type, |p| p.kind.clear()),
            (Field::Host, |p| p.host.clear()),
            (Field::Port, |p| p.port.clear()),
            (Field::Username, |p| p.username.clear()),
            (Field::Password, |p| p.password.clear()),
            (Field::Database, |p| p.database.clear()),
        ];
        for (field, clear) in cases {
            let mut profile = complete();
            clear(&mut profile);
            assert_eq!(
                validate(&profile, false),
                Err(ValidationError::Missing(field)),
                "clearing {field}"
            );
        }
    }

    #[test]
    fn reports_first_missing_field() {
        let mut profile = complete();
        profile.password.clear();
        profile.host.clear();
        assert_eq!(
            validate(&profile, false),
            Err(ValidationError::Missing(Field::Host))
        );
    }

    #[test]
    fn schema_only_matters_when_required() {
        let without = complete();
        let empty = complete().with_schema("");
        let filled = complete().with_schema("PUBLIC");

        assert_eq!(validate(&without, false), Ok(()));
        assert_eq!(validate(&empty, false), Ok(()));
        assert_eq!(
            validate(&without, true),
            Err(ValidationError::Missing(Field::Schema))
        );
        assert_eq!(
            validate(&empty, true),
            Err(ValidationError::Missing(Field::Schema))
        );
        assert_eq!(validate(&filled, true), Ok(()));
    }

    #[test]
    fn rejects_values_that_would_break_the_section_file() {
        let mut profile = complete();
        profile.password = "pw\nhost = evil".into();
        assert_eq!(
            validate(&profile, false),
            Err(ValidationError::LineBreak(Field::Password))
        );

        let bracketed = complete().with_id("prod]");
        assert_eq!(
            validate(&bracketed, false),
            Err(ValidationError::InvalidId("prod]".into()))
        );
    }

    #[test]
    fn whitespace_only_values_count_as_missing() {
        let mut profile = complete();
        profile.password = "   ".into();
        assert_eq!(
            validate(&profile, false),
            Err(ValidationError::Missing(Field::Password))
        );

        let blank_schema = complete().with_schema("  ");
        assert_eq!(
            validate(&blank_schema, true),
            Err(ValidationError::Missing(Field::Schema))
        );
    }

    #[test]
    fn rejects_values_with_surrounding_spaces() {
        let mut profile = complete();
        profile.password = " secret ".into();
        assert_eq!(
            validate(&profile, false),
            Err(ValidationError::Padded(Field::Password))
        );

        let padded_schema = complete().with_schema("PUBLIC ");
        assert_eq!(
            validate(&padded_schema, true),
            Err(ValidationError::Padded(Field::Schema))
        );
        assert_eq!(validate(&complete().with_schema("my schema"), true), Ok(()));
    }

    #[test]
    fn ids_must_be_usable_section_names() {
        assert_eq!(validate(&complete().with_id(""), false), Ok(()));
        assert_eq!(validate(&complete().with_id("prod db"), false), Ok(()));
        for id in ["  ", " prod", "prod\t"] {
            assert_eq!(
                validate(&complete().with_id(id), false),
                Err(ValidationError::InvalidId(id.into())),
                "id {id:?}"
            );
        }
        assert_eq!(
            validate(&complete().with_id("a\nb"), false),
            Err(ValidationError::LineBreak(Field::Id))
        );
    }

    #[test]
    fn snowflake_without_schema_names_the_schema_field() {
        let catalog = DefinitionCatalog::bundled().unwrap();
        let profile = ConnectionProfile::new("Snowflake", "acct", "443", "user", "pw", "DB");
        let err = validate_for(&profile, &catalog).unwrap_err();
        match err {
            Error::Validation(err) => {
                assert_eq!(err.field(), Field::Schema);
                assert!(err.to_string().contains("schema"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_reported_by_validate_for() {
        let catalog = DefinitionCatalog::bundled().unwrap();
        let mut profile = complete();
        profile.kind = "foobase".into();
        assert!(matches!(
            validate_for(&profile, &catalog),
            Err(Error::UnknownType(name)) if name == "foobase"
        ));
    }
}
