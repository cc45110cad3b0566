pub mod catalog;
pub mod dsn;
pub mod error;
pub mod profiles;
pub mod search;
pub mod templates;
pub mod validate;

pub use catalog::{DatabaseTypeDefinition, DefinitionCatalog};
pub use error::{ConnectionError, Error, Result};
pub use profiles::{ConnectionProfile, ProfileId, normalize_type_key};
pub use templates::{FieldTemplate, TemplateStore};
pub use validate::{Field, ValidationError, validate, validate_for};
