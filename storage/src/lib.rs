pub mod profiles;
pub mod section_file;

pub use profiles::{PROFILES_FILE, ProfileStore};
pub use section_file::{SectionFile, SyntaxError};
