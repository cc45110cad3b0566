use std::{
    fs,
    path::{Path, PathBuf},
};

use nocdc_core::{
    ConnectionProfile, Error, ProfileId, Result, ValidationError,
    profiles::GENERATED_ID_PREFIX, validate,
};

use crate::section_file::{Entries, SectionFile};

pub const PROFILES_FILE: &str = "connections.ini";

/// Connection profiles persisted in a section file, one section per profile.
///
/// Every operation reads the whole file and every mutation rewrites it.
/// Concurrent writers are not coordinated; the last write wins.
#[derive(Clone, Debug)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(config_dir: &Path) -> Self {
        Self::new(config_dir.join(PROFILES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> Result<Vec<ConnectionProfile>> {
        let file = self.load()?;
        Ok(file
            .sections()
            .map(|(id, entries)| profile_from_entries(id, entries))
            .collect())
    }

    pub fn get(&self, id: &str) -> Result<ConnectionProfile> {
        let file = self.load()?;
        file.section(id)
            .map(|entries| profile_from_entries(id, entries))
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Writes `profile` and returns its id.
    ///
    /// A new profile without an id gets the next free `connection_N`; an
    /// existing profile must already be in the file and is replaced in full.
    pub fn save(&self, profile: &ConnectionProfile, is_new: bool) -> Result<ProfileId> {
        validate(profile, false)?;
        let mut file = self.load()?;

        let id = if is_new {
            if profile.id.is_empty() {
                next_id(&file)
            } else if file.contains(&profile.id) {
                return Err(ValidationError::DuplicateId(profile.id.clone()).into());
            } else {
                profile.id.clone()
            }
        } else {
            if profile.id.is_empty() || !file.contains(&profile.id) {
                return Err(Error::NotFound(profile.id.clone()));
            }
            profile.id.clone()
        };

        file.set_section(id.clone(), entries_from_profile(profile));
        self.write(&file)?;
        tracing::info!(id = %id, kind = %profile.kind, is_new, "saved connection profile");
        Ok(id)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let mut file = self.load()?;
        if !file.remove_section(id) {
            return Err(Error::NotFound(id.to_string()));
        }
        self.write(&file)?;
        tracing::info!(id, "deleted connection profile");
        Ok(())
    }

    fn load(&self) -> Result<SectionFile> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let file = SectionFile::parse(&contents).map_err(|err| Error::Parse {
                    path: self.path.clone(),
                    line: err.line,
                    reason: err.reason,
                })?;
                tracing::debug!(path = %self.path.display(), profiles = file.len(), "read connections file");
                Ok(file)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(SectionFile::default()),
            Err(err) => Err(Error::io(&self.path, err)),
        }
    }

    fn write(&self, file: &SectionFile) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| Error::io(parent, err))?;
        }
        fs::write(&self.path, file.render()).map_err(|err| Error::io(&self.path, err))?;
        tracing::debug!(path = %self.path.display(), profiles = file.len(), "wrote connections file");
        Ok(())
    }
}

/// Starts at `count + 1` like the section count suggests, then skips ids
/// that are still taken (possible after deleting an earlier profile).
fn next_id(file: &SectionFile) -> ProfileId {
    (file.len() + 1..)
        .map(|n| format!("{GENERATED_ID_PREFIX}{n}"))
        .find(|candidate| !file.contains(candidate))
        .unwrap_or_default()
}

fn profile_from_entries(id: &str, entries: &Entries) -> ConnectionProfile {
    let field = |key: &str| entries.get(key).cloned().unwrap_or_default();
    ConnectionProfile {
        id: id.to_string(),
        kind: field("type"),
        host: field("host"),
        port: field("port"),
        username: field("username"),
        password: field("password"),
        database: field("database"),
        schema: entries
            .get("schema")
            .filter(|schema| !schema.is_empty())
            .cloned(),
    }
}

fn entries_from_profile(profile: &ConnectionProfile) -> Entries {
    let mut entries = Entries::new();
    entries.insert("type".into(), profile.kind.clone());
    entries.insert("host".into(), profile.host.clone());
    entries.insert("port".into(), profile.port.clone());
    entries.insert("username".into(), profile.username.clone());
    entries.insert("password".into(), profile.password.clone());
    entries.insert("database".into(), profile.database.clone());
    if let Some(schema) = profile.schema.as_ref().filter(|schema| !schema.is_empty()) {
        entries.insert("schema".into(), schema.clone());
    }
    entries
}
