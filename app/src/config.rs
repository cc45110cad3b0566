use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context as _, bail};
use directories::BaseDirs;
use nocdc_db::{DEFAULT_CONNECT_TIMEOUT, InstallerCommand};
use nocdc_storage::PROFILES_FILE;

use crate::{GlobalArgs, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub connections: PathBuf,
    pub catalog_dir: Option<PathBuf>,
    pub timeout: Duration,
    pub installer: Option<InstallerCommand>,
}

impl Settings {
    pub fn resolve(globals: &GlobalArgs) -> Result<Self> {
        let connections = match &globals.connections {
            Some(path) => path.clone(),
            None => resolve_config_dir()?.join(PROFILES_FILE),
        };
        let timeout = match globals.timeout {
            Some(0) => bail!("The connection timeout must be at least one second"),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_CONNECT_TIMEOUT,
        };
        let settings = Self {
            connections,
            catalog_dir: globals.catalog_dir.clone(),
            timeout,
            installer: globals.installer.as_deref().and_then(InstallerCommand::parse),
        };
        tracing::debug!(?settings, "resolved settings");
        Ok(settings)
    }
}

fn resolve_config_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().context("Unable to determine config directory")?;
    let dir = base_dirs.config_dir().join("nocdc");
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir)
}
