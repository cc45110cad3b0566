use std::{collections::BTreeSet, process::Command};

use nocdc_core::{DefinitionCatalog, Error, Result};

use crate::DriverRegistry;

/// What the host environment can tell about, and do for, driver packages.
pub trait PackageEnvironment {
    fn is_installed(&self, package: &str) -> bool;

    /// Installs one package, returning the installer's message on failure.
    fn install(&self, package: &str) -> std::result::Result<(), String>;
}

/// Asks the user whether missing packages may be installed.
pub trait InstallPrompt {
    fn confirm_install(&self, missing: &BTreeSet<String>) -> bool;
}

impl<F> InstallPrompt for F
where
    F: Fn(&BTreeSet<String>) -> bool,
{
    fn confirm_install(&self, missing: &BTreeSet<String>) -> bool {
        self(missing)
    }
}

pub struct DependencyResolver<'a> {
    catalog: &'a DefinitionCatalog,
    environment: &'a dyn PackageEnvironment,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(catalog: &'a DefinitionCatalog, environment: &'a dyn PackageEnvironment) -> Self {
        Self {
            catalog,
            environment,
        }
    }

    /// Dependencies of `type_key` the environment does not have.
    pub fn missing_dependencies(&self, type_key: &str) -> Result<BTreeSet<String>> {
        let definition = self
            .catalog
            .get(type_key)
            .ok_or_else(|| Error::UnknownType(type_key.to_string()))?;
        Ok(definition
            .dependencies
            .iter()
            .filter(|package| !self.environment.is_installed(package))
            .cloned()
            .collect())
    }

    /// Installs `packages` one at a time; the first failure stops the rest.
    pub fn install(&self, packages: &BTreeSet<String>) -> Result<()> {
        let mut pending = packages.iter();
        while let Some(package) = pending.next() {
            tracing::info!(package = %package, "installing dependency");
            if let Err(message) = self.environment.install(package) {
                tracing::warn!(package = %package, "dependency install failed: {message}");
                return Err(Error::PartialFailure {
                    package: package.clone(),
                    message,
                    skipped: pending.cloned().collect(),
                });
            }
        }
        Ok(())
    }
}

/// External command that installs one package per run, the package name
/// being appended as the last argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl InstallerCommand {
    /// Splits a command line on whitespace. Returns `None` when it is blank.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn run(&self, package: &str) -> std::result::Result<(), String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(package)
            .output()
            .map_err(|err| format!("could not run {}: {err}", self.program))?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            Err(format!("{} exited with {}", self.program, output.status))
        } else {
            Err(stderr.to_string())
        }
    }
}

/// Treats the compiled-in drivers as the installed packages and hands
/// installation to an optional external command.
pub struct DriverEnvironment<'a> {
    drivers: &'a DriverRegistry,
    installer: Option<InstallerCommand>,
}

impl<'a> DriverEnvironment<'a> {
    pub fn new(drivers: &'a DriverRegistry, installer: Option<InstallerCommand>) -> Self {
        Self { drivers, installer }
    }
}

impl PackageEnvironment for DriverEnvironment<'_> {
    fn is_installed(&self, package: &str) -> bool {
        self.drivers.by_name(package).is_some()
    }

    fn install(&self, package: &str) -> std::result::Result<(), String> {
        match &self.installer {
            Some(installer) => installer.run(package),
            None => Err("no installer is configured. Please install it manually.".into()),
        }
    }
}
