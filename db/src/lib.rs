mod deps;
mod mssql;
mod mysql;
mod postgres;
mod tester;

use async_trait::async_trait;
use nocdc_core::ConnectionError;

pub use deps::{
    DependencyResolver, DriverEnvironment, InstallPrompt, InstallerCommand, PackageEnvironment,
};
pub use mssql::MssqlDriver;
pub use mysql::MySqlDriver;
pub use postgres::PostgresDriver;
pub use tester::{ConnectivityTester, DEFAULT_CONNECT_TIMEOUT, TestOutcome};

/// Protocol handling for one family of connection-string schemes.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Package name type definitions list as a dependency.
    fn name(&self) -> &'static str;

    fn schemes(&self) -> &'static [&'static str];

    /// Opens a connection to `dsn` and closes it again.
    async fn probe(&self, dsn: &str) -> Result<(), ConnectionError>;
}

pub struct DriverRegistry {
    drivers: Vec<Box<dyn Driver>>,
}

impl DriverRegistry {
    pub fn empty() -> Self {
        Self {
            drivers: Vec::new(),
        }
    }

    /// Every driver compiled into this crate.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(PostgresDriver);
        registry.register(MySqlDriver);
        registry.register(MssqlDriver);
        registry
    }

    pub fn register(&mut self, driver: impl Driver + 'static) {
        self.drivers.push(Box::new(driver));
    }

    pub fn by_name(&self, name: &str) -> Option<&dyn Driver> {
        self.drivers
            .iter()
            .find(|driver| driver.name().eq_ignore_ascii_case(name))
            .map(|driver| driver.as_ref())
    }

    pub fn for_scheme(&self, scheme: &str) -> Option<&dyn Driver> {
        self.drivers
            .iter()
            .find(|driver| {
                driver
                    .schemes()
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(scheme))
            })
            .map(|driver| driver.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.drivers.iter().map(|driver| driver.name()).collect()
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// The scheme of a URL-style connection string, without the `+dialect`
/// suffix some templates carry (`mysql+tls://` yields `mysql`).
pub fn scheme_of(dsn: &str) -> Option<&str> {
    let (scheme, _) = dsn.split_once("://")?;
    let scheme = scheme.split('+').next().unwrap_or(scheme);
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '.'));
    valid.then_some(scheme)
}
