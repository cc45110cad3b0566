use std::time::Duration;

use nocdc_core::{
    ConnectionError, ConnectionProfile, DefinitionCatalog, Error, Result, dsn, normalize_type_key,
};

use crate::{DependencyResolver, DriverRegistry, InstallPrompt, PackageEnvironment, scheme_of};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestOutcome {
    Success,
    /// The user declined to install missing drivers; nothing was attempted.
    Cancelled,
}

/// One-shot connectivity probe for a profile. Blocks the calling thread for
/// at most the configured timeout.
pub struct ConnectivityTester<'a> {
    catalog: &'a DefinitionCatalog,
    drivers: &'a DriverRegistry,
    timeout: Duration,
}

impl<'a> ConnectivityTester<'a> {
    pub fn new(catalog: &'a DefinitionCatalog, drivers: &'a DriverRegistry) -> Self {
        Self {
            catalog,
            drivers,
            timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn test(
        &self,
        profile: &ConnectionProfile,
        environment: &dyn PackageEnvironment,
        prompt: &dyn InstallPrompt,
    ) -> Result<TestOutcome> {
        let key = normalize_type_key(&profile.kind);
        let definition = self
            .catalog
            .get(&key)
            .ok_or_else(|| Error::UnknownType(profile.kind.clone()))?;

        let resolver = DependencyResolver::new(self.catalog, environment);
        let missing = resolver.missing_dependencies(&definition.key)?;
        if !missing.is_empty() {
            if !prompt.confirm_install(&missing) {
                tracing::info!(kind = %definition.key, ?missing, "connection test cancelled");
                return Ok(TestOutcome::Cancelled);
            }
            resolver.install(&missing)?;
            let unusable = resolver.missing_dependencies(&definition.key)?;
            if let Some(package) = unusable.first() {
                tracing::warn!(kind = %definition.key, ?unusable, "installed packages provide no driver");
                return Err(Error::PartialFailure {
                    package: package.clone(),
                    message: "the installer succeeded, but the package provides no driver \
                              this build can load"
                        .into(),
                    skipped: Vec::new(),
                });
            }
        }

        let mut target = profile.clone();
        target.normalize_for(definition);
        let dsn = dsn::render(&definition.connection_string, &target).map_err(|err| {
            ConnectionError::new("Malformed connection string template.", err.to_string())
        })?;

        tracing::info!(kind = %definition.key, host = %target.host, "testing connection");
        self.probe(&dsn)?;
        tracing::info!(kind = %definition.key, host = %target.host, "connection test succeeded");
        Ok(TestOutcome::Success)
    }

    /// Connects to `dsn` with the driver registered for its scheme.
    pub fn probe(&self, dsn: &str) -> std::result::Result<(), ConnectionError> {
        let scheme = scheme_of(dsn).ok_or_else(|| {
            ConnectionError::new(
                "Malformed connection string.",
                "connection string has no scheme",
            )
        })?;
        let driver = self.drivers.for_scheme(scheme).ok_or_else(|| {
            ConnectionError::new(
                "No driver is available for this database type.",
                format!("no driver registered for scheme '{scheme}'"),
            )
        })?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| {
                ConnectionError::new("Failed to start the connection runtime.", err.to_string())
            })?;

        let timeout = self.timeout;
        let outcome = runtime.block_on(async move {
            match tokio::time::timeout(timeout, driver.probe(dsn)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ConnectionError::new(
                    "Connection timed out.",
                    format!("no response within {} ms", timeout.as_millis()),
                )),
            }
        });
        if let Err(err) = &outcome {
            tracing::warn!(scheme, "connection test failed: {}", err.detail);
        }
        outcome
    }
}
