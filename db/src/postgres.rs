use async_trait::async_trait;
use nocdc_core::ConnectionError;
use tokio_postgres::NoTls;

use crate::Driver;

pub struct PostgresDriver;

#[async_trait]
impl Driver for PostgresDriver {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn schemes(&self) -> &'static [&'static str] {
        &["postgres", "postgresql"]
    }

    async fn probe(&self, dsn: &str) -> Result<(), ConnectionError> {
        let config: tokio_postgres::Config = dsn.parse().map_err(|err: tokio_postgres::Error| {
            ConnectionError::new("Malformed connection string.", err.to_string())
        })?;

        let (client, connection) = match config.connect(NoTls).await {
            Ok(conn) => conn,
            Err(err) => return Err(classify_connection_error(&err)),
        };
        let monitor = tokio::spawn(connection);
        // Dropping the client ends the session; the connection task then finishes.
        drop(client);
        if let Ok(Err(err)) = monitor.await {
            tracing::debug!("postgres connection closed with error: {err}");
        }
        Ok(())
    }
}

fn classify_connection_error(err: &tokio_postgres::Error) -> ConnectionError {
    use tokio_postgres::error::SqlState;

    let detail = err.to_string();
    if let Some(db_err) = err.as_db_error() {
        return match db_err.code() {
            &SqlState::INVALID_PASSWORD => {
                ConnectionError::new("Password authentication failed.", detail)
            }
            &SqlState::INVALID_AUTHORIZATION_SPECIFICATION => {
                ConnectionError::new("User does not exist or lacks permission.", detail)
            }
            &SqlState::INVALID_CATALOG_NAME => {
                ConnectionError::new("Database does not exist.", detail)
            }
            _ => ConnectionError::new(db_err.message().to_string(), detail),
        };
    }

    let lower = detail.to_lowercase();
    if lower.contains("connection refused") {
        ConnectionError::new(
            "Unable to reach the database host (connection refused).",
            detail,
        )
    } else if lower.contains("timeout") || lower.contains("timed out") {
        ConnectionError::new("Connection timed out.", detail)
    } else if lower.contains("lookup") || lower.contains("resolve") {
        ConnectionError::new("Unable to resolve the database host.", detail)
    } else {
        ConnectionError::new("Failed to connect to the database.", detail)
    }
}
