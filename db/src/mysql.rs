use async_trait::async_trait;
use nocdc_core::ConnectionError;
use sqlx::{Connection, mysql::MySqlConnection};

use crate::Driver;

pub struct MySqlDriver;

#[async_trait]
impl Driver for MySqlDriver {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn schemes(&self) -> &'static [&'static str] {
        &["mysql", "mariadb"]
    }

    async fn probe(&self, dsn: &str) -> Result<(), ConnectionError> {
        let connection = MySqlConnection::connect(dsn)
            .await
            .map_err(|err| classify_connection_error(&err))?;
        connection.close().await.map_err(|err| {
            ConnectionError::new("Connected, but failed to close the connection.", err.to_string())
        })
    }
}

fn classify_connection_error(err: &sqlx::Error) -> ConnectionError {
    let detail = err.to_string();
    match err {
        sqlx::Error::Configuration(_) => ConnectionError::new("Malformed connection string.", detail),
        sqlx::Error::Io(_) => ConnectionError::new("Unable to reach the database host.", detail),
        sqlx::Error::Tls(_) => ConnectionError::new("TLS negotiation failed.", detail),
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            // SQLSTATE for "access denied"
            Some("28000") => ConnectionError::new("Access denied for this user.", detail),
            _ => ConnectionError::new(db_err.message().to_string(), detail),
        },
        _ => ConnectionError::new("Failed to connect to the database.", detail),
    }
}
