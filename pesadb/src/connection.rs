use tracing::info;

use pesadb_engine::Catalog;

use crate::{error::Error, executor::ExecuteResult, Executor};

/// The parsed pieces of a `pesadb://` connection URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// The database to connect to.
    pub database: String,
    /// The host. Informational only: pesadb is single-node and file-backed.
    pub host: String,
    /// The directory holding the catalog and snapshots.
    pub data_dir: String,
}

/// Parses a connection URL of the form
/// `pesadb://[host]/<database>[?data_dir=<path>]`.
///
/// The host defaults to `localhost` and the data directory to `data`.
/// The database name must be non-empty and match `[A-Za-z0-9_-]+`.
pub fn parse_connection_url(url: &str) -> Result<ConnectionInfo, Error> {
    let invalid = || {
        Error::Connection(format!(
            "Invalid connection URL format: {}. Expected format: pesadb://localhost/database_name or pesadb:///database_name",
            url
        ))
    };

    let rest = url.strip_prefix("pesadb://").ok_or_else(invalid)?;
    let (host, rest) = rest.split_once('/').ok_or_else(invalid)?;
    let host = if host.is_empty() { "localhost" } else { host };

    let (database, query) = match rest.split_once('?') {
        Some((database, query)) => (database, Some(query)),
        None => (rest, None),
    };
    let database = database.trim();
    if database.is_empty() {
        return Err(Error::Connection("Database name cannot be empty".into()));
    }
    if !database
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
    {
        return Err(Error::Connection(
            "Database name can only contain letters, numbers, underscores, and hyphens".into(),
        ));
    }

    let mut data_dir = "data".to_string();
    if let Some(query) = query {
        for parameter in query.split('&') {
            if let Some((key, value)) = parameter.split_once('=') {
                if key == "data_dir" {
                    data_dir = value.to_string();
                }
            }
        }
    }

    Ok(ConnectionInfo {
        database: database.to_string(),
        host: host.to_string(),
        data_dir,
    })
}

/// A connection to one database, auto-created on first contact.
///
/// The connection owns the catalog rooted at the URL's data directory and
/// an executor already pointed at the named database.
pub struct Connection {
    executor: Executor,
    info: ConnectionInfo,
}

impl Connection {
    /// Opens a connection from a `pesadb://` URL, creating the database
    /// if it does not exist yet.
    pub fn open(url: &str) -> Result<Self, Error> {
        let info = parse_connection_url(url)?;
        let catalog = Catalog::open(&info.data_dir)?;
        let mut executor = Executor::new(catalog);
        if !executor.catalog().database_exists(&info.database) {
            executor.catalog_mut().create_database(&info.database)?;
        }
        executor.use_database(&info.database)?;
        info!(database = %info.database, data_dir = %info.data_dir, "connected");
        Ok(Self { executor, info })
    }

    /// Executes one query string against the connected database.
    pub fn execute(&mut self, query: &str) -> Result<ExecuteResult, Error> {
        self.executor.execute_query(query)
    }

    /// The connected database name.
    pub fn database_name(&self) -> &str {
        &self.info.database
    }

    /// The parsed connection info.
    pub fn info(&self) -> &ConnectionInfo {
        &self.info
    }

    /// The underlying executor, for running commands against other
    /// databases of the same catalog.
    pub fn executor_mut(&mut self) -> &mut Executor {
        &mut self.executor
    }
}

/// Opens a [`Connection`]. Shorthand for [`Connection::open`].
pub fn connect(url: &str) -> Result<Connection, Error> {
    Connection::open(url)
}
