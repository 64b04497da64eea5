use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{database::DatabaseSnapshot, error::EngineError, Database};

/// The top-level registry of databases and the owner of the on-disk layout.
///
/// Layout under the data directory:
/// - `catalog.json` — `{"databases": ["name1", ...]}`
/// - `<name>.json` — one snapshot per database
///
/// The catalog persists eagerly: callers save the affected database after
/// every mutating command, and the metadata document is rewritten whenever
/// membership changes.
pub struct Catalog {
    data_dir: PathBuf,
    databases: IndexMap<String, Database>,
}

#[derive(Serialize, Deserialize, Default)]
struct CatalogMetadata {
    databases: Vec<String>,
}

impl Catalog {
    /// Opens a catalog rooted at `data_dir`, creating the directory if
    /// needed and loading every database listed in the metadata file.
    ///
    /// A snapshot that fails to load is skipped with a warning so one
    /// corrupt file does not take the whole catalog down.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;

        let mut catalog = Self {
            data_dir,
            databases: IndexMap::new(),
        };

        let metadata_path = catalog.metadata_path();
        if metadata_path.exists() {
            let metadata: CatalogMetadata = match fs::read_to_string(&metadata_path)
                .map_err(EngineError::from)
                .and_then(|text| serde_json::from_str(&text).map_err(EngineError::from))
            {
                Ok(metadata) => metadata,
                Err(err) => {
                    warn!(path = %metadata_path.display(), %err, "failed to load catalog metadata");
                    CatalogMetadata::default()
                }
            };
            for name in metadata.databases {
                match Self::load_snapshot(&catalog.database_path(&name)) {
                    Ok(database) => {
                        catalog.databases.insert(name, database);
                    }
                    Err(err) => {
                        warn!(database = %name, %err, "failed to load database snapshot");
                    }
                }
            }
        }

        info!(
            data_dir = %catalog.data_dir.display(),
            databases = catalog.databases.len(),
            "catalog opened"
        );
        Ok(catalog)
    }

    fn metadata_path(&self) -> PathBuf {
        self.data_dir.join("catalog.json")
    }

    fn database_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", name))
    }

    /// Creates a database, persisting the catalog metadata and an empty
    /// snapshot for it.
    pub fn create_database(&mut self, name: &str) -> Result<(), EngineError> {
        let name = name.trim();
        validate_database_name(name)?;
        if self.databases.contains_key(name) {
            return Err(EngineError::schema(format!(
                "Database '{}' already exists",
                name
            )));
        }

        self.databases
            .insert(name.to_string(), Database::new(name));
        self.save_metadata()?;
        self.save_database(name)?;
        info!(database = %name, "created database");
        Ok(())
    }

    /// Drops a database, removing its snapshot file and rewriting the
    /// catalog metadata.
    pub fn drop_database(&mut self, name: &str) -> Result<(), EngineError> {
        if self.databases.shift_remove(name).is_none() {
            return Err(EngineError::lookup(format!(
                "Database '{}' does not exist",
                name
            )));
        }

        let path = self.database_path(name);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        self.save_metadata()?;
        info!(database = %name, "dropped database");
        Ok(())
    }

    /// Looks up a database.
    pub fn database(&self, name: &str) -> Result<&Database, EngineError> {
        self.databases
            .get(name)
            .ok_or_else(|| EngineError::lookup(format!("Database '{}' does not exist", name)))
    }

    /// Looks up a database for mutation. The caller is expected to call
    /// [`Catalog::save_database`] once its command succeeds.
    pub fn database_mut(&mut self, name: &str) -> Result<&mut Database, EngineError> {
        self.databases
            .get_mut(name)
            .ok_or_else(|| EngineError::lookup(format!("Database '{}' does not exist", name)))
    }

    /// Whether the named database exists.
    pub fn database_exists(&self, name: &str) -> bool {
        self.databases.contains_key(name)
    }

    /// The database names, in creation order.
    pub fn database_names(&self) -> Vec<String> {
        self.databases.keys().cloned().collect()
    }

    /// Persists one database to its snapshot file, atomically: the
    /// document is written to a sibling temporary file, synced, and
    /// renamed over the target. A failed write never corrupts the
    /// previous snapshot.
    pub fn save_database(&self, name: &str) -> Result<(), EngineError> {
        let database = self.database(name)?;
        let snapshot = database.to_snapshot();
        let text = serde_json::to_string_pretty(&snapshot)?;
        self.write_atomically(&self.database_path(name), text.as_bytes())?;
        debug!(database = %name, "saved snapshot");
        Ok(())
    }

    fn save_metadata(&self) -> Result<(), EngineError> {
        let metadata = CatalogMetadata {
            databases: self.database_names(),
        };
        let text = serde_json::to_string_pretty(&metadata)?;
        self.write_atomically(&self.metadata_path(), text.as_bytes())
    }

    fn write_atomically(&self, target: &Path, contents: &[u8]) -> Result<(), EngineError> {
        let mut file = tempfile::NamedTempFile::new_in(&self.data_dir)?;
        file.write_all(contents)?;
        file.as_file().sync_all()?;
        file.persist(target).map_err(|err| err.error)?;
        Ok(())
    }

    fn load_snapshot(path: &Path) -> Result<Database, EngineError> {
        let text = fs::read_to_string(path)?;
        let snapshot: DatabaseSnapshot = serde_json::from_str(&text)?;
        Database::from_snapshot(snapshot)
    }
}

fn validate_database_name(name: &str) -> Result<(), EngineError> {
    if name.is_empty() {
        return Err(EngineError::schema("Database name cannot be empty"));
    }
    if !name
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
    {
        return Err(EngineError::schema(
            "Database name can only contain letters, numbers, underscores, and hyphens",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{row::RowMap, table::Column, Table};
    use pesadb_core::{DataType, Value};

    fn values(entries: &[(&str, Value)]) -> RowMap {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn create_and_drop_maintain_the_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = Catalog::open(dir.path()).unwrap();

        catalog.create_database("shop").unwrap();
        assert!(dir.path().join("catalog.json").exists());
        assert!(dir.path().join("shop.json").exists());

        catalog.drop_database("shop").unwrap();
        assert!(!dir.path().join("shop.json").exists());
        assert!(catalog.database_names().is_empty());
    }

    #[test]
    fn database_names_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = Catalog::open(dir.path()).unwrap();

        assert!(catalog.create_database("").is_err());
        assert!(catalog.create_database("no/slashes").is_err());
        catalog.create_database("ok_name-1").unwrap();
        let err = catalog.create_database("ok_name-1").unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn reopening_restores_saved_state() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut catalog = Catalog::open(dir.path()).unwrap();
            catalog.create_database("shop").unwrap();
            let db = catalog.database_mut("shop").unwrap();
            db.create_table(
                Table::new(
                    "t",
                    vec![
                        Column::primary_key("id", DataType::Int),
                        Column::plain("name", DataType::String),
                    ],
                )
                .unwrap(),
            )
            .unwrap();
            db.insert_into(
                "t",
                values(&[("id", Value::Int(1)), ("name", Value::from("a"))]),
            )
            .unwrap();
            catalog.save_database("shop").unwrap();
        }

        let catalog = Catalog::open(dir.path()).unwrap();
        let table = catalog.database("shop").unwrap().table("t").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].get("name"), Some(&Value::from("a")));
    }

    #[test]
    fn corrupt_snapshot_is_skipped_with_the_rest_loading() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut catalog = Catalog::open(dir.path()).unwrap();
            catalog.create_database("good").unwrap();
            catalog.create_database("bad").unwrap();
        }
        std::fs::write(dir.path().join("bad.json"), "{ not json").unwrap();

        let catalog = Catalog::open(dir.path()).unwrap();
        assert!(catalog.database_exists("good"));
        assert!(!catalog.database_exists("bad"));
    }
}
