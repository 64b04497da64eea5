mod ddl;
mod dml;
mod query;

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, string::String};
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use self::{
    ddl::{ColumnDef, CreateTableStmt, DescribeStmt, DropTableStmt, ForeignKeyRef, ReferentialAction},
    dml::{DeleteStmt, InsertStmt, UpdateStmt},
    query::{JoinClause, JoinType, OrderBy, SelectItem, SelectStmt},
};

/// A parsed command.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Stmt {
    /// `CREATE DATABASE <name>`
    CreateDatabase(CreateDatabaseStmt),
    /// `DROP DATABASE <name>`
    DropDatabase(DropDatabaseStmt),
    /// `USE <name>`
    UseDatabase(UseDatabaseStmt),
    /// `SHOW DATABASES`
    ShowDatabases,
    /// `SHOW TABLES`
    ShowTables,
    /// `DESCRIBE <table>` / `DESC <table>`
    Describe(DescribeStmt),
    /// `CREATE TABLE ...`
    CreateTable(CreateTableStmt),
    /// `DROP TABLE <table>`
    DropTable(DropTableStmt),
    /// `INSERT INTO ...`
    Insert(InsertStmt),
    /// `SELECT ...`
    Select(Box<SelectStmt>),
    /// `UPDATE ... SET ...`
    Update(UpdateStmt),
    /// `DELETE FROM ...`
    Delete(DeleteStmt),
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDatabase(stmt) => write!(f, "{}", stmt),
            Self::DropDatabase(stmt) => write!(f, "{}", stmt),
            Self::UseDatabase(stmt) => write!(f, "{}", stmt),
            Self::ShowDatabases => f.write_str("SHOW DATABASES"),
            Self::ShowTables => f.write_str("SHOW TABLES"),
            Self::Describe(stmt) => write!(f, "{}", stmt),
            Self::CreateTable(stmt) => write!(f, "{}", stmt),
            Self::DropTable(stmt) => write!(f, "{}", stmt),
            Self::Insert(stmt) => write!(f, "{}", stmt),
            Self::Select(stmt) => write!(f, "{}", stmt),
            Self::Update(stmt) => write!(f, "{}", stmt),
            Self::Delete(stmt) => write!(f, "{}", stmt),
        }
    }
}

/// The `CREATE DATABASE` statement.
///
/// ```txt
/// CREATE DATABASE <database name>
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CreateDatabaseStmt {
    /// Database name.
    pub name: String,
}

impl fmt::Display for CreateDatabaseStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE DATABASE {}", self.name)
    }
}

/// The `DROP DATABASE` statement.
///
/// ```txt
/// DROP DATABASE <database name>
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DropDatabaseStmt {
    /// Database name.
    pub name: String,
}

impl fmt::Display for DropDatabaseStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DROP DATABASE {}", self.name)
    }
}

/// The `USE` statement, selecting the active database.
///
/// ```txt
/// USE <database name>
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UseDatabaseStmt {
    /// Database name.
    pub name: String,
}

impl fmt::Display for UseDatabaseStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "USE {}", self.name)
    }
}
