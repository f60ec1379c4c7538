//! Named tables a suite runs against.

use crate::error::{GuardError, Result};
use crate::sources::TableLoader;
use crate::table::Table;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// A name to [`Table`] map.
///
/// Tables are registered under their own [`Table::name`]. Registering a
/// second table with the same name replaces the first.
///
/// # Examples
///
/// ```rust
/// use tabular_guard::core::Catalog;
/// use tabular_guard::table::{DataType, Table};
///
/// let customers = Table::builder("customers")
///     .column("customer_id", DataType::Int64)
///     .build()?;
/// let catalog = Catalog::new().with_table(customers);
///
/// assert!(catalog.get("customers").is_ok());
/// assert!(catalog.get("orders").is_err());
/// # Ok::<(), tabular_guard::error::SchemaError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: BTreeMap<String, Table>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table, returning the one it replaced.
    pub fn insert(&mut self, table: Table) -> Option<Table> {
        self.tables.insert(table.name().to_string(), table)
    }

    /// Registers a table (builder style).
    pub fn with_table(mut self, table: Table) -> Self {
        self.insert(table);
        self
    }

    /// Looks a table up by name.
    pub fn get(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| GuardError::TableNotFound(name.to_string()))
    }

    /// Returns true if a table with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Returns the registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Materializes `names` through `loader` into a new catalog.
    #[instrument(skip(loader, names), fields(tables = names.len()))]
    pub async fn load<L, S>(loader: &L, names: &[S]) -> Result<Self>
    where
        L: TableLoader + ?Sized,
        S: AsRef<str> + Sync,
    {
        let mut catalog = Self::new();
        for name in names {
            let table = loader.load_table(name.as_ref()).await?;
            debug!(table = %table.name(), rows = table.num_rows(), "Loaded table");
            catalog.insert(table);
        }
        Ok(catalog)
    }
}

impl FromIterator<Table> for Catalog {
    fn from_iter<I: IntoIterator<Item = Table>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for table in iter {
            catalog.insert(table);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{DataType, Value};

    fn table(name: &str, rows: i64) -> Table {
        Table::builder(name)
            .column("id", DataType::Int64)
            .rows((0..rows).map(|id| vec![Value::from(id)]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_lookup_by_name() {
        let catalog: Catalog = vec![table("customers", 5), table("transactions", 5)]
            .into_iter()
            .collect();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["customers", "transactions"]);

        match catalog.get("orders") {
            Err(GuardError::TableNotFound(name)) => assert_eq!(name, "orders"),
            other => panic!("expected TableNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_insert_replaces_same_name() {
        let mut catalog = Catalog::new();
        assert!(catalog.insert(table("customers", 5)).is_none());
        let replaced = catalog.insert(table("customers", 2)).unwrap();
        assert_eq!(replaced.num_rows(), 5);
        assert_eq!(catalog.get("customers").unwrap().num_rows(), 2);
    }
}
