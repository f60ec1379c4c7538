//! Loading tables from external collaborators.
//!
//! The checks only work on in-memory [`Table`]s. This module is the async
//! edge where data registered with a DataFusion [`SessionContext`] (CSV,
//! Parquet, in-memory batches, anything DataFusion can scan) is collected and
//! converted.

use crate::error::{GuardError, Result};
use crate::table::{Table, TableBuilder};
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use tracing::{debug, instrument};

/// Produces a [`Table`] by name.
///
/// # Examples
///
/// ```rust,ignore
/// use tabular_guard::core::Catalog;
/// use tabular_guard::sources::SessionLoader;
///
/// # async fn example(ctx: datafusion::prelude::SessionContext) -> tabular_guard::error::Result<()> {
/// let loader = SessionLoader::new(ctx).with_natural_key("customers", ["customer_id"]);
/// let catalog = Catalog::load(&loader, &["customers", "transactions"]).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait TableLoader: Debug + Send + Sync {
    /// Loads the table registered as `name`.
    ///
    /// A name the loader does not know is a [`GuardError::TableNotFound`].
    async fn load_table(&self, name: &str) -> Result<Table>;
}

/// Loads tables registered with a DataFusion session.
///
/// The whole table is collected into memory. Natural keys are not part of an
/// Arrow schema, so they are declared per table on the loader.
#[derive(Clone)]
pub struct SessionLoader {
    ctx: SessionContext,
    natural_keys: HashMap<String, Vec<String>>,
}

impl SessionLoader {
    /// Creates a loader over `ctx`.
    pub fn new(ctx: SessionContext) -> Self {
        Self {
            ctx,
            natural_keys: HashMap::new(),
        }
    }

    /// Declares the natural key used to identify rows of `table` in reports.
    pub fn with_natural_key<I, S>(mut self, table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.natural_keys
            .insert(table.into(), columns.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the underlying session.
    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }
}

impl Debug for SessionLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionLoader")
            .field("session_id", &self.ctx.session_id())
            .field("natural_keys", &self.natural_keys)
            .finish()
    }
}

#[async_trait]
impl TableLoader for SessionLoader {
    #[instrument(skip(self))]
    async fn load_table(&self, name: &str) -> Result<Table> {
        if !self.ctx.table_exist(name)? {
            return Err(GuardError::TableNotFound(name.to_string()));
        }

        let df = self.ctx.table(name).await?;
        let schema = df.schema().as_arrow().clone();
        let batches = df.collect().await?;
        debug!(
            table = %name,
            batches = batches.len(),
            "Collected table from session"
        );

        let mut builder = TableBuilder::from_arrow(name, &schema, &batches)?;
        if let Some(key) = self.natural_keys.get(name) {
            builder = builder.natural_key(key.iter().cloned());
        }
        Ok(builder.build()?)
    }
}
