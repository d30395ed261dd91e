//! Registry operations: batched conflict-aware writes and ordered reads.

use sea_orm::DatabaseConnection;

mod pull;
mod push;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// What happens to an already-stored row when a push hits a primary-key
/// conflict.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Overwrite the declared mutable columns of the conflicting row.
    #[default]
    Replace,
    /// Leave the conflicting row untouched.
    AppendOnly,
}

/// Options for a push call.
#[derive(Clone, Copy, Debug)]
pub struct PushOptions {
    /// Rows per insert statement; must be positive.
    pub batch_size: usize,
    pub mode: WriteMode,
}

impl PushOptions {
    pub fn replace(batch_size: usize) -> Self {
        Self {
            batch_size,
            mode: WriteMode::Replace,
        }
    }

    pub fn append_only(batch_size: usize) -> Self {
        Self {
            batch_size,
            mode: WriteMode::AppendOnly,
        }
    }
}

impl Default for PushOptions {
    fn default() -> Self {
        Self::replace(100)
    }
}

/// Options for a pull call. Zero means "unbounded" for `limit` and
/// "no skip" for `offset`, mirroring the SQL clauses they map to.
#[derive(Clone, Copy, Debug, Default)]
pub struct PullOptions {
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug)]
pub struct Registry {
    database: DatabaseConnection,
}

impl Registry {
    /// Return a builder for `Registry`. Help to build the struct.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }
}

/// The builder for `Registry`
#[derive(Default)]
pub struct RegistryBuilder {
    database: DatabaseConnection,
}

impl RegistryBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> RegistryBuilder {
        self.database = db;
        self
    }

    /// Construct `Registry`
    pub fn build(self) -> Registry {
        Registry {
            database: self.database,
        }
    }
}
