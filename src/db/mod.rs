//! Pooled query execution: pool setup, the executor seam, and the dispatch helper.

pub mod dispatch;
pub mod executor;
pub mod pool;
#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::{do_query, do_transaction, QueryResult, STATUS_ERR, STATUS_OK};
pub use executor::{PgExecutor, QueryExecutor, Row};
pub use pool::connect;
