pub mod dispatch;
pub mod error;
pub mod loader;
pub mod statements;
pub mod substitute;

pub use dispatch::{dispatch_all, DispatchOptions, StatementExecutor};
pub use error::{QueryError, Result};
pub use loader::{QueryLoader, QuerySource, Statement};
pub use substitute::VariableSubstitutor;
