use std::time::Duration;

use async_trait::async_trait;
use statement_client::StatementClient;
use tracing::{debug, error, info};

use crate::loader::Statement;

/// Submits one statement and reports whether the service accepted it.
/// Implementations never fail: every problem is logged and becomes `false`.
/// Anything logged passes through `Statement::redact`.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute(&self, statement: &Statement) -> bool;
}

#[async_trait]
impl StatementExecutor for StatementClient {
    async fn execute(&self, statement: &Statement) -> bool {
        info!(url = %self.endpoint().url(), label = %statement.label, "Submitting statement");
        debug!(statement = %statement.redact(&statement.text));

        match self.submit(&statement.text).await {
            Ok(resp) => {
                let body = serde_json::to_string_pretty(&resp.body).unwrap_or_default();
                info!(
                    status = resp.status,
                    "Statement executed successfully:\n{}",
                    statement.redact(&body)
                );
                true
            }
            Err(e) => {
                error!("Error executing statement: {}", statement.redact(&e.to_string()));
                false
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Pause after each accepted statement.
    pub delay: Duration,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(5),
        }
    }
}

/// Submit statements one at a time, in order. Returns one success flag per
/// statement. A failure never stops the run; only accepted statements are
/// followed by the delay.
pub async fn dispatch_all(
    statements: &[Statement],
    executor: &dyn StatementExecutor,
    options: &DispatchOptions,
) -> Vec<bool> {
    let total = statements.len();
    let mut outcomes = Vec::with_capacity(total);

    for (i, statement) in statements.iter().enumerate() {
        let n = i + 1;
        info!(label = %statement.label, "Executing statement {n} of {total}");

        let ok = executor.execute(statement).await;
        outcomes.push(ok);

        if ok {
            info!("Successfully executed statement {n}");
            if !options.delay.is_zero() {
                tokio::time::sleep(options.delay).await;
            }
        } else {
            error!(label = %statement.label, "Failed to execute statement {n}");
        }
    }

    outcomes
}
