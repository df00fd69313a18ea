use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{QueryError, Result};
use crate::loader::Statement;

/// `${NAME}` or one of the bare connection tokens.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|(BOOTSTRAP_SERVERS|SASL_USERNAME|SASL_PASSWORD|SCHEMA_REGISTRY_URL|API_KEY|API_SECRET)",
    )
    .expect("valid regex")
});

/// Bare tokens written directly into connector statements, and the variable
/// each one reads. `API_KEY`/`API_SECRET` are the SASL credentials.
const BARE_TOKENS: [(&str, &str); 6] = [
    ("BOOTSTRAP_SERVERS", "BOOTSTRAP_SERVERS"),
    ("SASL_USERNAME", "SASL_USERNAME"),
    ("SASL_PASSWORD", "SASL_PASSWORD"),
    ("SCHEMA_REGISTRY_URL", "SCHEMA_REGISTRY_URL"),
    ("API_KEY", "SASL_USERNAME"),
    ("API_SECRET", "SASL_PASSWORD"),
];

/// Variable a placeholder match reads from.
fn variable_for<'t>(caps: &Captures<'t>) -> &'t str {
    if let Some(name) = caps.get(1) {
        return name.as_str();
    }
    let token = caps.get(2).map_or("", |m| m.as_str());
    BARE_TOKENS
        .iter()
        .find(|(t, _)| *t == token)
        .map_or(token, |(_, var)| *var)
}

/// Replaces `${NAME}` tokens and the bare connection tokens with configured
/// values.
pub struct VariableSubstitutor {
    values: HashMap<String, String>,
}

impl VariableSubstitutor {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Variables referenced by `text`, deduplicated and sorted.
    pub fn placeholders(text: &str) -> Vec<String> {
        PLACEHOLDER
            .captures_iter(text)
            .map(|c| variable_for(&c).to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Substitute every placeholder in `statement`. Fails without producing
    /// any output if one or more variables have no value. The substituted
    /// values are kept on the result so logs can mask them.
    pub fn apply(&self, statement: &Statement) -> Result<Statement> {
        let names = Self::placeholders(&statement.text);
        let missing: Vec<String> = names
            .iter()
            .filter(|name| !self.values.contains_key(*name))
            .cloned()
            .collect();

        if !missing.is_empty() {
            return Err(QueryError::Unresolved {
                label: statement.label.clone(),
                names: missing,
            });
        }

        let text = PLACEHOLDER.replace_all(&statement.text, |caps: &Captures| {
            self.values[variable_for(caps)].clone()
        });

        let mut substituted = statement.substituted.clone();
        substituted.extend(names.iter().map(|name| self.values[name].clone()));

        Ok(Statement {
            label: statement.label.clone(),
            text: text.into_owned(),
            substituted,
        })
    }

    /// Substitute a whole batch. All statements are checked before any is
    /// returned, so a bad batch never reaches the dispatcher.
    pub fn apply_all(&self, statements: &[Statement]) -> Result<Vec<Statement>> {
        statements.iter().map(|s| self.apply(s)).collect()
    }
}
