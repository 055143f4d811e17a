//! Rules and rule composition
//!
//! A rule is a jq expression with a name. Rules from a transformer config keep
//! the names they were given; rules supplied inline (e.g. `-r` / `-a` on the
//! command line) are named by their position in the composed list.
//!
//! # Example
//!
//! ```yaml
//! rules:
//!   - name: readonly
//!     jq: '.paths |= map_values(with_entries(select(.key == "get")))'
//! ```

use serde::{Deserialize, Serialize};

/// One named jq expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule name, unique within a composed rule list
    pub name: String,

    /// jq expression, passed to the engine verbatim
    pub jq: String,
}

impl Rule {
    /// Create a rule
    pub fn new(name: impl Into<String>, jq: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            jq: jq.into(),
        }
    }
}

/// Rules applied around every transformer in a run.
///
/// Built once at process entry and handed to the loader; never mutated
/// while jobs run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Applied before each transformer's own rules
    pub prepend_rules: Vec<String>,

    /// Applied after each transformer's own rules
    pub append_rules: Vec<String>,
}

impl GlobalConfig {
    /// Whether there are no global rules at all
    pub fn is_empty(&self) -> bool {
        self.prepend_rules.is_empty() && self.append_rules.is_empty()
    }
}

/// Name each expression `rule-<n>`, counting up from `count_from`.
pub fn name_jq_rules<S: AsRef<str>>(count_from: usize, jq_rules: &[S]) -> Vec<Rule> {
    jq_rules
        .iter()
        .enumerate()
        .map(|(i, jq)| Rule::new(format!("rule-{}", count_from + i), jq.as_ref()))
        .collect()
}

/// Surround a transformer's rules with the global prepend and append rules.
///
/// Prepend rules are named from `rule-1`; append rules are named by their
/// position at the end of the combined list. The transformer's own rules keep
/// their names.
pub fn combine_rules(rules: &[Rule], global: &GlobalConfig) -> Vec<Rule> {
    let total = global.prepend_rules.len() + rules.len() + global.append_rules.len();

    let prepend = name_jq_rules(1, &global.prepend_rules);
    let append = name_jq_rules(total - global.append_rules.len() + 1, &global.append_rules);

    let mut all = Vec::with_capacity(total);
    all.extend(prepend);
    all.extend_from_slice(rules);
    all.extend(append);
    all
}
