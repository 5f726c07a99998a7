//! Relational and delta predicates used to narrow a search

use super::error::{SearchError, SearchResult};
use super::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Comparison applied to each candidate during a search pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    Increased,
    Decreased,
    Changed,
    Unchanged,
}

/// What the current value of a candidate is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// A reference value supplied by the caller
    Reference,
    /// The value cached from the previous pass
    Previous,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 10] = [
        ComparisonOperator::Equal,
        ComparisonOperator::NotEqual,
        ComparisonOperator::Less,
        ComparisonOperator::Greater,
        ComparisonOperator::LessOrEqual,
        ComparisonOperator::GreaterOrEqual,
        ComparisonOperator::Increased,
        ComparisonOperator::Decreased,
        ComparisonOperator::Changed,
        ComparisonOperator::Unchanged,
    ];

    /// Arity table: which operand the current value is tested against
    pub const fn operand(&self) -> Operand {
        match self {
            ComparisonOperator::Equal
            | ComparisonOperator::NotEqual
            | ComparisonOperator::Less
            | ComparisonOperator::Greater
            | ComparisonOperator::LessOrEqual
            | ComparisonOperator::GreaterOrEqual => Operand::Reference,
            ComparisonOperator::Increased
            | ComparisonOperator::Decreased
            | ComparisonOperator::Changed
            | ComparisonOperator::Unchanged => Operand::Previous,
        }
    }

    /// Checks if this operator needs a caller-supplied reference value
    pub const fn requires_reference(&self) -> bool {
        matches!(self.operand(), Operand::Reference)
    }

    /// Symbolic token for this operator
    pub const fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::Less => "<",
            ComparisonOperator::Greater => ">",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::GreaterOrEqual => ">=",
            ComparisonOperator::Increased => "increased",
            ComparisonOperator::Decreased => "decreased",
            ComparisonOperator::Changed => "changed",
            ComparisonOperator::Unchanged => "unchanged",
        }
    }

    /// Evaluates the predicate over `(previous, current, reference)`.
    ///
    /// Reference operators fail with `InvalidConfiguration` when no reference
    /// is given. Delta operators ignore `reference`.
    pub fn evaluate(
        &self,
        previous: Value,
        current: Value,
        reference: Option<Value>,
    ) -> SearchResult<bool> {
        let against = match self.operand() {
            Operand::Reference => reference.ok_or_else(|| {
                SearchError::invalid_configuration(format!(
                    "operator '{}' requires a reference value",
                    self
                ))
            })?,
            Operand::Previous => previous,
        };
        let ordering = current.compare(&against);

        Ok(match self {
            ComparisonOperator::Equal | ComparisonOperator::Unchanged => {
                ordering == Some(Ordering::Equal)
            }
            ComparisonOperator::NotEqual | ComparisonOperator::Changed => {
                ordering != Some(Ordering::Equal)
            }
            ComparisonOperator::Less | ComparisonOperator::Decreased => {
                ordering == Some(Ordering::Less)
            }
            ComparisonOperator::Greater | ComparisonOperator::Increased => {
                ordering == Some(Ordering::Greater)
            }
            ComparisonOperator::LessOrEqual => {
                matches!(ordering, Some(Ordering::Less | Ordering::Equal))
            }
            ComparisonOperator::GreaterOrEqual => {
                matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
            }
        })
    }
}

impl FromStr for ComparisonOperator {
    type Err = SearchError;

    fn from_str(s: &str) -> SearchResult<Self> {
        let token = s.trim().to_ascii_lowercase();
        let op = match token.as_str() {
            "=" | "==" | "eq" | "equal" => ComparisonOperator::Equal,
            "!=" | "ne" | "not-equal" => ComparisonOperator::NotEqual,
            "<" | "lt" | "less-than" => ComparisonOperator::Less,
            ">" | "gt" | "greater-than" => ComparisonOperator::Greater,
            "<=" | "le" | "less-or-equal" => ComparisonOperator::LessOrEqual,
            ">=" | "ge" | "greater-or-equal" => ComparisonOperator::GreaterOrEqual,
            "increased" => ComparisonOperator::Increased,
            "decreased" => ComparisonOperator::Decreased,
            "changed" => ComparisonOperator::Changed,
            "unchanged" => ComparisonOperator::Unchanged,
            _ => return Err(SearchError::unknown_operator(s)),
        };
        Ok(op)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
