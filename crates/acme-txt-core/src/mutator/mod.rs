//! Record mutator
//!
//! Pure functions computing what a Present or CleanUp has to write, given
//! the record set currently stored at the provider (or its absence) and the
//! challenge key. No I/O happens here; the reconciler executes the plan.
//!
//! ## Present
//!
//! | Existing record          | Plan                          |
//! |--------------------------|-------------------------------|
//! | absent                   | `Create { initial_value: K }` |
//! | present, contains K      | `NoOp`                        |
//! | present, without K       | `Update { values: V ++ [K] }` |
//!
//! ## CleanUp
//!
//! | Existing record          | Plan                              |
//! |--------------------------|-----------------------------------|
//! | absent                   | `NoOp`                            |
//! | present, without K       | `NoOp`                            |
//! | present, contains K      | `Update { values: V \ {K} }`      |

use crate::traits::RecordSet;

/// The write a reconciliation step has to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Nothing to write
    NoOp,
    /// Create the record set with a single value
    Create {
        /// The only value of the new record set
        initial_value: String,
    },
    /// Replace the value set of the existing record set
    Update {
        /// The complete new value set
        values: Vec<String>,
    },
}

impl Plan {
    /// Whether this plan requires a write
    pub fn is_noop(&self) -> bool {
        matches!(self, Plan::NoOp)
    }
}

/// Plan publishing `key`
///
/// Existing values are kept in order; `key` is appended only when it is not
/// already published.
pub fn plan_present(existing: Option<&RecordSet>, key: &str) -> Plan {
    match existing {
        None => Plan::Create {
            initial_value: key.to_string(),
        },
        Some(record) if record.contains(key) => Plan::NoOp,
        Some(record) => {
            let mut values = Vec::with_capacity(record.values.len() + 1);
            values.extend(record.values.iter().cloned());
            values.push(key.to_string());
            Plan::Update { values }
        }
    }
}

/// Plan removing `key`
///
/// Every occurrence of `key` is dropped and the remaining values keep their
/// relative order. Other values are never touched, so concurrent challenges
/// on the same name survive each other's cleanup.
pub fn plan_clean_up(existing: Option<&RecordSet>, key: &str) -> Plan {
    match existing {
        Some(record) if record.contains(key) => Plan::Update {
            values: record
                .values
                .iter()
                .filter(|value| value.as_str() != key)
                .cloned()
                .collect(),
        },
        _ => Plan::NoOp,
    }
}
