//! Dataset split names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One partition of the dataset.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    #[serde(alias = "valid", alias = "validation")]
    #[value(alias = "valid", alias = "validation")]
    Val,
    Test,
}

impl Split {
    /// All splits in canonical order.
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    /// Directory and manifest stem for this split.
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }

    /// Join a list of splits for messages, e.g. `train, val`.
    pub fn join(splits: &[Split]) -> String {
        splits
            .iter()
            .map(Split::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
