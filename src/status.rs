use crate::phase::Phase;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a batch stands on a given day. Variants are declared in lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Planned,
    Induction,
    Training,
    Certification,
    Ojt,
    OjtCertification,
    Completed,
}

impl BatchStatus {
    pub const ALL: [BatchStatus; 7] = [
        BatchStatus::Planned,
        BatchStatus::Induction,
        BatchStatus::Training,
        BatchStatus::Certification,
        BatchStatus::Ojt,
        BatchStatus::OjtCertification,
        BatchStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Planned => "planned",
            BatchStatus::Induction => "induction",
            BatchStatus::Training => "training",
            BatchStatus::Certification => "certification",
            BatchStatus::Ojt => "ojt",
            BatchStatus::OjtCertification => "ojt_certification",
            BatchStatus::Completed => "completed",
        }
    }

    /// The phase this status corresponds to, if the batch is mid-program.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            BatchStatus::Planned | BatchStatus::Completed => None,
            BatchStatus::Induction => Some(Phase::Induction),
            BatchStatus::Training => Some(Phase::Training),
            BatchStatus::Certification => Some(Phase::Certification),
            BatchStatus::Ojt => Some(Phase::Ojt),
            BatchStatus::OjtCertification => Some(Phase::OjtCertification),
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.phase().is_some()
    }
}

impl From<Phase> for BatchStatus {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Induction => BatchStatus::Induction,
            Phase::Training => BatchStatus::Training,
            Phase::Certification => BatchStatus::Certification,
            Phase::Ojt => BatchStatus::Ojt,
            Phase::OjtCertification => BatchStatus::OjtCertification,
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        BatchStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("unknown batch status '{}'", value.trim()))
    }
}
