use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Induction,
    Training,
    Certification,
    Ojt,
    OjtCertification,
}

impl Phase {
    /// Phases in the order a batch goes through them.
    pub const ALL: [Phase; 5] = [
        Phase::Induction,
        Phase::Training,
        Phase::Certification,
        Phase::Ojt,
        Phase::OjtCertification,
    ];

    pub fn index(&self) -> usize {
        match self {
            Phase::Induction => 0,
            Phase::Training => 1,
            Phase::Certification => 2,
            Phase::Ojt => 3,
            Phase::OjtCertification => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Induction => "induction",
            Phase::Training => "training",
            Phase::Certification => "certification",
            Phase::Ojt => "ojt",
            Phase::OjtCertification => "ojt_certification",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Working-day length of each phase. A zero-length phase still gets a one-day marker window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurations {
    #[serde(default)]
    pub induction: u32,
    #[serde(default)]
    pub training: u32,
    #[serde(default)]
    pub certification: u32,
    #[serde(default)]
    pub ojt: u32,
    #[serde(default)]
    pub ojt_certification: u32,
}

impl PhaseDurations {
    pub fn new(
        induction: u32,
        training: u32,
        certification: u32,
        ojt: u32,
        ojt_certification: u32,
    ) -> Self {
        Self {
            induction,
            training,
            certification,
            ojt,
            ojt_certification,
        }
    }

    pub fn get(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Induction => self.induction,
            Phase::Training => self.training,
            Phase::Certification => self.certification,
            Phase::Ojt => self.ojt,
            Phase::OjtCertification => self.ojt_certification,
        }
    }

    pub fn set(&mut self, phase: Phase, days: u32) {
        match phase {
            Phase::Induction => self.induction = days,
            Phase::Training => self.training = days,
            Phase::Certification => self.certification = days,
            Phase::Ojt => self.ojt = days,
            Phase::OjtCertification => self.ojt_certification = days,
        }
    }

    pub fn total_working_days(&self) -> u64 {
        Phase::ALL
            .iter()
            .map(|phase| u64::from(self.get(*phase)))
            .sum()
    }
}
