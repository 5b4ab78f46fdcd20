//! Fixed screening sequence and the admin-toggleable stage registry.

use serde::{Deserialize, Serialize};

/// One step in the fixed screening sequence. The declaration order is the
/// progression order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Documentation,
    Medical,
    Physical,
    SandModelling,
    Interview,
}

impl Stage {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Documentation,
            Self::Medical,
            Self::Physical,
            Self::SandModelling,
            Self::Interview,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Documentation => "Documentation",
            Self::Medical => "Medical Screening",
            Self::Physical => "Physical Assessment",
            Self::SandModelling => "Sand Modelling",
            Self::Interview => "Board Interview",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Documentation => "documentation",
            Self::Medical => "medical",
            Self::Physical => "physical",
            Self::SandModelling => "sand_modelling",
            Self::Interview => "interview",
        }
    }

    /// The stage a candidate enters after passing this one. `None` for the
    /// board interview, which completes the screening.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Documentation => Some(Self::Medical),
            Self::Medical => Some(Self::Physical),
            Self::Physical => Some(Self::SandModelling),
            Self::SandModelling => Some(Self::Interview),
            Self::Interview => None,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|stage| stage.slug() == raw.trim())
    }

    const fn index(self) -> usize {
        match self {
            Self::Documentation => 0,
            Self::Medical => 1,
            Self::Physical => 2,
            Self::SandModelling => 3,
            Self::Interview => 4,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Snapshot of one registry entry for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageState {
    pub stage: Stage,
    pub active: bool,
}

/// Active/locked flags over the fixed sequence. Locking a stage blocks new
/// assessment submissions for it system-wide; it never rewrites ledger rows
/// already created for that stage.
#[derive(Debug, Clone)]
pub struct StageRegistry {
    active: [bool; 5],
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::all_active()
    }
}

impl StageRegistry {
    pub fn all_active() -> Self {
        Self { active: [true; 5] }
    }

    pub fn is_active(&self, stage: Stage) -> bool {
        self.active[stage.index()]
    }

    /// Flips the active flag and returns the new state.
    pub fn toggle(&mut self, stage: Stage) -> bool {
        let slot = &mut self.active[stage.index()];
        *slot = !*slot;
        *slot
    }

    pub fn snapshot(&self) -> Vec<StageState> {
        Stage::ordered()
            .into_iter()
            .map(|stage| StageState {
                stage,
                active: self.is_active(stage),
            })
            .collect()
    }
}
