//! Placement subsystem.
//!
//! The scheduler enumerates every (region, hardware class) pair that meets a
//! workload's latency bound, scores it under a [`Strategy`], and returns the
//! cheapest placement with a ranked shortlist. Replacement analysis lives
//! here too since it shares the same intensity lookups.

pub mod placement;
pub mod replacement;
pub mod strategy;

pub use placement::{PlacementSelector, Ranking};
pub use replacement::{BreakEven, BreakEvenAnalyzer, ReplacementAnalysis, ServerSnapshot};
pub use strategy::{ScoreInputs, Strategy};

use crate::intensity::BlendedIntensity;
use crate::model::CarbonEstimate;
use serde::Serialize;
use std::fmt;

/// One scored (region, hardware class) option for a workload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub region: String,
    pub hardware_class: String,
    pub age_years: f64,
    pub carbon_intensity: BlendedIntensity,
    #[serde(flatten)]
    pub estimate: CarbonEstimate,
    pub debt_ratio: f64,
    pub power_w: f64,
    pub latency_ms: f64,
    pub cost_factor: f64,
    pub available_servers: u32,
    pub score: f64,
}

/// Why nothing could be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoCandidateReason {
    /// Every region's latency exceeds the SLA bound.
    SlaExceeded,
    /// Some regions meet the SLA but none has a server available.
    NoCapacity,
}

impl fmt::Display for NoCandidateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoCandidateReason::SlaExceeded => f.write_str("no candidates met SLA"),
            NoCandidateReason::NoCapacity => f.write_str("no capacity in regions meeting SLA"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Placement {
    Selected(Candidate),
    NoViableCandidate { reason: NoCandidateReason },
}

/// Result of one scheduling call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementDecision {
    pub strategy: Strategy,
    pub duration_s: f64,
    pub sla_ms: f64,
    pub placement: Placement,
    /// Lowest-score candidates first, the selected one included.
    pub alternatives: Vec<Candidate>,
    pub candidates_evaluated: usize,
}

impl PlacementDecision {
    pub fn best(&self) -> Option<&Candidate> {
        match &self.placement {
            Placement::Selected(candidate) => Some(candidate),
            Placement::NoViableCandidate { .. } => None,
        }
    }

    pub fn is_placed(&self) -> bool {
        self.best().is_some()
    }

    pub fn no_candidate_reason(&self) -> Option<NoCandidateReason> {
        match self.placement {
            Placement::NoViableCandidate { reason } => Some(reason),
            Placement::Selected(_) => None,
        }
    }
}
