//! Weighted task selection

use crate::error::{RunnerError, RunnerResult};
use bankload_config::Variant;
use bankload_http::Endpoint;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use serde::Serialize;
use std::fmt;

/// Amount moved by every transfer, in cents
pub const TRANSFER_AMOUNT_CENTS: u64 = 1;

/// Work a virtual user can perform between two pauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    MakeTransfer,
    FetchReport,
}

impl TaskKind {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            TaskKind::MakeTransfer => Endpoint::MakeTransfer,
            TaskKind::FetchReport => Endpoint::FetchReport,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::MakeTransfer => write!(f, "make_transfer"),
            TaskKind::FetchReport => write!(f, "fetch_report"),
        }
    }
}

/// Task table with selection probability proportional to weight.
///
/// Zero-weight tasks are kept for reporting but never drawn.
#[derive(Debug, Clone)]
pub struct TaskSet {
    tasks: Vec<(TaskKind, u32)>,
    eligible: Vec<TaskKind>,
    index: WeightedIndex<u32>,
}

impl TaskSet {
    pub fn new(tasks: &[(TaskKind, u32)]) -> RunnerResult<Self> {
        let (eligible, weights): (Vec<TaskKind>, Vec<u32>) = tasks
            .iter()
            .filter(|(_, weight)| *weight > 0)
            .copied()
            .unzip();

        if eligible.is_empty() {
            return Err(RunnerError::InvalidWeights(
                "at least one task needs a positive weight".to_string(),
            ));
        }

        let index =
            WeightedIndex::new(&weights).map_err(|e| RunnerError::InvalidWeights(e.to_string()))?;

        Ok(Self {
            tasks: tasks.to_vec(),
            eligible,
            index,
        })
    }

    /// Task table of a script variant.
    ///
    /// Shared-account users transfer five times for every report. Peer to
    /// peer users only transfer.
    pub fn for_variant(variant: Variant) -> RunnerResult<Self> {
        let table: &[(TaskKind, u32)] = match variant {
            Variant::SharedAccount => &[(TaskKind::MakeTransfer, 5), (TaskKind::FetchReport, 1)],
            Variant::PeerToPeer => &[(TaskKind::MakeTransfer, 1), (TaskKind::FetchReport, 0)],
        };
        Self::new(table)
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> TaskKind {
        self.eligible[self.index.sample(rng)]
    }

    pub fn weight(&self, kind: TaskKind) -> u32 {
        self.tasks
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, w)| *w)
            .unwrap_or(0)
    }

    pub fn tasks(&self) -> &[(TaskKind, u32)] {
        &self.tasks
    }
}
