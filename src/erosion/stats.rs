//! Aggregate statistics over a run of droplets.

use std::collections::HashMap;

use super::droplet::{DropletOutcome, Termination};

/// Totals collected while running droplets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErosionStats {
    /// Number of droplets simulated.
    pub droplets: usize,
    /// Sum of loop iterations across droplets.
    pub steps: u64,
    /// Total material removed from the grid.
    pub eroded: f64,
    /// Total material added back to the grid.
    pub deposited: f64,
    /// How many droplets stopped for each reason.
    pub terminations: HashMap<Termination, usize>,
}

impl ErosionStats {
    /// Adds one droplet's outcome to the totals.
    pub fn record(&mut self, outcome: &DropletOutcome) {
        self.droplets += 1;
        self.steps += outcome.steps as u64;
        self.eroded += outcome.eroded as f64;
        self.deposited += outcome.deposited as f64;
        *self.terminations.entry(outcome.termination).or_insert(0) += 1;
    }

    /// Folds another set of totals into this one.
    pub fn merge(&mut self, other: &ErosionStats) {
        self.droplets += other.droplets;
        self.steps += other.steps;
        self.eroded += other.eroded;
        self.deposited += other.deposited;
        for (&reason, &count) in &other.terminations {
            *self.terminations.entry(reason).or_insert(0) += count;
        }
    }

    /// Net change in total grid height (deposited minus eroded).
    pub fn net_change(&self) -> f64 {
        self.deposited - self.eroded
    }

    /// Number of droplets that stopped for `reason`.
    pub fn count(&self, reason: Termination) -> usize {
        self.terminations.get(&reason).copied().unwrap_or(0)
    }

    /// Mean number of steps per droplet, or 0 if none ran.
    pub fn mean_steps(&self) -> f64 {
        if self.droplets == 0 {
            0.0
        } else {
            self.steps as f64 / self.droplets as f64
        }
    }
}
