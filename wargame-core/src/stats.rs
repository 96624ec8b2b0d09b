//! Search statistics for reporting

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Node counts and timing for one search call
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Nodes visited, keyed by remaining depth (0 = leaves)
    pub nodes_per_depth: BTreeMap<u32, u64>,

    /// Wall-clock time spent searching
    pub elapsed_seconds: f64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one visited node
    pub fn record_node(&mut self, depth_remaining: u32) {
        *self.nodes_per_depth.entry(depth_remaining).or_insert(0) += 1;
    }

    #[must_use]
    pub fn total_nodes(&self) -> u64 {
        self.nodes_per_depth.values().sum()
    }

    #[must_use]
    pub fn nodes_at(&self, depth_remaining: u32) -> u64 {
        self.nodes_per_depth.get(&depth_remaining).copied().unwrap_or(0)
    }

    /// Node counts by ply from the root (1 = root), given the search's starting depth
    #[must_use]
    pub fn nodes_per_ply(&self, max_depth: u32) -> Vec<(u32, u64)> {
        self.nodes_per_depth
            .iter()
            .rev()
            .filter(|&(&depth, _)| depth <= max_depth)
            .map(|(&depth, &count)| (max_depth - depth + 1, count))
            .collect()
    }

    /// Share of all visited nodes per remaining depth, in percent
    #[must_use]
    pub fn percentages(&self) -> Vec<(u32, f64)> {
        let total = self.total_nodes();
        if total == 0 {
            return Vec::new();
        }
        self.nodes_per_depth
            .iter()
            .map(|(&depth, &count)| (depth, count as f64 * 100.0 / total as f64))
            .collect()
    }

    /// Leaves per node one level above them. None when there is nothing above
    /// the leaves to divide by.
    #[must_use]
    pub fn branching_factor(&self) -> Option<f64> {
        let parents = self.nodes_at(1);
        if parents == 0 {
            None
        } else {
            Some(self.nodes_at(0) as f64 / parents as f64)
        }
    }

    /// Nodes per second
    #[must_use]
    pub fn nodes_per_second(&self) -> f64 {
        if self.elapsed_seconds <= 0.0 {
            0.0
        } else {
            self.total_nodes() as f64 / self.elapsed_seconds
        }
    }
}

/// Totals across every search of a game
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub searches: u32,
    pub total_nodes: u64,
    pub total_seconds: f64,
}

impl SessionStats {
    pub fn absorb(&mut self, stats: &SearchStats) {
        self.searches += 1;
        self.total_nodes += stats.total_nodes();
        self.total_seconds += stats.elapsed_seconds;
    }

    #[must_use]
    pub fn nodes_per_second(&self) -> f64 {
        if self.total_seconds <= 0.0 {
            0.0
        } else {
            self.total_nodes as f64 / self.total_seconds
        }
    }
}
