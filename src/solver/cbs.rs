use super::comm::HighLevelOpenNode;
use super::{SolveError, Solver};
use crate::common::{Agent, Solution};
use crate::map::Map;
use crate::stat::Stats;

use std::collections::BTreeSet;
use std::time::Instant;
use tracing::debug;

/// Conflict-Based Search: a best-first branch-and-bound over constraint
/// sets. Every conflict produces both resolving children and the cheapest
/// open node is always expanded first, so the first conflict-free node
/// popped carries the minimum joint cost.
pub struct CBS {
    agents: Vec<Agent>,
    map: Map,
    stats: Stats,
    node_budget: Option<usize>,
}

impl CBS {
    pub fn new(agents: Vec<Agent>, map: &Map, node_budget: Option<usize>) -> Self {
        CBS {
            agents,
            map: map.clone(),
            stats: Stats::default(),
            node_budget,
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

impl Solver for CBS {
    fn solve(&mut self) -> Result<Solution, SolveError> {
        let total_solve_start_time = Instant::now();
        let mut open = BTreeSet::new();

        let root = HighLevelOpenNode::new(&self.agents, &self.map, &mut self.stats)
            .ok_or(SolveError::Exhausted)?;
        open.insert(root);

        while let Some(current_node) = open.pop_first() {
            let Some(conflict) = current_node.conflict else {
                // No conflicts, return solution.
                let total_solve_time = total_solve_start_time.elapsed();
                self.stats.time_us = total_solve_time.as_micros() as usize;
                self.stats.costs = current_node.cost;
                self.stats.print();

                return Ok(Solution {
                    paths: current_node.paths,
                    cost: current_node.cost,
                });
            };

            if let Some(budget) = self.node_budget {
                if self.stats.high_level_expand_nodes >= budget {
                    return Err(SolveError::BudgetExceeded {
                        expanded: self.stats.high_level_expand_nodes,
                    });
                }
            }

            debug!("conflict: {conflict:?}");
            self.stats.high_level_expand_nodes += 1;

            if let Some(child_1) =
                current_node.update_constraint(&conflict, true, &self.map, &mut self.stats)
            {
                open.insert(child_1);
            }

            if let Some(child_2) =
                current_node.update_constraint(&conflict, false, &self.map, &mut self.stats)
            {
                open.insert(child_2);
            }
        }

        Err(SolveError::Exhausted)
    }
}
