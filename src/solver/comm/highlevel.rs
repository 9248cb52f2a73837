use crate::common::Agent;
use crate::map::Map;
use crate::solver::algorithm::a_star_search;
use crate::stat::Stats;

use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::debug;

/// Forbids one agent from occupying `position` at `time_step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct VertexConstraint {
    pub(crate) time_step: usize,
    pub(crate) position: (usize, usize),
}

/// Forbids one agent from moving `from -> to` between `time_step` and
/// `time_step + 1`. Waiting never violates an edge constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct EdgeConstraint {
    pub(crate) time_step: usize,
    pub(crate) from: (usize, usize),
    pub(crate) to: (usize, usize),
}

/// One agent's constraints in one constraint-tree node. Built by cloning the
/// parent's set and inserting exactly one constraint; never mutated once the
/// node owning it exists, so sibling branches cannot contaminate each other.
/// BTreeSets keep iteration and node ordering deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct ConstraintSet {
    pub(crate) vertex: BTreeSet<VertexConstraint>,
    pub(crate) edge: BTreeSet<EdgeConstraint>,
}

impl ConstraintSet {
    pub(crate) fn violates_vertex(&self, position: (usize, usize), time: usize) -> bool {
        self.vertex.contains(&VertexConstraint {
            time_step: time,
            position,
        })
    }

    pub(crate) fn violates_edge(
        &self,
        from: (usize, usize),
        to: (usize, usize),
        time: usize,
    ) -> bool {
        self.edge.contains(&EdgeConstraint {
            time_step: time,
            from,
            to,
        })
    }

    /// Latest time at which a vertex constraint pins the goal cell. Arriving
    /// at the goal is only final past this time: an earlier arrival would
    /// sit on the goal when the constraint fires.
    pub(crate) fn latest_goal_constraint(&self, goal: (usize, usize)) -> Option<usize> {
        self.vertex
            .iter()
            .filter(|c| c.position == goal)
            .map(|c| c.time_step)
            .max()
    }

    /// Latest time step any constraint refers to; used to bound the
    /// time-expanded search horizon.
    pub(crate) fn latest_time(&self) -> usize {
        let vertex_max = self.vertex.iter().map(|c| c.time_step).max().unwrap_or(0);
        let edge_max = self.edge.iter().map(|c| c.time_step).max().unwrap_or(0);
        vertex_max.max(edge_max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum ConflictType {
    Vertex {
        position: (usize, usize),
        time_step: usize,
    },
    /// `agent_1` moves `u -> v` while `agent_2` moves `v -> u` between
    /// `time_step` and `time_step + 1`.
    Edge {
        u: (usize, usize),
        v: (usize, usize),
        time_step: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Conflict {
    pub(crate) agent_1: usize,
    pub(crate) agent_2: usize,
    pub(crate) conflict_type: ConflictType,
}

/// A constraint-tree node: per-agent constraint sets, the joint paths planned
/// under them, their total cost, and the earliest conflict those paths
/// contain. Immutable after creation.
#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) struct HighLevelOpenNode {
    pub(crate) agents: Vec<Agent>,
    pub(crate) constraints: Vec<ConstraintSet>,
    pub(crate) conflict: Option<Conflict>,
    pub(crate) paths: Vec<Vec<(usize, usize)>>,
    pub(crate) cost: usize,
}

impl Ord for HighLevelOpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .cmp(&other.cost)
            // We still need to compare the actual paths, since it will indeed
            // influence the optimal solution
            .then_with(|| self.paths.cmp(&other.paths))
            .then_with(|| self.constraints.cmp(&other.constraints))
    }
}

impl PartialOrd for HighLevelOpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn position_at(path: &[(usize, usize)], step: usize) -> (usize, usize) {
    path[step.min(path.len() - 1)]
}

impl HighLevelOpenNode {
    /// Root node: empty constraint sets, each agent on its unconstrained
    /// shortest path. `None` when any agent has no path at all.
    pub(crate) fn new(agents: &[Agent], map: &Map, stats: &mut Stats) -> Option<Self> {
        let mut paths = Vec::with_capacity(agents.len());
        let mut total_cost = 0;

        for agent in agents {
            let path = a_star_search(map, agent, &ConstraintSet::default(), stats)?;
            total_cost += path.len() - 1;
            paths.push(path);
        }

        let mut root = HighLevelOpenNode {
            agents: agents.to_vec(),
            constraints: vec![ConstraintSet::default(); agents.len()],
            conflict: None,
            paths,
            cost: total_cost,
        };
        root.conflict = root.detect_first_conflict();

        debug!("High level start node {root:?}");
        Some(root)
    }

    /// Earliest conflict in the joint paths, or `None` when they are
    /// mutually feasible. Time is the outer loop and agent pairs are scanned
    /// in id order, so ties resolve to the smallest pair; finished agents
    /// are treated as parked on their last cell.
    pub(crate) fn detect_first_conflict(&self) -> Option<Conflict> {
        let max_length = self.paths.iter().map(|p| p.len()).max().unwrap_or(0);

        for step in 0..max_length {
            for i in 0..self.agents.len() {
                for j in (i + 1)..self.agents.len() {
                    let pos_i = position_at(&self.paths[i], step);
                    let pos_j = position_at(&self.paths[j], step);

                    if pos_i == pos_j {
                        return Some(Conflict {
                            agent_1: i,
                            agent_2: j,
                            conflict_type: ConflictType::Vertex {
                                position: pos_i,
                                time_step: step,
                            },
                        });
                    }

                    let next_i = position_at(&self.paths[i], step + 1);
                    let next_j = position_at(&self.paths[j], step + 1);

                    if pos_i == next_j && pos_j == next_i {
                        return Some(Conflict {
                            agent_1: i,
                            agent_2: j,
                            conflict_type: ConflictType::Edge {
                                u: pos_i,
                                v: next_i,
                                time_step: step,
                            },
                        });
                    }
                }
            }
        }

        None
    }

    /// Child node resolving `conflict` against one of its two agents: clone
    /// the parent's constraint sets, add the single new constraint, re-plan
    /// only that agent, and keep every other path unchanged. `None` when the
    /// constrained agent has no path left (the branch is pruned).
    pub(crate) fn update_constraint(
        &self,
        conflict: &Conflict,
        resolve_first: bool,
        map: &Map,
        stats: &mut Stats,
    ) -> Option<HighLevelOpenNode> {
        let mut new_constraints = self.constraints.clone();
        let agent_to_update = if resolve_first {
            conflict.agent_1
        } else {
            conflict.agent_2
        };

        match conflict.conflict_type {
            ConflictType::Vertex {
                position,
                time_step,
            } => {
                new_constraints[agent_to_update].vertex.insert(VertexConstraint {
                    time_step,
                    position,
                });
            }
            ConflictType::Edge { u, v, time_step } => {
                let (from, to) = if resolve_first { (u, v) } else { (v, u) };
                new_constraints[agent_to_update].edge.insert(EdgeConstraint {
                    time_step,
                    from,
                    to,
                });
            }
        }

        let new_path = a_star_search(
            map,
            &self.agents[agent_to_update],
            &new_constraints[agent_to_update],
            stats,
        )?;

        debug!("Update agent {agent_to_update:?} with path {new_path:?} for conflict {conflict:?}");

        let old_agent_cost = self.paths[agent_to_update].len() - 1;
        let new_agent_cost = new_path.len() - 1;
        let mut new_paths = self.paths.clone();
        new_paths[agent_to_update] = new_path;

        let mut new_node = HighLevelOpenNode {
            agents: self.agents.clone(),
            constraints: new_constraints,
            conflict: None,
            paths: new_paths,
            cost: self.cost - old_agent_cost + new_agent_cost,
        };
        new_node.conflict = new_node.detect_first_conflict();

        Some(new_node)
    }
}
