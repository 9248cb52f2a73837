use crate::map::Map;

/// One planning task: a named agent that must travel from `start` to `goal`.
/// `id` is the dense index assigned in scenario order; all solver-internal
/// bookkeeping is keyed by it, `name` only resurfaces in the output schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub id: usize,
    pub name: String,
    pub start: (usize, usize),
    pub goal: (usize, usize),
}

/// A conflict-free joint plan: one path per agent, indexed by agent id.
/// `paths[i][t]` is agent i's cell at time step t; an agent whose path has
/// ended is considered parked on its last cell for all later times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub paths: Vec<Vec<(usize, usize)>>,
    pub cost: usize,
}

fn position_at(path: &[(usize, usize)], step: usize) -> (usize, usize) {
    path[step.min(path.len() - 1)]
}

impl Solution {
    /// Full soundness check: endpoints, single-step continuity, passability,
    /// cost bookkeeping, and pairwise vertex/edge safety over the whole
    /// horizon (with wait-at-goal semantics for finished agents).
    pub fn verify(&self, map: &Map, agents: &[Agent]) -> bool {
        if self.paths.len() != agents.len() {
            return false;
        }

        let mut total_cost = 0;
        for (agent, path) in agents.iter().zip(&self.paths) {
            if path.is_empty() {
                return false;
            }
            if path[0] != agent.start || *path.last().unwrap() != agent.goal {
                return false;
            }
            for window in path.windows(2) {
                let (from, to) = (window[0], window[1]);
                if !map.is_passable(to.0, to.1) {
                    return false;
                }
                if from.0.abs_diff(to.0) + from.1.abs_diff(to.1) > 1 {
                    return false;
                }
            }
            total_cost += path.len() - 1;
        }
        if total_cost != self.cost {
            return false;
        }

        let max_length = self.paths.iter().map(|p| p.len()).max().unwrap_or(0);
        for step in 0..max_length {
            for i in 0..self.paths.len() {
                for j in (i + 1)..self.paths.len() {
                    let pos_i = position_at(&self.paths[i], step);
                    let pos_j = position_at(&self.paths[j], step);
                    if pos_i == pos_j {
                        return false;
                    }
                    let next_i = position_at(&self.paths[i], step + 1);
                    let next_j = position_at(&self.paths[j], step + 1);
                    if pos_i == next_j && pos_j == next_i {
                        return false;
                    }
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_map() -> Map {
        Map::new(3, 3, Default::default())
    }

    fn agents() -> Vec<Agent> {
        vec![
            Agent {
                id: 0,
                name: "a1".to_string(),
                start: (0, 0),
                goal: (2, 0),
            },
            Agent {
                id: 1,
                name: "a2".to_string(),
                start: (0, 2),
                goal: (2, 2),
            },
        ]
    }

    #[test]
    fn test_verify_accepts_disjoint_paths() {
        let solution = Solution {
            paths: vec![
                vec![(0, 0), (1, 0), (2, 0)],
                vec![(0, 2), (1, 2), (2, 2)],
            ],
            cost: 4,
        };
        assert!(solution.verify(&open_map(), &agents()));
    }

    #[test]
    fn test_verify_rejects_vertex_collision() {
        // Both agents stand on (1, 1) at step 2.
        let solution = Solution {
            paths: vec![
                vec![(0, 0), (0, 1), (1, 1), (2, 1), (2, 0)],
                vec![(0, 2), (1, 2), (1, 1), (1, 2), (2, 2)],
            ],
            cost: 8,
        };
        assert!(!solution.verify(&open_map(), &agents()));
    }

    #[test]
    fn test_verify_rejects_swap() {
        let mut agents = agents();
        agents[1].start = (2, 0);
        agents[1].goal = (0, 0);
        let solution = Solution {
            paths: vec![
                vec![(0, 0), (0, 0), (1, 0), (2, 0)],
                vec![(2, 0), (1, 0), (0, 0)],
            ],
            cost: 5,
        };
        assert!(!solution.verify(&open_map(), &agents));
    }

    #[test]
    fn test_verify_rejects_teleport_and_bad_cost() {
        let solution = Solution {
            paths: vec![vec![(0, 0), (2, 0)], vec![(0, 2), (1, 2), (2, 2)]],
            cost: 3,
        };
        assert!(!solution.verify(&open_map(), &agents()));

        let solution = Solution {
            paths: vec![
                vec![(0, 0), (1, 0), (2, 0)],
                vec![(0, 2), (1, 2), (2, 2)],
            ],
            cost: 7,
        };
        assert!(!solution.verify(&open_map(), &agents()));
    }
}
