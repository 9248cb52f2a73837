use super::construct_path;
use crate::common::Agent;
use crate::map::Map;
use crate::solver::comm::{ConstraintSet, LowLevelOpenNode};
use crate::stat::Stats;

use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, instrument, trace};

/// Constrained shortest path for one agent over the time-expanded grid
/// (position x time), waiting allowed at unit cost. Returns `None` when no
/// path satisfies the constraint set; callers treat that as a pruned branch,
/// not an error.
///
/// A goal node is only final once its arrival time clears every vertex
/// constraint on the goal cell: a later constraint there means the agent
/// would have to vacate and return, so the search continues past the naive
/// arrival. Expansion is cut off at the latest constrained time plus the
/// grid size, past which any reachable goal would already have been reached.
#[instrument(skip_all, name="low_level_a_star", fields(agent = agent.id), level = "debug")]
pub(crate) fn a_star_search(
    map: &Map,
    agent: &Agent,
    constraints: &ConstraintSet,
    stats: &mut Stats,
) -> Option<Vec<(usize, usize)>> {
    debug!("constraints: {constraints:?}");
    let latest_goal_constraint = constraints.latest_goal_constraint(agent.goal);
    let time_limit = constraints.latest_time() + map.width * map.height;

    let mut open_list = BTreeSet::new();
    let mut closed_list = HashSet::new();
    let mut trace_map = HashMap::new();
    let mut g_cost_map = HashMap::new();

    let start_h_open_cost = map.heuristic(agent.start, agent.goal);
    let start_node = LowLevelOpenNode {
        position: agent.start,
        f_open_cost: start_h_open_cost,
        g_cost: 0,
        time: 0,
    };

    open_list.insert(start_node);
    g_cost_map.insert((agent.start, 0), 0);

    while let Some(current) = open_list.pop_first() {
        trace!("expand node: {current:?}");

        stats.low_level_expand_nodes += 1;

        closed_list.insert((current.position, current.time));

        if current.position == agent.goal
            && latest_goal_constraint.is_none_or(|time| current.time > time)
        {
            return Some(construct_path(
                &trace_map,
                (current.position, current.time),
            ));
        }

        // Time step increases as we move to the next node.
        let next_time = current.time + 1;
        if next_time > time_limit {
            continue;
        }

        // Assuming uniform cost.
        let tentative_g_cost = current.g_cost + 1;

        for neighbor in map.get_neighbors(current.position.0, current.position.1) {
            if closed_list.contains(&(neighbor, next_time)) {
                continue;
            }

            if constraints.violates_vertex(neighbor, next_time) {
                continue;
            }

            // Waiting is no motion, so only real moves are subject to edge
            // constraints.
            if neighbor != current.position
                && constraints.violates_edge(current.position, neighbor, current.time)
            {
                continue;
            }

            let old_g_cost = *g_cost_map
                .get(&(neighbor, next_time))
                .unwrap_or(&usize::MAX);
            if tentative_g_cost < old_g_cost {
                trace_map.insert((neighbor, next_time), (current.position, current.time));
                g_cost_map.insert((neighbor, next_time), tentative_g_cost);

                let h_open_cost = map.heuristic(neighbor, agent.goal);

                // Update old node in open list if it already appears there.
                if old_g_cost != usize::MAX {
                    open_list.remove(&LowLevelOpenNode {
                        position: neighbor,
                        f_open_cost: old_g_cost + h_open_cost,
                        g_cost: old_g_cost,
                        time: next_time,
                    });
                }

                open_list.insert(LowLevelOpenNode {
                    position: neighbor,
                    f_open_cost: tentative_g_cost + h_open_cost,
                    g_cost: tentative_g_cost,
                    time: next_time,
                });
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::comm::{EdgeConstraint, VertexConstraint};
    use std::collections::HashSet as StdHashSet;

    fn agent(start: (usize, usize), goal: (usize, usize)) -> Agent {
        Agent {
            id: 0,
            name: "a1".to_string(),
            start,
            goal,
        }
    }

    #[test]
    fn test_a_star_unconstrained() {
        let map = Map::new(3, 3, StdHashSet::new());
        let stats = &mut Stats::default();
        let path =
            a_star_search(&map, &agent((0, 0), (2, 0)), &ConstraintSet::default(), stats).unwrap();
        assert_eq!(path, vec![(0, 0), (1, 0), (2, 0)]);
    }

    #[test]
    fn test_a_star_vertex_constraint_on_path() {
        let map = Map::new(3, 3, StdHashSet::new());
        let mut constraints = ConstraintSet::default();
        constraints.vertex.insert(VertexConstraint {
            time_step: 1,
            position: (1, 0),
        });
        let stats = &mut Stats::default();
        let path = a_star_search(&map, &agent((0, 0), (2, 0)), &constraints, stats).unwrap();
        // One extra step to let the constrained cell clear.
        assert_eq!(path.len(), 4);
        assert_eq!(path[0], (0, 0));
        assert_eq!(*path.last().unwrap(), (2, 0));
        assert_ne!(path[1], (1, 0));
    }

    #[test]
    fn test_a_star_stay_at_goal() {
        // A constraint on the goal cell after the naive arrival time forces
        // the agent to be elsewhere at that time and come back.
        let map = Map::new(3, 3, StdHashSet::new());
        let mut constraints = ConstraintSet::default();
        constraints.vertex.insert(VertexConstraint {
            time_step: 5,
            position: (2, 0),
        });
        let stats = &mut Stats::default();
        let path = a_star_search(&map, &agent((0, 0), (2, 0)), &constraints, stats).unwrap();
        assert_eq!(path.len(), 7);
        assert_eq!(*path.last().unwrap(), (2, 0));
        assert_ne!(path[5], (2, 0));
    }

    #[test]
    fn test_a_star_edge_constraint() {
        let map = Map::new(5, 1, StdHashSet::new());
        let mut constraints = ConstraintSet::default();
        constraints.edge.insert(EdgeConstraint {
            time_step: 0,
            from: (0, 0),
            to: (1, 0),
        });
        let stats = &mut Stats::default();
        let path = a_star_search(&map, &agent((0, 0), (4, 0)), &constraints, stats).unwrap();
        // Forced to wait out the forbidden first move.
        assert_eq!(path.len(), 6);
        assert_eq!(path[1], (0, 0));
    }

    #[test]
    fn test_a_star_wait_exempt_from_edge_constraint() {
        let map = Map::new(2, 1, StdHashSet::new());
        let mut constraints = ConstraintSet::default();
        // A degenerate wait "edge" must not block waiting.
        constraints.edge.insert(EdgeConstraint {
            time_step: 0,
            from: (0, 0),
            to: (0, 0),
        });
        constraints.vertex.insert(VertexConstraint {
            time_step: 1,
            position: (1, 0),
        });
        let stats = &mut Stats::default();
        let path = a_star_search(&map, &agent((0, 0), (1, 0)), &constraints, stats).unwrap();
        assert_eq!(path, vec![(0, 0), (0, 0), (1, 0)]);
    }

    #[test]
    fn test_a_star_infeasible() {
        // Goal walled off entirely.
        let obstacles = StdHashSet::from([(1, 0), (0, 1), (1, 1)]);
        let map = Map::new(3, 3, obstacles);
        let stats = &mut Stats::default();
        assert!(
            a_star_search(&map, &agent((2, 2), (0, 0)), &ConstraintSet::default(), stats).is_none()
        );
    }
}
