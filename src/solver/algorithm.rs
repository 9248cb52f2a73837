mod astar;

pub(super) use astar::a_star_search;

use std::collections::HashMap;

type TimedCell = ((usize, usize), usize);

fn construct_path(trace: &HashMap<TimedCell, TimedCell>, goal: TimedCell) -> Vec<(usize, usize)> {
    let mut path = vec![goal.0];
    let mut current = goal;
    while let Some(&previous) = trace.get(&current) {
        path.push(previous.0);
        current = previous;
    }
    path.reverse();
    path
}
