use std::collections::HashSet;

/// Static grid world: bounds plus a set of blocked cells. Immutable for the
/// duration of one search.
#[derive(Debug, Clone)]
pub struct Map {
    pub width: usize,
    pub height: usize,
    obstacles: HashSet<(usize, usize)>,
}

impl Map {
    pub fn new(width: usize, height: usize, obstacles: HashSet<(usize, usize)>) -> Self {
        Map {
            width,
            height,
            obstacles,
        }
    }

    pub fn is_passable(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && !self.obstacles.contains(&(x, y))
    }

    /// Candidate successor cells of (x, y) for one time step: wait first,
    /// then the four moves in a fixed order so that equal-cost searches are
    /// reproducible. Out-of-bounds cells and obstacles are filtered here;
    /// time-dependent constraints are the caller's concern.
    pub fn get_neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let directions = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)];
        let mut neighbors = Vec::with_capacity(directions.len());

        for &(dx, dy) in &directions {
            let new_x = x as i64 + dx;
            let new_y = y as i64 + dy;
            if new_x >= 0
                && new_y >= 0
                && self.is_passable(new_x as usize, new_y as usize)
            {
                neighbors.push((new_x as usize, new_y as usize));
            }
        }

        neighbors
    }

    /// Manhattan distance, admissible and consistent for unit-cost
    /// 4-connected moves.
    pub fn heuristic(&self, position: (usize, usize), goal: (usize, usize)) -> usize {
        position.0.abs_diff(goal.0) + position.1.abs_diff(goal.1)
    }
}
