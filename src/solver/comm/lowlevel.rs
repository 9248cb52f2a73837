use std::cmp::Ordering;

/// A frontier entry of the time-expanded single-agent search. The ordering
/// is total so that a `BTreeSet` open list pops equal-cost nodes in a
/// reproducible order: smallest f first, then the node closer to the goal
/// (larger g), then time, then position.
#[derive(Clone, Eq, Debug, PartialEq, Hash)]
pub(crate) struct LowLevelOpenNode {
    pub(crate) position: (usize, usize),
    pub(crate) f_open_cost: usize,
    pub(crate) g_cost: usize,
    pub(crate) time: usize,
}

impl Ord for LowLevelOpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_open_cost
            .cmp(&other.f_open_cost)
            .then_with(|| self.g_cost.cmp(&other.g_cost).reverse())
            .then_with(|| self.time.cmp(&other.time))
            .then_with(|| self.position.cmp(&other.position))
    }
}

impl PartialOrd for LowLevelOpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
