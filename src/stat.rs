use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub costs: usize,
    pub time_us: usize,
    pub low_level_expand_nodes: usize,
    pub high_level_expand_nodes: usize,
}

impl Stats {
    pub(crate) fn print(&self) {
        info!(
            "Cost {:?} Time(microseconds) {:?} High level expand nodes number: {:?} Low level expand nodes number {:?}",
            self.costs, self.time_us, self.high_level_expand_nodes, self.low_level_expand_nodes
        );
    }
}
