use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use crate::common::{Agent, Solution};
use crate::map::Map;

#[derive(Debug, Serialize, Deserialize)]
pub struct AgentYaml {
    pub name: String,
    pub start: [usize; 2],
    pub goal: [usize; 2],
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MapYaml {
    pub dimensions: [usize; 2],
    #[serde(default)]
    pub obstacles: Vec<[usize; 2]>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub map: MapYaml,
    pub agents: Vec<AgentYaml>,
}

impl Scenario {
    pub fn from_yaml_str(s: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(s)
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open {path:?}"))?;
        let reader = BufReader::new(file);
        let scenario = serde_yaml::from_reader(reader)
            .with_context(|| format!("failed to parse scenario {path:?}"))?;
        Ok(scenario)
    }

    pub fn build_map(&self) -> Map {
        let obstacles: HashSet<(usize, usize)> = self
            .map
            .obstacles
            .iter()
            .map(|&[x, y]| (x, y))
            .collect();
        Map::new(self.map.dimensions[0], self.map.dimensions[1], obstacles)
    }

    /// Converts the scenario's agent list into solver agents, rejecting
    /// malformed input before any search runs: duplicate names, endpoints
    /// outside the grid or on obstacles, and shared start or goal cells
    /// (two agents that must begin or end on the same cell can never be
    /// separated).
    pub fn build_agents(&self, map: &Map) -> Result<Vec<Agent>> {
        let mut names = HashSet::new();
        let mut starts = HashSet::new();
        let mut goals = HashSet::new();
        let mut agents = Vec::with_capacity(self.agents.len());

        for (id, agent) in self.agents.iter().enumerate() {
            if !names.insert(agent.name.as_str()) {
                bail!("duplicate agent name {:?}", agent.name);
            }

            let start = (agent.start[0], agent.start[1]);
            let goal = (agent.goal[0], agent.goal[1]);
            if !map.is_passable(start.0, start.1) {
                bail!(
                    "agent {:?} start {start:?} is out of bounds or on an obstacle",
                    agent.name
                );
            }
            if !map.is_passable(goal.0, goal.1) {
                bail!(
                    "agent {:?} goal {goal:?} is out of bounds or on an obstacle",
                    agent.name
                );
            }
            if !starts.insert(start) {
                bail!("agent {:?} shares start {start:?} with another agent", agent.name);
            }
            if !goals.insert(goal) {
                bail!("agent {:?} shares goal {goal:?} with another agent", agent.name);
            }

            agents.push(Agent {
                id,
                name: agent.name.clone(),
                start,
                goal,
            });
        }

        Ok(agents)
    }
}

#[derive(Debug, Serialize)]
struct ScheduleState {
    t: usize,
    x: usize,
    y: usize,
}

#[derive(Debug, Serialize)]
struct ScheduleYaml {
    schedule: BTreeMap<String, Vec<ScheduleState>>,
    cost: usize,
}

/// Writes the solved schedule as YAML: a per-agent list of (t, x, y) states
/// plus the total cost.
pub fn write_schedule(path: &str, solution: &Solution, agents: &[Agent]) -> Result<()> {
    let mut schedule = BTreeMap::new();
    for agent in agents {
        let states = solution.paths[agent.id]
            .iter()
            .enumerate()
            .map(|(t, &(x, y))| ScheduleState { t, x, y })
            .collect();
        schedule.insert(agent.name.clone(), states);
    }

    let output = ScheduleYaml {
        schedule,
        cost: solution.cost,
    };

    let file = File::create(path).with_context(|| format!("failed to create {path:?}"))?;
    let mut writer = BufWriter::new(file);
    let yaml_data = serde_yaml::to_string(&output)?;
    writer.write_all(yaml_data.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = "
map:
  dimensions: [3, 3]
  obstacles:
    - [1, 1]
agents:
  - name: a1
    start: [0, 0]
    goal: [2, 0]
  - name: a2
    start: [2, 2]
    goal: [0, 2]
";

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::from_yaml_str(SCENARIO).unwrap();
        let map = scenario.build_map();
        assert_eq!(map.width, 3);
        assert_eq!(map.height, 3);
        assert!(!map.is_passable(1, 1));

        let agents = scenario.build_agents(&map).unwrap();
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].name, "a1");
        assert_eq!(agents[0].start, (0, 0));
        assert_eq!(agents[1].goal, (0, 2));
    }

    #[test]
    fn test_reject_duplicate_name() {
        let scenario = Scenario::from_yaml_str(
            "
map:
  dimensions: [3, 3]
agents:
  - name: a1
    start: [0, 0]
    goal: [2, 0]
  - name: a1
    start: [0, 1]
    goal: [2, 1]
",
        )
        .unwrap();
        let map = scenario.build_map();
        let err = scenario.build_agents(&map).unwrap_err();
        assert!(err.to_string().contains("duplicate agent name"));
    }

    #[test]
    fn test_reject_out_of_bounds_goal() {
        let scenario = Scenario::from_yaml_str(
            "
map:
  dimensions: [3, 3]
agents:
  - name: a1
    start: [0, 0]
    goal: [3, 0]
",
        )
        .unwrap();
        let map = scenario.build_map();
        assert!(scenario.build_agents(&map).is_err());
    }

    #[test]
    fn test_reject_goal_on_obstacle() {
        let scenario = Scenario::from_yaml_str(
            "
map:
  dimensions: [3, 3]
  obstacles:
    - [2, 0]
agents:
  - name: a1
    start: [0, 0]
    goal: [2, 0]
",
        )
        .unwrap();
        let map = scenario.build_map();
        let err = scenario.build_agents(&map).unwrap_err();
        assert!(err.to_string().contains("obstacle"));
    }

    #[test]
    fn test_reject_shared_start() {
        let scenario = Scenario::from_yaml_str(
            "
map:
  dimensions: [3, 3]
agents:
  - name: a1
    start: [0, 0]
    goal: [2, 0]
  - name: a2
    start: [0, 0]
    goal: [2, 1]
",
        )
        .unwrap();
        let map = scenario.build_map();
        let err = scenario.build_agents(&map).unwrap_err();
        assert!(err.to_string().contains("shares start"));
    }
}
