use anyhow::anyhow;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "Grid CBS",
    about = "Optimal conflict-based search planner for grid worlds.",
    version = "1.0"
)]
pub struct Cli {
    #[arg(
        long,
        help = "Path to the YAML scenario file",
        default_value = "scenario/demo.yaml"
    )]
    pub scenario_path: String,

    #[arg(long, help = "Path to write the schedule YAML")]
    pub output_path: Option<String>,

    #[arg(
        long,
        help = "Abort after expanding this many high level nodes"
    )]
    pub node_budget: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub scenario_path: String,
    pub output_path: Option<String>,
    pub node_budget: Option<usize>,
}

impl Config {
    pub fn new(cli: &Cli) -> Self {
        Self {
            scenario_path: cli.scenario_path.clone(),
            output_path: cli.output_path.clone(),
            node_budget: cli.node_budget,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(node_budget) = self.node_budget {
            if node_budget == 0 {
                return Err(anyhow!("Node budget must be greater than 0"));
            }
        }
        Ok(())
    }
}
