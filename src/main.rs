use mapf_cbs::config::{Cli, Config};
use mapf_cbs::solver::{Solver, CBS};
use mapf_cbs::yaml::{self, Scenario};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();
    let cli = Cli::parse();

    let config = Config::new(&cli);
    config.validate()?;

    let scenario = Scenario::load_from_file(&config.scenario_path)
        .with_context(|| format!("error with scenario file: {}", config.scenario_path))?;
    let map = scenario.build_map();
    let agents = scenario
        .build_agents(&map)
        .context("invalid scenario input")?;
    info!("Loaded {} agents on a {}x{} map", agents.len(), map.width, map.height);

    let mut cbs_solver = CBS::new(agents.clone(), &map, config.node_budget);
    match cbs_solver.solve() {
        Ok(solution) => {
            assert!(solution.verify(&map, &agents));
            info!("solution cost: {}", solution.cost);
            if let Some(output_path) = &config.output_path {
                yaml::write_schedule(output_path, &solution, &agents)
                    .with_context(|| format!("error writing schedule to {output_path}"))?;
                info!("schedule written to {output_path}");
            }
        }
        Err(err) => error!("cbs solve fails: {err}"),
    }

    Ok(())
}
