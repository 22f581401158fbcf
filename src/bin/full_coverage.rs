// Full coverage of a square cell along a Hilbert curve, executed on the
// simulated waypoint navigator.
//
//   RUST_LOG=debug cargo run --bin full_coverage -- --order 4 --plot img/coverage.png

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use coverage_navigation::mission_planning::{FullCoverageMission, SimulatedNavigator};
use coverage_navigation::utils::Visualizer;
use coverage_navigation::{CoverageResult, MissionConfig, Visualizable};

#[derive(Debug, Parser)]
#[command(name = "full_coverage", about = "Hilbert-curve full coverage mission")]
struct Args {
    /// Mission configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Edge length of the square cell [m]
    #[arg(long)]
    cell_size: Option<f64>,

    /// Hilbert curve order
    #[arg(long)]
    order: Option<u32>,

    /// Simulated travel speed [m/s]
    #[arg(long)]
    speed: Option<f64>,

    /// Save a plot of the coverage path to this PNG file
    #[arg(long)]
    plot: Option<String>,

    /// Open the plot in a gnuplot window
    #[arg(long)]
    show: bool,
}

impl Args {
    fn mission_config(&self) -> CoverageResult<MissionConfig> {
        let mut config = match &self.config {
            Some(path) => MissionConfig::load(path)?,
            None => MissionConfig::default(),
        };
        if let Some(cell_size) = self.cell_size {
            config.coverage.cell_size = cell_size;
        }
        if let Some(order) = self.order {
            config.coverage.curve_order = order;
            config.coverage.curve_resolution = None;
        }
        if let Some(speed) = self.speed {
            config.simulation.speed = speed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn run(args: &Args) -> CoverageResult<()> {
    let config = args.mission_config()?;
    let mut navigator = SimulatedNavigator::new(config.simulated_navigator_config()?)?;
    let mission = FullCoverageMission::new(config)?;

    let report = mission.run(&mut navigator)?;
    log::info!(
        "{} waypoints, {:.2} m travelled, result {:?}",
        report.waypoint_count(),
        report.path_length,
        report.result
    );

    if args.plot.is_some() || args.show {
        let mut vis = Visualizer::new();
        vis.set_title("Hilbert Curve Full Coverage");
        report.visualize(&mut vis);

        if let Some(path) = &args.plot {
            vis.save_png(path, 800, 800)?;
            log::info!("plot saved to: {}", path);
        }
        if args.show {
            vis.show()?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
