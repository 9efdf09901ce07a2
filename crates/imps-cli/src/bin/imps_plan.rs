//! imps-plan - plan a strike mission offline and print its steer points.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imps_cli::{leg_summary, steer_point_table, MissionOverrides};
use imps_core::{scenario::Scenario, steer, AirportCatalog, MissionState, PlannerConfig, RoutePlanner};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario JSON to start from (defaults to the built-in mission)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Threat clearance in km
    #[arg(long)]
    margin: Option<f64>,

    /// Steer point stride
    #[arg(long)]
    gap: Option<usize>,

    /// Intermediate airport for the ingress leg ("" clears it)
    #[arg(long)]
    waypoint: Option<String>,

    /// Skip the return-to-base leg
    #[arg(long)]
    no_rtb: bool,

    /// Write steer points to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Save the resulting scenario to this JSON file
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("imps_cli=info".parse()?)
            .add_directive("imps_plan=info".parse()?)
            .add_directive("imps_core=info".parse()?))
        .init();

    let args = Args::parse();

    let mut mission = match &args.scenario {
        Some(path) => Scenario::read(path)
            .with_context(|| format!("loading scenario {}", path.display()))?
            .into_state(),
        None => MissionState::default(),
    };

    MissionOverrides {
        margin: args.margin,
        gap: args.gap,
        waypoint: args.waypoint.clone(),
        no_rtb: args.no_rtb,
    }
    .apply(&mut mission.params);

    let planner = RoutePlanner::new(PlannerConfig::default())?;
    let airports = AirportCatalog::default();

    println!(
        "Mission: {} -> {} ({:.4}, {:.4})",
        mission.params.start,
        mission.params.target_name,
        mission.params.target_lat,
        mission.params.target_lon
    );
    println!(
        "Margin {} km, RTB {}, waypoint {}, {} threats",
        mission.params.margin,
        mission.params.rtb,
        mission.params.waypoint.as_deref().unwrap_or("none"),
        mission.threats.len()
    );

    let plan = mission.plan(&planner, &airports)?;
    println!("{}", leg_summary("Ingress", &plan.ingress));
    if let Some(egress) = &plan.egress {
        println!("{}", leg_summary("Egress", egress));
    }

    if plan.has_route() {
        println!();
        print!("{}", steer_point_table(&plan.steer_points));
    } else {
        tracing::warn!("no feasible route to {}", mission.params.target_name);
    }

    if let Some(path) = &args.csv {
        std::fs::write(path, steer::to_csv(&plan.steer_points))
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Steer points written to {}", path.display());
    }

    if let Some(path) = &args.save {
        Scenario::capture(&mission)
            .write(path)
            .with_context(|| format!("saving scenario {}", path.display()))?;
        println!("Scenario saved to {}", path.display());
    }

    Ok(())
}
