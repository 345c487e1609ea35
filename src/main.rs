//! Indirect-fire ballistic calculator: CLI.

use arty_calc::config::CalcConfig;
use arty_calc::correction::{correct_fire, CorrectionRequest, FireCorrection};
use arty_calc::dataset::{load_ballistic_data, DataSource, Dataset, SystemType};
use arty_calc::ffe::{solve_ffe, FfePattern};
use arty_calc::geometry::{meters_to_grid, parse_grid_to_meters, parse_position, Position3D, PositionInput};
use arty_calc::report::{
    render_correction, render_ffe, render_solutions, render_weapons, to_json_string,
    write_json_report,
};
use arty_calc::solution::{calculate, calculate_all_trajectories, prepare_input};
use arty_calc::trajectory::generate_trajectory_points;
use arty_calc::util::init_logging;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arty-calc")]
#[command(about = "Indirect-fire ballistic calculator (mortar, MLRS, howitzer)")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Ballistic dataset JSON (overrides the config file).
    #[arg(long, global = true, value_name = "JSON")]
    data: Option<PathBuf>,

    #[arg(long, global = true, value_name = "TOML")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Gun, target and weapon shared by the solving commands.
#[derive(Args)]
struct Shot {
    #[arg(long, value_name = "GRID")]
    gun: String,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    gun_z: f64,
    #[arg(long, value_name = "GRID")]
    target: String,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    target_z: f64,
    #[arg(long)]
    weapon: String,
    #[arg(long)]
    ammo: String,
    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PatternKind {
    Perpendicular,
    AlongBearing,
    Circular,
}

#[derive(Subcommand)]
enum Commands {
    /// List weapon systems and their ammunition.
    Weapons {
        #[arg(long, value_name = "TYPE", help = "mortar, mlrs or howitzer")]
        system_type: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Solve a gun/target pair.
    Solve {
        #[command(flatten)]
        shot: Shot,
        /// Force a charge level (or variant index).
        #[arg(long)]
        charge: Option<u32>,
        /// Show every in-range charge instead of the best one.
        #[arg(long)]
        all: bool,
    },
    /// Apply a spotting correction and re-solve.
    Correct {
        #[command(flatten)]
        shot: Shot,
        /// Left (-) / right (+) in meters.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        lr: f64,
        /// Drop (-) / add (+) in meters.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        ad: f64,
        /// Observer grid; corrections are then along the observer-target line.
        #[arg(long, value_name = "GRID")]
        observer: Option<String>,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        observer_z: f64,
        #[arg(long)]
        previous_charge: Option<u32>,
    },
    /// Solve a fire-for-effect sheaf.
    Ffe {
        #[command(flatten)]
        shot: Shot,
        #[arg(long, value_enum)]
        pattern: PatternKind,
        #[arg(long)]
        rounds: u32,
        #[arg(long)]
        spacing: Option<f64>,
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Sample display arcs for every in-range charge.
    Trajectory {
        #[command(flatten)]
        shot: Shot,
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Convert between grid references and meters.
    Grid {
        grid: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        x: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        y: Option<f64>,
        #[arg(long)]
        high_precision: bool,
    },
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => CalcConfig::load(path).map_err(|e| e.to_string())?,
        None => CalcConfig::default(),
    };

    if let Commands::Grid {
        grid,
        x,
        y,
        high_precision,
    } = &cli.command
    {
        return run_grid(grid.as_deref(), *x, *y, *high_precision || config.high_precision_grids);
    }

    let data_path = cli.data.clone().unwrap_or_else(|| config.dataset.clone());
    let dataset =
        load_ballistic_data(&DataSource::Path(data_path.clone())).map_err(|e| e.to_string())?;
    tracing::debug!(
        "loaded {} weapon system(s) from {}",
        dataset.weapons().len(),
        data_path.display()
    );

    match cli.command {
        Commands::Weapons { system_type, json } => run_weapons(&dataset, system_type, json),
        Commands::Solve { shot, charge, all } => run_solve(&dataset, &shot, charge, all),
        Commands::Correct {
            shot,
            lr,
            ad,
            observer,
            observer_z,
            previous_charge,
        } => {
            let observer = observer
                .map(|g| position(&g, observer_z))
                .transpose()?;
            run_correct(
                &dataset,
                &shot,
                FireCorrection { lr, ad },
                observer,
                previous_charge,
                config.high_precision_grids,
            )
        }
        Commands::Ffe {
            shot,
            pattern,
            rounds,
            spacing,
            radius,
        } => {
            let pattern = build_pattern(pattern, rounds, spacing, radius)?;
            run_ffe(&dataset, &shot, &pattern, config.max_ffe_rounds)
        }
        Commands::Trajectory { shot, out } => run_trajectory(&dataset, &shot, out),
        Commands::Grid { .. } => Ok(()),
    }
}

fn position(grid: &str, z: f64) -> Result<Position3D, String> {
    parse_position(&PositionInput::Grid {
        grid: grid.to_string(),
        z,
    })
    .map_err(|e| e.to_string())
}

fn shot_positions(shot: &Shot) -> Result<(Position3D, Position3D), String> {
    Ok((
        position(&shot.gun, shot.gun_z)?,
        position(&shot.target, shot.target_z)?,
    ))
}

fn build_pattern(
    kind: PatternKind,
    rounds: u32,
    spacing: Option<f64>,
    radius: Option<f64>,
) -> Result<FfePattern, String> {
    Ok(match kind {
        PatternKind::Perpendicular => FfePattern::Perpendicular {
            rounds,
            spacing: spacing.ok_or("--spacing is required for this pattern")?,
        },
        PatternKind::AlongBearing => FfePattern::AlongBearing {
            rounds,
            spacing: spacing.ok_or("--spacing is required for this pattern")?,
        },
        PatternKind::Circular => FfePattern::Circular {
            rounds,
            radius: radius.ok_or("--radius is required for circular patterns")?,
        },
    })
}

fn run_weapons(dataset: &Dataset, system_type: Option<String>, json: bool) -> Result<(), String> {
    let filter = system_type
        .map(|s| s.parse::<SystemType>())
        .transpose()
        .map_err(|e| e.to_string())?;
    let weapons = dataset.get_all_weapon_systems(filter);
    if json {
        println!("{}", to_json_string(&weapons)?);
    } else {
        print!("{}", render_weapons(&weapons));
    }
    Ok(())
}

fn run_solve(dataset: &Dataset, shot: &Shot, charge: Option<u32>, all: bool) -> Result<(), String> {
    let (gun, target) = shot_positions(shot)?;
    let mut input =
        prepare_input(dataset, gun, target, &shot.weapon, &shot.ammo).map_err(|e| e.to_string())?;
    if let Some(level) = charge {
        input = input.with_charge(level);
    }
    let solutions = if all {
        calculate_all_trajectories(dataset, &input).map_err(|e| e.to_string())?
    } else {
        vec![calculate(dataset, &input).map_err(|e| e.to_string())?]
    };
    if shot.json {
        println!("{}", to_json_string(&solutions)?);
    } else {
        print!("{}", render_solutions(&solutions));
    }
    Ok(())
}

fn run_correct(
    dataset: &Dataset,
    shot: &Shot,
    correction: FireCorrection,
    observer: Option<Position3D>,
    previous_charge: Option<u32>,
    high_precision: bool,
) -> Result<(), String> {
    let (gun, target) = shot_positions(shot)?;
    let outcome = correct_fire(
        dataset,
        &CorrectionRequest {
            weapon_id: &shot.weapon,
            ammo_id: &shot.ammo,
            gun,
            target,
            observer,
            correction,
            previous_charge,
        },
    )
    .map_err(|e| e.to_string())?;
    if shot.json {
        println!("{}", to_json_string(&outcome)?);
    } else {
        let grid = meters_to_grid(outcome.new_target.x, outcome.new_target.y, high_precision)
            .map_err(|e| e.to_string())?;
        println!("Grid {}", grid);
        print!("{}", render_correction(&outcome));
    }
    Ok(())
}

fn run_ffe(dataset: &Dataset, shot: &Shot, pattern: &FfePattern, max_rounds: u32) -> Result<(), String> {
    let (gun, target) = shot_positions(shot)?;
    let ffe = solve_ffe(dataset, gun, target, &shot.weapon, &shot.ammo, pattern, max_rounds)
        .map_err(|e| e.to_string())?;
    if shot.json {
        println!("{}", to_json_string(&ffe)?);
    } else {
        print!("{}", render_ffe(&ffe));
    }
    Ok(())
}

fn run_trajectory(dataset: &Dataset, shot: &Shot, out: Option<PathBuf>) -> Result<(), String> {
    let (gun, target) = shot_positions(shot)?;
    let input =
        prepare_input(dataset, gun, target, &shot.weapon, &shot.ammo).map_err(|e| e.to_string())?;
    let solutions = calculate_all_trajectories(dataset, &input).map_err(|e| e.to_string())?;
    let plot = generate_trajectory_points(&solutions);
    match out {
        Some(path) => {
            write_json_report(&plot, &path)?;
            tracing::info!("wrote {} arc(s) to {}", plot.arcs.len(), path.display());
        }
        None => println!("{}", to_json_string(&plot)?),
    }
    Ok(())
}

fn run_grid(grid: Option<&str>, x: Option<f64>, y: Option<f64>, high_precision: bool) -> Result<(), String> {
    match (grid, x, y) {
        (Some(g), _, _) => {
            let m = parse_grid_to_meters(g).map_err(|e| e.to_string())?;
            println!("{} {}", m.x, m.y);
            Ok(())
        }
        (None, Some(x), Some(y)) => {
            let grid = meters_to_grid(x, y, high_precision).map_err(|e| e.to_string())?;
            println!("{}", grid);
            Ok(())
        }
        _ => Err("provide a GRID or both --x and --y".to_string()),
    }
}
