use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use milp_io::{MpsReader, ProblemReader};
use milp_solver::{GridSearchConfig, GridSearchSolver, LpSolver, MilpProblem, Solution};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "milp")]
#[command(about = "Load and solve small MILP instances", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the LP relaxation of a problem
    Solve {
        /// Problem source: `example` for the demo instance, or a file path
        #[arg(default_value = "example")]
        input: String,
        /// Read INPUT as an MPS file
        #[arg(long)]
        mps: bool,
        /// Advisory time limit in seconds
        #[arg(long, default_value_t = 5.0)]
        time_limit: f64,
        /// Grid intervals per variable
        #[arg(long)]
        steps: Option<usize>,
        /// Largest variable count searched on the grid
        #[arg(long)]
        max_grid_vars: Option<usize>,
        /// Feasibility tolerance
        #[arg(long)]
        tolerance: Option<f64>,
        /// Drop integrality annotations before solving
        #[arg(long)]
        relax: bool,
        /// Output format
        #[arg(short, long, value_enum, default_value = "pretty")]
        format: OutputFormat,
        /// Skip the problem summary
        #[arg(short, long)]
        quiet: bool,
    },
    /// Print a summary of a problem without solving it
    Show {
        /// Problem source: `example` for the demo instance, or a file path
        #[arg(default_value = "example")]
        input: String,
        /// Read INPUT as an MPS file
        #[arg(long)]
        mps: bool,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("MILP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load(input: &str, mps: bool) -> MilpProblem {
    let loaded = if mps {
        MpsReader::read_file(input).map_err(|e| e.to_string())
    } else {
        ProblemReader::read(input).map_err(|e| e.to_string())
    };

    match loaded {
        Ok(problem) => problem,
        Err(e) => {
            eprintln!("Failed to load problem: {}", e);
            eprintln!("Use 'example' or a supported path.");
            std::process::exit(1);
        }
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            input,
            mps,
            time_limit,
            steps,
            max_grid_vars,
            tolerance,
            relax,
            format,
            quiet,
        } => {
            let mut problem = load(&input, mps);
            if relax {
                problem = problem.relaxed();
            }

            let mut config = GridSearchConfig::new();
            if let Some(steps) = steps {
                config = config.with_steps(steps);
            }
            if let Some(n) = max_grid_vars {
                config = config.with_max_grid_vars(n);
            }
            if let Some(tol) = tolerance {
                config = config.with_tolerance(tol);
            }

            let mut solver: Box<dyn LpSolver> = match GridSearchSolver::with_config(config) {
                Ok(s) => Box::new(s),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            if !quiet && format == OutputFormat::Pretty {
                print!("{}", problem);
            }

            solver.set_time_limit(time_limit);
            if let Err(e) = solver.load_problem(&problem) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }

            let started = Instant::now();
            let solution = solver.solve();
            let elapsed = started.elapsed().as_secs_f64();
            tracing::info!(
                component = "cli",
                operation = "solve",
                input = %input,
                backend = solver.name(),
                feasible = solution.feasible,
                elapsed_seconds = elapsed,
                "Solve complete"
            );

            match format {
                OutputFormat::Pretty => {
                    println!("LP solve finished in {} seconds", elapsed);
                    print!("{}", solution);
                }
                OutputFormat::Json => print_json(solver.name(), &problem, &solution, elapsed),
            }
        }
        Commands::Show { input, mps } => {
            let problem = load(&input, mps);
            print!("{}", problem);
        }
    }
}

fn print_json(backend: &str, problem: &MilpProblem, solution: &Solution, elapsed: f64) {
    let report = serde_json::json!({
        "problem": problem.name,
        "backend": backend,
        "variables": problem.num_vars(),
        "constraints": problem.num_cons(),
        "solve_seconds": elapsed,
        "solution": solution,
    });
    match serde_json::to_string_pretty(&report) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error serializing solution: {}", e);
            std::process::exit(1);
        }
    }
}
