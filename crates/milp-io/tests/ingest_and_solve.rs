use milp_io::{IngestError, MpsReader, ProblemReader};
use milp_solver::{GridSearchSolver, LpSolver};

const KNAPSACK: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/knapsack.mps");

#[test]
fn test_demo_instance_solves_near_three() {
    let problem = ProblemReader::read("example").expect("demo always loads");

    let mut solver = GridSearchSolver::new();
    solver.set_time_limit(5.0);
    solver.load_problem(&problem).expect("demo is well formed");
    let solution = solver.solve();

    assert!(solution.feasible);
    assert!(
        solution.obj_value >= 3.0 - 1e-9 && solution.obj_value <= 3.2 + 1e-9,
        "obj = {}",
        solution.obj_value
    );
    assert_eq!(solution.x.len(), 2);
}

#[test]
fn test_mps_knapsack_relaxation() {
    let problem = MpsReader::read_file(KNAPSACK).expect("fixture parses");
    assert_eq!(problem.name, "KNAPSACK");
    assert!(!problem.minimize);
    assert_eq!(problem.num_integer_vars(), 2);

    let mut solver = GridSearchSolver::new();
    solver.load_problem(&problem.relaxed()).expect("fixture is well formed");
    let solution = solver.solve();

    // Both items fit exactly; maximize 5 is reported as -5.
    assert!(solution.feasible);
    assert!((solution.obj_value + 5.0).abs() < 1e-6, "obj = {}", solution.obj_value);
    assert!((solution.x[0] - 1.0).abs() < 1e-6);
    assert!((solution.x[1] - 1.0).abs() < 1e-6);
}

#[test]
fn test_mps_file_is_not_handled_by_adapter() {
    // The adapter never parses files, even valid MPS ones.
    let err = ProblemReader::read(KNAPSACK).unwrap_err();
    assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
}
