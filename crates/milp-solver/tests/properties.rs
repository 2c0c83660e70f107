#![allow(clippy::float_cmp)]

use milp_solver::{Constraint, GridSearchConfig, GridSearchSolver, LpSolver, MilpProblem, Solution, Variable};
use proptest::prelude::*;

fn solve_with(config: GridSearchConfig, problem: &MilpProblem) -> Solution {
    let mut solver = GridSearchSolver::with_config(config).expect("valid config");
    solver.load_problem(problem).expect("valid problem");
    solver.solve()
}

fn coarse() -> GridSearchConfig {
    GridSearchConfig::default().with_steps(10)
}

/// Bounds on a small integer lattice so generated problems stay well formed.
fn bounds() -> impl Strategy<Value = (f64, f64)> {
    (-5i32..5, 0i32..8).prop_map(|(lb, width)| (lb as f64, (lb + width) as f64))
}

fn coefficient() -> impl Strategy<Value = f64> {
    (-4i32..=4).prop_map(|c| c as f64 * 0.5)
}

prop_compose! {
    fn small_problem(max_vars: usize)
        (n in 1..=max_vars)
        (vars in prop::collection::vec(bounds(), n),
         obj in prop::collection::vec(coefficient(), n),
         rows in prop::collection::vec(
             (prop::collection::vec(coefficient(), n), -6i32..6, 0i32..10),
             0..3),
         minimize in any::<bool>())
        -> MilpProblem
    {
        let mut problem = MilpProblem::new("generated");
        for (i, (lb, ub)) in vars.into_iter().enumerate() {
            let v = problem.add_variable(Variable::continuous(lb, ub));
            problem.set_obj_coef(v, obj[i]);
        }
        for (coefs, lb, width) in rows {
            let terms = coefs.into_iter().enumerate().collect();
            problem.add_constraint(Constraint::new(terms, lb as f64, (lb + width) as f64));
        }
        problem.set_minimize(minimize);
        problem
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn solve_is_deterministic(problem in small_problem(3)) {
        let first = solve_with(coarse(), &problem);
        let second = solve_with(coarse(), &problem);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn direction_flip_reports_same_optimum(problem in small_problem(3)) {
        let mut flipped = problem.clone();
        flipped.minimize = !problem.minimize;
        for c in &mut flipped.obj {
            *c = -*c;
        }

        let original = solve_with(coarse(), &problem);
        let mirrored = solve_with(coarse(), &flipped);

        // The reported value is in minimize sense, so both encodings agree on
        // it and on the point; the true objectives are negatives of each other.
        prop_assert_eq!(original.feasible, mirrored.feasible);
        prop_assert_eq!(&original.x, &mirrored.x);
        prop_assert_eq!(original.obj_value, mirrored.obj_value);
        if original.feasible {
            let a = problem.objective_value(&original.x);
            let b = flipped.objective_value(&mirrored.x);
            prop_assert!((a + b).abs() < 1e-9);
        }
    }

    #[test]
    fn tightening_never_improves(problem in small_problem(3), shrink in 0i32..4) {
        prop_assume!(problem.num_cons() > 0);
        let before = solve_with(coarse(), &problem);

        let mut tightened = problem.clone();
        let row = &mut tightened.cons[0];
        let half = (row.ub - row.lb) / 2.0;
        let delta = half.min(shrink as f64 * 0.5);
        row.lb += delta;
        row.ub -= delta;
        let after = solve_with(coarse(), &tightened);

        prop_assert!(
            !after.feasible || after.obj_value >= before.obj_value,
            "before {} after {}",
            before.obj_value,
            after.obj_value
        );
    }

    #[test]
    fn large_instances_evaluate_one_point(problem in small_problem(4)) {
        // Force the fallback regardless of size.
        let config = GridSearchConfig::default().with_max_grid_vars(0);
        let solution = solve_with(config, &problem);

        let expected: Vec<f64> = problem.vars.iter().map(|v| 0.5 * (v.lb + v.ub)).collect();
        prop_assert_eq!(&solution.x, &expected);

        let feasible = problem.cons.iter().all(|c| c.is_satisfied(&expected, 1e-9));
        prop_assert_eq!(solution.feasible, feasible);

        let raw = problem.objective_value(&expected);
        let directed = if problem.minimize { raw } else { -raw };
        prop_assert_eq!(solution.obj_value, directed);
    }
}

#[test]
fn empty_problem_for_any_direction() {
    for minimize in [true, false] {
        let mut problem = MilpProblem::new("empty");
        problem.set_minimize(minimize);
        let solution = solve_with(GridSearchConfig::default(), &problem);
        assert!(solution.feasible);
        assert_eq!(solution.obj_value, 0.0);
        assert!(solution.x.is_empty());
    }
}

#[test]
fn independent_solvers_on_threads() {
    let handles: Vec<_> = (0..4)
        .map(|k| {
            std::thread::spawn(move || {
                let mut problem = MilpProblem::default();
                let x = problem.add_variable(Variable::continuous(0.0, 10.0));
                problem.set_obj_coef(x, 1.0);
                problem.add_constraint(Constraint::new(vec![(x, 1.0)], k as f64, f64::INFINITY));
                solve_with(GridSearchConfig::default(), &problem)
            })
        })
        .collect();

    for (k, handle) in handles.into_iter().enumerate() {
        let solution = handle.join().expect("solver thread panicked");
        assert!(solution.feasible);
        assert!((solution.obj_value - k as f64).abs() < 1e-9);
    }
}
