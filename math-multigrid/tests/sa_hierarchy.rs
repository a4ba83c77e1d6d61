//! End-to-end tests of smoothed aggregation hierarchy construction
//!
//! These build complete hierarchies from model operators and check the
//! structural invariants every hierarchy must satisfy: level bookkeeping,
//! operator shapes, aggregation partitions, termination and all-or-nothing
//! failure handling.

use approx::assert_relative_eq;
use math_audio_multigrid::aggregation::check_partition;
use math_audio_multigrid::{
    AmgError, CoarseSolver, CooMatrix, CsrMatrix, DiaMatrix, JacobiSmoother, LinearOperator,
    LuFactorization, SaOptions, SetupStep, SmoothedAggregation, Smoother, SparseFormat,
    SparseMatrix, StandardStrategy, StrategyError,
};
use ndarray::Array1;
use num_complex::Complex64;

type Sa = SmoothedAggregation<f64>;

/// 1D Poisson operator, tridiag(-1, 2, -1)
fn laplacian_1d(n: usize) -> CsrMatrix<f64> {
    let mut triplets = Vec::with_capacity(3 * n);
    for i in 0..n {
        triplets.push((i, i, 2.0));
        if i > 0 {
            triplets.push((i, i - 1, -1.0));
        }
        if i + 1 < n {
            triplets.push((i, i + 1, -1.0));
        }
    }
    CsrMatrix::from_triplets(n, n, triplets)
}

/// 2D Poisson operator on an `m x m` grid, 5-point stencil
fn laplacian_2d(m: usize) -> CsrMatrix<f64> {
    let n = m * m;
    let idx = |i: usize, j: usize| i * m + j;
    let mut triplets = Vec::with_capacity(5 * n);
    for i in 0..m {
        for j in 0..m {
            let row = idx(i, j);
            triplets.push((row, row, 4.0));
            if i > 0 {
                triplets.push((row, idx(i - 1, j), -1.0));
            }
            if i + 1 < m {
                triplets.push((row, idx(i + 1, j), -1.0));
            }
            if j > 0 {
                triplets.push((row, idx(i, j - 1), -1.0));
            }
            if j + 1 < m {
                triplets.push((row, idx(i, j + 1), -1.0));
            }
        }
    }
    CsrMatrix::from_triplets(n, n, triplets)
}

fn options(min_level_size: usize, max_levels: usize) -> SaOptions {
    SaOptions::default()
        .min_level_size(min_level_size)
        .max_levels(max_levels)
}

/// Structural checks shared by every successfully built hierarchy
fn assert_well_formed<M, Sm, So>(sa: &SmoothedAggregation<f64, StandardStrategy, M, Sm, So>)
where
    M: SparseMatrix<f64>,
    Sm: Smoother<f64, M>,
    So: CoarseSolver<f64>,
{
    let levels = sa.levels();
    let setup = sa.setup_levels();
    assert_eq!(levels.len(), setup.len());
    assert!(!levels.is_empty());

    let num_levels = levels.len();
    for (lvl, (level, setup_level)) in levels.iter().zip(setup).enumerate() {
        let a = level.a.as_ref().expect("every level is materialized");
        assert_eq!(a.num_rows(), setup_level.a.num_rows);
        assert_eq!(a.num_cols(), setup_level.a.num_cols);
        assert_eq!(setup_level.b.len(), setup_level.a.num_rows);
        assert_eq!(level.smoother.is_some(), num_levels > 1);

        if lvl > 0 {
            assert_eq!(level.x.len(), a.num_rows());
            assert_eq!(level.b.len(), a.num_rows());
        }

        if lvl + 1 < num_levels {
            let p = level.p.as_ref().expect("prolongation on non-coarsest level");
            let r = level.r.as_ref().expect("restriction on non-coarsest level");
            let coarse_rows = setup[lvl + 1].a.num_rows;

            assert_eq!(p.num_rows(), a.num_rows());
            assert_eq!(p.num_cols(), coarse_rows);
            assert_eq!(r.num_rows(), coarse_rows);
            assert_eq!(r.num_cols(), a.num_rows());
            assert_eq!(level.residual.len(), a.num_rows());

            let k = check_partition(&setup_level.aggregates, setup_level.a.num_rows)
                .expect("aggregates form a partition");
            assert_eq!(k, coarse_rows);
            assert!(setup_level.rho_dinv_a > 0.0);
        } else {
            assert!(level.p.is_none());
            assert!(level.r.is_none());
            assert!(level.residual.is_empty());
            assert!(setup_level.aggregates.is_empty());
        }
    }

    let solver = sa.coarse_solver().expect("coarse solver is built");
    assert_eq!(solver.num_rows(), setup[num_levels - 1].a.num_rows);

    let opts = sa.options();
    let coarsest_rows = setup[num_levels - 1].a.num_rows;
    assert!(coarsest_rows <= opts.min_level_size || num_levels >= opts.max_levels);
}

#[test]
fn test_tridiagonal_100_coarsens_to_min_level_size() {
    let a = laplacian_1d(100);
    let sa = Sa::build(&a, options(10, 10)).expect("setup succeeds");

    assert_well_formed(&sa);
    assert!(sa.num_levels() >= 2);

    let rows: Vec<usize> = sa.setup_levels().iter().map(|l| l.num_rows()).collect();
    assert_eq!(rows[0], 100);
    assert!(rows.windows(2).all(|w| w[1] < w[0]), "rows = {rows:?}");
    assert!(*rows.last().expect("non-empty") <= 10);

    let summary = sa.summary();
    assert_eq!(summary.fine.num_rows, 100);
    assert_eq!(summary.fine.num_entries, 298);
}

#[test]
fn test_max_levels_one_uses_fine_operator_for_coarse_solver() {
    let a = laplacian_1d(100);
    let sa = Sa::build(&a, options(10, 1)).expect("setup succeeds");

    assert_well_formed(&sa);
    assert_eq!(sa.num_levels(), 1);
    let level = &sa.levels()[0];
    assert!(!level.has_transfer_operators());
    assert!(level.smoother.is_none());
    assert_eq!(sa.coarse_solver().map(|s| s.num_rows()), Some(100));
    assert_eq!(sa.setup_levels()[0].a, a);
}

#[test]
fn test_rows_equal_to_min_level_size_means_no_coarsening() {
    let a = laplacian_1d(10);
    let sa = Sa::build(&a, options(10, 10)).expect("setup succeeds");

    assert_well_formed(&sa);
    assert_eq!(sa.num_levels(), 1);
    let solver = sa.coarse_solver().expect("coarse solver is built");
    assert_eq!(solver.num_rows(), 10);

    let b = Array1::from_elem(10, 1.0);
    let x = solver.solve(&b).expect("conforming right-hand side");
    let ax = a.matvec(&x);
    for i in 0..10 {
        assert_relative_eq!(ax[i], b[i], epsilon = 1e-10);
    }
}

#[test]
fn test_level_counts_grow_by_one_per_extension() {
    let a = laplacian_1d(200);
    let mut sa = Sa::build(&a, options(20, 2)).expect("setup succeeds");
    assert_eq!(sa.num_levels(), 2);
    assert_eq!(sa.setup_levels().len(), 2);

    let coarse_rows = sa.setup_levels()[1].num_rows();
    sa.extend_hierarchy().expect("extension succeeds");
    assert_eq!(sa.num_levels(), 3);
    assert_eq!(sa.setup_levels().len(), 3);
    assert!(sa.setup_levels()[2].num_rows() < coarse_rows);
    assert_eq!(
        sa.coarse_solver().map(|s| s.num_rows()),
        Some(sa.setup_levels()[2].num_rows())
    );
    assert!(sa.levels()[1].has_transfer_operators());
    assert!(sa.levels()[2].smoother.is_some());
}

#[test]
fn test_reinitialize_matches_fresh_build() {
    let a = laplacian_2d(12);
    let other = laplacian_1d(77);

    let fresh = Sa::build(&a, options(10, 10)).expect("setup succeeds");

    let mut reused = Sa::build(&other, options(10, 10)).expect("setup succeeds");
    reused.initialize(&a).expect("setup succeeds");
    reused.initialize(&a).expect("setup succeeds");

    assert_eq!(reused.num_levels(), fresh.num_levels());
    assert_eq!(reused.setup_levels(), fresh.setup_levels());
    for (lhs, rhs) in reused.levels().iter().zip(fresh.levels()) {
        assert_eq!(lhs.a, rhs.a);
        assert_eq!(lhs.p, rhs.p);
        assert_eq!(lhs.r, rhs.r);
    }
}

#[test]
fn test_clone_survives_original_and_keeps_coarsening() {
    let a = laplacian_1d(300);
    let original = Sa::build(&a, options(30, 2)).expect("setup succeeds");
    let expected_setup = original.setup_levels().to_vec();

    let mut copy = original.clone();
    drop(original);

    assert_eq!(copy.setup_levels(), expected_setup.as_slice());
    assert_eq!(copy.options().min_level_size, 30);

    copy.extend_hierarchy().expect("copy can keep coarsening");
    assert_eq!(copy.num_levels(), 3);
    assert_eq!(copy.setup_levels()[0], expected_setup[0]);
    assert_eq!(copy.setup_levels()[1].a, expected_setup[1].a);
    assert_well_formed(&copy);
}

#[test]
fn test_two_dimensional_poisson() {
    let a = laplacian_2d(20);
    let sa = Sa::build(&a, options(25, 10)).expect("setup succeeds");
    assert_well_formed(&sa);

    let diagnostics = sa.diagnostics();
    assert_eq!(diagnostics.num_levels, sa.num_levels());
    assert!(diagnostics.grid_complexity > 1.0 && diagnostics.grid_complexity < 2.0);
    assert!(diagnostics.operator_complexity > 1.0);
    assert!(diagnostics.to_string().contains("operator complexity"));
}

#[test]
fn test_coarse_operator_is_galerkin_product() {
    let a = laplacian_1d(60);
    let sa = Sa::build(&a, options(10, 2)).expect("setup succeeds");
    let level = &sa.levels()[0];
    let p = level.p.as_ref().expect("prolongation").to_dense();
    let r = level.r.as_ref().expect("restriction").to_dense();
    let rap = r.dot(&a.to_dense()).dot(&p);

    let coarse = sa.setup_levels()[1].a.to_dense();
    assert_eq!(coarse.dim(), rap.dim());
    for ((i, j), &v) in coarse.indexed_iter() {
        assert_relative_eq!(v, rap[[i, j]], epsilon = 1e-12);
    }
    assert_eq!(r, p.t().to_owned());
}

#[test]
fn test_coo_input_matches_csr_input() {
    let csr = laplacian_1d(120);
    let mut coo = CooMatrix::new(120, 120);
    for i in (0..120).rev() {
        for (j, v) in csr.row_entries(i) {
            coo.push(i, j, v).expect("in range");
        }
    }

    let from_csr = Sa::build(&csr, options(10, 10)).expect("setup succeeds");
    let from_coo = Sa::build(&coo, options(10, 10)).expect("setup succeeds");
    assert_eq!(from_coo.setup_levels(), from_csr.setup_levels());
    assert_eq!(from_coo.summary().fine.num_entries, coo.nnz());
}

#[test]
fn test_explicit_candidate() {
    let a = laplacian_1d(90);
    let b = Array1::from_iter((0..90).map(|i| 1.0 + i as f64 / 90.0));
    let sa = Sa::build_with_candidates(&a, &b, options(10, 10)).expect("setup succeeds");
    assert_well_formed(&sa);
    assert_eq!(sa.setup_levels()[0].b, b);
}

#[test]
fn test_rebind_to_banded_solve_format() {
    let a = laplacian_1d(100);
    let sa = Sa::build(&a, options(10, 10)).expect("setup succeeds");

    let banded = sa
        .rebind::<DiaMatrix<f64>, JacobiSmoother<f64>, LuFactorization<f64>>()
        .expect("operators are banded enough");
    assert_well_formed(&banded);
    assert_eq!(banded.num_levels(), sa.num_levels());
    assert_eq!(banded.setup_levels(), sa.setup_levels());
    assert_eq!(<DiaMatrix<f64> as SparseMatrix<f64>>::FORMAT, SparseFormat::Dia);

    for (dia_level, csr_level) in banded.levels().iter().zip(sa.levels()) {
        let dia_a = dia_level.a.as_ref().expect("materialized");
        let csr_a = csr_level.a.as_ref().expect("materialized");
        assert_eq!(dia_a.to_csr().to_dense(), csr_a.to_dense());

        let x = Array1::from_iter((0..csr_a.num_cols).map(|i| (i as f64).sin()));
        let y_dia = dia_a.apply(&x);
        let y_csr = csr_a.apply(&x);
        for i in 0..y_csr.len() {
            assert_relative_eq!(y_dia[i], y_csr[i], epsilon = 1e-12);
        }
    }

    // the source hierarchy is untouched
    assert_well_formed(&sa);
}

#[test]
fn test_complex_operator() {
    let n = 80;
    let shift = Complex64::new(0.1, 0.5);
    let mut triplets = Vec::new();
    for i in 0..n {
        triplets.push((i, i, Complex64::new(2.0, 0.0) + shift));
        if i > 0 {
            triplets.push((i, i - 1, Complex64::new(-1.0, 0.0)));
        }
        if i + 1 < n {
            triplets.push((i, i + 1, Complex64::new(-1.0, 0.0)));
        }
    }
    let a = CsrMatrix::from_triplets(n, n, triplets);

    let sa: SmoothedAggregation<Complex64> =
        SmoothedAggregation::build(&a, options(10, 10)).expect("setup succeeds");
    assert!(sa.num_levels() > 1);
    assert_eq!(sa.levels().len(), sa.setup_levels().len());
    assert!(sa.setup_levels()[0].rho_dinv_a > 0.0);
}

#[test]
fn test_invalid_configuration() {
    let a = laplacian_1d(50);
    let err = Sa::build(&a, options(10, 0)).unwrap_err();
    assert!(err.is_config_error());

    let err = Sa::build(&a, options(0, 10)).unwrap_err();
    assert!(matches!(err, AmgError::InvalidConfiguration(_)));
}

#[test]
fn test_rectangular_operator_is_a_shape_error() {
    let a = CsrMatrix::from_triplets(40, 30, (0..30).map(|i| (i, i, 1.0)).collect());
    let err = Sa::build(&a, options(10, 10)).unwrap_err();
    assert!(err.is_shape_error());
    assert_eq!(err.step(), Some(SetupStep::StrengthOfConnection));
}

#[test]
fn test_failure_clears_previous_hierarchy() {
    let mut sa = Sa::build(&laplacian_1d(100), options(10, 10)).expect("setup succeeds");
    assert!(sa.num_levels() > 1);

    // row 7 has no diagonal entry
    let mut triplets = Vec::new();
    for i in 0..100 {
        if i != 7 {
            triplets.push((i, i, 2.0));
        }
        if i > 0 {
            triplets.push((i, i - 1, -1.0));
        }
        if i + 1 < 100 {
            triplets.push((i, i + 1, -1.0));
        }
    }
    let singular = CsrMatrix::from_triplets(100, 100, triplets);

    let err = sa.initialize(&singular).unwrap_err();
    assert!(matches!(
        err,
        AmgError::CollaboratorFailure {
            step: SetupStep::ProlongationSmoothing,
            source: StrategyError::ZeroDiagonal { row: 7 },
        }
    ));
    assert!(err.to_string().starts_with("prolongation smoothing failed"));
    assert!(sa.is_empty());
    assert!(sa.setup_levels().is_empty());
    assert!(sa.coarse_solver().is_none());
    assert_eq!(sa.summary().fine.num_rows, 0);

    // the cleared hierarchy can be rebuilt
    sa.initialize(&laplacian_1d(100)).expect("setup succeeds");
    assert_well_formed(&sa);
}

#[test]
fn test_singular_coarsest_operator_fails_in_coarse_solver() {
    let a = CsrMatrix::from_triplets(
        4,
        4,
        vec![(0, 0, 1.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 1.0)],
    );
    let mut sa = Sa::new(options(10, 10));
    let err = sa.initialize(&a).unwrap_err();
    assert_eq!(err.step(), Some(SetupStep::CoarseSolver));
    assert!(sa.is_empty());
}

#[test]
fn test_rebind_to_dia_fails_for_wide_prolongators() {
    let a = laplacian_1d(1500);
    let sa = Sa::build(&a, options(10, 10)).expect("setup succeeds");

    let err = sa
        .rebind::<DiaMatrix<f64>, JacobiSmoother<f64>, LuFactorization<f64>>()
        .unwrap_err();
    assert_eq!(err.step(), Some(SetupStep::FormatConversion));
    assert!(matches!(
        err,
        AmgError::CollaboratorFailure {
            source: StrategyError::FormatConversion(_),
            ..
        }
    ));
    assert_well_formed(&sa);
}
