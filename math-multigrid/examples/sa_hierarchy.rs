use math_audio_multigrid::{
    CsrMatrix, DiaMatrix, JacobiSmoother, LinearOperator, LuFactorization, SaOptions,
    SmoothedAggregation, SparseMatrix,
};

fn main() {
    env_logger::init();

    // 2D Poisson on a 64 x 64 grid
    let m = 64;
    let n = m * m;
    let mut triplets = Vec::with_capacity(5 * n);
    for i in 0..m {
        for j in 0..m {
            let row = i * m + j;
            triplets.push((row, row, 4.0));
            if i > 0 {
                triplets.push((row, row - m, -1.0));
            }
            if i + 1 < m {
                triplets.push((row, row + m, -1.0));
            }
            if j > 0 {
                triplets.push((row, row - 1, -1.0));
            }
            if j + 1 < m {
                triplets.push((row, row + 1, -1.0));
            }
        }
    }
    let a = CsrMatrix::from_triplets(n, n, triplets);

    let options = SaOptions::for_poisson().min_level_size(50);
    let mut sa: SmoothedAggregation<f64> = match SmoothedAggregation::build(&a, options) {
        Ok(sa) => sa,
        Err(e) => {
            eprintln!("setup failed: {e}");
            std::process::exit(1);
        }
    };
    println!("{}", sa.diagnostics());

    for (lvl, level) in sa.levels().iter().enumerate() {
        if let (Some(p), Some(r)) = (&level.p, &level.r) {
            println!(
                "level {lvl}: P {}x{} ({} nnz), R {}x{}",
                p.num_rows(),
                p.num_cols(),
                p.num_entries(),
                r.num_rows(),
                r.num_cols()
            );
        }
    }

    // one more level below the coarsest
    match sa.extend_hierarchy() {
        Ok(()) => println!("extended to {} levels", sa.num_levels()),
        Err(e) => eprintln!("extension failed: {e}"),
    }

    // small 1D problem in banded storage
    let n = 400;
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
    let a = CsrMatrix::from_triplets(n, n, triplets);
    let banded = SmoothedAggregation::<f64>::build(&a, SaOptions::default().min_level_size(20))
        .and_then(|sa| sa.rebind::<DiaMatrix<f64>, JacobiSmoother<f64>, LuFactorization<f64>>());
    match banded {
        Ok(sa) => {
            for (lvl, level) in sa.levels().iter().enumerate() {
                if let Some(a) = &level.a {
                    println!("level {lvl}: DIA {} diagonals", a.num_diagonals());
                }
            }
        }
        Err(e) => eprintln!("DIA rebind failed: {e}"),
    }
}
