//! Smoothed aggregation hierarchy builder
//!
//! Starting from the fine operator, each coarsening step runs the six
//! strategy slots against the coarsest setup level:
//!
//! 1. strength of connection `C`
//! 2. aggregation of `C`
//! 3. tentative prolongator `T` and coarse candidate
//! 4. smoothed prolongator `P`
//! 5. restriction `R`
//! 6. Galerkin operator `R A P`
//!
//! The coarse operator and candidate are moved into a new setup level and
//! `P`, `R` into the current solve level. Coarsening stops once the
//! coarsest operator has at most `min_level_size` rows or `max_levels`
//! levels exist. The coarsest setup operator then feeds the coarse solver,
//! and each level's operator is converted into the solve format `M`.
//!
//! Construction is all-or-nothing: any failure leaves the hierarchy empty.

use super::aggregate::check_partition;
use super::diagnostics::SaDiagnostics;
use super::level::{Level, SetupLevel};
use super::options::{SaOptions, SaStrategy, StandardStrategy};
use crate::direct::{CoarseSolver, LuFactorization};
use crate::error::{AmgError, Result, SetupStep};
use crate::smoothers::{JacobiSmoother, Smoother};
use crate::sparse::{CsrMatrix, MatrixShape, SparseMatrix};
use crate::traits::ComplexField;
use ndarray::Array1;
use std::time::Instant;

/// Fine-level facts recorded by `initialize`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HierarchySummary {
    /// Shape and entry count of the operator passed to `initialize`
    pub fine: MatrixShape,
    /// Wall time spent in setup, in milliseconds
    pub setup_time_ms: f64,
}

/// Smoothed aggregation multilevel hierarchy
///
/// Type parameters:
/// - `T`: scalar type
/// - `S`: coarsening strategy
/// - `M`: solve format of level operators and transfer operators
/// - `Sm`: per-level smoother
/// - `So`: coarsest-level solver
///
/// # Example
///
/// ```
/// use math_audio_multigrid::{CsrMatrix, SaOptions, SmoothedAggregation};
///
/// let n = 200;
/// let mut triplets = Vec::new();
/// for i in 0..n {
///     triplets.push((i, i, 2.0));
///     if i > 0 {
///         triplets.push((i, i - 1, -1.0));
///     }
///     if i + 1 < n {
///         triplets.push((i, i + 1, -1.0));
///     }
/// }
/// let a = CsrMatrix::from_triplets(n, n, triplets);
///
/// let options = SaOptions::default().min_level_size(20);
/// let sa: SmoothedAggregation<f64> = SmoothedAggregation::build(&a, options)?;
/// assert!(sa.num_levels() > 1);
/// # Ok::<(), math_audio_multigrid::AmgError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SmoothedAggregation<
    T: ComplexField,
    S = StandardStrategy,
    M = CsrMatrix<T>,
    Sm = JacobiSmoother<T>,
    So = LuFactorization<T>,
> {
    options: SaOptions<S>,
    levels: Vec<Level<T, M, Sm>>,
    setup_levels: Vec<SetupLevel<T>>,
    solver: Option<So>,
    summary: HierarchySummary,
}

impl<T, S, M, Sm, So> SmoothedAggregation<T, S, M, Sm, So>
where
    T: ComplexField,
    S: SaStrategy<T>,
    M: SparseMatrix<T>,
    Sm: Smoother<T, M>,
    So: CoarseSolver<T>,
{
    /// Empty hierarchy holding `options`; call [`initialize`](Self::initialize)
    pub fn new(options: SaOptions<S>) -> Self {
        Self {
            options,
            levels: Vec::new(),
            setup_levels: Vec::new(),
            solver: None,
            summary: HierarchySummary::default(),
        }
    }

    /// Build a hierarchy for `a` with the all-ones candidate
    pub fn build<A: SparseMatrix<T>>(a: &A, options: SaOptions<S>) -> Result<Self> {
        let mut sa = Self::new(options);
        sa.initialize(a)?;
        Ok(sa)
    }

    /// Build a hierarchy for `a` with an explicit near-null-space candidate
    pub fn build_with_candidates<A: SparseMatrix<T>>(
        a: &A,
        b: &Array1<T>,
        options: SaOptions<S>,
    ) -> Result<Self> {
        let mut sa = Self::new(options);
        sa.initialize_with_candidates(a, b)?;
        Ok(sa)
    }

    /// (Re)build the hierarchy for `a` using a constant candidate.
    ///
    /// Any previous levels are discarded first.
    pub fn initialize<A: SparseMatrix<T>>(&mut self, a: &A) -> Result<()> {
        let ones = Array1::from_elem(a.num_rows(), T::one());
        self.initialize_with_candidates(a, &ones)
    }

    /// (Re)build the hierarchy for `a` with candidate `b`
    pub fn initialize_with_candidates<A: SparseMatrix<T>>(
        &mut self,
        a: &A,
        b: &Array1<T>,
    ) -> Result<()> {
        let result = self.try_initialize(a, b);
        if result.is_err() {
            self.clear();
        }
        result
    }

    /// Add one coarser level below the current coarsest one.
    ///
    /// Runs a single coarsening step regardless of the termination
    /// controls, then materializes the new level and rebuilds the coarse
    /// solver. Fails with [`AmgError::EmptyHierarchy`] before `initialize`.
    pub fn extend_hierarchy(&mut self) -> Result<()> {
        let result = self.try_extend();
        if result.is_err() {
            self.clear();
        }
        result
    }

    /// Copy this hierarchy into another solve format, smoother and coarse
    /// solver.
    ///
    /// Setup levels and options are cloned, level operators converted and
    /// smoothers and solver rebuilt. No coarsening is repeated.
    ///
    /// `P` and `R` are converted too. Their band widens with the problem
    /// size, so [`DiaMatrix`](crate::sparse::DiaMatrix) as `M2` only suits
    /// small hierarchies: a 1D Laplacian above roughly 1200 rows fails with
    /// [`SetupStep::FormatConversion`].
    pub fn rebind<M2, Sm2, So2>(&self) -> Result<SmoothedAggregation<T, S, M2, Sm2, So2>>
    where
        M2: SparseMatrix<T>,
        Sm2: Smoother<T, M2>,
        So2: CoarseSolver<T>,
    {
        if self.setup_levels.is_empty() {
            return Err(AmgError::EmptyHierarchy);
        }

        let convert = |m: &Option<M>| -> Result<Option<M2>> {
            m.as_ref()
                .map(|m| M2::from_csr(m.to_csr()))
                .transpose()
                .map_err(|e| AmgError::at_step(SetupStep::FormatConversion, e))
        };

        let mut levels = Vec::with_capacity(self.levels.capacity());
        for level in &self.levels {
            levels.push(Level {
                a: convert(&level.a)?,
                p: convert(&level.p)?,
                r: convert(&level.r)?,
                smoother: None,
                x: level.x.clone(),
                b: level.b.clone(),
                residual: level.residual.clone(),
            });
        }

        let mut target = SmoothedAggregation {
            options: self.options.clone(),
            levels,
            setup_levels: self.setup_levels.clone(),
            solver: None,
            summary: self.summary,
        };
        target.finish()?;
        log::debug!(
            "rebound {}-level hierarchy from {} to {}",
            target.num_levels(),
            M::FORMAT,
            M2::FORMAT
        );
        Ok(target)
    }

    /// Drop every level and the coarse solver
    pub fn clear(&mut self) {
        self.levels.clear();
        self.setup_levels.clear();
        self.solver = None;
        self.summary = HierarchySummary::default();
    }

    /// Number of levels, finest included
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// `true` before `initialize` or after a failure
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Solve-phase records, finest first
    pub fn levels(&self) -> &[Level<T, M, Sm>] {
        &self.levels
    }

    /// Solve-phase record of level `lvl`
    pub fn level(&self, lvl: usize) -> Option<&Level<T, M, Sm>> {
        self.levels.get(lvl)
    }

    /// Setup records, finest first
    pub fn setup_levels(&self) -> &[SetupLevel<T>] {
        &self.setup_levels
    }

    /// Solver for the coarsest level
    pub fn coarse_solver(&self) -> Option<&So> {
        self.solver.as_ref()
    }

    /// Options this hierarchy was built with
    pub fn options(&self) -> &SaOptions<S> {
        &self.options
    }

    /// Fine shape and setup time
    pub fn summary(&self) -> &HierarchySummary {
        &self.summary
    }

    /// Per-level statistics
    pub fn diagnostics(&self) -> SaDiagnostics {
        SaDiagnostics::from_setup_levels(&self.setup_levels, self.summary.setup_time_ms)
    }

    fn try_initialize<A: SparseMatrix<T>>(&mut self, a: &A, b: &Array1<T>) -> Result<()> {
        self.options.validate()?;
        if b.len() != a.num_rows() {
            return Err(AmgError::shape(
                SetupStep::Initialization,
                format!(
                    "candidate has {} entries, operator has {} rows",
                    b.len(),
                    a.num_rows()
                ),
            ));
        }

        let start = Instant::now();
        self.clear();
        self.summary.fine = a.shape();

        self.levels.reserve(self.options.max_levels);
        self.setup_levels.reserve(self.options.max_levels);
        self.levels.push(Level::default());
        self.setup_levels.push(SetupLevel::new(a.to_csr(), b.clone()));

        while self.should_coarsen() {
            self.coarsen()?;
        }
        self.finish()?;

        let fine = self.summary.fine;
        let materialized = self.levels[0].shape().unwrap_or_default();
        if materialized.num_rows != fine.num_rows
            || materialized.num_cols != fine.num_cols
            || materialized.num_entries != self.setup_levels[0].a.nnz()
        {
            return Err(AmgError::shape(
                SetupStep::FormatConversion,
                format!("fine operator {fine} materialized as {materialized}"),
            ));
        }

        self.summary.setup_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        let diagnostics = self.diagnostics();
        log::info!(
            "SA setup: {} levels, grid complexity {:.3}, operator complexity {:.3}, {:.2} ms",
            diagnostics.num_levels,
            diagnostics.grid_complexity,
            diagnostics.operator_complexity,
            diagnostics.setup_time_ms
        );
        Ok(())
    }

    fn try_extend(&mut self) -> Result<()> {
        if self.setup_levels.is_empty() {
            return Err(AmgError::EmptyHierarchy);
        }
        self.coarsen()?;
        self.finish()
    }

    fn should_coarsen(&self) -> bool {
        self.setup_levels.last().is_some_and(|coarsest| {
            coarsest.num_rows() > self.options.min_level_size
                && self.setup_levels.len() < self.options.max_levels
        })
    }

    /// One coarsening step against the coarsest setup level
    fn coarsen(&mut self) -> Result<()> {
        let strategy = &self.options.strategy;
        let setup = self.setup_levels.last_mut().ok_or(AmgError::EmptyHierarchy)?;
        let lvl = self.levels.len() - 1;
        let a = &setup.a;
        let n = a.num_rows;

        let c = strategy
            .strength_of_connection(a)
            .map_err(|e| AmgError::at_step(SetupStep::StrengthOfConnection, e))?;
        expect_shape(SetupStep::StrengthOfConnection, "C", &c, n, a.num_cols)?;

        let aggregates = strategy
            .aggregate(&c)
            .map_err(|e| AmgError::at_step(SetupStep::Aggregation, e))?;
        let k = check_partition(&aggregates, n)
            .map_err(|e| AmgError::at_step(SetupStep::Aggregation, e))?;
        drop(c);

        let (t, b_coarse) = strategy
            .fit_candidates(&aggregates, &setup.b)
            .map_err(|e| AmgError::at_step(SetupStep::CandidateFitting, e))?;
        expect_shape(SetupStep::CandidateFitting, "T", &t, n, k)?;
        if b_coarse.len() != k {
            return Err(AmgError::shape(
                SetupStep::CandidateFitting,
                format!("coarse candidate has {} entries, expected {k}", b_coarse.len()),
            ));
        }

        let (p, rho) = strategy
            .smooth_prolongator(a, &t, setup.rho_dinv_a)
            .map_err(|e| AmgError::at_step(SetupStep::ProlongationSmoothing, e))?;
        expect_shape(SetupStep::ProlongationSmoothing, "P", &p, n, k)?;
        drop(t);

        let r = strategy
            .form_restriction(&p)
            .map_err(|e| AmgError::at_step(SetupStep::Restriction, e))?;
        expect_shape(SetupStep::Restriction, "R", &r, k, n)?;

        let rap = strategy
            .galerkin_product(&r, a, &p)
            .map_err(|e| AmgError::at_step(SetupStep::GalerkinProduct, e))?;
        expect_shape(SetupStep::GalerkinProduct, "RAP", &rap, k, k)?;

        log::debug!(
            "SA level {lvl}: {n} rows, {} nnz -> {k} aggregates, rho(D^-1 A) = {rho:?}, P nnz {}",
            a.nnz(),
            p.nnz()
        );
        if k >= n {
            log::warn!("SA level {lvl}: aggregation did not reduce the problem ({n} rows -> {k})");
        }

        setup.aggregates = aggregates;
        setup.rho_dinv_a = rho;

        let level = self.levels.last_mut().ok_or(AmgError::EmptyHierarchy)?;
        level.p = Some(to_solve_format(p)?);
        level.r = Some(to_solve_format(r)?);
        level.residual = Array1::zeros(n);

        self.setup_levels.push(SetupLevel::new(rap, b_coarse));
        self.levels.push(Level::with_work_vectors(k));
        Ok(())
    }

    /// Materialize missing level operators and smoothers, rebuild the
    /// coarse solver
    fn finish(&mut self) -> Result<()> {
        let coarsest = self.setup_levels.last().ok_or(AmgError::EmptyHierarchy)?;
        self.solver = Some(
            So::from_setup_matrix(&coarsest.a)
                .map_err(|e| AmgError::at_step(SetupStep::CoarseSolver, e))?,
        );

        let multilevel = self.levels.len() > 1;
        for (level, setup) in self.levels.iter_mut().zip(&self.setup_levels) {
            if level.a.is_none() {
                level.a = Some(to_solve_format(setup.a.clone())?);
            }
            if multilevel && level.smoother.is_none() {
                if let Some(a) = &level.a {
                    level.smoother = Some(
                        Sm::from_level_matrix(a)
                            .map_err(|e| AmgError::at_step(SetupStep::Smoother, e))?,
                    );
                }
            }
        }
        Ok(())
    }
}

fn to_solve_format<T: ComplexField, M: SparseMatrix<T>>(m: CsrMatrix<T>) -> Result<M> {
    M::from_csr(m).map_err(|e| AmgError::at_step(SetupStep::FormatConversion, e))
}

fn expect_shape<T: ComplexField>(
    step: SetupStep,
    name: &str,
    m: &CsrMatrix<T>,
    rows: usize,
    cols: usize,
) -> Result<()> {
    if m.num_rows != rows || m.num_cols != cols {
        return Err(AmgError::shape(
            step,
            format!(
                "{name} is {}x{}, expected {rows}x{cols}",
                m.num_rows, m.num_cols
            ),
        ));
    }
    Ok(())
}
