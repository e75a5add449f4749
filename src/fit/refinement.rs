use argmin::core::{
    CostFunction,
    Error,
    Executor,
    State
};
use argmin::solver::neldermead::NelderMead;
use tracing::debug;

use crate::distribution::parametriccdf::DistributionFamily;
use crate::error::modelerror::ModelError;
use crate::fit::fitpoint::FitPoint;
use crate::fit::goodnessoffit::{
    ks_statistic_table,
    ks_test_table
};
use crate::sample::sampletable::SampleTable;

const SD_TOLERANCE: f64 = 1e-10;

struct KsCost {
    table: SampleTable,
    family: DistributionFamily,
}

impl CostFunction for KsCost {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        let cdf = self.family.instantiate(param[0], param[1]);
        Ok(ks_statistic_table(&cdf, &self.table))
    }
}

/// 以 Nelder-Mead 在同一分布族內微調 (mean, stddev)，最小化 KS 統計量 D。
///
/// 起始單形為起點加上沿兩軸各 10% 的偏移（stddev 為 0 時改用 1e-3）。
pub fn refine_fit(
    table: &SampleTable,
    family: DistributionFamily,
    start: &FitPoint,
    max_iters: u64,
) -> Result<FitPoint, ModelError> {
    let total = table.total();
    if total <= 1 {
        return Err(ModelError::InsufficientSamples { required: 2, actual: total });
    }
    let (mean, stddev) = (start.mean(), start.stddev());
    let mean_step = if mean != 0.0 { 0.1 * mean.abs() } else { 1e-3 };
    let stddev_step = if stddev > 0.0 { 0.1 * stddev } else { 1e-3 };
    let stddev = stddev.max(stddev_step);
    let simplex = vec![
        vec![mean, stddev],
        vec![mean + mean_step, stddev],
        vec![mean, stddev + stddev_step],
    ];

    let cost = KsCost { table: table.clone(), family };
    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(SD_TOLERANCE)
        .map_err(|error| ModelError::Refinement(error.to_string()))?;
    let result = Executor::new(cost, solver)
        .configure(|state| state.max_iters(max_iters))
        .run()
        .map_err(|error| ModelError::Refinement(error.to_string()))?;

    let best = result
        .state()
        .get_best_param()
        .cloned()
        .ok_or_else(|| ModelError::Refinement("solver returned no parameters".to_owned()))?;
    let cdf = family.instantiate(best[0], best[1]);
    let refined = FitPoint::new(cdf, ks_test_table(&cdf, table));
    debug!(
        iterations = result.state().get_iter(),
        mean = refined.mean(),
        stddev = refined.stddev(),
        p_value = refined.p_value(),
        "refinement finished"
    );

    // 微調不應比起點更差
    if refined.p_value() < start.p_value() {
        return Ok(start.clone());
    }
    Ok(refined)
}
