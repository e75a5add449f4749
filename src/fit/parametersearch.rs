use std::time::Instant;

use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::{
    info,
    warn
};

use crate::configuration::SearchConfiguration;
use crate::distribution::parametriccdf::DistributionFamily;
use crate::error::modelerror::ModelError;
use crate::fit::cancellation::CancellationToken;
use crate::fit::fitpoint::FitPoint;
use crate::fit::goodnessoffit::ks_test_table;
use crate::fit::refinement::refine_fit;
use crate::sample::sampletable::SampleTable;

/// 一次完整掃描的結果。
///
/// `p_values` 的列對應 `means`，行對應 `stddevs`。
#[derive(Clone, Debug, PartialEq)]
pub struct FitSurface {
    family: DistributionFamily,
    means: Vec<f64>,
    stddevs: Vec<f64>,
    p_values: DMatrix<f64>,
    best: FitPoint,
    best_cell: (usize, usize),
}

impl FitSurface {
    pub fn family(&self) -> DistributionFamily {
        self.family
    }

    pub fn resolution(&self) -> usize {
        self.means.len() - 1
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn stddevs(&self) -> &[f64] {
        &self.stddevs
    }

    pub fn p_values(&self) -> &DMatrix<f64> {
        &self.p_values
    }

    pub fn best(&self) -> &FitPoint {
        &self.best
    }

    /// 最佳點所在的 (列, 行)。
    pub fn best_cell(&self) -> (usize, usize) {
        self.best_cell
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.p_values
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }
}

/// 對 2 參數分布族做格點掃描，另外支援手動選點。
///
/// 格點為 mean ∈ [0, 2·樣本平均]、stddev ∈ [0, 2·樣本標準差]，
/// 每軸 resolution + 1 個點（含兩端）。最佳點取列優先順序中第一個嚴格最大值。
#[derive(Clone, Debug)]
pub struct ParameterSearch {
    table: SampleTable,
    family: DistributionFamily,
    resolution: usize,
    parallel: bool,
    max_refine_iterations: u64,
    surface: Option<FitSurface>,
    selection: Option<FitPoint>,
}

impl ParameterSearch {
    pub fn new(family: DistributionFamily, resolution: usize) -> Result<ParameterSearch, ModelError> {
        if resolution == 0 {
            return Err(ModelError::InvalidResolution(resolution));
        }
        Ok(ParameterSearch {
            table: SampleTable::new(),
            family,
            resolution,
            parallel: true,
            max_refine_iterations: 200,
            surface: None,
            selection: None,
        })
    }

    pub fn from_configuration(config: &SearchConfiguration) -> Result<ParameterSearch, ModelError> {
        let mut search = ParameterSearch::new(config.family(), config.resolution())?;
        search.parallel = config.parallel();
        search.max_refine_iterations = config.max_refine_iterations();
        Ok(search)
    }

    pub fn samples(&self) -> &SampleTable {
        &self.table
    }

    pub fn family(&self) -> DistributionFamily {
        self.family
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    /// 手動選點與舊樣本綁定，因此一併清除；格點結果保留到下一次掃描。
    pub fn set_samples(&mut self, table: SampleTable) {
        self.table = table;
        self.selection = None;
    }

    pub fn set_family(&mut self, family: DistributionFamily) {
        self.family = family;
        self.selection = None;
    }

    pub fn set_resolution(&mut self, resolution: usize) -> Result<(), ModelError> {
        if resolution == 0 {
            return Err(ModelError::InvalidResolution(resolution));
        }
        self.resolution = resolution;
        Ok(())
    }

    /// 最近一次完成的掃描。
    pub fn surface(&self) -> Option<&FitSurface> {
        self.surface.as_ref()
    }

    pub fn best(&self) -> Option<&FitPoint> {
        self.surface.as_ref().map(FitSurface::best)
    }

    pub fn selected(&self) -> Option<&FitPoint> {
        self.selection.as_ref()
    }

    /// 手動選點優先，否則為格點最佳點。
    pub fn current(&self) -> Option<&FitPoint> {
        self.selection.as_ref().or_else(|| self.best())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn sample_moments(&self) -> Result<(f64, f64), ModelError> {
        let mean = self.table.mean();
        match (mean, mean.and_then(|m| self.table.stddev(m))) {
            (Some(mean), Some(stddev)) => Ok((mean, stddev)),
            _ => Err(ModelError::InsufficientSamples { required: 2, actual: self.table.total() }),
        }
    }

    /// 評估任意 (mean, stddev)，結果會覆蓋格點最佳點直到清除。
    pub fn select(&mut self, mean: f64, stddev: f64) -> Result<&FitPoint, ModelError> {
        if self.table.is_empty() {
            return Err(ModelError::InsufficientSamples { required: 1, actual: 0 });
        }
        let cdf = self.family.instantiate(mean, stddev);
        let point = FitPoint::new(cdf, ks_test_table(&cdf, &self.table));
        Ok(self.selection.insert(point))
    }

    /// 完整掃描格點。取消時不更新任何結果。
    pub fn scan(&mut self, token: &CancellationToken) -> Result<&FitSurface, ModelError> {
        let (sample_mean, sample_stddev) = self.sample_moments()?;
        let started = Instant::now();
        let r = self.resolution;
        let means: Vec<f64> = (0..=r).map(|i| 2.0 * sample_mean * i as f64 / r as f64).collect();
        let stddevs: Vec<f64> = (0..=r).map(|j| 2.0 * sample_stddev * j as f64 / r as f64).collect();

        let table = &self.table;
        let family = self.family;
        let evaluate_row = |i: usize| -> Option<Vec<f64>> {
            if token.is_cancelled() {
                return None;
            }
            Some(
                stddevs
                    .iter()
                    .map(|&stddev| ks_test_table(&family.instantiate(means[i], stddev), table))
                    .collect(),
            )
        };
        let rows: Option<Vec<Vec<f64>>> = if self.parallel {
            (0..=r).into_par_iter().map(evaluate_row).collect()
        } else {
            (0..=r).map(evaluate_row).collect()
        };
        let Some(rows) = rows else {
            warn!(resolution = r, family = ?family, "parameter scan cancelled");
            return Err(ModelError::Cancelled);
        };

        let p_values = DMatrix::from_fn(r + 1, r + 1, |i, j| rows[i][j]);
        let (mut best_cell, mut best_p) = ((0, 0), f64::NEG_INFINITY);
        for i in 0..=r {
            for j in 0..=r {
                if p_values[(i, j)] > best_p {
                    best_p = p_values[(i, j)];
                    best_cell = (i, j);
                }
            }
        }
        let best = FitPoint::new(family.instantiate(means[best_cell.0], stddevs[best_cell.1]), p_values[best_cell]);
        info!(
            resolution = r,
            family = ?family,
            mean = best.mean(),
            stddev = best.stddev(),
            p_value = best.p_value(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "parameter scan finished"
        );

        Ok(self.surface.insert(FitSurface { family, means, stddevs, p_values, best, best_cell }))
    }

    /// 從目前的點（手動選點或格點最佳點）出發做 Nelder-Mead 微調，結果成為手動選點。
    pub fn refine(&mut self) -> Result<&FitPoint, ModelError> {
        let start = match self.current() {
            Some(point) => point.clone(),
            None => {
                let (mean, stddev) = self.sample_moments()?;
                let cdf = self.family.instantiate(mean, stddev);
                FitPoint::new(cdf, ks_test_table(&cdf, &self.table))
            }
        };
        let refined = refine_fit(&self.table, self.family, &start, self.max_refine_iterations)?;
        Ok(self.selection.insert(refined))
    }
}
