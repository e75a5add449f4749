use serde::Serialize;

use crate::distribution::cdf::Cdf;
use crate::distribution::parametriccdf::ParametricCdf;

/// 一個評估過的 (mean, stddev) 點：格點或手動選取。
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FitPoint {
    mean: f64,
    stddev: f64,
    label: String,
    p_value: f64,
    #[serde(skip)]
    cdf: ParametricCdf,
}

impl FitPoint {
    pub fn new(cdf: ParametricCdf, p_value: f64) -> FitPoint {
        FitPoint {
            mean: cdf.mean(),
            stddev: cdf.stddev(),
            label: cdf.label(),
            p_value,
            cdf,
        }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn stddev(&self) -> f64 {
        self.stddev
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    pub fn cdf(&self) -> &ParametricCdf {
        &self.cdf
    }
}
