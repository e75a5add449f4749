use serde::{
    Deserialize,
    Serialize
};
use statrs::distribution::{
    Continuous,
    ContinuousCDF,
    LogNormal,
    Normal
};
use tracing::debug;

use crate::distribution::cdf::Cdf;
use crate::math::curve::curve::Curve;
use crate::math::round::round;

/// 以 (mean, stddev) 參數化的分布族。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistributionFamily {
    Normal,
    LogNormal,
}

impl DistributionFamily {
    /// 建立該族在 (mean, stddev) 的實例；參數不合法時回傳退化分布（p ≡ 0）。
    pub fn instantiate(&self, mean: f64, stddev: f64) -> ParametricCdf {
        let cdf = match self {
            DistributionFamily::Normal => Normal::new(mean, stddev)
                .ok()
                .filter(|_| stddev > 0.0)
                .map(|dist| ParametricCdf::Normal { mean, stddev, dist }),
            DistributionFamily::LogNormal => {
                if mean > 0.0 && stddev > 0.0 {
                    // 以算術平均與標準差換算對數空間參數
                    let sigma2 = (1.0 + (stddev * stddev) / (mean * mean)).ln();
                    let location = mean.ln() - 0.5 * sigma2;
                    LogNormal::new(location, sigma2.sqrt())
                        .ok()
                        .map(|dist| ParametricCdf::LogNormal { mean, stddev, dist })
                } else {
                    None
                }
            }
        };
        cdf.unwrap_or_else(|| {
            debug!(family = ?self, mean, stddev, "degenerate distribution parameters");
            ParametricCdf::Degenerate { family: *self, mean, stddev }
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            DistributionFamily::Normal => "Normal",
            DistributionFamily::LogNormal => "LogNormal",
        }
    }
}

/// 參數化分布的 CDF 實例。
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParametricCdf {
    Normal { mean: f64, stddev: f64, dist: Normal },
    LogNormal { mean: f64, stddev: f64, dist: LogNormal },
    Degenerate { family: DistributionFamily, mean: f64, stddev: f64 },
}

impl ParametricCdf {
    pub fn family(&self) -> DistributionFamily {
        match self {
            ParametricCdf::Normal { .. } => DistributionFamily::Normal,
            ParametricCdf::LogNormal { .. } => DistributionFamily::LogNormal,
            ParametricCdf::Degenerate { family, .. } => *family,
        }
    }

    pub fn mean(&self) -> f64 {
        match self {
            ParametricCdf::Normal { mean, .. }
            | ParametricCdf::LogNormal { mean, .. }
            | ParametricCdf::Degenerate { mean, .. } => *mean,
        }
    }

    pub fn stddev(&self) -> f64 {
        match self {
            ParametricCdf::Normal { stddev, .. }
            | ParametricCdf::LogNormal { stddev, .. }
            | ParametricCdf::Degenerate { stddev, .. } => *stddev,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, ParametricCdf::Degenerate { .. })
    }
}

impl Cdf for ParametricCdf {
    fn p(&self, x: f64) -> f64 {
        match self {
            ParametricCdf::Normal { dist, .. } => dist.cdf(x),
            ParametricCdf::LogNormal { dist, .. } => dist.cdf(x),
            ParametricCdf::Degenerate { .. } => 0.0,
        }
    }

    fn dx(&self, x: f64) -> f64 {
        match self {
            ParametricCdf::Normal { dist, .. } => dist.pdf(x),
            ParametricCdf::LogNormal { dist, .. } => dist.pdf(x),
            ParametricCdf::Degenerate { .. } => 0.0,
        }
    }

    fn label(&self) -> String {
        let suffix = if self.is_degenerate() { ", degenerate" } else { "" };
        format!(
            "{}(mean={}, stddev={}{})",
            self.family().name(),
            round(self.mean(), 3),
            round(self.stddev(), 3),
            suffix
        )
    }
}

impl Curve for ParametricCdf {
    fn value(&self, x: f64) -> f64 {
        self.p(x)
    }

    fn derivative(&self, x: f64) -> f64 {
        self.dx(x)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn p_is_bounded_and_non_decreasing(
            lognormal in any::<bool>(),
            mean in -10.0f64..10.0,
            stddev in -1.0f64..5.0,
            mut xs in proptest::collection::vec(-50.0f64..50.0, 2..40)
        ) {
            let family = if lognormal { DistributionFamily::LogNormal } else { DistributionFamily::Normal };
            let cdf = family.instantiate(mean, stddev);
            xs.sort_by(|a, b| a.total_cmp(b));
            let mut prev = 0.0;
            for x in xs {
                let p = cdf.p(x);
                prop_assert!((0.0..=1.0).contains(&p));
                prop_assert!(p + 1e-15 >= prev);
                prev = p;
            }
        }
    }
}
