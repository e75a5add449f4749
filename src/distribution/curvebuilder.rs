use serde::{
    Deserialize,
    Serialize
};
use tracing::{
    debug,
    warn
};

use crate::configuration::CurveConfiguration;
use crate::error::modelerror::ModelError;
use crate::math::curve::nonparametriccurve::monotonespline::{
    MonotoneSpline,
    DEFAULT_TAIL_FACTOR
};
use crate::math::curve::nonparametriccurve::nonparametriccurve::Point2D;
use crate::math::curve::piecewisefunction::{
    linear_function,
    PiecewiseFunction
};
use crate::math::curve::plot::Plot;
use crate::math::curve::segmentlist::SegmentList;
use crate::sample::sampletable::SampleTable;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveType {
    Raw,
    Linear,
    Cubic,
}

impl CurveType {
    /// 建構失敗時改用的曲線：Cubic → Linear → Raw。
    pub fn simpler(&self) -> Option<CurveType> {
        match self {
            CurveType::Cubic => Some(CurveType::Linear),
            CurveType::Linear => Some(CurveType::Raw),
            CurveType::Raw => None,
        }
    }
}

/// 由 SampleTable 產生 CDF 曲線。
///
/// `build` 不會失敗：非空的表建構失敗時依序退回較簡單的曲線，
/// 空表則為預設範圍上的常數 0。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveBuilder {
    raw_padding: f64,
    linear_margin: f64,
    tail_factor: f64,
    default_min_x: f64,
    default_max_x: f64,
}

impl Default for CurveBuilder {
    fn default() -> Self {
        CurveBuilder {
            raw_padding: 0.15,
            linear_margin: 2.0,
            tail_factor: DEFAULT_TAIL_FACTOR,
            default_min_x: -1.0,
            default_max_x: 1.0,
        }
    }
}

impl CurveBuilder {
    pub fn new() -> CurveBuilder {
        CurveBuilder::default()
    }

    pub fn from_configuration(config: &CurveConfiguration) -> CurveBuilder {
        CurveBuilder {
            raw_padding: config.raw_padding(),
            linear_margin: config.linear_margin(),
            tail_factor: config.tail_factor(),
            default_min_x: config.default_min_x(),
            default_max_x: config.default_max_x(),
        }
    }

    pub fn tail_factor(&self) -> f64 {
        self.tail_factor
    }

    pub fn build(&self, table: &SampleTable, curve_type: CurveType) -> Plot {
        if table.is_empty() {
            debug!(?curve_type, "empty sample table, using default domain");
            return self.default_plot();
        }
        match self.try_build(table, curve_type) {
            Ok(plot) => plot,
            Err(error) => match curve_type.simpler() {
                Some(simpler) => {
                    warn!(?curve_type, ?simpler, %error, "curve construction failed, using a simpler curve");
                    self.build(table, simpler)
                }
                None => {
                    warn!(?curve_type, %error, "curve construction failed, using default domain");
                    self.default_plot()
                }
            },
        }
    }

    fn try_build(&self, table: &SampleTable, curve_type: CurveType) -> Result<Plot, ModelError> {
        match curve_type {
            CurveType::Raw => self.raw(table),
            CurveType::Linear => self.linear(table),
            CurveType::Cubic if table.len() < 2 => {
                debug!(distinct = table.len(), "too few distinct values for a cubic curve, using linear");
                self.linear(table)
            }
            CurveType::Cubic => self.cubic(table),
        }
    }

    fn default_plot(&self) -> Plot {
        Plot::new(
            SegmentList::new(PiecewiseFunction::Constant(0.0)),
            self.default_min_x,
            self.default_max_x,
        )
    }

    /// 階梯 ECDF：每個樣本值處跳到 cumcount/total。
    fn raw(&self, table: &SampleTable) -> Result<Plot, ModelError> {
        let mut segments = SegmentList::new(PiecewiseFunction::Constant(0.0));
        for (v, p) in table.point_iter() {
            segments.push(v, PiecewiseFunction::Constant(p))?;
        }
        let (min, max) = bounds(table)?;
        let range = max - min;
        let padding = if range > 0.0 {
            self.raw_padding * range
        } else {
            0.5 * (self.default_max_x - self.default_min_x)
        };
        Ok(Plot::new(segments, min - padding, max + padding))
    }

    /// 繪圖位置之間的折線，兩端以固定距離的直線接到 0 與 1。
    fn linear(&self, table: &SampleTable) -> Result<Plot, ModelError> {
        let points = plotting_positions(table);
        let (first, last) = match (points.first(), points.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(ModelError::NotEnoughPoints { required: 1, actual: 0 }),
        };
        let start = first.x() - self.linear_margin;
        let end = last.x() + self.linear_margin;

        let mut segments = SegmentList::new(PiecewiseFunction::Constant(0.0));
        segments.push(start, linear_function(start, 0.0, first.x(), first.y())?)?;
        for w in points.windows(2) {
            segments.push(w[0].x(), linear_function(w[0].x(), w[0].y(), w[1].x(), w[1].y())?)?;
        }
        segments.push(last.x(), linear_function(last.x(), last.y(), end, 1.0)?)?;
        segments.push(end, PiecewiseFunction::Constant(1.0))?;
        Ok(Plot::new(segments, start, end))
    }

    fn cubic(&self, table: &SampleTable) -> Result<Plot, ModelError> {
        MonotoneSpline::new(plotting_positions(table))?.to_cdf_plot(self.tail_factor)
    }
}

fn bounds(table: &SampleTable) -> Result<(f64, f64), ModelError> {
    match (table.min(), table.max()) {
        (Some(min), Some(max)) => Ok((min, max)),
        _ => Err(ModelError::NotEnoughPoints { required: 1, actual: 0 }),
    }
}

/// 繪圖位置 (value, cumcount/(N+1))，N 為觀測值總數。
pub fn plotting_positions(table: &SampleTable) -> Vec<Point2D> {
    let denominator = (table.total() + 1) as f64;
    table
        .iter()
        .scan(0u64, |cumulative, (v, c)| {
            *cumulative += c;
            Some(Point2D::new(v, *cumulative as f64 / denominator))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::curve::nonparametriccurve::nonparametriccurve::NonparametricCurve;

    fn one_to_six() -> SampleTable {
        SampleTable::from_samples(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap()
    }

    #[test]
    fn plotting_positions_use_total_observations() {
        let table = SampleTable::from_samples(&[1.0, 2.0, 2.0]).unwrap();
        assert_eq!(plotting_positions(&table), vec![Point2D::new(1.0, 0.25), Point2D::new(2.0, 0.75)]);
    }

    #[test]
    fn raw_steps_reach_one_at_maximum() {
        let plot = CurveBuilder::new().build(&one_to_six(), CurveType::Raw);
        assert_eq!(plot.eval(6.0), 1.0);
        assert_eq!(plot.eval(100.0), 1.0);
        assert_eq!(plot.eval(0.999), 0.0);
        assert_eq!(plot.eval(f64::NEG_INFINITY), 0.0);
        assert!((plot.eval(3.5) - 0.5).abs() < 1e-15);
        assert!((plot.min_x() - 0.25).abs() < 1e-12);
        assert!((plot.max_x() - 6.75).abs() < 1e-12);
    }

    #[test]
    fn raw_single_value_uses_default_half_width() {
        let table = SampleTable::from_samples(&[4.0, 4.0]).unwrap();
        let plot = CurveBuilder::new().build(&table, CurveType::Raw);
        assert_eq!(plot.min_x(), 3.0);
        assert_eq!(plot.max_x(), 5.0);
        assert_eq!(plot.eval(4.0), 1.0);
        assert_eq!(plot.eval(3.9), 0.0);
    }

    #[test]
    fn empty_table_plots_constant_zero() {
        let builder = CurveBuilder::new();
        for curve_type in [CurveType::Raw, CurveType::Linear, CurveType::Cubic] {
            let plot = builder.build(&SampleTable::new(), curve_type);
            assert_eq!(plot.min_x(), -1.0);
            assert_eq!(plot.max_x(), 1.0);
            assert_eq!(plot.eval(0.0), 0.0);
            assert_eq!(plot.segments().len(), 1);
        }
    }

    #[test]
    fn linear_runs_in_and_out() {
        let table = SampleTable::from_samples(&[1.0, 2.0, 3.0]).unwrap();
        let plot = CurveBuilder::new().build(&table, CurveType::Linear);
        assert_eq!(plot.min_x(), -1.0);
        assert_eq!(plot.max_x(), 5.0);
        assert_eq!(plot.eval(-2.0), 0.0);
        assert!((plot.eval(0.0) - 0.125).abs() < 1e-15);
        assert!((plot.eval(1.0) - 0.25).abs() < 1e-15);
        assert!((plot.eval(2.5) - 0.625).abs() < 1e-15);
        assert!((plot.eval(4.0) - 0.875).abs() < 1e-15);
        assert_eq!(plot.eval(5.0), 1.0);
        assert_eq!(plot.eval(9.0), 1.0);
    }

    #[test]
    fn cubic_with_one_distinct_value_falls_back_to_linear() {
        let table = SampleTable::from_samples(&[2.0, 2.0, 2.0]).unwrap();
        let builder = CurveBuilder::new();
        let cubic = builder.build(&table, CurveType::Cubic);
        let linear = builder.build(&table, CurveType::Linear);
        assert_eq!(cubic, linear);
        assert!((cubic.eval(2.0) - 0.75).abs() < 1e-15);
    }

    #[test]
    fn cubic_through_uniform_positions() {
        let plot = CurveBuilder::new().build(&one_to_six(), CurveType::Cubic);
        // 所有切線皆為 1/7，兩端尾巴延伸到 -1 與 8
        assert!((plot.min_x() + 1.0).abs() < 1e-12);
        assert!((plot.max_x() - 8.0).abs() < 1e-12);
        for k in 1..=6 {
            assert!((plot.eval(k as f64) - k as f64 / 7.0).abs() < 1e-12);
        }
        assert!((plot.eval(3.5) - 0.5).abs() < 1e-12);
        assert_eq!(plot.eval(-5.0), 0.0);
        assert_eq!(plot.eval(20.0), 1.0);
        assert!(plot.eval(0.0) > 0.0 && plot.eval(0.0) < 1.0 / 7.0);
    }

    #[test]
    fn cubic_is_monotone_on_skewed_data() {
        let table = SampleTable::from_samples(&[0.1, 0.2, 0.2, 0.2, 0.9, 5.0, 5.1, 30.0]).unwrap();
        let plot = CurveBuilder::new().build(&table, CurveType::Cubic);
        let mut prev = f64::NEG_INFINITY;
        for pt in plot.sample(2000) {
            assert!(pt.y() >= prev - 1e-12, "decrease at x = {}", pt.x());
            assert!((-1e-12..=1.0 + 1e-12).contains(&pt.y()));
            prev = pt.y();
        }
    }

    #[test]
    fn cubic_keeps_large_magnitude_samples_in_place() {
        // 1e16 附近 f64 間距為 2，前尾長度 0.8 會與第一個節點重合
        let table = SampleTable::from_pairs(vec![(1e16, 1), (1e16 + 2.0, 5), (1e16 + 4.0, 1)]).unwrap();
        let plot = CurveBuilder::new().build(&table, CurveType::Cubic);
        assert_eq!(plot.min_x(), 1e16);
        assert!(plot.max_x() > 1e16 + 4.0);
        assert_eq!(plot.eval(1e16 - 2.0), 0.0);
        assert!((plot.eval(1e16 + 2.0) - 0.75).abs() < 1e-12);
        assert!((plot.eval(1e16 + 4.0) - 0.875).abs() < 1e-12);
        assert_eq!(plot.eval(1e17), 1.0);
    }

    #[test]
    fn linear_failure_falls_back_to_raw() {
        // 1e17 附近 f64 間距為 16，邊距 2 會與端點重合
        let table = SampleTable::from_pairs(vec![(1e17, 1), (1e17 + 16.0, 1)]).unwrap();
        let builder = CurveBuilder::new();
        let plot = builder.build(&table, CurveType::Linear);
        assert_eq!(plot, builder.build(&table, CurveType::Raw));
        assert_eq!(plot.min_x(), 1e17);
        assert_eq!(plot.eval(1e17), 0.5);
        assert_eq!(plot.eval(1e17 + 16.0), 1.0);
    }

    #[test]
    fn fallback_order() {
        assert_eq!(CurveType::Cubic.simpler(), Some(CurveType::Linear));
        assert_eq!(CurveType::Linear.simpler(), Some(CurveType::Raw));
        assert_eq!(CurveType::Raw.simpler(), None);
    }

    #[test]
    fn configured_tail_factor_moves_tails() {
        let builder = CurveBuilder { tail_factor: 1.0, ..CurveBuilder::new() };
        let plot = builder.build(&one_to_six(), CurveType::Cubic);
        assert!((plot.min_x() - 0.0).abs() < 1e-12);
        assert!((plot.max_x() - 7.0).abs() < 1e-12);
    }
}
