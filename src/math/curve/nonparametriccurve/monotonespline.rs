use tracing::debug;

use crate::error::modelerror::ModelError;
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    check_knots,
    NonparametricCurve,
    Point2D
};
use crate::math::curve::piecewisefunction::{
    cubic_function,
    cubic_polynomial,
    PiecewiseFunction
};
use crate::math::curve::plot::Plot;
use crate::math::curve::segmentlist::SegmentList;

/// 尾端外插距離的預設倍數：x0 = x1 - k·y1/dy1、x2 = x1 + k·(1-y1)/dy1。
///
/// k ≤ 3 時尾端三次式落在 Fritsch-Carlson 單調圓內。
pub const DEFAULT_TAIL_FACTOR: f64 = 2.0;

// ─────────────────────────────────────────────
// Fritsch-Carlson 切線
// ─────────────────────────────────────────────
//
// 1. 割線 d[i] = (y[i+1]-y[i]) / (x[i+1]-x[i])
// 2. 暫定切線：端點沿用相鄰割線；內部點若兩側割線異號則為 0，否則取平均
// 3. 割線為 0 的區間，兩端切線都強制為 0（獨立一輪，不會被步驟 2 覆蓋）
// 4. 限制：a = m[i]/d[i]、b = m[i+1]/d[i]，若 a²+b² > 9，
//    兩條切線乘上 τ = 3/√(a²+b²)

pub fn fritsch_carlson_tangents(points: &[Point2D]) -> Vec<f64> {
    let n = points.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let secants: Vec<f64> = points
        .windows(2)
        .map(|w| w[0].slope_to(&w[1]))
        .collect();

    let mut m = vec![0.0_f64; n];
    m[0] = secants[0];
    m[n - 1] = secants[n - 2];
    for i in 1..(n - 1) {
        let (d0, d1) = (secants[i - 1], secants[i]);
        m[i] = if d0 * d1 <= 0.0 { 0.0 } else { (d0 + d1) / 2.0 };
    }

    for (k, &dk) in secants.iter().enumerate() {
        if dk == 0.0 {
            m[k] = 0.0;
            m[k + 1] = 0.0;
        }
    }

    let mut limited = 0usize;
    for (k, &dk) in secants.iter().enumerate() {
        if dk == 0.0 {
            continue;
        }
        let ak = m[k] / dk;
        let bk = m[k + 1] / dk;
        let radius2 = ak * ak + bk * bk;
        if radius2 > 9.0 {
            let tau = 3.0 / radius2.sqrt();
            m[k] = tau * ak * dk;
            m[k + 1] = tau * bk * dk;
            limited += 1;
        }
    }
    if limited > 0 {
        debug!(limited, intervals = secants.len(), "fritsch-carlson limiting applied");
    }
    m
}

// ─────────────────────────────────────────────
// MonotoneSpline
// ─────────────────────────────────────────────

/// 保單調的三次 Hermite 樣條。
///
/// 輸入 x 必須嚴格遞增；y 應為單調不減，但不做檢查。
#[derive(Clone, Debug)]
pub struct MonotoneSpline {
    knots: Vec<Point2D>,
    tangents: Vec<f64>,
}

impl MonotoneSpline {
    pub fn new(knots: Vec<Point2D>) -> Result<MonotoneSpline, ModelError> {
        check_knots(&knots, 2)?;
        let tangents = fritsch_carlson_tangents(&knots);
        Ok(MonotoneSpline { knots, tangents })
    }

    pub fn knots(&self) -> &[Point2D] {
        &self.knots
    }

    pub fn tangents(&self) -> &[f64] {
        &self.tangents
    }

    fn interior_segments(&self) -> Result<Vec<(f64, PiecewiseFunction)>, ModelError> {
        self.knots
            .windows(2)
            .zip(self.tangents.windows(2))
            .map(|(p, t)| {
                let f = cubic_function(p[0].x(), p[0].y(), t[0], p[1].x(), p[1].y(), t[1])?;
                Ok((p[0].x(), f))
            })
            .collect()
    }

    /// 只含節點區間的曲線，兩端以常數延伸。
    pub fn to_plot(&self) -> Result<Plot, ModelError> {
        let first = self.knots[0];
        let last = self.knots[self.knots.len() - 1];
        let mut segments = SegmentList::new(PiecewiseFunction::Constant(first.y()));
        for (b, f) in self.interior_segments()? {
            segments.push(b, f)?;
        }
        segments.push(last.x(), PiecewiseFunction::Constant(last.y()))?;
        Ok(Plot::new(segments, first.x(), last.x()))
    }

    /// 前尾：從 x0 處 (0, 斜率 0) 接到第一個節點的三次式。
    ///
    /// 第一個節點已在 0、切線不為正，或 x0 在浮點數上與節點重合時，
    /// 退化為常數 0，回傳的 x 為第一個節點。
    pub fn front_tail(&self, tail_factor: f64) -> Result<(f64, PiecewiseFunction), ModelError> {
        let first = self.knots[0];
        let (x1, y1, dy1) = (first.x(), first.y(), self.tangents[0]);
        if !(y1 > 0.0 && dy1 > 0.0) {
            return Ok((x1, PiecewiseFunction::Constant(0.0)));
        }
        let x0 = x1 - tail_factor * y1 / dy1;
        if !(x0 < x1) {
            debug!(x1, "front tail shorter than the spacing of f64 at the first knot");
            return Ok((x1, PiecewiseFunction::Constant(0.0)));
        }
        let curve = cubic_polynomial(x0, 0.0, 0.0, x1, y1, dy1)?;
        Ok((x0, PiecewiseFunction::FrontTail { start: x0, curve }))
    }

    /// 後尾：從最後一個節點接到 x2 處 (1, 斜率 0) 的三次式。
    ///
    /// 最後一個節點已達 1、切線不為正，或 x2 在浮點數上與節點重合時，
    /// 退化為常數 1，回傳的 x 為最後一個節點。
    pub fn back_tail(&self, tail_factor: f64) -> Result<(f64, PiecewiseFunction), ModelError> {
        let last = self.knots[self.knots.len() - 1];
        let (x1, y1, dy1) = (last.x(), last.y(), self.tangents[self.tangents.len() - 1]);
        if !(y1 < 1.0 && dy1 > 0.0) {
            return Ok((x1, PiecewiseFunction::Constant(1.0)));
        }
        let x2 = x1 + tail_factor * (1.0 - y1) / dy1;
        if !(x2 > x1) {
            debug!(x1, "back tail shorter than the spacing of f64 at the last knot");
            return Ok((x1, PiecewiseFunction::Constant(1.0)));
        }
        let curve = cubic_polynomial(x1, y1, dy1, x2, 1.0, 0.0)?;
        Ok((x2, PiecewiseFunction::BackTail { end: x2, curve }))
    }

    /// 完整 CDF 曲線：前尾、各區間三次式、後尾、x2 之後的常數 1。
    ///
    /// 建議範圍為兩條尾巴的漸近點 [x0, x2]。
    pub fn to_cdf_plot(&self, tail_factor: f64) -> Result<Plot, ModelError> {
        let first_x = self.knots[0].x();
        let last_x = self.knots[self.knots.len() - 1].x();

        let (min_x, front) = self.front_tail(tail_factor)?;
        let (max_x, back) = self.back_tail(tail_factor)?;

        let mut segments = SegmentList::new(front);
        for (b, f) in self.interior_segments()? {
            segments.push(b, f)?;
        }
        let has_back_tail = matches!(back, PiecewiseFunction::BackTail { .. });
        segments.push(last_x, back)?;
        if has_back_tail {
            segments.push(max_x, PiecewiseFunction::Constant(1.0))?;
        }
        debug!(knots = self.knots.len(), min_x, max_x, first_x, last_x, "monotone cdf plot built");
        Ok(Plot::new(segments, min_x, max_x))
    }
}

impl NonparametricCurve for MonotoneSpline {
    fn points(&self) -> Vec<Point2D> {
        self.knots.clone()
    }

    fn min_x(&self) -> f64 {
        self.knots[0].x()
    }

    fn max_x(&self) -> f64 {
        self.knots[self.knots.len() - 1].x()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn monotone_knots() -> impl Strategy<Value = Vec<Point2D>> {
        proptest::collection::vec((0.01_f64..10.0, 0.0_f64..1.0), 2..=40).prop_map(|steps| {
            let total_rise: f64 = steps.iter().map(|s| s.1).sum::<f64>() + 1.0;
            let mut x = -5.0;
            let mut y = 0.0;
            steps
                .into_iter()
                .map(|(dx, dy)| {
                    x += dx;
                    y += dy / total_rise;
                    Point2D::new(x, y)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn cdf_plot_is_non_decreasing(knots in monotone_knots(), factor in 0.5_f64..=3.0) {
            let spline = MonotoneSpline::new(knots).unwrap();
            let plot = spline.to_cdf_plot(factor).unwrap();
            let lo = plot.min_x() - 1.0;
            let hi = plot.max_x() + 1.0;
            let steps = 2000;
            let mut prev = plot.eval(lo);
            prop_assert!(prev >= -1e-12);
            for i in 1..=steps {
                let x = lo + (hi - lo) * i as f64 / steps as f64;
                let y = plot.eval(x);
                prop_assert!(y >= prev - 1e-12, "decrease at x = {}: {} -> {}", x, prev, y);
                prop_assert!(y <= 1.0 + 1e-12);
                prev = y;
            }
        }

        #[test]
        fn interior_plot_is_non_decreasing(knots in monotone_knots()) {
            let spline = MonotoneSpline::new(knots.clone()).unwrap();
            let plot = spline.to_plot().unwrap();
            for w in knots.windows(2) {
                let mut prev = plot.eval(w[0].x());
                for i in 1..=50 {
                    let x = w[0].x() + (w[1].x() - w[0].x()) * i as f64 / 50.0;
                    let y = plot.eval(x);
                    prop_assert!(y >= prev - 1e-12);
                    prev = y;
                }
            }
        }
    }
}
