use crate::math::curve::curve::Curve;
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    NonparametricCurve,
    Point2D
};
use crate::math::curve::segmentlist::SegmentList;

/// 分段曲線加上建議的繪圖範圍。
///
/// `min_x`/`max_x` 只是建議的顯示區間，範圍外仍可求值。
#[derive(Clone, Debug, PartialEq)]
pub struct Plot {
    segments: SegmentList,
    min_x: f64,
    max_x: f64,
}

impl Plot {
    pub fn new(segments: SegmentList, min_x: f64, max_x: f64) -> Plot {
        Plot { segments, min_x, max_x }
    }

    pub fn segments(&self) -> &SegmentList {
        &self.segments
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.segments.eval(x)
    }

    pub fn derivative(&self) -> Plot {
        Plot {
            segments: self.segments.derivative(),
            min_x: self.min_x,
            max_x: self.max_x,
        }
    }

    /// 在 [min_x, max_x] 上等距取 `columns` 個點，相當於外部繪圖逐欄求值。
    pub fn sample(&self, columns: usize) -> Vec<Point2D> {
        self.tabulate(self.min_x, self.max_x, columns)
    }
}

impl Curve for Plot {
    fn value(&self, x: f64) -> f64 {
        self.eval(x)
    }

    fn derivative(&self, x: f64) -> f64 {
        self.segments.function_at(x).deriv().eval(x)
    }
}

impl NonparametricCurve for Plot {
    /// 各有限斷點上的曲線值。
    fn points(&self) -> Vec<Point2D> {
        self.segments
            .breakpoints()
            .filter(|b| b.is_finite())
            .map(|b| Point2D::new(b, self.eval(b)))
            .collect()
    }

    fn min_x(&self) -> f64 {
        self.min_x
    }

    fn max_x(&self) -> f64 {
        self.max_x
    }
}
