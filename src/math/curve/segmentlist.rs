use crate::error::modelerror::ModelError;
use crate::math::curve::piecewisefunction::PiecewiseFunction;

/// 依斷點排序的 (breakpoint, function) 序列。
///
/// 第一個斷點固定為 -∞，第 i 個函數負責 [breakpoint_i, breakpoint_{i+1})。
/// 斷點嚴格遞增。
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentList {
    segments: Vec<(f64, PiecewiseFunction)>,
}

impl SegmentList {
    pub fn new(first: PiecewiseFunction) -> SegmentList {
        SegmentList { segments: vec![(f64::NEG_INFINITY, first)] }
    }

    pub fn push(&mut self, breakpoint: f64, function: PiecewiseFunction) -> Result<(), ModelError> {
        let previous = self.last_breakpoint();
        if !(breakpoint > previous) {
            return Err(ModelError::UnorderedBreakpoint { previous, breakpoint });
        }
        self.segments.push((breakpoint, function));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn last_breakpoint(&self) -> f64 {
        self.segments.last().map_or(f64::NEG_INFINITY, |(b, _)| *b)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(f64, PiecewiseFunction)> + '_ {
        self.segments.iter()
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = f64> + '_ {
        self.segments.iter().map(|(b, _)| *b)
    }

    /// 負責 x 的區段索引，O(log k)。
    pub fn find_segment(&self, x: f64) -> usize {
        self.segments
            .partition_point(|(b, _)| *b <= x)
            .saturating_sub(1)
    }

    pub fn function_at(&self, x: f64) -> &PiecewiseFunction {
        &self.segments[self.find_segment(x)].1
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.function_at(x).eval(x)
    }

    /// 各區段逐一取導數，斷點不變。
    pub fn derivative(&self) -> SegmentList {
        SegmentList {
            segments: self.segments
                .iter()
                .map(|(b, f)| (*b, f.deriv()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::curve::piecewisefunction::linear_function;

    fn ramp() -> SegmentList {
        let mut list = SegmentList::new(PiecewiseFunction::Constant(0.0));
        list.push(0.0, linear_function(0.0, 0.0, 1.0, 1.0).unwrap()).unwrap();
        list.push(1.0, PiecewiseFunction::Constant(1.0)).unwrap();
        list
    }

    #[test]
    fn first_breakpoint_is_negative_infinity() {
        let list = ramp();
        assert_eq!(list.breakpoints().next(), Some(f64::NEG_INFINITY));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn lookup_is_half_open() {
        let list = ramp();
        assert_eq!(list.find_segment(-1e300), 0);
        assert_eq!(list.find_segment(-0.1), 0);
        assert_eq!(list.find_segment(0.0), 1);
        assert_eq!(list.find_segment(0.999), 1);
        assert_eq!(list.find_segment(1.0), 2);
        assert_eq!(list.find_segment(f64::INFINITY), 2);
        assert_eq!(list.find_segment(f64::NAN), 0);
    }

    #[test]
    fn evaluation_dispatches_to_segment() {
        let list = ramp();
        assert_eq!(list.eval(-5.0), 0.0);
        assert_eq!(list.eval(0.25), 0.25);
        assert_eq!(list.eval(7.0), 1.0);
    }

    #[test]
    fn breakpoints_must_increase() {
        let mut list = ramp();
        assert!(matches!(
            list.push(1.0, PiecewiseFunction::Constant(2.0)),
            Err(ModelError::UnorderedBreakpoint { .. })
        ));
        assert!(list.push(0.5, PiecewiseFunction::Constant(2.0)).is_err());
        assert!(list.push(f64::NAN, PiecewiseFunction::Constant(2.0)).is_err());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn derivative_keeps_breakpoints() {
        let list = ramp();
        let d = list.derivative();
        assert_eq!(d.breakpoints().collect::<Vec<_>>(), list.breakpoints().collect::<Vec<_>>());
        assert_eq!(d.eval(0.5), 1.0);
        assert_eq!(d.eval(2.0), 0.0);
    }
}
