use serde::{
    Deserialize,
    Serialize
};

use crate::error::modelerror::ModelError;

/// 曲線上的節點或取樣點，序列化為 `{"x": .., "y": ..}`。
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    x: f64,
    y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Point2D {
        Point2D { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// 到 `rhs` 的割線斜率。
    pub fn slope_to(&self, rhs: &Point2D) -> f64 {
        (rhs.y - self.y) / (rhs.x - self.x)
    }
}

/// 節點至少 `required` 個，且 x 嚴格遞增。
pub fn check_knots(points: &[Point2D], required: usize) -> Result<(), ModelError> {
    if points.len() < required {
        return Err(ModelError::NotEnoughPoints { required, actual: points.len() });
    }
    match points.windows(2).position(|w| !(w[1].x > w[0].x)) {
        Some(i) => Err(ModelError::UnorderedPoints(i + 1)),
        None => Ok(()),
    }
}

/// 由離散節點決定、帶有建議求值範圍 [min_x, max_x] 的曲線。
pub trait NonparametricCurve {
    fn points(&self) -> Vec<Point2D>;

    fn min_x(&self) -> f64;

    fn max_x(&self) -> f64;

    fn is_non_decreasing(&self) -> bool {
        self.points().windows(2).all(|w| w[1].y >= w[0].y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slope_between_points() {
        let lhs = Point2D::new(1.0, 2.0);
        let rhs = Point2D::new(3.0, 6.0);
        assert_eq!(lhs.slope_to(&rhs), 2.0);
        assert_eq!(rhs.slope_to(&lhs), 2.0);
    }

    #[test]
    fn knot_checks() {
        let pts = [Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.5), Point2D::new(1.0, 0.7)];
        assert!(check_knots(&pts[..2], 2).is_ok());
        assert!(matches!(check_knots(&pts[..1], 2), Err(ModelError::NotEnoughPoints { required: 2, actual: 1 })));
        assert!(matches!(check_knots(&pts, 2), Err(ModelError::UnorderedPoints(2))));
        let nan = [Point2D::new(0.0, 0.0), Point2D::new(f64::NAN, 1.0)];
        assert!(check_knots(&nan, 2).is_err());
    }

    #[test]
    fn serializes_as_object() {
        let json = serde_json::to_string(&Point2D::new(0.5, 0.25)).unwrap();
        assert_eq!(json, r#"{"x":0.5,"y":0.25}"#);
    }
}
