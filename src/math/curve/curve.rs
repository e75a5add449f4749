use crate::math::curve::nonparametriccurve::nonparametriccurve::Point2D;

/// 可在任意 x 求值與求導的一維曲線。
pub trait Curve {
    fn value(&self, x: f64) -> f64;

    fn derivative(&self, x: f64) -> f64;

    /// 在 [min_x, max_x] 上等距取 `columns` 個點求值，最後一點固定為 max_x。
    fn tabulate(&self, min_x: f64, max_x: f64, columns: usize) -> Vec<Point2D> {
        match columns {
            0 => Vec::new(),
            1 => vec![Point2D::new(min_x, self.value(min_x))],
            _ => {
                let step = (max_x - min_x) / (columns - 1) as f64;
                (0..columns)
                    .map(|i| {
                        let x = if i == columns - 1 { max_x } else { min_x + step * i as f64 };
                        Point2D::new(x, self.value(x))
                    })
                    .collect()
            }
        }
    }
}
