use crate::error::modelerror::ModelError;

// ─────────────────────────────────────────────
// Polynomial
// ─────────────────────────────────────────────

/// 以 Horner 形式儲存的多項式，係數由最高次排到常數項。
///
/// 求值時使用局部座標 `x - origin`。
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    coefs: Vec<f64>,
    origin: f64,
}

impl Polynomial {
    /// 空的係數列表視為零多項式。
    pub fn new(coefs: Vec<f64>) -> Polynomial {
        Self::with_origin(coefs, 0.0)
    }

    pub fn with_origin(coefs: Vec<f64>, origin: f64) -> Polynomial {
        let coefs = if coefs.is_empty() { vec![0.0] } else { coefs };
        Polynomial { coefs, origin }
    }

    pub fn coefs(&self) -> &[f64] {
        &self.coefs
    }

    pub fn origin(&self) -> f64 {
        self.origin
    }

    pub fn degree(&self) -> usize {
        self.coefs.len() - 1
    }

    pub fn eval(&self, x: f64) -> f64 {
        let x_diff = x - self.origin;
        let mut result = self.coefs[0];
        for &beta in &self.coefs[1..] {
            result = f64::mul_add(result, x_diff, beta);
        }
        result
    }

    pub fn derivative(&self) -> Polynomial {
        let order = self.degree();
        let coefs = if order == 0 {
            vec![0.0]
        } else {
            (0..order)
                .map(|i| (order - i) as f64 * self.coefs[i])
                .collect()
        };
        Polynomial { coefs, origin: self.origin }
    }
}

// ─────────────────────────────────────────────
// PiecewiseFunction
// ─────────────────────────────────────────────

/// 分段曲線中單一區段的函數。
///
/// 尾端變體包住一段三次多項式，並在越過漸近點後飽和：
/// `FrontTail` 在 `start` 以下為 0，`BackTail` 在 `end` 以上為 1，
/// `BackTailDerivative` 在 `end` 以上為 0。
#[derive(Clone, Debug, PartialEq)]
pub enum PiecewiseFunction {
    Constant(f64),
    Polynomial(Polynomial),
    FrontTail { start: f64, curve: Polynomial },
    BackTail { end: f64, curve: Polynomial },
    BackTailDerivative { end: f64, curve: Polynomial },
}

impl PiecewiseFunction {
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            PiecewiseFunction::Constant(c) => *c,
            PiecewiseFunction::Polynomial(p) => p.eval(x),
            PiecewiseFunction::FrontTail { start, curve } => {
                if x <= *start { 0.0 } else { curve.eval(x) }
            }
            PiecewiseFunction::BackTail { end, curve } => {
                if x >= *end { 1.0 } else { curve.eval(x) }
            }
            PiecewiseFunction::BackTailDerivative { end, curve } => {
                if x >= *end { 0.0 } else { curve.eval(x) }
            }
        }
    }

    pub fn deriv(&self) -> PiecewiseFunction {
        match self {
            PiecewiseFunction::Constant(_) => PiecewiseFunction::Constant(0.0),
            PiecewiseFunction::Polynomial(p) => {
                if p.degree() == 0 {
                    PiecewiseFunction::Constant(0.0)
                } else {
                    PiecewiseFunction::Polynomial(p.derivative())
                }
            }
            // 0 的導數仍為 0，所以前尾的導數還是前尾
            PiecewiseFunction::FrontTail { start, curve } => PiecewiseFunction::FrontTail {
                start: *start,
                curve: curve.derivative(),
            },
            PiecewiseFunction::BackTail { end, curve }
            | PiecewiseFunction::BackTailDerivative { end, curve } => {
                PiecewiseFunction::BackTailDerivative {
                    end: *end,
                    curve: curve.derivative(),
                }
            }
        }
    }
}

// ─────────────────────────────────────────────
// 建構輔助函數
// ─────────────────────────────────────────────

/// 通過 (x1, y1)、(x2, y2) 的一次多項式。
pub fn linear_function(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<PiecewiseFunction, ModelError> {
    if x1 == x2 {
        return Err(ModelError::CoincidentAbscissae(x1));
    }
    let slope = (y2 - y1) / (x2 - x1);
    Ok(PiecewiseFunction::Polynomial(Polynomial::with_origin(vec![slope, y1], x1)))
}

/// 滿足兩端點函數值與一階導數的三次 Hermite 多項式。
///
/// 以 t = x - x1、h = x2 - x1、Δ = y2 - y1 表示：
///   p(t) = y1 + dy1·t + c·t² + d·t³
///   c = (3Δ/h - 2·dy1 - dy2) / h
///   d = (-2Δ/h + dy1 + dy2) / h²
pub fn cubic_function(
    x1: f64,
    y1: f64,
    dy1: f64,
    x2: f64,
    y2: f64,
    dy2: f64,
) -> Result<PiecewiseFunction, ModelError> {
    Ok(PiecewiseFunction::Polynomial(cubic_polynomial(x1, y1, dy1, x2, y2, dy2)?))
}

pub(crate) fn cubic_polynomial(
    x1: f64,
    y1: f64,
    dy1: f64,
    x2: f64,
    y2: f64,
    dy2: f64,
) -> Result<Polynomial, ModelError> {
    if x1 == x2 {
        return Err(ModelError::CoincidentAbscissae(x1));
    }
    let h = x2 - x1;
    let secant = (y2 - y1) / h;
    let c = (3.0 * secant - 2.0 * dy1 - dy2) / h;
    let d = (-2.0 * secant + dy1 + dy2) / (h * h);
    Ok(Polynomial::with_origin(vec![d, c, dy1, y1], x1))
}
