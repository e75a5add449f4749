/// 累積分布函數的共同介面。
///
/// `p` 必須單調不減且落在 [0, 1]；`dx` 為對應的密度。
pub trait Cdf: Send + Sync {
    fn p(&self, x: f64) -> f64;
    fn dx(&self, x: f64) -> f64;
    fn label(&self) -> String;
}
