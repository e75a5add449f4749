// Kolmogorov 分布的存活函數（漸近近似）。
//
// 三段近似取自 CERN ROOT 的 TMath::KolmogorovProb：
//   z < 0.2            → 1
//   0.2 ≤ z < 0.755    → theta 函數反演公式
//   0.755 ≤ z < 6.8116 → 交錯級數 2·Σ (-1)^(j-1)·exp(-2j²z²)
//   z ≥ 6.8116         → 0（小於 1e-15 的機率直接視為 0）

use crate::math::round::nint;

const W: f64 = 2.50662827;
// c1 = -π²/8, c2 = 9·c1, c3 = 25·c1
const C1: f64 = -1.2337005501361697;
const C2: f64 = -11.103304951225528;
const C3: f64 = -30.842513753404244;
const FJ: [f64; 4] = [-2.0, -8.0, -18.0, -32.0];

/// 在虛無假設下，Kolmogorov 統計量 √n·D 超過 z 的機率。
///
/// 兩樣本比較時以 z = √(n·m/(n+m))·D 代入。
pub fn kolmogorov_prob(z: f64) -> f64 {
    if z < 0.2 {
        1.0
    } else if z < 0.755 {
        let v = 1.0 / (z * z);
        1.0 - W * ((C1 * v).exp() + (C2 * v).exp() + (C3 * v).exp()) / z
    } else if z < 6.8116 {
        let v = z * z;
        let max_j = nint(3.0 / z).clamp(1, FJ.len() as i64) as usize;
        let mut r = [0.0_f64; 4];
        for j in 0..max_j {
            r[j] = (FJ[j] * v).exp();
        }
        2.0 * (r[0] - r[1] + r[2] - r[3])
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturates_outside_modelled_regimes() {
        assert_eq!(kolmogorov_prob(0.0), 1.0);
        assert_eq!(kolmogorov_prob(0.1), 1.0);
        assert_eq!(kolmogorov_prob(6.8116), 0.0);
        assert_eq!(kolmogorov_prob(10.0), 0.0);
    }

    #[test]
    fn constants_follow_pi() {
        let c1 = -std::f64::consts::PI * std::f64::consts::PI / 8.0;
        assert!((C1 - c1).abs() < 1e-15);
        assert!((C2 - 9.0 * c1).abs() < 1e-13);
        assert!((C3 - 25.0 * c1).abs() < 1e-13);
    }

    #[test]
    fn known_values() {
        assert!((kolmogorov_prob(0.7549) - 0.6189241685558303).abs() < 1e-9);
        assert!((kolmogorov_prob(0.755) - 0.6187560849843837).abs() < 1e-9);
        // 常用的 5% 臨界值 1.3581
        assert!((kolmogorov_prob(1.3581) - 0.05).abs() < 1e-3);
        assert!((kolmogorov_prob(1.0) - 0.26999967167737987).abs() < 1e-9);
    }

    #[test]
    fn non_increasing_across_regime_boundaries() {
        let mut prev = kolmogorov_prob(0.0);
        let mut z = 0.0;
        while z < 8.0 {
            z += 1e-4;
            let p = kolmogorov_prob(z);
            assert!(p <= prev + 1e-12, "increase at z = {}: {} -> {}", z, prev, p);
            assert!((0.0..=1.0).contains(&p));
            prev = p;
        }
        for boundary in [0.2, 0.755, 6.8116] {
            assert!(kolmogorov_prob(boundary - 1e-9) + 1e-12 >= kolmogorov_prob(boundary));
        }
    }
}
