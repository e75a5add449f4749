use crate::distribution::cdf::Cdf;
use crate::math::kolmogorov::kolmogorov_prob;
use crate::sample::sampletable::SampleTable;

// ─────────────────────────────────────────────
// Kolmogorov-Smirnov
// ─────────────────────────────────────────────
//
// 第 i 個排序後樣本（0 起算）在納入前後的經驗值為 i/n 與 (i+1)/n，
// D 為參考 CDF 與這兩個值的最大絕對差，z = D·√n。

/// 單樣本 KS 統計量 D。空樣本時為 0。
pub fn ks_statistic<C: Cdf + ?Sized>(cdf: &C, samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len() as f64;
    sorted
        .iter()
        .enumerate()
        .fold(0.0, |d: f64, (i, &x)| {
            let p = cdf.p(x);
            let before = (p - i as f64 / n).abs();
            let after = (p - (i + 1) as f64 / n).abs();
            d.max(before).max(after)
        })
}

/// 樣本來自參考分布的信心水準，落在 [0, 1]。
pub fn ks_test<C: Cdf + ?Sized>(cdf: &C, samples: &[f64]) -> f64 {
    let d = ks_statistic(cdf, samples);
    kolmogorov_prob(d * (samples.len() as f64).sqrt())
}

/// 以壓縮表計算 D，與展開成個別樣本的結果相同。
///
/// 同一個值的 c 筆觀測只需比較區塊前後兩個經驗值。
pub fn ks_statistic_table<C: Cdf + ?Sized>(cdf: &C, table: &SampleTable) -> f64 {
    let n = table.total() as f64;
    let mut cumulative = 0u64;
    let mut d: f64 = 0.0;
    for (v, c) in table.iter() {
        let p = cdf.p(v);
        let before = (p - cumulative as f64 / n).abs();
        cumulative += c;
        let after = (p - cumulative as f64 / n).abs();
        d = d.max(before).max(after);
    }
    d
}

pub fn ks_test_table<C: Cdf + ?Sized>(cdf: &C, table: &SampleTable) -> f64 {
    let d = ks_statistic_table(cdf, table);
    kolmogorov_prob(d * (table.total() as f64).sqrt())
}

/// 雙樣本 KS：z = D·√(n·m/(n+m))。任一方為空時回傳 1。
pub fn two_sample_ks_test(lhs: &SampleTable, rhs: &SampleTable) -> f64 {
    let (n, m) = (lhs.total() as f64, rhs.total() as f64);
    if n == 0.0 || m == 0.0 {
        return 1.0;
    }
    let d = lhs
        .zip_points(rhs)
        .iter()
        .fold(0.0, |d: f64, &(_, a, b)| d.max((a - b).abs()));
    kolmogorov_prob(d * (n * m / (n + m)).sqrt())
}
