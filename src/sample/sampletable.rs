use std::cmp::Ordering;

use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer
};
use tracing::trace;

use crate::distribution::cdf::Cdf;
use crate::error::modelerror::ModelError;
use crate::fit::goodnessoffit::{
    ks_test_table,
    two_sample_ks_test
};

/// 二分搜尋的結果：找到完全相同的值，或是應插入的位置。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(usize),
    InsertAt(usize),
}

/// 經排序、去重的 value → count 表（ECDF 的儲存形式）。
///
/// `values` 嚴格遞增且皆為有限值，`counts` 與之對齊且皆 ≥ 1。
/// 只會透過 `add` 與 `merge` 變更，不會縮小。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleTable {
    values: Vec<f64>,
    counts: Vec<u64>,
}

impl SampleTable {
    pub fn new() -> SampleTable {
        SampleTable::default()
    }

    /// 排序後依相同值計數。
    pub fn from_samples(samples: &[f64]) -> Result<SampleTable, ModelError> {
        if let Some(&bad) = samples.iter().find(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteSample(bad));
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mut table = SampleTable::new();
        for v in sorted {
            let v = if v == 0.0 { 0.0 } else { v };
            match table.values.last() {
                Some(&last) if last == v => {
                    if let Some(c) = table.counts.last_mut() {
                        *c += 1;
                    }
                }
                _ => {
                    table.values.push(v);
                    table.counts.push(1);
                }
            }
        }
        Ok(table)
    }

    /// 由 (value, count) 序列建立，檢查排序與計數。
    pub fn from_pairs(pairs: Vec<(f64, u64)>) -> Result<SampleTable, ModelError> {
        let mut table = SampleTable {
            values: Vec::with_capacity(pairs.len()),
            counts: Vec::with_capacity(pairs.len()),
        };
        for (i, (v, c)) in pairs.into_iter().enumerate() {
            if !v.is_finite() {
                return Err(ModelError::InvalidTable(format!("value at index {} is not finite", i)));
            }
            if c == 0 {
                return Err(ModelError::InvalidTable(format!("count at index {} is zero", i)));
            }
            let v = if v == 0.0 { 0.0 } else { v };
            if let Some(&last) = table.values.last() {
                if !(v > last) {
                    return Err(ModelError::InvalidTable(format!(
                        "values must be strictly increasing ({} follows {})",
                        v, last
                    )));
                }
            }
            table.values.push(v);
            table.counts.push(c);
        }
        Ok(table)
    }

    pub fn from_json(json: &str) -> Result<SampleTable, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 以 `[[value, count], ...]` 輸出。
    ///
    /// 數值一律寫成浮點形式（`1` 會寫成 `1.0`），因此對本函式自己輸出的文字，
    /// `from_json` 後再 `to_json` 會得到相同字串。
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    /// 不重複值的個數。
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 觀測值總數。
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.values.iter().copied().zip(self.counts.iter().copied())
    }

    pub fn min(&self) -> Option<f64> {
        self.values.first().copied()
    }

    pub fn max(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn locate(&self, v: f64) -> SearchOutcome {
        // -0.0 與 0.0 視為同一個值
        let v = if v == 0.0 { 0.0 } else { v };
        let mut lo = 0;
        let mut hi = self.values.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.values[mid].total_cmp(&v) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return SearchOutcome::Found(mid),
            }
        }
        SearchOutcome::InsertAt(lo)
    }

    fn add_n(&mut self, v: f64, count: u64) -> Result<(), ModelError> {
        if !v.is_finite() {
            return Err(ModelError::NonFiniteSample(v));
        }
        let v = if v == 0.0 { 0.0 } else { v };
        match self.locate(v) {
            SearchOutcome::Found(i) => self.counts[i] += count,
            SearchOutcome::InsertAt(i) => {
                self.values.insert(i, v);
                self.counts.insert(i, count);
            }
        }
        Ok(())
    }

    /// 加入一筆觀測值。
    pub fn add(&mut self, v: f64) -> Result<(), ModelError> {
        self.add_n(v, 1)
    }

    /// 線性雙指標合併；相同的值計數相加。
    pub fn merge(&mut self, other: &SampleTable) {
        if other.is_empty() {
            return;
        }
        let capacity = self.len() + other.len();
        let mut values = Vec::with_capacity(capacity);
        let mut counts = Vec::with_capacity(capacity);
        let (mut i, mut j) = (0, 0);
        while i < self.len() && j < other.len() {
            let (a, b) = (self.values[i], other.values[j]);
            if a < b {
                values.push(a);
                counts.push(self.counts[i]);
                i += 1;
            } else if b < a {
                values.push(b);
                counts.push(other.counts[j]);
                j += 1;
            } else {
                values.push(a);
                counts.push(self.counts[i] + other.counts[j]);
                i += 1;
                j += 1;
            }
        }
        values.extend_from_slice(&self.values[i..]);
        counts.extend_from_slice(&self.counts[i..]);
        values.extend_from_slice(&other.values[j..]);
        counts.extend_from_slice(&other.counts[j..]);
        trace!(before = self.len(), incoming = other.len(), after = values.len(), "sample tables merged");
        self.values = values;
        self.counts = counts;
    }

    /// 加權平均；空表時為 `None`。
    pub fn mean(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let sum: f64 = self.iter().map(|(v, c)| v * c as f64).sum();
        Some(sum / total as f64)
    }

    /// 加權樣本標準差（除以 total - 1）；觀測值不超過 1 筆時為 `None`。
    pub fn stddev(&self, mean: f64) -> Option<f64> {
        let total = self.total();
        if total <= 1 {
            return None;
        }
        let sum: f64 = self
            .iter()
            .map(|(v, c)| {
                let err = v - mean;
                err * err * c as f64
            })
            .sum();
        Some((sum / (total - 1) as f64).sqrt())
    }

    /// ECDF 上的點：(value, P(X ≤ value))。
    pub fn point_iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let total = self.total() as f64;
        self.iter().scan(0u64, move |sum, (v, c)| {
            *sum += c;
            Some((v, *sum as f64 / total))
        })
    }

    /// 階梯 ECDF 在 x 的值。
    pub fn fraction(&self, x: f64) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let idx = self.values.partition_point(|&v| v <= x);
        let below: u64 = self.counts[..idx].iter().sum();
        below as f64 / total as f64
    }

    /// 單樣本 KS 檢定：樣本來自參考分布的信心水準。
    pub fn drawn_from_distribution<C: Cdf + ?Sized>(&self, cdf: &C) -> f64 {
        ks_test_table(cdf, self)
    }

    /// 雙樣本 KS 檢定：兩個樣本來自同一分布的信心水準。
    pub fn drawn_from_same_distribution_as(&self, other: &SampleTable) -> f64 {
        two_sample_ks_test(self, other)
    }

    /// 兩條 ECDF 依序走過所有斷點：(value, P_self, P_other)。
    ///
    /// 其中一方已走完時以 1.0 代入。
    pub fn zip_points(&self, other: &SampleTable) -> Vec<(f64, f64, f64)> {
        let a_points: Vec<(f64, f64)> = self.point_iter().collect();
        let b_points: Vec<(f64, f64)> = other.point_iter().collect();
        let mut out = Vec::with_capacity(a_points.len() + b_points.len());
        let (mut i, mut j) = (0, 0);
        let (mut a, mut b) = (0.0, 0.0);
        loop {
            match (a_points.get(i), b_points.get(j)) {
                (Some(&(a_v, a_p)), Some(&(b_v, b_p))) => {
                    let v = if a_v <= b_v { a_v } else { b_v };
                    if a_v <= b_v {
                        a = a_p;
                        i += 1;
                    }
                    if a_v >= b_v {
                        b = b_p;
                        j += 1;
                    }
                    out.push((v, a, b));
                }
                (Some(&(a_v, a_p)), None) => {
                    out.push((a_v, a_p, 1.0));
                    i += 1;
                }
                (None, Some(&(b_v, b_p))) => {
                    out.push((b_v, 1.0, b_p));
                    j += 1;
                }
                (None, None) => break,
            }
        }
        out
    }

    /// 兩條階梯 ECDF 之間的面積。
    pub fn area_difference(&self, other: &SampleTable) -> f64 {
        let points = self.zip_points(other);
        points
            .windows(2)
            .map(|w| (w[1].0 - w[0].0) * (w[0].1 - w[0].2).abs())
            .sum()
    }
}

impl Serialize for SampleTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for pair in self.iter() {
            seq.serialize_element(&pair)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for SampleTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs = Vec::<(f64, u64)>::deserialize(deserializer)?;
        SampleTable::from_pairs(pairs).map_err(D::Error::custom)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn small_values() -> impl Strategy<Value = Vec<f64>> {
        // 取整數值，確保有重複
        proptest::collection::vec((-20i32..20).prop_map(f64::from), 0..=60)
    }

    proptest! {
        #[test]
        fn insertion_order_does_not_matter(values in small_values(), seed in any::<u64>()) {
            let mut shuffled = values.clone();
            // 簡單的確定性洗牌
            let mut state = seed | 1;
            for i in (1..shuffled.len()).rev() {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                let j = (state % (i as u64 + 1)) as usize;
                shuffled.swap(i, j);
            }
            let mut a = SampleTable::new();
            for v in &values {
                a.add(*v).unwrap();
            }
            let mut b = SampleTable::new();
            for v in &shuffled {
                b.add(*v).unwrap();
            }
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a, SampleTable::from_samples(&values).unwrap());
        }

        #[test]
        fn merge_is_commutative_and_associative(x in small_values(), y in small_values(), z in small_values()) {
            let a = SampleTable::from_samples(&x).unwrap();
            let b = SampleTable::from_samples(&y).unwrap();
            let c = SampleTable::from_samples(&z).unwrap();

            let mut ab = a.clone();
            ab.merge(&b);
            let mut ba = b.clone();
            ba.merge(&a);
            prop_assert_eq!(&ab, &ba);

            let mut ab_c = ab.clone();
            ab_c.merge(&c);
            let mut bc = b.clone();
            bc.merge(&c);
            let mut a_bc = a.clone();
            a_bc.merge(&bc);
            prop_assert_eq!(&ab_c, &a_bc);

            let all: Vec<f64> = x.iter().chain(y.iter()).chain(z.iter()).copied().collect();
            prop_assert_eq!(ab_c, SampleTable::from_samples(&all).unwrap());
        }

        #[test]
        fn json_round_trip_preserves_text(values in small_values()) {
            let table = SampleTable::from_samples(&values).unwrap();
            let json = table.to_json().unwrap();
            let back = SampleTable::from_json(&json).unwrap();
            prop_assert_eq!(back.to_json().unwrap(), json);
            prop_assert_eq!(back, table);
        }
    }
}
