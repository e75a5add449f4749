use crate::sample::sampletable::SampleTable;

/// SampleTable 的線性內插檢視：相鄰樣本值之間的累積次數以直線連接。
///
/// 第一個樣本值之前以前兩個樣本值的斜率往回外推；
/// 少於兩個不重複值時無法外推，該區域回傳 NaN。
#[derive(Clone, Copy, Debug)]
pub struct InterpolatedEcdf<'a> {
    table: &'a SampleTable,
}

impl<'a> InterpolatedEcdf<'a> {
    pub fn new(table: &'a SampleTable) -> InterpolatedEcdf<'a> {
        InterpolatedEcdf { table }
    }

    pub fn table(&self) -> &'a SampleTable {
        self.table
    }

    /// 觀測值總數。
    pub fn len(&self) -> f64 {
        self.table.total() as f64
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// 累積比例 q 對應的值。
    ///
    /// q 為 NaN 或表為空時回傳 NaN；q < 0 為 -∞，q > 1 為 +∞。
    pub fn quantile(&self, q: f64) -> f64 {
        if q.is_nan() {
            return f64::NAN;
        }
        if q < 0.0 {
            return f64::NEG_INFINITY;
        }
        if q > 1.0 {
            return f64::INFINITY;
        }
        let mut pairs = self.table.iter();
        let (first_v, first_c) = match pairs.next() {
            Some((v, c)) => (v, c as f64),
            None => return f64::NAN,
        };

        let mut rank = self.len() * q;
        if first_c > rank {
            return match pairs.next() {
                Some((next_v, next_c)) => {
                    let slope = (next_v - first_v) / next_c as f64;
                    first_v + (rank - first_c) * slope
                }
                None => f64::NAN,
            };
        }
        rank -= first_c;
        let mut lower = first_v;
        for (v, c) in pairs {
            let c = c as f64;
            if c > rank {
                return lower + (v - lower) * (rank / c);
            }
            lower = v;
            rank -= c;
        }
        lower
    }

    /// 內插後在 v 的累積比例，截在 [0, 1]。
    ///
    /// v 為 NaN 或表為空時回傳 NaN。
    pub fn fraction(&self, v: f64) -> f64 {
        if v.is_nan() || self.table.is_empty() {
            return f64::NAN;
        }
        let values = self.table.values();
        let counts = self.table.counts();
        let total = self.len();

        let rank = if v < values[0] {
            if values.len() < 2 {
                return f64::NAN;
            }
            let slope = counts[1] as f64 / (values[1] - values[0]);
            counts[0] as f64 + (v - values[0]) * slope
        } else {
            // values[upper] 為第一個大於 v 的值
            let upper = values.partition_point(|&x| x <= v);
            if upper == values.len() {
                return 1.0;
            }
            let through_upper: u64 = counts[..=upper].iter().sum();
            let slope = counts[upper] as f64 / (values[upper] - values[upper - 1]);
            through_upper as f64 + (v - values[upper]) * slope
        };
        (rank / total).clamp(0.0, 1.0)
    }
}

impl SampleTable {
    pub fn interpolate(&self) -> InterpolatedEcdf<'_> {
        InterpolatedEcdf::new(self)
    }
}
