/// 四捨六入五成雙（banker's rounding）到指定小數位數。
pub fn round(x: f64, digits: u32) -> f64 {
    let scale = 10.0_f64.powi(digits as i32);
    let y = x * scale;
    let mut z = y.round();
    if (y - z).abs() == 0.5 {
        z = 2.0 * (y / 2.0).round();
    }
    z / scale
}

/// 最接近的整數，.5 時取偶數。
pub fn nint(x: f64) -> i64 {
    round(x, 0) as i64
}
