use thiserror::Error;

/// 模型層共用的錯誤型別。
///
/// 所有「前置條件不成立」的情況都在 API 邊界以這個型別回報，
/// 不會在內部 panic。
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("coincident abscissae at x = {0}")]
    CoincidentAbscissae(f64),

    #[error("breakpoint {breakpoint} does not follow previous breakpoint {previous}")]
    UnorderedBreakpoint { previous: f64, breakpoint: f64 },

    #[error("x values must be strictly ascending (violated at index {0})")]
    UnorderedPoints(usize),

    #[error("at least {required} points are needed, got {actual}")]
    NotEnoughPoints { required: usize, actual: usize },

    #[error("sample value {0} is not finite")]
    NonFiniteSample(f64),

    #[error("cannot parse sample '{0}'")]
    InvalidSample(String),

    #[error("invalid sample table: {0}")]
    InvalidTable(String),

    #[error("at least {required} observations are needed, got {actual}")]
    InsufficientSamples { required: u64, actual: u64 },

    #[error("grid resolution must be at least 1, got {0}")]
    InvalidResolution(usize),

    #[error("parameter scan cancelled")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("refinement failed: {0}")]
    Refinement(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
