use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::distribution::curvebuilder::CurveType;
use crate::distribution::parametriccdf::DistributionFamily;
use crate::error::modelerror::ModelError;

// 尾端倍數超過 3 時尾端三次式會離開單調圓
const MAX_TAIL_FACTOR: f64 = 3.0;

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SearchJsonProp {
    family: DistributionFamily,
    resolution: usize,
    parallel: bool,
    refine: bool,
    max_refine_iterations: u64,
}

impl Default for SearchJsonProp {
    fn default() -> Self {
        SearchJsonProp {
            family: DistributionFamily::Normal,
            resolution: 40,
            parallel: true,
            refine: false,
            max_refine_iterations: 200,
        }
    }
}

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CurveJsonProp {
    curve_type: CurveType,
    raw_padding: f64,
    linear_margin: f64,
    tail_factor: f64,
    default_min_x: f64,
    default_max_x: f64,
    columns: usize,
}

impl Default for CurveJsonProp {
    fn default() -> Self {
        CurveJsonProp {
            curve_type: CurveType::Cubic,
            raw_padding: 0.15,
            linear_margin: 2.0,
            tail_factor: 2.0,
            default_min_x: -1.0,
            default_max_x: 1.0,
            columns: 200,
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigurationJsonProp {
    search: SearchJsonProp,
    curve: CurveJsonProp,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchConfiguration {
    family: DistributionFamily,
    resolution: usize,
    parallel: bool,
    refine: bool,
    max_refine_iterations: u64,
}

impl SearchConfiguration {
    pub fn family(&self) -> DistributionFamily {
        self.family
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    pub fn refine(&self) -> bool {
        self.refine
    }

    pub fn max_refine_iterations(&self) -> u64 {
        self.max_refine_iterations
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveConfiguration {
    curve_type: CurveType,
    raw_padding: f64,
    linear_margin: f64,
    tail_factor: f64,
    default_min_x: f64,
    default_max_x: f64,
    columns: usize,
}

impl CurveConfiguration {
    pub fn curve_type(&self) -> CurveType {
        self.curve_type
    }

    pub fn raw_padding(&self) -> f64 {
        self.raw_padding
    }

    pub fn linear_margin(&self) -> f64 {
        self.linear_margin
    }

    pub fn tail_factor(&self) -> f64 {
        self.tail_factor
    }

    pub fn default_min_x(&self) -> f64 {
        self.default_min_x
    }

    pub fn default_max_x(&self) -> f64 {
        self.default_max_x
    }

    pub fn columns(&self) -> usize {
        self.columns
    }
}

/// 掃描與曲線的設定，所有欄位皆可省略。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Configuration {
    search: SearchConfiguration,
    curve: CurveConfiguration,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration::new()
    }
}

impl Configuration {
    pub fn new() -> Configuration {
        // 預設值必定通過檢查
        Configuration::from_json_prop_unchecked(ConfigurationJsonProp::default())
    }

    pub fn search(&self) -> &SearchConfiguration {
        &self.search
    }

    pub fn curve(&self) -> &CurveConfiguration {
        &self.curve
    }

    pub fn from_str(json: &str) -> Result<Configuration, ModelError> {
        let json_prop: ConfigurationJsonProp = serde_json::from_str(json)?;
        Configuration::from_json_prop(json_prop)
    }

    pub fn from_reader<P: AsRef<Path>>(file_path: P) -> Result<Configuration, ModelError> {
        let file = File::open(file_path)?;
        let reader = BufReader::new(file);
        let json_prop: ConfigurationJsonProp = serde_json::from_reader(reader)?;
        Configuration::from_json_prop(json_prop)
    }

    fn from_json_prop_unchecked(json_prop: ConfigurationJsonProp) -> Configuration {
        let search = json_prop.search;
        let curve = json_prop.curve;
        Configuration {
            search: SearchConfiguration {
                family: search.family,
                resolution: search.resolution,
                parallel: search.parallel,
                refine: search.refine,
                max_refine_iterations: search.max_refine_iterations,
            },
            curve: CurveConfiguration {
                curve_type: curve.curve_type,
                raw_padding: curve.raw_padding,
                linear_margin: curve.linear_margin,
                tail_factor: curve.tail_factor,
                default_min_x: curve.default_min_x,
                default_max_x: curve.default_max_x,
                columns: curve.columns,
            },
        }
    }

    fn from_json_prop(json_prop: ConfigurationJsonProp) -> Result<Configuration, ModelError> {
        let config = Configuration::from_json_prop_unchecked(json_prop);
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ModelError> {
        let invalid = |message: String| Err(ModelError::InvalidConfiguration(message));
        let curve = &self.curve;
        if self.search.resolution == 0 {
            return Err(ModelError::InvalidResolution(0));
        }
        if !(curve.raw_padding >= 0.0 && curve.raw_padding.is_finite()) {
            return invalid(format!("raw_padding must be a non-negative number, got {}", curve.raw_padding));
        }
        if !(curve.linear_margin > 0.0 && curve.linear_margin.is_finite()) {
            return invalid(format!("linear_margin must be positive, got {}", curve.linear_margin));
        }
        if !(curve.tail_factor > 0.0 && curve.tail_factor <= MAX_TAIL_FACTOR) {
            return invalid(format!("tail_factor must lie in (0, {}], got {}", MAX_TAIL_FACTOR, curve.tail_factor));
        }
        if !(curve.default_min_x.is_finite() && curve.default_max_x.is_finite()) {
            return invalid("default domain must be finite".to_owned());
        }
        if !(curve.default_max_x > curve.default_min_x) {
            return invalid(format!(
                "default_max_x ({}) must exceed default_min_x ({})",
                curve.default_max_x, curve.default_min_x
            ));
        }
        if curve.columns < 2 {
            return invalid(format!("columns must be at least 2, got {}", curve.columns));
        }
        Ok(())
    }
}
