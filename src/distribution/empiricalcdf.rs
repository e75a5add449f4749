use crate::distribution::cdf::Cdf;
use crate::distribution::curvebuilder::{
    CurveBuilder,
    CurveType
};
use crate::math::curve::plot::Plot;
use crate::sample::sampletable::SampleTable;

/// 以樣本快照作為 CDF：`p` 為階梯 ECDF，`dx` 取單調三次曲線的導數。
#[derive(Clone, Debug, PartialEq)]
pub struct EmpiricalCdf {
    table: SampleTable,
    density: Plot,
}

impl EmpiricalCdf {
    pub fn new(table: SampleTable) -> EmpiricalCdf {
        EmpiricalCdf::with_builder(table, &CurveBuilder::new())
    }

    pub fn with_builder(table: SampleTable, builder: &CurveBuilder) -> EmpiricalCdf {
        let density = builder.build(&table, CurveType::Cubic).derivative();
        EmpiricalCdf { table, density }
    }

    pub fn table(&self) -> &SampleTable {
        &self.table
    }

    pub fn density(&self) -> &Plot {
        &self.density
    }
}

impl Cdf for EmpiricalCdf {
    fn p(&self, x: f64) -> f64 {
        self.table.fraction(x)
    }

    fn dx(&self, x: f64) -> f64 {
        self.density.eval(x)
    }

    fn label(&self) -> String {
        format!("Empirical(n={})", self.table.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_probability_and_smoothed_density() {
        let table = SampleTable::from_samples(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let cdf = EmpiricalCdf::new(table);
        assert_eq!(cdf.p(0.5), 0.0);
        assert!((cdf.p(3.0) - 0.5).abs() < 1e-15);
        assert_eq!(cdf.p(6.0), 1.0);
        assert!((cdf.dx(3.5) - 1.0 / 7.0).abs() < 1e-12);
        assert_eq!(cdf.dx(-10.0), 0.0);
        assert_eq!(cdf.dx(10.0), 0.0);
        assert_eq!(cdf.label(), "Empirical(n=6)");
    }

    #[test]
    fn empty_snapshot() {
        let cdf = EmpiricalCdf::new(SampleTable::new());
        assert_eq!(cdf.p(0.0), 0.0);
        assert_eq!(cdf.dx(0.0), 0.0);
    }
}
