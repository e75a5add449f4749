pub mod configuration;

pub mod error {
    pub mod modelerror;
}

pub mod math {
    pub mod curve {
        pub mod curve;
        pub mod piecewisefunction;
        pub mod segmentlist;
        pub mod plot;
        pub mod nonparametriccurve {
            pub mod nonparametriccurve;
            pub mod monotonespline;
        }
    }
    pub mod kolmogorov;
    pub mod round;
}

pub mod sample {
    pub mod sampletable;
    pub mod interpolatedecdf;
    pub mod sampleparser;
    pub mod histogram;
}

pub mod distribution {
    pub mod cdf;
    pub mod parametriccdf;
    pub mod empiricalcdf;
    pub mod curvebuilder;
}

pub mod fit {
    pub mod goodnessoffit;
    pub mod fitpoint;
    pub mod cancellation;
    pub mod refinement;
    pub mod parametersearch;
}
