pub mod calibration;
pub mod estimator;
pub mod tracker;
