//! Pendulum-model position tracking from a wireless IMU stream.
//!
//! A background thread ingests orientation/acceleration datagrams over UDP
//! into a single-slot latest-value cell; a consumer ticks [`SwayTracker`] at
//! its own cadence, calibrating a neutral pose on the first sample and
//! converting tilt relative to it into a horizontal sway offset below a
//! fixed anchor point.

pub mod config;
pub mod io;
pub mod math;
pub mod track;
pub mod utils;

pub use config::TrackerConfig;
pub use io::{receiver::SensorReceiver, wire::SensorSample};
pub use math::frame::AxisMap;
pub use track::{
    calibration::{Calibration, CalibrationFrame},
    estimator::EstimatorParams,
    tracker::SwayTracker,
};
