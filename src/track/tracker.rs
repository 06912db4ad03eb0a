use std::sync::Arc;

use nalgebra::{UnitQuaternion, Vector3};

use crate::{
    io::wire::SensorSample,
    track::{
        calibration::Calibration,
        estimator::{self, EstimatorParams},
    },
    utils::latest::LatestCell,
};

/// Consumer side of the pipeline: ticks at the caller's cadence, consuming
/// at most one sample per tick from the shared slot.
///
/// The first consumed sample calibrates the neutral pose; each fresh sample
/// afterwards produces a new position estimate. When no sample arrived since
/// the previous tick the last estimate is returned unchanged (the rest pose
/// `anchor + (0, -L, 0)` before any sample at all). Single-threaded by
/// design; only the slot is shared with the ingestion thread.
#[derive(Debug)]
pub struct SwayTracker {
    slot: Arc<LatestCell<SensorSample>>,
    params: EstimatorParams,
    calibration: Calibration,
    last_position: Option<Vector3<f64>>,
}

impl SwayTracker {
    pub fn new(slot: Arc<LatestCell<SensorSample>>, params: EstimatorParams) -> Self {
        SwayTracker {
            slot,
            params,
            calibration: Calibration::default(),
            last_position: None,
        }
    }

    /// One consumer tick. Never blocks.
    pub fn update(&mut self, anchor_m: &Vector3<f64>) -> Vector3<f64> {
        if let Some(sample) = self.slot.take_fresh() {
            let oriented =
                estimator::mount_adjusted(&sample.quat, self.params.mounting_roll_offset_deg);
            let frame = self.calibration.observe(&oriented);

            let position = estimator::compute(&sample.quat, &frame, anchor_m, &self.params);
            self.last_position = Some(position);
            position
        } else {
            self.last_position
                .unwrap_or_else(|| anchor_m + Vector3::new(0.0, -self.params.pendulum_length_m, 0.0))
        }
    }

    /// Latest converted orientation published by the ingestor, if any.
    pub fn current_orientation(&self) -> Option<UnitQuaternion<f64>> {
        self.slot.peek().map(|s| s.quat)
    }

    /// Drops the calibration; the next consumed sample becomes the new
    /// neutral pose.
    pub fn reset(&mut self) {
        self.calibration.reset();
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_calibrated()
    }

    pub fn last_position(&self) -> Option<Vector3<f64>> {
        self.last_position
    }

    pub fn params(&self) -> &EstimatorParams {
        &self.params
    }
}
