// THEORY:
// The clump finder works in pixel units only. Observers think in parsecs and
// km/s/pc, so this module converts the physical linking lengths into pixels
// given the source distance and the angular pixel size (the `CDELT2` header
// keyword, in degrees).

use crate::core_modules::error::{FofError, FofResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Distance to the source and the angular size of one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalScale {
    /// Distance to the source in parsecs.
    pub distance_pc: f64,
    /// Angular size of one pixel in degrees.
    pub pixel_deg: f64,
}

impl PhysicalScale {
    pub fn new(distance_pc: f64, pixel_deg: f64) -> FofResult<Self> {
        let scale = Self {
            distance_pc,
            pixel_deg,
        };
        scale.validate()?;
        Ok(scale)
    }

    pub fn validate(&self) -> FofResult<()> {
        if !(self.distance_pc.is_finite() && self.distance_pc > 0.0) {
            return Err(FofError::Configuration(format!(
                "distance must be positive, got {} pc",
                self.distance_pc
            )));
        }
        if !(self.pixel_deg.is_finite() && self.pixel_deg > 0.0) {
            return Err(FofError::Configuration(format!(
                "pixel scale must be positive, got {} deg",
                self.pixel_deg
            )));
        }
        Ok(())
    }

    /// Physical size of one pixel in parsecs.
    pub fn parsecs_per_pixel(&self) -> f64 {
        self.distance_pc * self.pixel_deg * PI / 180.0
    }

    /// Linear separation in parsecs to pixels.
    pub fn radius_to_pixels(&self, radius_pc: f64) -> f64 {
        radius_pc / self.parsecs_per_pixel()
    }

    /// Velocity gradient in km/s/pc to km/s/pixel.
    pub fn gradient_to_pixels(&self, gradient_kms_pc: f64) -> f64 {
        gradient_kms_pc * self.parsecs_per_pixel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_pixel_round_trips_through_its_physical_size() {
        let scale = PhysicalScale::new(1300.0, 0.002).unwrap();
        let pc = scale.parsecs_per_pixel();
        assert!((scale.radius_to_pixels(pc) - 1.0).abs() < 1e-12);
        assert!((scale.gradient_to_pixels(1.0 / pc) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn matches_the_small_angle_formula() {
        let scale = PhysicalScale::new(1300.0, 0.002).unwrap();
        let expected = 0.023 / 1300.0 * 180.0 / PI / 0.002;
        assert!((scale.radius_to_pixels(0.023) - expected).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_positive_scales() {
        assert!(PhysicalScale::new(0.0, 0.002).is_err());
        assert!(PhysicalScale::new(1300.0, -1.0).is_err());
        assert!(PhysicalScale::new(f64::NAN, 0.002).is_err());
    }
}
