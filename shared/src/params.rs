//! Projectile launch parameters and their validation.

use thiserror::Error;

const MAX_SPEED: f64 = 10_000.0;
const MAX_MASS: f64 = 1_000.0;
const MAX_DRAG_COEFF: f64 = 2.0;

/// Immutable launch parameters for one trajectory simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileParams {
    /// Initial speed in m/s.
    pub speed: f64,
    /// Launch angle in degrees above the horizontal.
    pub angle_deg: f64,
    /// Projectile mass in kg.
    pub mass: f64,
    /// Dimensionless drag coefficient.
    pub drag_coeff: f64,
}

/// Validation failure carrying every violated constraint.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", .violations.join("; "))]
pub struct InvalidParams {
    pub violations: Vec<String>,
}

impl ProjectileParams {
    pub fn new(speed: f64, angle_deg: f64, mass: f64, drag_coeff: f64) -> Self {
        Self {
            speed,
            angle_deg,
            mass,
            drag_coeff,
        }
    }

    /// Checks every constraint and collects the violations.
    ///
    /// The comparisons are written so that a NaN field always counts as a
    /// violation. Parameters that pass here are safe to hand to the
    /// trajectory calculator.
    pub fn validate(&self) -> Result<(), InvalidParams> {
        let mut violations = Vec::new();

        if !(self.speed > 0.0) {
            violations.push("velocity deve essere > 0".to_string());
        }
        if self.speed > MAX_SPEED {
            violations.push("velocity troppo alta (max 10000 m/s)".to_string());
        }
        if !(0.0..=90.0).contains(&self.angle_deg) {
            violations.push("angle deve essere tra 0 e 90".to_string());
        }
        if !(self.mass > 0.0) {
            violations.push("mass deve essere > 0".to_string());
        }
        if self.mass > MAX_MASS {
            violations.push("mass troppo alta (max 1000 kg)".to_string());
        }
        if !(self.drag_coeff > 0.0) {
            violations.push("dragCoeff deve essere > 0".to_string());
        }
        if self.drag_coeff > MAX_DRAG_COEFF {
            violations.push("dragCoeff troppo alto (max 2)".to_string());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(InvalidParams { violations })
        }
    }

    /// Renders the parameters as a `SIMULATE` command line.
    pub fn to_command_string(&self) -> String {
        format!(
            "SIMULATE {:.4} {:.4} {:.4} {:.4}",
            self.speed, self.angle_deg, self.mass, self.drag_coeff
        )
    }

    /// Classic cannonball: 100 m/s at 45°, 5 kg, sphere drag.
    pub fn medieval_cannon() -> Self {
        Self::new(100.0, 45.0, 5.0, 0.47)
    }

    /// Flat, fast trajectory with low drag.
    pub fn modern_bullet() -> Self {
        Self::new(800.0, 30.0, 0.15, 0.295)
    }

    /// Slow lob at a steep angle.
    pub fn parabolic_throw() -> Self {
        Self::new(20.0, 60.0, 0.5, 0.47)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn presets_are_valid() {
        assert!(ProjectileParams::medieval_cannon().validate().is_ok());
        assert!(ProjectileParams::modern_bullet().validate().is_ok());
        assert!(ProjectileParams::parabolic_throw().validate().is_ok());

        let cannon = ProjectileParams::medieval_cannon();
        assert_approx_eq!(cannon.speed, 100.0);
        assert_approx_eq!(cannon.drag_coeff, 0.47);
    }

    #[test]
    fn boundary_angles_are_valid() {
        assert!(ProjectileParams::new(10.0, 0.0, 1.0, 0.5).validate().is_ok());
        assert!(ProjectileParams::new(10.0, 90.0, 1.0, 0.5).validate().is_ok());
    }

    #[test]
    fn negative_speed_mentions_velocity() {
        let err = ProjectileParams::new(-5.0, 45.0, 5.0, 0.47)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("velocity"));
    }

    #[test]
    fn upper_bounds_are_enforced() {
        let err = ProjectileParams::new(20_000.0, 95.0, 2_000.0, 3.0)
            .validate()
            .unwrap_err();
        assert_eq!(err.violations.len(), 4);
        assert!(err.to_string().contains("max 10000 m/s"));
        assert!(err.to_string().contains("tra 0 e 90"));
        assert!(err.to_string().contains("max 1000 kg"));
        assert!(err.to_string().contains("max 2"));
    }

    #[test]
    fn nan_fields_never_validate() {
        assert!(ProjectileParams::new(f64::NAN, 45.0, 5.0, 0.47)
            .validate()
            .is_err());
        assert!(ProjectileParams::new(100.0, f64::NAN, 5.0, 0.47)
            .validate()
            .is_err());
        assert!(ProjectileParams::new(100.0, 45.0, f64::NAN, 0.47)
            .validate()
            .is_err());
        assert!(ProjectileParams::new(100.0, 45.0, 5.0, f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn command_string_uses_fixed_decimals() {
        let cmd = ProjectileParams::medieval_cannon().to_command_string();
        assert_eq!(cmd, "SIMULATE 100.0000 45.0000 5.0000 0.4700");
    }
}
