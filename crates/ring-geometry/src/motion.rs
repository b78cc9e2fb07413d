use std::f64::consts::TAU;

use crate::scene::Transform;

const SPIN_RATE: f64 = 0.35;
const WOBBLE_RATE: f64 = 0.8;

/// Idle pose of the whole ring at `elapsed_secs` after the preview started.
///
/// Renderers apply this on top of the static scene every frame; the scene
/// itself never changes with time.
pub fn idle_motion(elapsed_secs: f64, twist: f64) -> Transform {
    let spin = (elapsed_secs * SPIN_RATE).rem_euclid(TAU);
    let wobble = (elapsed_secs * WOBBLE_RATE).sin() * (0.02 + twist * 0.02);
    Transform::IDENTITY.with_rotation([wobble, spin, 0.0])
}

#[cfg(test)]
mod tests {
    use super::idle_motion;

    #[test]
    fn starts_at_rest() {
        let pose = idle_motion(0.0, 1.0);
        assert_eq!(pose.rotation, [0.0, 0.0, 0.0]);
        assert_eq!(pose.translation, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn wobble_amplitude_grows_with_twist() {
        let quarter = std::f64::consts::FRAC_PI_2 / 0.8;
        let calm = idle_motion(quarter, 0.0).rotation[0];
        let lively = idle_motion(quarter, 1.0).rotation[0];
        assert!((calm - 0.02).abs() < 1e-12);
        assert!((lively - 0.04).abs() < 1e-12);
    }

    #[test]
    fn spin_stays_within_one_turn() {
        let spin = idle_motion(10_000.0, 0.5).rotation[1];
        assert!((0.0..std::f64::consts::TAU).contains(&spin));
    }
}
