// Circular-orbit position helper shared by the gameplay screens.
//
// Deliberately not a physics model: bodies move on fixed circles at constant
// angular velocity, which is all the planning view needs.

/// Position on a circle of `radius` in the orbital plane after `elapsed_s`
/// seconds at `angular_velocity` radians per second. The y component is the
/// plane normal and stays zero.
pub fn orbital_position(radius: f32, angular_velocity: f32, elapsed_s: f32) -> [f32; 3] {
    let angle = angular_velocity * elapsed_s;
    [radius * angle.cos(), 0.0, radius * angle.sin()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn starts_on_positive_x_axis() {
        let p = orbital_position(10.0, 1.0, 0.0);
        assert!(close(p[0], 10.0));
        assert!(close(p[1], 0.0));
        assert!(close(p[2], 0.0));
    }

    #[test]
    fn quarter_turn_lands_on_z_axis() {
        let p = orbital_position(5.0, 1.0, std::f32::consts::FRAC_PI_2);
        assert!(close(p[0], 0.0));
        assert!(close(p[2], 5.0));
    }

    #[test]
    fn stays_on_the_circle() {
        for i in 0..16 {
            let p = orbital_position(7.5, 0.3, i as f32 * 0.9);
            let r = (p[0] * p[0] + p[2] * p[2]).sqrt();
            assert!(close(r, 7.5));
        }
    }

    #[test]
    fn zero_radius_is_the_origin() {
        assert_eq!(orbital_position(0.0, 2.0, 3.0), [0.0, 0.0, 0.0]);
    }
}
