//! Source-to-target coordinate conversion
//!
//! Source space is Z-up, target space is Y-up; both are right-handed.
//! Source Z becomes target Y and source Y becomes target -Z:
//!
//! ```text
//! tx =  lx     ty =  lz     tz = -ly
//! rx =  rx     ry =  rz     rz = -ry
//! sx =  sx     sy =  sz     sz =  sy
//! ```
//!
//! Every value written to a descriptor or geometry file goes through here.

use glam::{DMat3, DVec3, Vec3};
use m2n_core::Transform;

/// `Rx(-90°)` with exact entries. Maps a source camera's viewing axis
/// (local -Z, up +Y) onto the target convention once remapped.
const CAMERA_CORRECTION: DMat3 = DMat3::from_cols(
    DVec3::new(1.0, 0.0, 0.0),
    DVec3::new(0.0, 0.0, -1.0),
    DVec3::new(0.0, 1.0, 0.0),
);

/// Below this `cos(ry)` the XYZ decomposition is in gimbal lock
const GIMBAL_EPSILON: f64 = 1e-12;

/// Remap a position or normal: `(x, y, z) -> (x, z, -y)`
#[inline]
pub fn to_target(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, -v.y)
}

/// Inverse of [`to_target`]: `(x, y, z) -> (x, -z, y)`
#[inline]
pub fn to_source(v: Vec3) -> Vec3 {
    Vec3::new(v.x, -v.z, v.y)
}

/// Remap a local transform
pub fn convert_transform(t: &Transform) -> Transform {
    Transform {
        translation: to_target(t.translation),
        rotation: Vec3::new(t.rotation.x, t.rotation.z, -t.rotation.y),
        scale: Vec3::new(t.scale.x, t.scale.z, t.scale.y),
    }
}

/// Remap a camera transform
///
/// The correction rotation is applied in the camera's local frame before
/// the Euler angles are re-extracted and remapped.
pub fn convert_camera_transform(t: &Transform) -> Transform {
    let corrected = euler_to_matrix(t.rotation) * CAMERA_CORRECTION;
    convert_transform(&Transform {
        rotation: matrix_to_euler(&corrected),
        ..*t
    })
}

/// Rotation matrix for XYZ Euler angles: `Rz * Ry * Rx`
pub fn euler_to_matrix(rotation: Vec3) -> DMat3 {
    let r = rotation.as_dvec3();
    DMat3::from_rotation_z(r.z) * DMat3::from_rotation_y(r.y) * DMat3::from_rotation_x(r.x)
}

/// XYZ Euler angles of a rotation matrix, inverse of [`euler_to_matrix`]
///
/// In gimbal lock the Z angle is fixed to zero.
pub fn matrix_to_euler(m: &DMat3) -> Vec3 {
    // Column-major: m.col(c)[r] is row r, column c
    let cos_y = m.x_axis.x.hypot(m.x_axis.y);
    let y = (-m.x_axis.z).atan2(cos_y);

    let (x, z) = if cos_y > GIMBAL_EPSILON {
        (m.y_axis.z.atan2(m.z_axis.z), m.x_axis.y.atan2(m.x_axis.x))
    } else {
        ((-m.z_axis.y).atan2(m.y_axis.y), 0.0)
    };

    DVec3::new(x, y, z).as_vec3()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_vector_remap() {
        assert_eq!(to_target(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 3.0, -2.0));
        assert_eq!(to_source(Vec3::new(1.0, 3.0, -2.0)), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_up_axis_becomes_y() {
        assert_eq!(to_target(Vec3::Z), Vec3::Y);
        assert_eq!(to_target(Vec3::Y), Vec3::NEG_Z);
    }

    #[test]
    fn test_transform_remap() {
        let t = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.1, 0.2, 0.3),
            Vec3::new(4.0, 5.0, 6.0),
        );
        let c = convert_transform(&t);

        assert_eq!(c.translation, Vec3::new(1.0, 3.0, -2.0));
        assert_eq!(c.rotation, Vec3::new(0.1, 0.3, -0.2));
        assert_eq!(c.scale, Vec3::new(4.0, 6.0, 5.0));
    }

    #[test]
    fn test_identity_stays_identity() {
        assert!(convert_transform(&Transform::IDENTITY).is_identity());
    }

    #[test]
    fn test_identity_camera_gets_correction() {
        let c = convert_camera_transform(&Transform::IDENTITY);

        assert_eq!(c.rotation.x, -FRAC_PI_2);
        assert_eq!(c.rotation.y, 0.0);
        assert_eq!(c.rotation.z, 0.0);
        assert_eq!(c.translation, Vec3::ZERO);
        assert_eq!(c.scale, Vec3::ONE);
    }

    #[test]
    fn test_camera_looking_forward_is_upright() {
        // Source camera pitched up 90° looks along source +Y (forward),
        // which is target -Z: no rotation left after correction.
        let t = Transform {
            rotation: Vec3::new(FRAC_PI_2, 0.0, 0.0),
            ..Transform::IDENTITY
        };
        let c = convert_camera_transform(&t);

        assert!(c.rotation.abs().max_element() < 1e-6, "{:?}", c.rotation);
    }

    #[test]
    fn test_euler_matrix_round_trip() {
        let angles = Vec3::new(0.3, -0.7, 1.9);
        let back = matrix_to_euler(&euler_to_matrix(angles));
        assert!((back - angles).abs().max_element() < 1e-6, "{:?}", back);
    }

    #[test]
    fn test_gimbal_lock_fixes_z() {
        let m = DMat3::from_rotation_y(std::f64::consts::FRAC_PI_2) * DMat3::from_rotation_x(0.4);
        let back = matrix_to_euler(&m);

        assert_eq!(back.z, 0.0);
        assert!((back.x - 0.4).abs() < 1e-6);
        let rebuilt = euler_to_matrix(back);
        assert!((rebuilt - m).to_cols_array().iter().all(|d| d.abs() < 1e-6));
    }
}
