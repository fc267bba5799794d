//! Rotation math on plain arrays.
//! - quaternions are `[x, y, z, w]`
//! - slerp takes the shortest arc and falls back to nlerp for near-parallel inputs
//! - euler input is XYZ intrinsic, radians

/// Quaternion (x, y, z, w)
pub type Quat = [f32; 4];

/// 3D vector / position
pub type Vec3 = [f32; 3];

pub const IDENTITY_QUAT: Quat = [0.0, 0.0, 0.0, 1.0];

/// Tolerance used when checking the unit-norm invariant.
pub const UNIT_EPSILON: f32 = 1e-4;

#[inline]
pub fn lerp_f(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    [lerp_f(a[0], b[0], t), lerp_f(a[1], b[1], t), lerp_f(a[2], b[2], t)]
}

#[inline]
pub fn dot_quat(a: Quat, b: Quat) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

#[inline]
pub fn quat_norm(q: Quat) -> f32 {
    dot_quat(q, q).sqrt()
}

/// Normalize a quaternion. Returns `None` for zero-length or non-finite input.
/// Already-unit input is returned untouched so normalizing is idempotent bit-for-bit.
pub fn try_normalize_quat(q: Quat) -> Option<Quat> {
    if q.iter().any(|c| !c.is_finite()) {
        return None;
    }
    let mag = quat_norm(q);
    if mag <= f32::EPSILON || !mag.is_finite() {
        return None;
    }
    if (mag - 1.0).abs() <= 4.0 * f32::EPSILON {
        return Some(q);
    }
    Some([q[0] / mag, q[1] / mag, q[2] / mag, q[3] / mag])
}

/// Normalize a quaternion, falling back to identity when it cannot be normalized.
#[inline]
pub fn normalize_quat(q: Quat) -> Quat {
    try_normalize_quat(q).unwrap_or(IDENTITY_QUAT)
}

#[inline]
pub fn is_unit_quat(q: Quat) -> bool {
    (quat_norm(q) - 1.0).abs() <= UNIT_EPSILON
}

/// Spherical linear interpolation between two rotations (shortest arc).
pub fn slerp_quat(q1: Quat, q2: Quat, t: f32) -> Quat {
    let qa = normalize_quat(q1);
    let mut qb = normalize_quat(q2);

    let mut dot = dot_quat(qa, qb);
    if dot < 0.0 {
        qb = [-qb[0], -qb[1], -qb[2], -qb[3]];
        dot = -dot;
    }

    // Close enough to treat the arc as a line.
    const DOT_THRESHOLD: f32 = 0.9995;
    if dot > DOT_THRESHOLD {
        return normalize_quat([
            lerp_f(qa[0], qb[0], t),
            lerp_f(qa[1], qb[1], t),
            lerp_f(qa[2], qb[2], t),
            lerp_f(qa[3], qb[3], t),
        ]);
    }

    let theta_0 = dot.clamp(-1.0, 1.0).acos();
    let theta = theta_0 * t;
    let sin_theta_0 = theta_0.sin();
    let s0 = (theta_0 - theta).sin() / sin_theta_0;
    let s1 = theta.sin() / sin_theta_0;

    normalize_quat([
        s0 * qa[0] + s1 * qb[0],
        s0 * qa[1] + s1 * qb[1],
        s0 * qa[2] + s1 * qb[2],
        s0 * qa[3] + s1 * qb[3],
    ])
}

/// Build a quaternion from XYZ intrinsic euler angles (radians).
pub fn quat_from_euler(e: Vec3) -> Quat {
    let (s1, c1) = (e[0] * 0.5).sin_cos();
    let (s2, c2) = (e[1] * 0.5).sin_cos();
    let (s3, c3) = (e[2] * 0.5).sin_cos();
    normalize_quat([
        s1 * c2 * c3 + c1 * s2 * s3,
        c1 * s2 * c3 - s1 * c2 * s3,
        c1 * c2 * s3 + s1 * s2 * c3,
        c1 * c2 * c3 - s1 * s2 * s3,
    ])
}

/// Reflect a rotation across the YZ (sagittal) plane.
#[inline]
pub fn mirror_quat(q: Quat) -> Quat {
    [q[0], -q[1], -q[2], q[3]]
}

/// Angle in radians of the relative rotation between `a` and `b`.
/// Uses the half-chord form, which stays accurate for nearly equal rotations.
pub fn quat_angle(a: Quat, b: Quat) -> f32 {
    let a = normalize_quat(a);
    let mut b = normalize_quat(b);
    if dot_quat(a, b) < 0.0 {
        b = [-b[0], -b[1], -b[2], -b[3]];
    }
    let diff = [a[0] - b[0], a[1] - b[1], a[2] - b[2], a[3] - b[3]];
    let sum = [a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3] + b[3]];
    4.0 * quat_norm(diff).atan2(quat_norm(sum))
}
