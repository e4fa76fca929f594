/// Source to scene axis mapping (row-major: [x_new, y_new, z_new]).
/// -90° rotation about X: source Z becomes scene Y (up), source -Y becomes scene Z.
pub const COORDINATE_TRANSFORM: [[f64; 3]; 3] = [
    [1.0, 0.0, 0.0],  // X = X
    [0.0, 0.0, 1.0],  // Y = Z
    [0.0, -1.0, 0.0], // Z = -Y
];

/// Map a source (LAS, Z-up) position into scene space (Y-up).
pub fn to_scene_space(position: [f64; 3]) -> [f64; 3] {
    let mut output = [0.0; 3];

    for (row, out) in COORDINATE_TRANSFORM.iter().zip(output.iter_mut()) {
        *out = row.iter().zip(position.iter()).map(|(m, p)| m * p).sum();
    }

    output
}
