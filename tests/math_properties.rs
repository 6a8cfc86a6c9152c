use approx::assert_abs_diff_eq;
use framekit::math::{CFrame, Matrix, RotationOrder, Vector3};

fn sample_frames() -> Vec<CFrame> {
    vec![
        CFrame::identity(),
        CFrame::new(1.0, -2.0, 3.5),
        CFrame::from_euler_angles_xyz(0.3, 0.5, -0.2).add((4.0, 0.0, -1.0)),
        CFrame::looking_at((2.0, 3.0, 4.0), (-1.0, 0.5, 0.0)),
        CFrame::from_axis_angle((1.0, 1.0, 0.0), 2.0).add((0.0, 9.0, 0.0)),
    ]
}

#[test]
fn test_unit_vectors_have_unit_magnitude() {
    let samples = [
        Vector3::new(3.0, 4.0, 0.0),
        Vector3::new(-0.001, 0.002, 0.0005),
        Vector3::new(1e6, -2e6, 3e6),
        Vector3::one(),
    ];
    for v in samples {
        assert_abs_diff_eq!(v.unit().magnitude(), 1.0, epsilon = 1e-9);
    }
    assert_eq!(Vector3::zero().unit(), Vector3::zero());
}

#[test]
fn test_frame_times_inverse_is_identity() {
    for frame in sample_frames() {
        let product = frame * frame.inverse();
        assert!(product.fuzzy_eq(&CFrame::identity(), 1e-6), "{frame}");
    }
}

#[test]
fn test_matrix_times_inverse_is_identity() -> anyhow::Result<()> {
    let samples = [
        Matrix::from_rows(&[[4.0, 7.0], [2.0, 6.0]])?,
        Matrix::from_rows(&[[2.0, 0.0, 1.0], [1.0, 3.0, 2.0], [1.0, 1.0, 1.0]])?,
        Matrix::from_rows(&[
            [1.0, 2.0, 0.0, 1.0],
            [0.0, 1.0, 3.0, 0.0],
            [2.0, 0.0, 1.0, 1.0],
            [1.0, 1.0, 1.0, 2.0],
        ])?,
    ];
    for m in &samples {
        let product = m.multiply(m.inverse()?)?;
        assert!(product.equals(&Matrix::identity(m.rows())?, 1e-6), "{m}");
    }
    Ok(())
}

#[test]
fn test_two_by_two_determinant_and_inverse() -> anyhow::Result<()> {
    let m = Matrix::from_array(&[[1.0, 2.0], [3.0, 4.0]])?;
    assert_abs_diff_eq!(m.determinant()?, -2.0, epsilon = 1e-12);
    let expected = Matrix::from_array(&[[-2.0, 1.0], [1.5, -0.5]])?;
    assert!(m.inverse()?.equals(&expected, 1e-9));
    Ok(())
}

#[test]
fn test_lerp_endpoints() {
    let frames = sample_frames();
    for pair in frames.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!(a.lerp(&b, 0.0).fuzzy_eq(&a, 1e-6));
        assert!(a.lerp(&b, 1.0).fuzzy_eq(&b, 1e-6));
    }
}

#[test]
fn test_euler_round_trip_in_every_order() {
    let (rx, ry, rz) = (0.3, 0.5, -0.2);
    for order in RotationOrder::ALL {
        let (x, y, z) = CFrame::from_euler_angles(rx, ry, rz, order).to_euler_angles(order);
        assert_abs_diff_eq!(x, rx, epsilon = 1e-9);
        assert_abs_diff_eq!(y, ry, epsilon = 1e-9);
        assert_abs_diff_eq!(z, rz, epsilon = 1e-9);
    }
}

#[test]
fn test_looking_toward_positive_z() {
    let frame = CFrame::looking_at(Vector3::zero(), (0.0, 0.0, 1.0));
    assert!(frame.look_vector().fuzzy_eq((0.0, 0.0, 1.0), 1e-9));
    assert!(CFrame::from_slice(&[]).is_ok());
    assert!(CFrame::from_slice(&[1.0, 2.0]).is_err());
}

#[test]
fn test_derived_values_are_stable() -> anyhow::Result<()> {
    let v = Vector3::new(1.0, 2.0, 2.0);
    assert_eq!(v.magnitude(), v.magnitude());

    let frame = CFrame::from_euler_angles_yxz(0.1, 0.2, 0.3);
    assert_eq!(frame.inverse(), frame.inverse());

    let m = Matrix::from_rows(&[[2.0, 1.0], [1.0, 3.0]])?;
    assert_eq!(m.determinant()?, m.determinant()?);
    assert!(std::ptr::eq(m.inverse()?, m.inverse()?));
    assert!(std::ptr::eq(m.transpose(), m.transpose()));
    assert!(std::ptr::eq(m.as_text(), m.as_text()));
    Ok(())
}
