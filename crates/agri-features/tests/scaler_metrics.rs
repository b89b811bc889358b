use agri_features::{mse, r2, rmse, StandardScaler};
use proptest::prelude::*;

#[test]
fn constant_columns_map_to_zero() {
    let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
    let scaler = StandardScaler::fit(&rows).unwrap();
    assert_eq!(scaler.mean(), &[2.0, 5.0]);
    assert_eq!(scaler.scale(), &[1.0, 1.0]);
    let scaled = scaler.transform(&rows).unwrap();
    assert_eq!(scaled, vec![vec![-1.0, 0.0], vec![1.0, 0.0]]);
}

#[test]
fn width_mismatch_is_reported() {
    let scaler = StandardScaler::fit(&[vec![1.0, 2.0]]).unwrap();
    assert!(scaler.transform_row(&[1.0]).is_err());
    assert!(StandardScaler::fit(&[]).is_err());
    assert!(StandardScaler::fit(&[vec![1.0], vec![1.0, 2.0]]).is_err());
}

#[test]
fn scaler_survives_json() {
    let scaler = StandardScaler::fit(&[vec![1.0, 2.0], vec![4.0, 8.0]]).unwrap();
    let json = serde_json::to_string(&scaler).unwrap();
    assert_eq!(serde_json::from_str::<StandardScaler>(&json).unwrap(), scaler);
}

#[test]
fn metrics_match_hand_computation() {
    let truth = [1.0, 2.0, 3.0, 4.0];
    let pred = [1.0, 2.0, 3.0, 6.0];
    assert_eq!(mse(&truth, &pred).unwrap(), 1.0);
    assert_eq!(rmse(&truth, &pred).unwrap(), 1.0);
    assert!((r2(&truth, &pred).unwrap() - 0.2).abs() < 1e-12);
    assert_eq!(r2(&truth, &truth).unwrap(), 1.0);
}

#[test]
fn r2_on_constant_truth() {
    assert_eq!(r2(&[2.0, 2.0], &[2.0, 2.0]).unwrap(), 1.0);
    assert_eq!(r2(&[2.0, 2.0], &[2.0, 3.0]).unwrap(), 0.0);
    assert!(mse(&[], &[]).is_err());
    assert!(mse(&[1.0], &[1.0, 2.0]).unwrap_err().is_fatal());
}

proptest! {
    #[test]
    fn inverse_transform_recovers_input(
        rows in prop::collection::vec(prop::collection::vec(-1.0e4f64..1.0e4, 3), 1..20)
    ) {
        let scaler = StandardScaler::fit(&rows).unwrap();
        let restored = scaler.inverse_transform(&scaler.transform(&rows).unwrap()).unwrap();
        for (original, back) in rows.iter().zip(&restored) {
            for (a, b) in original.iter().zip(back) {
                prop_assert!((a - b).abs() <= 1e-6 * (1.0 + a.abs()));
            }
        }
    }
}
