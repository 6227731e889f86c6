use dtw_digits::{align, frame_cost, DistanceScore, FeatureSequence};
use proptest::prelude::*;

/// Unpruned `(n+1) × (m+1)` table; cells outside the band are simply skipped.
fn full_table_dtw(a: &FeatureSequence, b: &FeatureSequence, locality: usize) -> DistanceScore {
    let n = a.len();
    let m = b.len();
    let (va, vb) = (a.as_view(), b.as_view());
    let mut dp = vec![vec![f64::INFINITY; m + 1]; n + 1];
    dp[0][0] = 0.0;
    for i in 1..=n {
        for j in 1..=m {
            if i.abs_diff(j) > locality {
                continue;
            }
            let prev = dp[i - 1][j].min(dp[i][j - 1]).min(dp[i - 1][j - 1]);
            if prev.is_finite() {
                dp[i][j] = prev + frame_cost(&va, i - 1, &vb, j - 1);
            }
        }
    }
    DistanceScore::new(dp[n][m])
}

fn sequence(arity: usize, max_len: usize) -> impl Strategy<Value = FeatureSequence> {
    let frame = prop::collection::vec(-4i8..5, arity);
    prop::collection::vec(frame, 1..=max_len).prop_map(|frames| {
        let frames: Vec<Vec<f64>> = frames
            .into_iter()
            .map(|f| f.into_iter().map(|v| f64::from(v) * 0.5).collect())
            .collect();
        FeatureSequence::from_frames(&frames).unwrap()
    })
}

fn pair(max_len: usize) -> impl Strategy<Value = (FeatureSequence, FeatureSequence)> {
    (1usize..4)
        .prop_flat_map(move |arity| (sequence(arity, max_len), sequence(arity, max_len)))
}

proptest! {
    #[test]
    fn self_distance_is_zero(a in sequence(3, 12), locality in 0usize..6) {
        prop_assert_eq!(align(&a, &a, locality).unwrap(), DistanceScore::ZERO);
    }

    #[test]
    fn symmetric((a, b) in pair(10), locality in 0usize..12) {
        prop_assert_eq!(align(&a, &b, locality).unwrap(), align(&b, &a, locality).unwrap());
    }

    #[test]
    fn widening_the_band_never_costs_more(
        (a, b) in pair(10),
        l1 in 0usize..10,
        extra in 1usize..5,
    ) {
        let narrow = align(&a, &b, l1).unwrap();
        let wide = align(&a, &b, l1 + extra).unwrap();
        prop_assert!(wide <= narrow);
    }

    #[test]
    fn infeasible_exactly_when_gap_exceeds_band((a, b) in pair(10), locality in 0usize..10) {
        let score = align(&a, &b, locality).unwrap();
        let gap = a.len().abs_diff(b.len());
        prop_assert_eq!(score.is_infeasible(), gap > locality);
    }

    #[test]
    fn matches_full_table_reference((a, b) in pair(12), locality in 0usize..14) {
        prop_assert_eq!(align(&a, &b, locality).unwrap(), full_table_dtw(&a, &b, locality));
    }

    #[test]
    fn non_negative((a, b) in pair(10)) {
        let score = align(&a, &b, 10).unwrap();
        prop_assert!(score.value().map_or(false, |v| v >= 0.0));
    }
}

#[test]
fn views_align_like_owned_copies() {
    let long_rows = [
        [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0],
        [2.0, 7.0, 1.0, 8.0, 2.0, 8.0, 1.0, 8.0],
    ];
    let short_rows = [[1.0, 4.0, 1.0, 5.0], [7.0, 1.0, 8.0, 2.0]];
    let long = FeatureSequence::from_coefficients(&long_rows).unwrap();
    let other = FeatureSequence::from_coefficients(&short_rows).unwrap();
    let view = long.view(1, 5).unwrap();
    let owned = view.to_sequence().unwrap();
    assert_eq!(
        align(view, &other, 2).unwrap(),
        align(&owned, &other, 2).unwrap()
    );
}

#[test]
fn single_frame_sequences() {
    let a = FeatureSequence::from_scalars(&[1.0]).unwrap();
    let b = FeatureSequence::from_scalars(&[4.0]).unwrap();
    assert_eq!(align(&a, &b, 0).unwrap(), DistanceScore::Finite(3.0));
}
