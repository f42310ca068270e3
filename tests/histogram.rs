//! End-to-end histogram tests driving the full frame event contract.
//!
//! Input scripts mirror three frames of multipoint data (bare and weighted),
//! binned over `[1.0, 3.0)` in four bins of width 0.5. Expectations are
//! computed by hand from the binning rules.

use approx::assert_abs_diff_eq;
use rstest::rstest;

use framehist::testing::{replay, Frame};
use framehist::{AccumulatorKind, FrameAccumulator, FrameStream, HistogramSettings};

fn settings(include_all: bool) -> HistogramSettings {
    let builder = HistogramSettings::from_range(1.0, 3.0).bin_count(4);
    let builder = if include_all {
        builder.include_all()
    } else {
        builder
    };
    builder.build().unwrap()
}

fn bare_frames() -> Vec<Frame> {
    vec![
        Frame::bare(1.0, &[&[0.7], &[1.1], &[2.3], &[2.9]]),
        Frame::bare(2.0, &[&[1.3], &[2.2]]),
        Frame::bare(3.0, &[&[3.3], &[1.2], &[1.3]]),
    ]
}

fn weighted_frames() -> Vec<Frame> {
    vec![
        Frame::weighted(
            1.0,
            &[&[(0.7, 0.5)], &[(1.1, 1.0)], &[(2.3, 1.0)], &[(2.9, 2.0)]],
        ),
        Frame::weighted(2.0, &[&[(1.3, 1.0)], &[(2.2, 3.0)]]),
        Frame::weighted(3.0, &[&[(3.3, 0.5)], &[(1.2, 2.0)], &[(1.3, 1.0)]]),
    ]
}

fn stream(kind: AccumulatorKind, include_all: bool) -> FrameStream<Box<dyn FrameAccumulator>> {
    FrameStream::new(kind.build(settings(include_all), 1))
}

// =============================================================================
// Counting
// =============================================================================

#[test]
fn counting_rows_match_manual_binning() {
    let mut stream = stream(AccumulatorKind::Count, false);
    let rows = replay(&mut stream, &bare_frames()).unwrap();

    // 0.7 and 3.3 fall outside [1.0, 3.0) and are dropped.
    assert_eq!(rows[0].column(0).to_vec(), vec![1.0, 0.0, 1.0, 1.0]);
    assert_eq!(rows[1].column(0).to_vec(), vec![1.0, 0.0, 1.0, 0.0]);
    assert_eq!(rows[2].column(0).to_vec(), vec![2.0, 0.0, 0.0, 0.0]);

    // Per-bin totals across frames equal total in-range occurrences.
    let totals: Vec<f64> = (0..4)
        .map(|bin| rows.iter().map(|row| row.value(0, bin)).sum())
        .collect();
    assert_eq!(totals, vec![4.0, 0.0, 2.0, 1.0]);
}

#[test]
fn counting_with_include_all_clamps_boundary_samples() {
    let mut stream = stream(AccumulatorKind::Count, true);
    let rows = replay(&mut stream, &bare_frames()).unwrap();

    // 0.7 clamps to bin 0, 3.3 clamps to bin 3.
    assert_eq!(rows[0].column(0).to_vec(), vec![2.0, 0.0, 1.0, 1.0]);
    assert_eq!(rows[1].column(0).to_vec(), vec![1.0, 0.0, 1.0, 0.0]);
    assert_eq!(rows[2].column(0).to_vec(), vec![2.0, 0.0, 0.0, 1.0]);
}

#[rstest]
#[case(false, vec![3.0, 2.0, 2.0])]
#[case(true, vec![4.0, 2.0, 3.0])]
fn counting_totals_per_frame(#[case] include_all: bool, #[case] expected: Vec<f64>) {
    let mut stream = stream(AccumulatorKind::Count, include_all);
    let rows = replay(&mut stream, &bare_frames()).unwrap();
    let sums: Vec<f64> = rows.iter().map(|row| row.column(0).sum()).collect();
    assert_eq!(sums, expected);
}

#[test]
fn counting_average_over_frames() {
    let mut stream = stream(AccumulatorKind::Count, false);
    replay(&mut stream, &bare_frames()).unwrap();
    let averaged = stream.finish().unwrap();

    assert_eq!(averaged.frame_count(), 3);
    // Bin 0 counts per frame: 1, 1, 2.
    assert_abs_diff_eq!(averaged.mean(0, 0), 4.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(averaged.mean(0, 1), 0.0);
    assert_abs_diff_eq!(averaged.mean(0, 2), 2.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(averaged.mean(0, 3), 1.0 / 3.0, epsilon = 1e-12);
    // Bin 0 deviations: 2*(1/3)^2 + (2/3)^2 = 2/3; stderr = sqrt((2/3)/6).
    assert_abs_diff_eq!(averaged.standard_error(0, 0), 1.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(averaged.standard_error(0, 1), 0.0);
}

// =============================================================================
// Weighted sum
// =============================================================================

#[test]
fn weighted_sum_rows_match_manual_binning() {
    let mut stream = stream(AccumulatorKind::WeightedSum, false);
    let rows = replay(&mut stream, &weighted_frames()).unwrap();

    assert_eq!(rows[0].column(0).to_vec(), vec![1.0, 0.0, 1.0, 2.0]);
    assert_eq!(rows[1].column(0).to_vec(), vec![1.0, 0.0, 3.0, 0.0]);
    assert_eq!(rows[2].column(0).to_vec(), vec![3.0, 0.0, 0.0, 0.0]);
}

#[test]
fn weighted_sum_with_include_all_keeps_boundary_weight() {
    let mut stream = stream(AccumulatorKind::WeightedSum, true);
    let rows = replay(&mut stream, &weighted_frames()).unwrap();

    assert_eq!(rows[0].column(0).to_vec(), vec![1.5, 0.0, 1.0, 2.0]);
    assert_eq!(rows[1].column(0).to_vec(), vec![1.0, 0.0, 3.0, 0.0]);
    assert_eq!(rows[2].column(0).to_vec(), vec![3.0, 0.0, 0.0, 0.5]);
}

// =============================================================================
// Weighted average
// =============================================================================

#[test]
fn weighted_average_rows_divide_by_hit_count() {
    let mut stream = stream(AccumulatorKind::WeightedAverage, false);
    let rows = replay(&mut stream, &weighted_frames()).unwrap();

    // Frame 3 bins 1.2 (w=2.0) and 1.3 (w=1.0) into bin 0: mean 1.5.
    assert_eq!(rows[0].column(0).to_vec(), vec![1.0, 0.0, 1.0, 2.0]);
    assert_eq!(rows[1].column(0).to_vec(), vec![1.0, 0.0, 3.0, 0.0]);
    assert_eq!(rows[2].column(0).to_vec(), vec![1.5, 0.0, 0.0, 0.0]);
}

#[test]
fn weighted_average_with_include_all() {
    let mut stream = stream(AccumulatorKind::WeightedAverage, true);
    let rows = replay(&mut stream, &weighted_frames()).unwrap();

    // Frame 1 bin 0 now holds 0.7 (w=0.5) and 1.1 (w=1.0): mean 0.75.
    assert_eq!(rows[0].column(0).to_vec(), vec![0.75, 0.0, 1.0, 2.0]);
    // Frame 3 bin 3 holds the clamped 3.3 (w=0.5).
    assert_eq!(rows[2].column(0).to_vec(), vec![1.5, 0.0, 0.0, 0.5]);
}

// =============================================================================
// Clone and resample end to end
// =============================================================================

#[test]
fn averager_clone_is_unaffected_by_later_frames() {
    let frames = bare_frames();
    let mut stream = stream(AccumulatorKind::Count, false);
    replay(&mut stream, &frames[..2]).unwrap();

    let snapshot = stream.averager().clone().done();
    assert_eq!(snapshot.frame_count(), 2);
    assert_abs_diff_eq!(snapshot.mean(0, 0), 1.0);

    replay(&mut stream, &frames[2..]).unwrap();
    let full = stream.finish().unwrap();
    assert_eq!(full.frame_count(), 3);
    assert_abs_diff_eq!(full.mean(0, 0), 4.0 / 3.0, epsilon = 1e-12);
    // The earlier snapshot is untouched.
    assert_abs_diff_eq!(snapshot.mean(0, 0), 1.0);
}

#[test]
fn resampling_halves_the_finalized_histogram() {
    let mut stream = stream(AccumulatorKind::Count, false);
    replay(&mut stream, &bare_frames()).unwrap();
    let averaged = stream.finish().unwrap();

    let resampled = averaged.resample_double_bin_width(false);
    assert_eq!(resampled.settings().bin_count(), 2);
    assert_abs_diff_eq!(resampled.settings().bin_width(), 1.0);
    assert_abs_diff_eq!(resampled.settings().first_edge(), 1.0);
    assert_abs_diff_eq!(resampled.mean(0, 0), 2.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(resampled.mean(0, 1), 0.5, epsilon = 1e-12);
    // The source histogram is unchanged.
    assert_abs_diff_eq!(averaged.mean(0, 0), 4.0 / 3.0, epsilon = 1e-12);
}
