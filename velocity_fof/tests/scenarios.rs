use proptest::prelude::*;
use velocity_fof::{ClumpCatalog, Cube, FofConfig, FofError, GradientMode, find_clumps};

const NAN: f64 = f64::NAN;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Single-component cube; pixels not listed are missing.
fn sparse_cube(rows: usize, cols: usize, pixels: &[(usize, usize, f64, f64)]) -> Cube {
    let mut data = vec![NAN; 2 * rows * cols];
    for &(row, col, intensity, velocity) in pixels {
        data[row * cols + col] = intensity;
        data[rows * cols + row * cols + col] = velocity;
    }
    Cube::new(2, rows, cols, data).unwrap()
}

fn coords(samples: &[velocity_fof::Sample]) -> Vec<(u32, u32)> {
    samples.iter().map(|s| (s.point.row, s.point.col)).collect()
}

fn all_ids(catalog: &ClumpCatalog) -> Vec<usize> {
    let mut ids: Vec<usize> = catalog
        .groups
        .iter()
        .chain(&catalog.stage0_isolated)
        .flatten()
        .chain(&catalog.isolated)
        .map(|s| s.id.0)
        .collect();
    ids.sort_unstable();
    ids
}

fn blob_config() -> FofConfig {
    FofConfig {
        components: 1,
        intensity_threshold: 0.5,
        radius_px: 1.5,
        gradient: GradientMode::Fixed(0.5),
        num_min: 4,
    }
}

#[test]
fn compact_blob_becomes_the_only_group() {
    init_tracing();
    let blob = [(1, 1), (1, 2), (2, 1), (2, 2)];
    let scattered = [(0, 4, 10.0), (4, 0, -8.0), (4, 4, 25.0)];
    let mut pixels: Vec<(usize, usize, f64, f64)> =
        blob.iter().map(|&(r, c)| (r, c, 1.0, 2.0)).collect();
    pixels.extend(scattered.iter().map(|&(r, c, v)| (r, c, 1.0, v)));
    let cube = sparse_cube(5, 5, &pixels);

    let report = find_clumps(&cube, blob_config()).unwrap();
    let catalog = &report.catalog;

    assert_eq!(catalog.groups.len(), 1);
    let group = coords(&catalog.groups[0]);
    assert!(group.len() >= 4);
    for (r, c) in blob {
        assert!(group.contains(&(r as u32, c as u32)));
    }

    let mut leftovers: Vec<(u32, u32)> = catalog
        .stage0_isolated
        .iter()
        .flat_map(|cluster| coords(cluster))
        .chain(coords(&catalog.isolated))
        .collect();
    leftovers.sort_unstable();
    assert_eq!(leftovers, vec![(0, 4), (4, 0), (4, 4)]);

    assert_eq!(report.statistics.points_in_groups, 4);
    assert_eq!(report.statistics.total_samples, 7);
}

#[test]
fn faint_halo_is_reabsorbed_in_stage_two() {
    // Every pixel valid at the same velocity; only the central 2x2 is bright.
    let mut pixels = Vec::new();
    for r in 0..5 {
        for c in 0..5 {
            let bright = (2..4).contains(&r) && (2..4).contains(&c);
            pixels.push((r, c, if bright { 1.0 } else { 0.1 }, 2.0));
        }
    }
    let cube = sparse_cube(5, 5, &pixels);

    let report = find_clumps(&cube, blob_config()).unwrap();
    let catalog = &report.catalog;

    assert_eq!(catalog.groups.len(), 1);
    assert!(catalog.stage0_isolated.is_empty());
    // (0,0) is set aside as the placeholder; growth stops with at most one
    // other pixel left behind.
    assert!(coords(&catalog.isolated).contains(&(0, 0)));
    assert!(catalog.groups[0].len() >= 23);
    assert_eq!(all_ids(catalog), (0..25).collect::<Vec<_>>());
}

#[test]
fn nothing_above_threshold_leaves_every_sample_isolated() {
    let pixels: Vec<_> = (0..4usize).map(|c| (0, c, 0.01, c as f64)).collect();
    let cube = sparse_cube(1, 4, &pixels);

    let report = find_clumps(&cube, blob_config()).unwrap();

    assert!(report.catalog.groups.is_empty());
    assert!(report.catalog.stage0_isolated.is_empty());
    assert_eq!(report.catalog.isolated.len(), 4);
    assert_eq!(report.statistics.final_isolated_fraction(), 1.0);
}

#[test]
fn missing_sigma_on_a_valid_sample_is_rejected_before_growth() {
    // 1 component, 1x3: three valid velocities but (0,1) has no sigma value.
    let data = vec![
        1.0, 1.0, 1.0, // intensity
        0.0, 0.1, 0.2, // velocity
        0.5, NAN, 0.5, // sigma
    ];
    let cube = Cube::new(3, 1, 3, data).unwrap();
    let config = FofConfig {
        gradient: GradientMode::Adaptive,
        ..blob_config()
    };

    let err = find_clumps(&cube, config).unwrap_err();
    assert!(matches!(err, FofError::Configuration(_)));
}

#[test]
fn adaptive_thresholds_follow_each_reference_sample() {
    // A strip whose velocity steps by 1.0 per pixel up to (0,3). Samples 0 and 1
    // tolerate that step, sample 2 does not, so the strip splits in two.
    let data = vec![
        1.0, 1.0, 1.0, 1.0, 1.0, // intensity
        0.0, 1.0, 2.0, 3.0, 3.05, // velocity
        2.0, 2.0, 0.1, 0.1, 0.1, // sigma
    ];
    let cube = Cube::new(3, 1, 5, data).unwrap();
    let config = FofConfig {
        components: 1,
        intensity_threshold: 0.5,
        radius_px: 1.0,
        gradient: GradientMode::Adaptive,
        num_min: 2,
    };

    let report = find_clumps(&cube, config).unwrap();
    let groups: Vec<Vec<usize>> = report
        .catalog
        .groups
        .iter()
        .map(|g| g.iter().map(|s| s.id.0).collect())
        .collect();
    assert_eq!(groups, vec![vec![0, 1, 2], vec![3, 4]]);
}

#[test]
fn adaptive_thresholds_stay_on_their_own_pixel() {
    // (0,0) carries a tight sigma but no velocity. The samples at (0,1) and (0,2)
    // must use their own loose sigma, so the slope-1.0 link between them holds.
    let data = vec![
        1.0, 1.0, 1.0, // intensity
        NAN, 0.0, 1.0, // velocity
        0.01, 5.0, 5.0, // sigma
    ];
    let cube = Cube::new(3, 1, 3, data).unwrap();
    let config = FofConfig {
        components: 1,
        intensity_threshold: 0.5,
        radius_px: 1.0,
        gradient: GradientMode::Adaptive,
        num_min: 2,
    };

    let report = find_clumps(&cube, config).unwrap();
    assert_eq!(report.catalog.groups.len(), 1);
    let ids: Vec<usize> = report.catalog.groups[0].iter().map(|s| s.id.0).collect();
    assert_eq!(ids, vec![0, 1]);
    assert!(report.catalog.stage0_isolated.is_empty());
    assert!(report.catalog.isolated.is_empty());
}

#[test]
fn reclustering_is_reproducible() {
    let mut pixels = Vec::new();
    for r in 0..6usize {
        for c in 0..6usize {
            let velocity = ((r * 7 + c * 3) % 5) as f64 * 0.3;
            let intensity = if (r + c) % 3 == 0 { 1.0 } else { 0.2 };
            pixels.push((r, c, intensity, velocity));
        }
    }
    let cube = sparse_cube(6, 6, &pixels);
    let config = FofConfig {
        num_min: 3,
        ..blob_config()
    };

    let first = find_clumps(&cube, config.clone()).unwrap();
    let second = find_clumps(&cube, config).unwrap();
    assert_eq!(first.catalog, second.catalog);
    assert_eq!(first.statistics, second.statistics);
}

fn cube_strategy() -> impl Strategy<Value = (usize, Cube)> {
    (1usize..=2, 1usize..=6, 1usize..=6).prop_flat_map(|(compt, rows, cols)| {
        let len = 2 * compt * rows * cols;
        prop::collection::vec(prop_oneof![1 => Just(NAN), 4 => -3.0f64..3.0], len)
            .prop_map(move |data| (compt, Cube::new(2 * compt, rows, cols, data).unwrap()))
    })
}

proptest! {
    #[test]
    fn every_sample_lands_in_exactly_one_category(
        (compt, cube) in cube_strategy(),
        radius in 0.0f64..3.0,
        dv in 0.0f64..4.0,
        num_min in 1usize..5,
        threshold in -1.0f64..2.0,
    ) {
        let config = FofConfig {
            components: compt,
            intensity_threshold: threshold,
            radius_px: radius,
            gradient: GradientMode::Fixed(dv),
            num_min,
        };
        let total = cube.sample_table(compt).unwrap().len();

        let report = find_clumps(&cube, config).unwrap();

        prop_assert_eq!(all_ids(&report.catalog), (0..total).collect::<Vec<_>>());
        for cluster in &report.catalog.stage0_isolated {
            prop_assert!(cluster.len() < num_min);
        }
        prop_assert_eq!(report.statistics.total_samples, total);
    }
}
