use forest_protector_core::{FieldLayout, FIXED_PATH_COUNT};
use forest_protector_system_path_generation::PathGenerator;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn pool_holds_fixed_shapes_followed_by_random_paths() {
    let layout = FieldLayout::default();
    let generator = PathGenerator::new(&layout, 50);
    let mut rng = ChaCha8Rng::seed_from_u64(0x00c0_ffee);

    let paths = generator.generate_all_paths(&mut rng);

    assert_eq!(paths.len(), 50);
    assert_eq!(paths[0], generator.circular());
    assert_eq!(paths[1], generator.straight());
    assert_eq!(paths[2], generator.zigzag());
    assert_eq!(paths[3], generator.spiral());
    assert_eq!(paths[4], generator.wave());
}

#[test]
fn every_path_crosses_the_field_from_left_to_right() {
    let layout = FieldLayout::default();
    let generator = PathGenerator::new(&layout, 50);
    let mut rng = ChaCha8Rng::seed_from_u64(17);

    for path in generator.generate_all_paths(&mut rng) {
        assert!(path.len() >= 2);
        assert_eq!(path.start().x, 0.0);
        assert_eq!(path.end().x, layout.width);
    }
}

#[test]
fn random_paths_stay_within_their_vertical_bands() {
    let layout = FieldLayout::default();
    let generator = PathGenerator::new(&layout, 50);
    let mut rng = ChaCha8Rng::seed_from_u64(99);

    for _ in 0..200 {
        let path = generator.random(&mut rng);
        let points = path.points();
        let interior = &points[1..points.len() - 1];

        assert!((3..=7).contains(&(interior.len() + 1)));
        assert!((270.0..=810.0).contains(&path.start().y));
        assert!((270.0..=810.0).contains(&path.end().y));
        for waypoint in interior {
            assert!((216.0..=864.0).contains(&waypoint.y));
            assert!(waypoint.x > 0.0 && waypoint.x < layout.width);
        }
        for pair in points.windows(2) {
            assert!(pair[0].x < pair[1].x, "random paths advance rightwards");
        }
    }
}

#[test]
fn same_seed_produces_the_same_pool() {
    let generator = PathGenerator::new(&FieldLayout::default(), 12);

    let first = generator.generate_all_paths(&mut ChaCha8Rng::seed_from_u64(5));
    let second = generator.generate_all_paths(&mut ChaCha8Rng::seed_from_u64(5));

    assert_eq!(first.len(), 12);
    assert_eq!(first, second);
}

#[test]
fn undersized_pools_still_hold_every_fixed_shape() {
    let generator = PathGenerator::new(&FieldLayout::default(), 1);
    let paths = generator.generate_all_paths(&mut ChaCha8Rng::seed_from_u64(1));

    assert_eq!(paths.len(), FIXED_PATH_COUNT);
}
