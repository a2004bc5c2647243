mod common;

use common::rectangles;
use harris::{
    Assignment, FeatureMatch, GrayFloatImage, Harris, KeyPoint, MatcherParams, MatchingMethod,
    PatchMatcher,
};
use log::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use test_case::test_case;

fn random_texture(width: usize, height: usize, seed: u64) -> GrayFloatImage {
    let mut rng = Pcg64::seed_from_u64(seed);
    GrayFloatImage::from_fn(width, height, |_, _| rng.gen())
}

/// Distinct keypoints, some of them on the image border.
fn scattered_keypoints() -> Vec<KeyPoint> {
    vec![
        KeyPoint::new(0, 0),
        KeyPoint::new(15, 3),
        KeyPoint::new(7, 8),
        KeyPoint::new(31, 31),
        KeyPoint::new(20, 12),
        KeyPoint::new(1, 1),
        KeyPoint::new(12, 27),
        KeyPoint::new(31, 0),
    ]
}

fn identity(n: usize) -> Vec<FeatureMatch<usize>> {
    (0..n).map(|i| FeatureMatch(i, i)).collect()
}

#[test_case("ssd", 3 ; "ssd window 3")]
#[test_case("SSD", 7 ; "ssd window 7")]
#[test_case("ncc", 5 ; "ncc window 5")]
#[test_case("Ncc", 9 ; "ncc window 9")]
fn identical_images_match_identically(method: &str, window_size: usize) {
    let _ = pretty_env_logger::try_init_timed();
    let image = random_texture(32, 32, 7);
    let keypoints = scattered_keypoints();
    let matcher = PatchMatcher::from_names(window_size, method).unwrap();
    let matches = matcher.match_features(&image, &keypoints, &image, &keypoints);
    assert_eq!(matches, identity(keypoints.len()));
}

#[test]
fn detected_corners_follow_a_translation() {
    let _ = pretty_env_logger::try_init_timed();
    let harris = Harris::default();
    let image1 = rectangles(0, 0);
    let image2 = rectangles(3, 2);
    let keypoints1 = harris.detect(&image1);
    let keypoints2 = harris.detect(&image2);
    info!(
        "Detected {} and {} keypoints",
        keypoints1.len(),
        keypoints2.len()
    );
    // Corners of rectangles with different brightness are perfectly
    // correlated, so NCC cannot tell them apart. SSD can.
    let matcher = PatchMatcher::ssd(7).unwrap();
    let matches = matcher.match_features(&image1, &keypoints1, &image2, &keypoints2);
    assert_eq!(matches.len(), keypoints1.len());
    for FeatureMatch(i, j) in matches {
        assert_eq!(keypoints1[i].offset(3, 2), Some(keypoints2[j]));
    }
}

#[test]
fn descriptors_are_the_image_patches() {
    let image = random_texture(20, 16, 3);
    let keypoints = [KeyPoint::new(5, 9), KeyPoint::new(12, 4)];
    let matcher = PatchMatcher::ncc(5).unwrap();
    let descriptors = matcher.get_descriptors(&image, &keypoints);
    assert_eq!(descriptors.dim(), (2, 25));
    for (row, kp) in descriptors.rows().into_iter().zip(&keypoints) {
        let (cx, cy) = (kp.x as usize, kp.y as usize);
        let patch: Vec<f32> = (cy - 2..=cy + 2)
            .flat_map(|y| (cx - 2..=cx + 2).map(move |x| (x, y)))
            .map(|(x, y)| image.get(x, y))
            .collect();
        assert_eq!(row.to_vec(), patch);
    }
}

#[test]
fn distance_diagonals_are_zero() {
    let image = random_texture(32, 32, 11);
    let keypoints = scattered_keypoints();
    let descriptors = PatchMatcher::ssd(5)
        .unwrap()
        .get_descriptors(&image, &keypoints);
    let ssd = harris::match_ssd(&descriptors, &descriptors);
    let ncc = harris::match_ncc(&descriptors, &descriptors);
    for i in 0..keypoints.len() {
        assert_eq!(ssd[(i, i)], 0.0);
        assert_eq!(ncc[(i, i)], 0.0);
    }
    assert!(ssd.iter().all(|&d| d >= 0.0));
    assert!(ncc.iter().all(|&d| (0.0..=2.0).contains(&d)));
}

#[test_case(Assignment::Optimal ; "optimal")]
#[test_case(Assignment::Greedy ; "greedy")]
fn matches_are_one_to_one(assignment: Assignment) {
    let mut rng = Pcg64::seed_from_u64(5);
    let image1 = random_texture(40, 40, 1);
    let image2 = random_texture(40, 40, 2);
    let matcher = PatchMatcher::new(MatcherParams {
        window_size: 5,
        matching_method: MatchingMethod::Ssd,
        assignment,
        ..Default::default()
    })
    .unwrap();
    for _ in 0..20 {
        let n1 = rng.gen_range(0..12);
        let n2 = rng.gen_range(0..12);
        let mut random_keypoints = |n: usize| -> Vec<KeyPoint> {
            (0..n)
                .map(|_| KeyPoint::new(rng.gen_range(0..40), rng.gen_range(0..40)))
                .collect()
        };
        let keypoints1 = random_keypoints(n1);
        let keypoints2 = random_keypoints(n2);
        let matches = matcher.match_features(&image1, &keypoints1, &image2, &keypoints2);
        assert_eq!(matches.len(), n1.min(n2));
        let mut firsts: Vec<usize> = matches.iter().map(|m| m.0).collect();
        let mut seconds: Vec<usize> = matches.iter().map(|m| m.1).collect();
        // Sorted by first index already.
        assert!(firsts.windows(2).all(|w| w[0] < w[1]));
        seconds.sort_unstable();
        seconds.dedup();
        firsts.dedup();
        assert_eq!(firsts.len(), n1.min(n2));
        assert_eq!(seconds.len(), n1.min(n2));
        assert!(matches.iter().all(|m| m.0 < n1 && m.1 < n2));
    }
}

#[test]
fn optimal_never_costs_more_than_greedy() {
    let image1 = random_texture(40, 40, 21);
    let image2 = random_texture(40, 40, 22);
    let keypoints1: Vec<KeyPoint> = (0..9).map(|i| KeyPoint::new(4 * i + 2, 3 * i + 5)).collect();
    let keypoints2: Vec<KeyPoint> = (0..7).map(|i| KeyPoint::new(37 - 5 * i, 2 * i + 9)).collect();
    let params = MatcherParams {
        window_size: 7,
        matching_method: MatchingMethod::Ncc,
        ..Default::default()
    };
    let optimal = PatchMatcher::new(params).unwrap();
    let greedy = PatchMatcher::new(MatcherParams {
        assignment: Assignment::Greedy,
        ..params
    })
    .unwrap();
    let distances = optimal.params().matching_method.distance_matrix(
        &optimal.get_descriptors(&image1, &keypoints1),
        &optimal.get_descriptors(&image2, &keypoints2),
    );
    let cost = |matches: Vec<FeatureMatch<usize>>| -> f64 {
        matches
            .into_iter()
            .map(|FeatureMatch(i, j)| f64::from(distances[(i, j)]))
            .sum()
    };
    let optimal_cost = cost(optimal.compute_matches(&distances));
    let greedy_cost = cost(greedy.compute_matches(&distances));
    assert!(optimal_cost <= greedy_cost + 1e-9);
}
