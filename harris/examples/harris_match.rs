use std::{fs, io::Write, path::Path};

use harris::{Harris, MatcherParams, PatchMatcher};

fn replace_ext(filename: &str, new: &str) -> String {
    let stemmed = Path::new(filename).file_stem().unwrap().to_str().unwrap();
    format!("{stemmed}{new}")
}

fn main() {
    pretty_env_logger::init_timed();
    let args: Vec<_> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: {} <image1> <image2>", args[0]);
        std::process::exit(1);
    }
    let harris = Harris::default();
    let matcher = PatchMatcher::new(MatcherParams::default()).unwrap();
    let mut images = vec![];
    let mut keypoints = vec![];
    for path in &args[1..] {
        let image = harris::GrayFloatImage::from_dynamic(&image::open(path).unwrap());
        let kps = harris.detect(&image);
        let mut kp_file = fs::File::create(replace_ext(path, "_kps.csv")).unwrap();
        for kp in &kps {
            writeln!(kp_file, "{}, {}", kp.x, kp.y).unwrap();
        }
        images.push(image);
        keypoints.push(kps);
    }
    let matches = matcher.match_features(&images[0], &keypoints[0], &images[1], &keypoints[1]);
    let mut match_file = fs::File::create("matches.csv").unwrap();
    for harris::FeatureMatch(i, j) in matches {
        let (a, b) = (keypoints[0][i], keypoints[1][j]);
        writeln!(match_file, "{i}, {j}, {}, {}, {}, {}", a.x, a.y, b.x, b.y).unwrap();
    }
}
