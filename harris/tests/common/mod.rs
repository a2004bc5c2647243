use harris::GrayFloatImage;

/// Three flat rectangles of different contrast on a 0.1 background,
/// shifted by `(ox, oy)`.
pub fn rectangles(ox: usize, oy: usize) -> GrayFloatImage {
    const RECTS: [(usize, usize, usize, usize, f32); 3] = [
        (6, 6, 14, 14, 0.8),
        (22, 8, 32, 16, 0.4),
        (10, 24, 18, 33, 0.6),
    ];
    GrayFloatImage::from_fn(48, 48, |x, y| {
        RECTS
            .iter()
            .find(|&&(x0, y0, x1, y1, _)| {
                (x0 + ox..x1 + ox).contains(&x) && (y0 + oy..y1 + oy).contains(&y)
            })
            .map_or(0.1, |r| r.4)
    })
}
