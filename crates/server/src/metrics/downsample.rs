//! Largest-Triangle-Three-Buckets downsampling.
//!
//! Naive fixed-stride sampling on long windows hides spikes; LTTB keeps the
//! visually significant extrema while bounding the payload handed to the
//! dashboard. The algorithm is metric-agnostic: callers supply accessors for
//! the time axis and the value axis.

/// Reduces `data` to at most `target` points while preserving its shape.
///
/// The first and last points are always kept. When `target` is 0, 1, or at
/// least `data.len()`, the input is returned unchanged (a `target` of 1
/// cannot bound both endpoints, so it is treated as "no reduction"). `x`
/// must be monotonically increasing over `data`.
pub fn lttb<T, X, Y>(data: &[T], target: usize, x: X, y: Y) -> Vec<T>
where
    T: Clone,
    X: Fn(&T) -> f64,
    Y: Fn(&T) -> f64,
{
    let n = data.len();
    if target <= 1 || target >= n {
        return data.to_vec();
    }
    if target == 2 {
        return vec![data[0].clone(), data[n - 1].clone()];
    }

    let mut sampled = Vec::with_capacity(target);
    sampled.push(data[0].clone());

    // Fractional bucket width; boundaries are computed by flooring the
    // cumulative index so rounding drift does not accumulate.
    let bucket_size = (n - 2) as f64 / (target - 2) as f64;
    let mut a = 0usize;

    for i in 0..target - 2 {
        let start = (i as f64 * bucket_size).floor() as usize + 1;
        let mut end = ((i + 1) as f64 * bucket_size).floor() as usize + 1;
        if end >= n - 1 {
            end = n - 1;
        }

        // The fixed third corner of the triangle is the centroid of the
        // next bucket.
        let next_start = end;
        let mut next_end = ((i + 2) as f64 * bucket_size).floor() as usize + 1;
        if next_end > n {
            next_end = n;
        }

        let mut avg_x = 0.0;
        let mut avg_y = 0.0;
        let mut avg_count = 0usize;
        for point in &data[next_start..next_end] {
            avg_x += x(point);
            avg_y += y(point);
            avg_count += 1;
        }
        if avg_count > 0 {
            avg_x /= avg_count as f64;
            avg_y /= avg_count as f64;
        }

        let ax = x(&data[a]);
        let ay = y(&data[a]);
        let mut max_area = -1.0;
        let mut max_idx = start;
        for (j, point) in data.iter().enumerate().take(end).skip(start) {
            let bx = x(point);
            let by = y(point);
            let area = ((ax - bx) * (avg_y - ay) - (ax - avg_x) * (by - ay)).abs() / 2.0;
            if area > max_area {
                max_area = area;
                max_idx = j;
            }
        }

        sampled.push(data[max_idx].clone());
        a = max_idx;
    }

    sampled.push(data[n - 1].clone());
    sampled
}
