//! Rank and correlation primitives for the adaptation indices.

/// Assign 1-based mid ranks: tied values share the average of their would-be
/// ranks. Empty input produces empty output.
pub fn rank_average(data: &[f64]) -> Vec<f64> {
    let n = data.len();
    if n == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| data[a].total_cmp(&data[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        // Find the end of the tie group.
        let mut j = i + 1;
        while j < n && data[order[j]].total_cmp(&data[order[i]]).is_eq() {
            j += 1;
        }
        // Ranks in the group are (i+1)..=j; their average is (i+1 + j) / 2.
        let rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = rank;
        }
        i = j;
    }
    ranks
}

/// Pearson product-moment correlation. Returns 0.0 for constant series and
/// for fewer than two observations.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len();
    if n < 2 {
        return 0.0;
    }

    let mean_x: f64 = x.iter().sum::<f64>() / n as f64;
    let mean_y: f64 = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    cov / denom
}

/// Spearman rank correlation: Pearson correlation on mid ranks. Ties are
/// expected (usage profiles carry many zeros) and handled by rank averaging.
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    pearson(&rank_average(x), &rank_average(y))
}
