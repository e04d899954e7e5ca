use statrs::distribution::{ContinuousCDF, StudentsT};

/// Pearson correlation coefficient of two equal-length samples.
///
/// Returns `None` for fewer than two points, zero variance on either side or
/// non-finite input.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() {
        return None;
    }
    pearson_from_pairs(x.iter().copied().zip(y.iter().copied()))
}

/// Pearson correlation over the positions where both samples are present.
pub fn pearson_pairwise(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    pearson_from_pairs(
        x.iter()
            .zip(y)
            .filter_map(|(a, b)| Some(((*a)?, (*b)?))),
    )
}

fn pearson_from_pairs<I>(pairs: I) -> Option<f64>
where
    I: Iterator<Item = (f64, f64)> + Clone,
{
    let (n, sum_x, sum_y) = pairs
        .clone()
        .fold((0usize, 0.0, 0.0), |(n, sx, sy), (a, b)| (n + 1, sx + a, sy + b));
    if n < 2 {
        return None;
    }

    let mean_x = sum_x / n as f64;
    let mean_y = sum_y / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }

    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Two-sided p-value of a Pearson coefficient computed from `n` pairs, under
/// the null hypothesis of no correlation.
pub fn pearson_p_value(r: f64, n: usize) -> Option<f64> {
    if n < 2 || !r.is_finite() {
        return None;
    }
    if n == 2 {
        return Some(1.0);
    }
    if r.abs() >= 1.0 {
        return Some(0.0);
    }

    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}

/// Mean of the finite values, `None` when there are none.
pub fn nan_mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (count, sum) = values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0usize, 0.0), |(c, s), v| (c + 1, s + v));
    (count > 0).then(|| sum / count as f64)
}
