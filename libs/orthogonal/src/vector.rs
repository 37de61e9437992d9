//! Small cross-sectional vector math: each "vector" is one value per symbol
//! in the current batch, not a per-symbol multi-dimensional point.

pub fn mean(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.iter().sum::<f64>() / v.len() as f64
}

pub fn std_dev(v: &[f64]) -> f64 {
    if v.len() < 2 {
        return 0.0;
    }
    let m = mean(v);
    (v.iter().map(|x| (x - m).powi(2)).sum::<f64>() / v.len() as f64).sqrt()
}

/// Z-scores `v` against its own batch mean/std. A zero-variance batch
/// z-scores to all zeros rather than dividing by zero.
pub fn zscore(v: &[f64]) -> Vec<f64> {
    let m = mean(v);
    let s = std_dev(v);
    if s == 0.0 {
        return vec![0.0; v.len()];
    }
    v.iter().map(|x| (x - m) / s).collect()
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

/// Subtracts from `v` its projection onto `onto`. If `onto` is (near) zero,
/// `v` is returned unchanged — there is nothing to project against.
pub fn project_out(v: &[f64], onto: &[f64]) -> Vec<f64> {
    let onto_norm_sq = dot(onto, onto);
    if onto_norm_sq < 1e-12 {
        return v.to_vec();
    }
    let scale = dot(v, onto) / onto_norm_sq;
    v.iter().zip(onto).map(|(x, o)| x - scale * o).collect()
}

/// Pearson correlation between two equal-length batch columns.
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    let (sa, sb) = (std_dev(a), std_dev(b));
    if sa == 0.0 || sb == 0.0 {
        return 0.0;
    }
    let (ma, mb) = (mean(a), mean(b));
    let cov = a.iter().zip(b).map(|(x, y)| (x - ma) * (y - mb)).sum::<f64>() / a.len() as f64;
    cov / (sa * sb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zscore_of_constant_batch_is_all_zero() {
        assert_eq!(zscore(&[5.0, 5.0, 5.0]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn project_out_removes_collinear_component() {
        let v = vec![2.0, 4.0, 6.0];
        let onto = vec![1.0, 2.0, 3.0];
        let residual = project_out(&v, &onto);
        assert!(residual.iter().all(|x| x.abs() < 1e-9));
    }

    #[test]
    fn correlation_of_identical_series_is_one() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        assert!((correlation(&a, &a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn correlation_of_constant_series_is_zero() {
        let a = vec![1.0, 1.0, 1.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(correlation(&a, &b), 0.0);
    }
}
