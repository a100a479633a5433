//! Descriptive statistics over f64 slices.
//!
//! Note: summation runs in slice order so repeated runs are bit-identical.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    Some(sum / values.len() as f64)
}

/// Sum of squared deviations from the mean. Zero for a single value.
pub fn sum_sq_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    Some(values.iter().map(|v| (v - m) * (v - m)).sum())
}

/// Sample variance (n - 1 degrees of freedom). `None` when n < 2.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let ss = sum_sq_dev(values)?;
    Some(ss / (values.len() - 1) as f64)
}

pub fn sample_stdev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// 2^(-delta_cq), the relative expression of a target against its reference.
pub fn relative_expression(delta_cq: f64) -> f64 {
    2f64.powf(-delta_cq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdev_needs_two_values() {
        assert_eq!(sample_stdev(&[1.0]), None);
        assert_eq!(sample_stdev(&[]), None);
    }

    #[test]
    fn sum_sq_dev_single_value_is_zero() {
        assert_eq!(sum_sq_dev(&[3.5]), Some(0.0));
    }
}
