//! Rolling window statistics shared by the windowed indicators.
//!
//! Windows are full-length only: a row is defined when it and the
//! `period - 1` rows before it are all defined. Standard deviations are
//! sample deviations (divide by N-1), so a window of one is never defined.

pub fn window_mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

pub fn sample_stddev(window: &[f64]) -> Option<f64> {
    let n = window.len();
    if n < 2 {
        return None;
    }
    let mean = window_mean(window);
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(variance.sqrt())
}

/// Apply `stat` to every full window of `period` defined values.
pub fn rolling<F>(values: &[Option<f64>], period: usize, stat: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let mut window: Vec<f64> = Vec::with_capacity(period);
    for i in (period - 1)..values.len() {
        window.clear();
        for v in &values[i + 1 - period..=i] {
            match v {
                Some(x) => window.push(*x),
                None => break,
            }
        }
        if window.len() == period {
            out[i] = stat(&window);
        }
    }
    out
}

pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, |w| Some(window_mean(w)))
}

pub fn rolling_stddev(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, sample_stddev)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rolling_stddev_warmup() {
        let values: Vec<Option<f64>> = [10.0, 20.0, 30.0, 40.0, 50.0].into_iter().map(Some).collect();
        let sd = rolling_stddev(&values, 3);

        assert_eq!(sd[0], None);
        assert_eq!(sd[1], None);
        assert!(sd[2].is_some());
        assert!(sd[4].is_some());
    }

    #[test]
    fn stddev_is_sample_deviation() {
        let window = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // population stddev is 2.0; sample stddev is sqrt(32 / 7)
        assert_relative_eq!(
            sample_stddev(&window).unwrap(),
            (32.0_f64 / 7.0).sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn stddev_constant_values_is_zero() {
        assert_eq!(sample_stddev(&[100.0; 5]), Some(0.0));
    }

    #[test]
    fn stddev_single_value_is_undefined() {
        assert_eq!(sample_stddev(&[1.0]), None);
        assert_eq!(rolling_stddev(&[Some(1.0), Some(2.0)], 1), vec![None, None]);
    }

    #[test]
    fn rolling_skips_windows_with_gaps() {
        let values = vec![None, Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)];
        let means = rolling_mean(&values, 2);
        assert_eq!(
            means,
            vec![None, None, Some(1.5), None, None, Some(4.5)]
        );
    }

    #[test]
    fn rolling_zero_period_is_all_undefined() {
        let values = vec![Some(1.0), Some(2.0)];
        assert_eq!(rolling_mean(&values, 0), vec![None, None]);
    }

    #[test]
    fn rolling_longer_than_input() {
        let values = vec![Some(1.0), Some(2.0)];
        assert_eq!(rolling_stddev(&values, 5), vec![None, None]);
    }
}
