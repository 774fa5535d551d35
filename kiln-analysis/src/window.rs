// Kiln Analysis - Variance and anomaly analysis
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Trailing window of the last N samples for one metric.

use std::collections::VecDeque;

/// Mean and sample standard deviation of a full window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub mean: f64,
    /// `None` for a single-sample window.
    pub std_dev: Option<f64>,
}

impl WindowStats {
    /// `None` when the deviation is undefined.
    pub fn is_outlier(&self, value: f64, threshold_std: f64) -> Option<bool> {
        self.std_dev
            .map(|std_dev| (value - self.mean).abs() > std_dev * threshold_std)
    }
}

#[derive(Debug, Clone)]
pub struct RollingWindow {
    samples: VecDeque<f64>,
    size: usize,
}

impl RollingWindow {
    /// The buffer grows on demand; `size` only bounds it.
    pub fn new(size: usize) -> Self {
        Self {
            samples: VecDeque::new(),
            size,
        }
    }

    /// Add a sample and return the stats once `size` samples are held.
    pub fn push(&mut self, value: f64) -> Option<WindowStats> {
        self.samples.push_back(value);
        while self.samples.len() > self.size {
            self.samples.pop_front();
        }
        self.stats()
    }

    pub fn stats(&self) -> Option<WindowStats> {
        if self.size == 0 || self.samples.len() < self.size {
            return None;
        }

        let n = self.samples.len() as f64;
        let mean = self.samples.iter().sum::<f64>() / n;
        let std_dev = if self.samples.len() > 1 {
            let ss: f64 = self.samples.iter().map(|v| (v - mean).powi(2)).sum();
            Some((ss / (n - 1.0)).sqrt())
        } else {
            None
        };

        Some(WindowStats { mean, std_dev })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.size
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Trailing stats for every position of `values`.
pub fn rolling_statistics(values: &[f64], window_size: usize) -> Vec<Option<WindowStats>> {
    let mut window = RollingWindow::new(window_size);
    values.iter().map(|&v| window.push(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_window_not_full() {
        let mut window = RollingWindow::new(3);
        assert!(window.push(1.0).is_none());
        assert!(window.push(2.0).is_none());
        assert!(!window.is_full());

        let stats = window.push(3.0).unwrap();
        assert_relative_eq!(stats.mean, 2.0);
        assert_relative_eq!(stats.std_dev.unwrap(), 1.0);
    }

    #[test]
    fn test_window_count_based_pruning() {
        let mut window = RollingWindow::new(3);
        for i in 0..5 {
            window.push(i as f64);
        }
        assert_eq!(window.len(), 3);
        // [2, 3, 4]
        assert_relative_eq!(window.stats().unwrap().mean, 3.0);
    }

    #[test]
    fn test_sample_std_uses_n_minus_one() {
        let stats = rolling_statistics(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        let last = stats[7].unwrap();
        assert_relative_eq!(last.mean, 5.0);
        assert_relative_eq!(last.std_dev.unwrap(), (32.0f64 / 7.0).sqrt());
        assert!(stats[..7].iter().all(Option::is_none));
    }

    #[test]
    fn test_single_sample_window() {
        let stats = rolling_statistics(&[1.0, 5.0], 1);
        let s = stats[1].unwrap();
        assert_eq!(s.mean, 5.0);
        assert!(s.std_dev.is_none());
        assert_eq!(s.is_outlier(5.0, 3.0), None);
    }

    #[test]
    fn test_is_outlier() {
        let stats = WindowStats {
            mean: 10.0,
            std_dev: Some(1.0),
        };
        assert_eq!(stats.is_outlier(13.5, 3.0), Some(true));
        assert_eq!(stats.is_outlier(13.0, 3.0), Some(false));
        assert_eq!(stats.is_outlier(6.0, 3.0), Some(true));
    }

    #[test]
    fn test_huge_window_stays_undetermined() {
        let stats = rolling_statistics(&[1.0, 2.0, 3.0], usize::MAX);
        assert_eq!(stats.len(), 3);
        assert!(stats.iter().all(Option::is_none));

        let mut window = RollingWindow::new(1 << 40);
        window.push(1.0);
        assert_eq!(window.len(), 1);
        assert!(!window.is_full());
    }

    #[test]
    fn test_clear() {
        let mut window = RollingWindow::new(2);
        window.push(1.0);
        window.clear();
        assert!(window.is_empty());
    }
}
