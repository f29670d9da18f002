//! Reward driven line search over a single scalar.
//!
//! Each scalar is nudged by a fixed set of offsets around its original value,
//! the reward is measured for every candidate, and the scalar is left at the
//! best one. The unmodified value is never measured, so the search always
//! moves and can settle on a worse value than the one it started from.

use crate::error::{Error, Result};

use itertools::Itertools;

/// Step sizes for the per-dimension search.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineSearch {
    learning_rate: f64,
    granularity: usize,
}

impl LineSearch {
    /// Creates a search covering `[-learning_rate, learning_rate]` in
    /// `granularity` steps per direction.
    pub fn new(learning_rate: f64, granularity: usize) -> Result<Self> {
        if !(learning_rate > 0.0 && learning_rate.is_finite()) {
            return Err(Error::LearningRate(learning_rate));
        }
        if granularity == 0 {
            return Err(Error::Granularity);
        }
        Ok(LineSearch {
            learning_rate,
            granularity,
        })
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn granularity(&self) -> usize {
        self.granularity
    }

    /// Distance between two neighbouring offsets.
    pub fn step(&self) -> f64 {
        self.learning_rate / self.granularity as f64
    }

    /// Number of reward evaluations spent on each dimension.
    pub fn evaluations(&self) -> usize {
        2 * self.granularity
    }

    /// Offsets in the order they are tried: the positive sweep outwards,
    /// then the negative sweep outwards.
    pub fn offsets(&self) -> impl Iterator<Item = f64> {
        let step = self.step();
        let positive = (1..=self.granularity).map(move |k| step * k as f64);
        let negative = (1..=self.granularity).map(move |k| -step * k as f64);
        positive.chain(negative)
    }

    /// Tries every offset around `original` and returns the value with the
    /// highest reward.
    ///
    /// `reward` receives each candidate value and must report the reward
    /// obtained with it in place. Ties go to the earliest candidate.
    pub fn search<F>(&self, original: f64, mut reward: F) -> (f64, f64)
    where
        F: FnMut(f64) -> f64,
    {
        let candidates = self
            .offsets()
            .map(|offset| {
                let value = original + offset;
                (value, reward(value))
            })
            .collect_vec();
        // offsets() is never empty.
        let best = index_of_max(candidates.iter().map(|&(_, r)| r)).unwrap_or(0);
        candidates[best]
    }
}

/// Returns the position of the first maximum, or `None` for no values.
///
/// NaN never compares greater, so it only wins when it comes first.
pub fn index_of_max<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, value) in values.into_iter().enumerate() {
        match best {
            Some((_, max)) if !(value > max) => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn rejects_bad_parameters() {
        assert_eq!(LineSearch::new(0.0, 4), Err(Error::LearningRate(0.0)));
        assert_eq!(LineSearch::new(-1.0, 4), Err(Error::LearningRate(-1.0)));
        assert!(LineSearch::new(f64::NAN, 4).is_err());
        assert!(LineSearch::new(f64::INFINITY, 4).is_err());
        assert_eq!(LineSearch::new(1.0, 0), Err(Error::Granularity));
    }

    #[test]
    fn sweep_coverage() {
        let search = LineSearch::new(1.0, 4).unwrap();
        assert_eq!(
            search.offsets().collect_vec(),
            vec![0.25, 0.5, 0.75, 1.0, -0.25, -0.5, -0.75, -1.0]
        );
        assert_eq!(search.evaluations(), 8);
    }

    #[test]
    fn sweep_calls_reward_once_per_offset() {
        let search = LineSearch::new(0.3, 3).unwrap();
        let mut tried = Vec::new();
        search.search(10.0, |value| {
            tried.push(value);
            0.0
        });
        assert_eq!(tried.len(), search.evaluations());
        assert!(tried[..3].iter().all(|&v| v > 10.0));
        assert!(tried[3..].iter().all(|&v| v < 10.0));
    }

    #[test]
    fn first_max_wins() {
        assert_eq!(index_of_max(vec![0.5, 0.9, 0.9, 0.1]), Some(1));
        assert_eq!(index_of_max(vec![]), None);
        assert_eq!(index_of_max(vec![f64::NAN, 1.0]), Some(0));
        assert_eq!(index_of_max(vec![1.0, f64::NAN, 2.0]), Some(2));
    }

    #[test]
    fn search_moves_towards_reward() {
        let search = LineSearch::new(1.0, 4).unwrap();
        let (value, reward) = search.search(0.0, |x| -(x + 0.5) * (x + 0.5));
        assert_eq!(value, -0.5);
        assert_eq!(reward, 0.0);
    }

    #[test]
    fn positive_sweep_wins_ties() {
        let search = LineSearch::new(1.0, 2).unwrap();
        let (value, _) = search.search(3.0, |x| -(x - 3.0).abs());
        assert_eq!(value, 3.5);
    }

    #[test]
    fn never_stays_put() {
        // The reward peaks at the starting value, which is never tried.
        let search = LineSearch::new(1.0, 4).unwrap();
        let (value, reward) = search.search(2.0, |x| if x == 2.0 { 1.0 } else { -x });
        assert_eq!(value, 1.0);
        assert_eq!(reward, -1.0);
    }
}
