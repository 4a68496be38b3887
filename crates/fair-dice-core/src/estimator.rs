//! Monte Carlo estimation of pairwise win probabilities between dice.
//!
//! Every ordered pair `(i, j)` with `i != j` is simulated on its own: the
//! estimate for `j` against `i` is never derived from the one for `i`
//! against `j`, and nothing assumes the "beats" relation is transitive.
//!
//! The reported probability is the strict-win frequency. Ties are counted
//! separately within the same run, so `wins + ties + losses == trials` holds
//! for each entry.

use crate::dice::Dice;
use crate::random::SecureRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Default number of simulated rolls per ordered pair
pub const DEFAULT_TRIALS: u32 = 1000;

/// Estimated outcome of rolling dice `i` against dice `j`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbabilityEntry {
    pub i: usize,
    pub j: usize,
    pub wins: u32,
    pub ties: u32,
    pub trials: u32,
}

impl ProbabilityEntry {
    /// Estimated P(roll of `i` > roll of `j`)
    pub fn probability(&self) -> f64 {
        ratio(self.wins, self.trials)
    }

    pub fn tie_probability(&self) -> f64 {
        ratio(self.ties, self.trials)
    }

    pub fn losses(&self) -> u32 {
        self.trials.saturating_sub(self.wins).saturating_sub(self.ties)
    }

    /// Probability with four decimal digits, e.g. `0.5560`
    pub fn formatted(&self) -> String {
        format!("{:.4}", self.probability())
    }
}

fn ratio(count: u32, trials: u32) -> f64 {
    if trials == 0 {
        0.0
    } else {
        f64::from(count) / f64::from(trials)
    }
}

/// Win probabilities for every ordered pair of a dice set
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityTable {
    size: usize,
    entries: Vec<ProbabilityEntry>,
}

impl ProbabilityTable {
    /// Number of dice covered by the table
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Entries in row-major order, diagonal excluded
    pub fn entries(&self) -> &[ProbabilityEntry] {
        &self.entries
    }

    /// Entry for `i` against `j`; `None` on the diagonal or out of bounds
    pub fn get(&self, i: usize, j: usize) -> Option<&ProbabilityEntry> {
        if i == j || i >= self.size || j >= self.size {
            return None;
        }
        let column = if j < i { j } else { j - 1 };
        self.entries.get(i * (self.size - 1) + column)
    }

    pub fn probability(&self, i: usize, j: usize) -> Option<f64> {
        self.get(i, j).map(ProbabilityEntry::probability)
    }

    /// Four-digit probability, or `-` where no comparison applies
    pub fn formatted(&self, i: usize, j: usize) -> String {
        self.get(i, j)
            .map(ProbabilityEntry::formatted)
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Estimates which dice statistically dominate which by simulation
#[derive(Clone, Debug)]
pub struct ProbabilityEstimator {
    random: SecureRandom,
    trials: u32,
}

impl ProbabilityEstimator {
    pub fn new(random: SecureRandom) -> Self {
        Self {
            random,
            trials: DEFAULT_TRIALS,
        }
    }

    /// Set the number of simulated rolls per pair
    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = trials;
        self
    }

    pub fn trials(&self) -> u32 {
        self.trials
    }

    /// Simulate `a` against `b`
    pub fn estimate_pair(&self, a: &Dice, b: &Dice) -> ProbabilityEntry {
        let (wins, ties) = simulate(a, b, self.trials, &self.random);
        ProbabilityEntry {
            i: 0,
            j: 1,
            wins,
            ties,
            trials: self.trials,
        }
    }

    /// Simulate every ordered pair of `dice`
    pub fn estimate_all(&self, dice: &[Dice]) -> ProbabilityTable {
        let pairs: Vec<(usize, usize)> = (0..dice.len())
            .flat_map(|i| (0..dice.len()).filter(move |&j| j != i).map(move |j| (i, j)))
            .collect();
        debug!(dice = dice.len(), pairs = pairs.len(), trials = self.trials, "estimating win probabilities");

        let run = |&(i, j): &(usize, usize), random: &SecureRandom| {
            let (wins, ties) = simulate(&dice[i], &dice[j], self.trials, random);
            ProbabilityEntry {
                i,
                j,
                wins,
                ties,
                trials: self.trials,
            }
        };

        #[cfg(feature = "rayon")]
        let entries: Vec<ProbabilityEntry> = {
            let workers: Vec<SecureRandom> = pairs.iter().map(|_| self.random.fork()).collect();
            pairs
                .par_iter()
                .zip(workers.par_iter())
                .map(|(pair, random)| run(pair, random))
                .collect()
        };

        #[cfg(not(feature = "rayon"))]
        let entries: Vec<ProbabilityEntry> = pairs.iter().map(|pair| run(pair, &self.random)).collect();

        ProbabilityTable {
            size: dice.len(),
            entries,
        }
    }
}

fn simulate(a: &Dice, b: &Dice, trials: u32, random: &SecureRandom) -> (u32, u32) {
    let mut wins = 0;
    let mut ties = 0;
    for _ in 0..trials {
        let roll_a = a.sample_with(random);
        let roll_b = b.sample_with(random);
        if roll_a > roll_b {
            wins += 1;
        } else if roll_a == roll_b {
            ties += 1;
        }
    }
    (wins, ties)
}

/// Exact P(roll of `a` > roll of `b`) by enumerating every face pair
pub fn analytic_win_probability(a: &Dice, b: &Dice) -> f64 {
    let wins: usize = a
        .faces()
        .iter()
        .map(|fa| b.faces().iter().filter(|&fb| fa > fb).count())
        .sum();
    wins as f64 / (a.face_count() * b.face_count()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dice(faces: &[u64], random: &SecureRandom) -> Dice {
        Dice::new(faces.to_vec(), random.clone()).unwrap()
    }

    #[test]
    fn test_table_skips_diagonal() {
        let random = SecureRandom::from_seed([17u8; 32]);
        let set = vec![dice(&[1, 2], &random), dice(&[3, 4], &random), dice(&[5, 6], &random)];
        let table = ProbabilityEstimator::new(random).with_trials(100).estimate_all(&set);

        assert_eq!(table.len(), 3);
        assert_eq!(table.entries().len(), 6);
        for i in 0..3 {
            assert!(table.get(i, i).is_none());
            assert_eq!(table.formatted(i, i), "-");
        }
        assert!(table.get(0, 3).is_none());
    }

    #[test]
    fn test_table_lookup_matches_pair() {
        let random = SecureRandom::from_seed([19u8; 32]);
        let set = vec![
            dice(&[1], &random),
            dice(&[2], &random),
            dice(&[3], &random),
            dice(&[4], &random),
        ];
        let table = ProbabilityEstimator::new(random).with_trials(10).estimate_all(&set);

        for i in 0..4 {
            for j in 0..4 {
                if let Some(entry) = table.get(i, j) {
                    assert_eq!((entry.i, entry.j), (i, j));
                    let expected = if i > j { 1.0 } else { 0.0 };
                    assert_eq!(entry.probability(), expected);
                }
            }
        }
    }

    #[test]
    fn test_ties_count_toward_neither_side() {
        let random = SecureRandom::from_seed([23u8; 32]);
        let set = vec![dice(&[3, 3], &random), dice(&[3, 3], &random), dice(&[3], &random)];
        let table = ProbabilityEstimator::new(random).with_trials(200).estimate_all(&set);

        let forward = table.get(0, 1).unwrap();
        let backward = table.get(1, 0).unwrap();
        assert_eq!(forward.probability(), 0.0);
        assert_eq!(backward.probability(), 0.0);
        assert_eq!(forward.tie_probability(), 1.0);
        assert_eq!(forward.losses(), 0);
    }

    #[test]
    fn test_counts_add_up() {
        let random = SecureRandom::from_seed([29u8; 32]);
        let a = dice(&[1, 2, 3, 4, 5, 6], &random);
        let b = dice(&[2, 2, 3, 5, 5, 5], &random);
        let entry = ProbabilityEstimator::new(random).estimate_pair(&a, &b);

        assert_eq!(entry.trials, DEFAULT_TRIALS);
        assert_eq!(entry.wins + entry.ties + entry.losses(), DEFAULT_TRIALS);
    }

    #[test]
    fn test_losses_of_inconsistent_entry() {
        let entry: ProbabilityEntry =
            serde_json::from_str(r#"{"i":0,"j":1,"wins":8,"ties":5,"trials":10}"#).unwrap();

        assert_eq!(entry.losses(), 0);
        assert_eq!(entry.probability(), 0.8);
    }

    #[test]
    fn test_four_decimal_format() {
        let entry = ProbabilityEntry {
            i: 0,
            j: 1,
            wins: 556,
            ties: 0,
            trials: 1000,
        };
        assert_eq!(entry.formatted(), "0.5560");

        let entry = ProbabilityEntry { wins: 1, trials: 3, ..entry };
        assert_eq!(entry.formatted(), "0.3333");
    }

    #[test]
    fn test_zero_trials() {
        let random = SecureRandom::from_seed([31u8; 32]);
        let entry = ProbabilityEstimator::new(random.clone())
            .with_trials(0)
            .estimate_pair(&dice(&[2], &random), &dice(&[1], &random));

        assert_eq!(entry.probability(), 0.0);
        assert_eq!(entry.formatted(), "0.0000");
    }

    #[test]
    fn test_analytic_probability() {
        let random = SecureRandom::os();
        let a = dice(&[2, 2, 4, 4, 9, 9], &random);
        let b = dice(&[1, 1, 6, 6, 8, 8], &random);

        assert!((analytic_win_probability(&a, &b) - 5.0 / 9.0).abs() < 1e-12);
        assert!((analytic_win_probability(&b, &a) - 4.0 / 9.0).abs() < 1e-12);
        assert_eq!(analytic_win_probability(&a, &a), 12.0 / 36.0);
    }

    #[test]
    fn test_table_serializes() {
        let random = SecureRandom::from_seed([41u8; 32]);
        let set = vec![dice(&[1, 2], &random), dice(&[2, 3], &random), dice(&[3, 4], &random)];
        let table = ProbabilityEstimator::new(random).with_trials(20).estimate_all(&set);

        let json = serde_json::to_string(&table).unwrap();
        let decoded: ProbabilityTable = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, table);
    }
}
