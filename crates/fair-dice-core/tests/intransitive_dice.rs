//! Convergence of the win probability estimator on a known intransitive set.

use fair_dice_core::{
    dice::Dice,
    estimator::{analytic_win_probability, ProbabilityEstimator},
    random::SecureRandom,
};

fn intransitive_set(random: &SecureRandom) -> Vec<Dice> {
    [
        vec![2, 2, 4, 4, 9, 9],
        vec![1, 1, 6, 6, 8, 8],
        vec![3, 3, 5, 5, 7, 7],
    ]
    .into_iter()
    .map(|faces| Dice::new(faces, random.clone()).unwrap())
    .collect()
}

fn assert_converges(trials: u32, tolerance: f64, seed: u8) {
    let random = SecureRandom::from_seed([seed; 32]);
    let dice = intransitive_set(&random);
    let table = ProbabilityEstimator::new(random).with_trials(trials).estimate_all(&dice);

    for i in 0..dice.len() {
        for j in 0..dice.len() {
            if i == j {
                assert!(table.probability(i, j).is_none());
                continue;
            }
            let estimate = table.probability(i, j).unwrap();
            let exact = analytic_win_probability(&dice[i], &dice[j]);
            assert!(
                (estimate - exact).abs() < tolerance,
                "dice {} vs {}: estimated {}, exact {}",
                i,
                j,
                estimate,
                exact
            );
        }
    }
}

#[test]
fn test_estimates_converge_at_20k_trials() {
    assert_converges(20_000, 0.03, 1);
}

#[test]
fn test_estimates_converge_at_100k_trials() {
    assert_converges(100_000, 0.01, 2);
}

#[test]
fn test_cycle_holds_simultaneously() {
    let random = SecureRandom::from_seed([3u8; 32]);
    let dice = intransitive_set(&random);
    let table = ProbabilityEstimator::new(random).with_trials(20_000).estimate_all(&dice);

    // A beats B, B beats C, C beats A
    assert!(table.probability(0, 1).unwrap() > 0.5);
    assert!(table.probability(1, 2).unwrap() > 0.5);
    assert!(table.probability(2, 0).unwrap() > 0.5);

    // and each loses the reverse matchup
    assert!(table.probability(1, 0).unwrap() < 0.5);
    assert!(table.probability(2, 1).unwrap() < 0.5);
    assert!(table.probability(0, 2).unwrap() < 0.5);
}

#[test]
fn test_default_trials_report_four_digits() {
    let random = SecureRandom::os();
    let dice = intransitive_set(&random);
    let table = ProbabilityEstimator::new(random).estimate_all(&dice);

    for entry in table.entries() {
        assert_eq!(entry.trials, 1000);
        let text = entry.formatted();
        assert_eq!(text.len(), 6, "{}", text);
        assert!(text.starts_with("0.") || text == "1.0000");
    }
    assert_eq!(table.formatted(1, 1), "-");
}
