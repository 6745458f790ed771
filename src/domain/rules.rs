/// Spawn placement and click classification, truth-table driven.
///
/// Pure functions, no side effects. These decide "what happened" without
/// touching score or board; `sim::game` applies the result.
///
/// ## Next Index
/// ┌──────────────────────────┬─────────────────────────────────────┐
/// │ Condition                 │ Result                              │
/// ├──────────────────────────┼─────────────────────────────────────┤
/// │ cell_count ≤ 1            │ 0                                   │
/// │ no previous index         │ ⌊r · n⌋                              │
/// │ otherwise                 │ (prev + ⌊r · (n-1)⌋ + 1) mod n       │
/// └──────────────────────────┴─────────────────────────────────────┘
///
/// The shifted form never repeats `prev` and is uniform over the
/// remaining `n - 1` cells.
///
/// ## Click
/// ┌──────────────────────────────────────┬──────────┐
/// │ Condition (priority order)            │ Kind     │
/// ├──────────────────────────────────────┼──────────┤
/// │ game over                             │ Ignored  │
/// │ click outside the grid                │ Ignored  │
/// │ target cell AND round active          │ Hit      │
/// │ otherwise                             │ Miss     │
/// └──────────────────────────────────────┴──────────┘

use super::board::ClickTarget;
use super::random::RandomSource;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClickKind {
    Ignored,
    Hit,
    Miss,
}

/// Choose the cell for the next spawn.
pub fn next_index(cell_count: usize, previous: Option<usize>, rng: &mut dyn RandomSource) -> usize {
    if cell_count <= 1 {
        return 0;
    }

    match previous {
        None => scale(rng.next_unit(), cell_count),
        Some(prev) => {
            let shift = scale(rng.next_unit(), cell_count - 1) + 1;
            (prev % cell_count + shift) % cell_count
        }
    }
}

/// `⌊r · n⌋`, clamped into `[0, n)`.
fn scale(r: f64, n: usize) -> usize {
    let idx = (r * n as f64).floor();
    if idx <= 0.0 {
        0
    } else {
        (idx as usize).min(n - 1)
    }
}

pub fn classify_click(is_over: bool, round_active: bool, target: ClickTarget) -> ClickKind {
    if is_over || target.cell.is_none() {
        ClickKind::Ignored
    } else if target.is_target_cell && round_active {
        ClickKind::Hit
    } else {
        ClickKind::Miss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::random::SeededRandom;

    struct Fixed(f64);

    impl RandomSource for Fixed {
        fn next_unit(&mut self) -> f64 {
            self.0
        }
    }

    #[test]
    fn single_cell_board_always_zero() {
        let mut rng = Fixed(0.9);
        assert_eq!(next_index(1, None, &mut rng), 0);
        assert_eq!(next_index(1, Some(0), &mut rng), 0);
    }

    #[test]
    fn first_spawn_scales_over_all_cells() {
        assert_eq!(next_index(16, None, &mut Fixed(0.0)), 0);
        assert_eq!(next_index(16, None, &mut Fixed(0.5)), 8);
        assert_eq!(next_index(16, None, &mut Fixed(0.999_999)), 15);
    }

    #[test]
    fn shift_wraps_around_the_grid() {
        // shift = floor(0.0 * 15) + 1 = 1
        assert_eq!(next_index(16, Some(15), &mut Fixed(0.0)), 0);
        // shift = floor(0.999 * 15) + 1 = 15
        assert_eq!(next_index(16, Some(3), &mut Fixed(0.999)), 2);
    }

    #[test]
    fn out_of_contract_sample_is_clamped() {
        assert_eq!(next_index(4, None, &mut Fixed(1.0)), 3);
        assert_eq!(next_index(4, None, &mut Fixed(-0.5)), 0);
    }

    #[test]
    fn never_repeats_previous_index() {
        let mut rng = SeededRandom::from_seed(1234);
        for n in 2..=20 {
            let mut prev = next_index(n, None, &mut rng);
            for _ in 0..500 {
                let next = next_index(n, Some(prev), &mut rng);
                assert_ne!(next, prev, "repeat on a {n}-cell board");
                assert!(next < n);
                prev = next;
            }
        }
    }

    #[test]
    fn uniform_over_the_other_cells() {
        const N: usize = 8;
        const DRAWS: usize = 70_000;
        let prev = 3;
        let mut rng = SeededRandom::from_seed(42);
        let mut counts = [0usize; N];
        for _ in 0..DRAWS {
            counts[next_index(N, Some(prev), &mut rng)] += 1;
        }

        assert_eq!(counts[prev], 0);
        let expected = DRAWS as f64 / (N - 1) as f64;
        for (i, &c) in counts.iter().enumerate() {
            if i == prev {
                continue;
            }
            let deviation = (c as f64 - expected).abs() / expected;
            assert!(deviation < 0.05, "cell {i}: {c} draws, expected ~{expected:.0}");
        }
    }

    #[test]
    fn click_truth_table() {
        let on_target = ClickTarget::cell(2, true);
        let on_empty = ClickTarget::cell(5, false);
        let outside = ClickTarget::outside();

        assert_eq!(classify_click(false, true, on_target), ClickKind::Hit);
        assert_eq!(classify_click(false, false, on_target), ClickKind::Miss);
        assert_eq!(classify_click(false, true, on_empty), ClickKind::Miss);
        assert_eq!(classify_click(false, true, outside), ClickKind::Ignored);
        assert_eq!(classify_click(true, true, on_target), ClickKind::Ignored);
        assert_eq!(classify_click(true, false, on_empty), ClickKind::Ignored);
    }
}
