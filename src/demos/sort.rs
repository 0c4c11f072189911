//! Sorting race: merge sort against heap sort, with quicksort and insertion
//! sort widening the field.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::race::error::{RaceError, Result};
use crate::race::{CancellationToken, Strategy, StrategyOutcome};

/// Upper bound on the key count.
const MAX_KEYS: usize = 1 << 26;

/// Recursions on ranges larger than this probe for cancellation.
const PROBE_CUTOFF: usize = 1024;

/// Iteration batch between probes for the loop-shaped sorts.
const PROBE_BATCH: u64 = 1024;

/// Generate `n` seeded random keys.
pub fn random_keys(n: usize, seed: u64) -> Result<Vec<i64>> {
    if n > MAX_KEYS {
        return Err(RaceError::ProblemTooLarge { requested: n });
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Ok((0..n).map(|_| rng.random_range(0..1_000_000_000i64)).collect())
}

/// The full pool; the leading pair mirrors the classic merge-vs-heap race.
pub fn strategies() -> Vec<Box<dyn Strategy<Vec<i64>, Vec<i64>>>> {
    vec![
        Box::new(MergeSort),
        Box::new(HeapSort),
        Box::new(QuickSort),
        Box::new(InsertionSort),
    ]
}

/// Top-down merge sort, probing at every recursion entry above the cutoff.
pub struct MergeSort;

impl Strategy<Vec<i64>, Vec<i64>> for MergeSort {
    fn name(&self) -> &str {
        "merge-sort"
    }

    fn solve(&self, keys: &Vec<i64>, cancel: &CancellationToken) -> StrategyOutcome<Vec<i64>> {
        let mut keys = keys.clone();
        if merge_sort(&mut keys, cancel) {
            StrategyOutcome::Solved(keys)
        } else {
            StrategyOutcome::Cancelled
        }
    }
}

fn merge_sort(a: &mut [i64], cancel: &CancellationToken) -> bool {
    if a.len() <= 1 {
        return true;
    }
    if a.len() > PROBE_CUTOFF && cancel.should_cancel() {
        return false;
    }
    let mid = a.len() / 2;
    let (left, right) = a.split_at_mut(mid);
    if !merge_sort(left, cancel) || !merge_sort(right, cancel) {
        return false;
    }
    merge(a, mid);
    true
}

fn merge(a: &mut [i64], mid: usize) {
    let left = a[..mid].to_vec();
    let right = a[mid..].to_vec();
    let (mut i, mut j) = (0, 0);
    for slot in a.iter_mut() {
        if i < left.len() && (j >= right.len() || left[i] <= right[j]) {
            *slot = left[i];
            i += 1;
        } else {
            *slot = right[j];
            j += 1;
        }
    }
}

/// Bottom-up heapify then pop, probing every `PROBE_BATCH` sift-downs.
pub struct HeapSort;

impl Strategy<Vec<i64>, Vec<i64>> for HeapSort {
    fn name(&self) -> &str {
        "heap-sort"
    }

    fn solve(&self, keys: &Vec<i64>, cancel: &CancellationToken) -> StrategyOutcome<Vec<i64>> {
        let mut a = keys.clone();
        let n = a.len();
        let mut since_probe: u64 = 0;

        for root in (0..n / 2).rev() {
            sift_down(&mut a, root);
            since_probe += 1;
            if since_probe >= PROBE_BATCH {
                since_probe = 0;
                if cancel.should_cancel() {
                    return StrategyOutcome::Cancelled;
                }
            }
        }
        for end in (1..n).rev() {
            a.swap(0, end);
            sift_down(&mut a[..end], 0);
            since_probe += 1;
            if since_probe >= PROBE_BATCH {
                since_probe = 0;
                if cancel.should_cancel() {
                    return StrategyOutcome::Cancelled;
                }
            }
        }
        StrategyOutcome::Solved(a)
    }
}

fn sift_down(a: &mut [i64], mut root: usize) {
    loop {
        let left = 2 * root + 1;
        let right = left + 1;
        let mut largest = root;
        if left < a.len() && a[left] > a[largest] {
            largest = left;
        }
        if right < a.len() && a[right] > a[largest] {
            largest = right;
        }
        if largest == root {
            return;
        }
        a.swap(root, largest);
        root = largest;
    }
}

/// Median-of-three quicksort, probing at every recursion entry above the
/// cutoff; small ranges finish with insertion sort.
pub struct QuickSort;

impl Strategy<Vec<i64>, Vec<i64>> for QuickSort {
    fn name(&self) -> &str {
        "quick-sort"
    }

    fn solve(&self, keys: &Vec<i64>, cancel: &CancellationToken) -> StrategyOutcome<Vec<i64>> {
        let mut keys = keys.clone();
        if quick_sort(&mut keys, cancel) {
            StrategyOutcome::Solved(keys)
        } else {
            StrategyOutcome::Cancelled
        }
    }
}

fn quick_sort(a: &mut [i64], cancel: &CancellationToken) -> bool {
    if a.len() <= 16 {
        insertion_pass(a);
        return true;
    }
    if a.len() > PROBE_CUTOFF && cancel.should_cancel() {
        return false;
    }
    let pivot = partition(a);
    let (left, right) = a.split_at_mut(pivot);
    quick_sort(left, cancel) && quick_sort(&mut right[1..], cancel)
}

/// Lomuto partition around the median of first, middle and last.
fn partition(a: &mut [i64]) -> usize {
    let n = a.len();
    let mid = n / 2;
    if a[0] > a[mid] {
        a.swap(0, mid);
    }
    if a[0] > a[n - 1] {
        a.swap(0, n - 1);
    }
    if a[mid] > a[n - 1] {
        a.swap(mid, n - 1);
    }
    a.swap(mid, n - 1);

    let pivot = a[n - 1];
    let mut store = 0;
    for i in 0..n - 1 {
        if a[i] < pivot {
            a.swap(i, store);
            store += 1;
        }
    }
    a.swap(store, n - 1);
    store
}

/// Straight insertion sort, probing every `PROBE_BATCH` insertions. The
/// slowest of the pool; it exists to lose races and demonstrate
/// cancellation.
pub struct InsertionSort;

impl Strategy<Vec<i64>, Vec<i64>> for InsertionSort {
    fn name(&self) -> &str {
        "insertion-sort"
    }

    fn solve(&self, keys: &Vec<i64>, cancel: &CancellationToken) -> StrategyOutcome<Vec<i64>> {
        let mut a = keys.clone();
        for i in 1..a.len() {
            let key = a[i];
            let mut j = i;
            while j > 0 && a[j - 1] > key {
                a[j] = a[j - 1];
                j -= 1;
            }
            a[j] = key;
            if i as u64 % PROBE_BATCH == 0 && cancel.should_cancel() {
                return StrategyOutcome::Cancelled;
            }
        }
        StrategyOutcome::Solved(a)
    }
}

fn insertion_pass(a: &mut [i64]) {
    for i in 1..a.len() {
        let key = a[i];
        let mut j = i;
        while j > 0 && a[j - 1] > key {
            a[j] = a[j - 1];
            j -= 1;
        }
        a[j] = key;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race::channel::CoordinatorMessage;
    use crossbeam_channel::{bounded, Sender};

    fn idle_token() -> (Sender<CoordinatorMessage>, CancellationToken) {
        let (tx, rx) = bounded(1);
        (tx, CancellationToken::new(rx))
    }

    fn sorted(keys: &[i64]) -> Vec<i64> {
        let mut keys = keys.to_vec();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn test_every_strategy_sorts() {
        let keys = random_keys(500, 3).unwrap();
        let expected = sorted(&keys);

        for strategy in strategies() {
            let (_tx, token) = idle_token();
            match strategy.solve(&keys, &token) {
                StrategyOutcome::Solved(result) => {
                    assert_eq!(result, expected, "{} mis-sorted", strategy.name());
                }
                other => panic!("{} did not finish: {:?}", strategy.name(), other),
            }
        }
    }

    #[test]
    fn test_duplicate_keys() {
        let keys = vec![5, 1, 5, 3, 3, 3, 0, 5];
        let expected = sorted(&keys);
        let (_tx, token) = idle_token();

        for strategy in strategies() {
            match strategy.solve(&keys, &token) {
                StrategyOutcome::Solved(result) => assert_eq!(result, expected),
                other => panic!("{} did not finish: {:?}", strategy.name(), other),
            }
        }
    }

    #[test]
    fn test_empty_and_single() {
        let (_tx, token) = idle_token();
        for keys in [Vec::new(), vec![9]] {
            for strategy in strategies() {
                match strategy.solve(&keys, &token) {
                    StrategyOutcome::Solved(result) => assert_eq!(result, keys),
                    other => panic!("{} did not finish: {:?}", strategy.name(), other),
                }
            }
        }
    }

    #[test]
    fn test_pending_cancel_aborts_large_sorts() {
        let keys = random_keys(50_000, 8).unwrap();

        for strategy in strategies() {
            let (tx, token) = idle_token();
            tx.send(CoordinatorMessage::Cancel).unwrap();
            assert!(
                matches!(strategy.solve(&keys, &token), StrategyOutcome::Cancelled),
                "{} ignored a pending cancel",
                strategy.name()
            );
        }
    }

    #[test]
    fn test_oversized_input_is_rejected() {
        assert!(matches!(
            random_keys(MAX_KEYS + 1, 0),
            Err(RaceError::ProblemTooLarge { .. })
        ));
    }
}
