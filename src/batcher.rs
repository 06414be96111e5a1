use std::iter::{Skip, StepBy};

/// Deals the items of an iterator out round-robin into `n_batches` lazy
/// iterators, one per worker. The input may be unbounded.
///
/// Nothing is collected: with a request count of 0 the slots are
/// `repeat(()).take(usize::MAX)` and only the time limit ends the run.
///
/// Example : input of 5 request slots split over 3 workers
///
/// ---------------------
/// | 1 | 2 | 3 | 4 | 5 |
/// ---------------------
///        |
///        |
///        V
/// -------------
/// | 1 | 2 | 3 |         worker 0:   1,4
/// -------------     ->  worker 1:   2,5
/// | 4 | 5 |             worker 2:   3
///
pub(crate) fn split<I>(iter: &I, n_batches: usize) -> Vec<StepBy<Skip<I>>>
where
    I: Iterator + Clone,
{
    let n_batches = n_batches.max(1);
    (0..n_batches)
        .map(|i| iter.clone().skip(i).step_by(n_batches))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::batcher::split;

    #[test]
    fn deals_uneven_input_round_robin() {
        let input = vec![1, 2, 3, 4, 5];
        let mut splits = split(&input.into_iter(), 3);

        let batch2: Vec<i32> = splits.pop().unwrap().collect();
        let batch1: Vec<i32> = splits.pop().unwrap().collect();
        let batch0: Vec<i32> = splits.pop().unwrap().collect();

        assert_eq!(vec![1, 4], batch0);
        assert_eq!(vec![2, 5], batch1);
        assert_eq!(vec![3], batch2);
    }

    #[test]
    fn more_workers_than_items_leaves_some_idle() {
        let splits = split(&vec![1, 2].into_iter(), 4);
        let sizes: Vec<usize> = splits.into_iter().map(Iterator::count).collect();
        assert_eq!(vec![1, 1, 0, 0], sizes);
    }

    #[test]
    fn zero_workers_is_treated_as_one() {
        let splits = split(&(0..3), 0);
        assert_eq!(1, splits.len());
    }

    #[test]
    fn unbounded_input_stays_lazy() {
        let slots = std::iter::repeat(()).take(usize::MAX);
        let mut splits = split(&slots, 2);
        assert_eq!(3, splits.remove(1).take(3).count());
    }
}
