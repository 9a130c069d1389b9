//! Lazy cartesian-product enumeration over per-component candidate lists.
//!
//! The enumeration is an explicit odometer over per-list indices: the last
//! list spins fastest, so combinations come out in lexicographic order with
//! the first list varying slowest. Only the index vector is held in memory;
//! the product itself is never materialized.

/// Streaming cartesian product of a set of candidate value slices.
///
/// The caller supplies the slices in component-identifier order; each yielded
/// combination pairs positionally with that order.
#[derive(Debug)]
pub struct Combinations<'a> {
    lists: Vec<&'a [f64]>,
    cursor: Vec<usize>,
    exhausted: bool,
}

impl<'a> Combinations<'a> {
    pub fn new(lists: Vec<&'a [f64]>) -> Self {
        let exhausted = lists.iter().any(|l| l.is_empty());
        Combinations {
            cursor: vec![0; lists.len()],
            lists,
            exhausted,
        }
    }

    /// Total number of combinations, computed from the list lengths alone.
    pub fn total(&self) -> u128 {
        self.lists.iter().map(|l| l.len() as u128).product()
    }

    /// Rewind to the first combination.
    pub fn reset(&mut self) {
        for c in self.cursor.iter_mut() {
            *c = 0;
        }
        self.exhausted = self.lists.iter().any(|l| l.is_empty());
    }

    fn advance(&mut self) {
        for i in (0..self.lists.len()).rev() {
            self.cursor[i] += 1;
            if self.cursor[i] < self.lists[i].len() {
                return;
            }
            self.cursor[i] = 0;
        }
        // Every position carried over, the odometer has wrapped.
        self.exhausted = true;
    }
}

impl<'a> Iterator for Combinations<'a> {
    type Item = Vec<f64>;

    fn next(&mut self) -> Option<Vec<f64>> {
        if self.exhausted {
            return None;
        }
        let item = self
            .cursor
            .iter()
            .zip(&self.lists)
            .map(|(&i, list)| list[i])
            .collect();
        self.advance();
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerates_in_lexicographic_order() {
        let a = [1.0, 2.0];
        let b = [10.0, 20.0, 30.0];
        let combos: Vec<Vec<f64>> = Combinations::new(vec![&a[..], &b[..]]).collect();
        assert_eq!(
            combos,
            vec![
                vec![1.0, 10.0],
                vec![1.0, 20.0],
                vec![1.0, 30.0],
                vec![2.0, 10.0],
                vec![2.0, 20.0],
                vec![2.0, 30.0],
            ]
        );
    }

    #[test]
    fn total_is_the_product_of_list_lengths() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [1.0, 2.0];
        let combos = Combinations::new(vec![&a[..], &b[..]]);
        assert_eq!(combos.total(), 8);
        assert_eq!(combos.count(), 8);
    }

    #[test]
    fn total_handles_large_products_without_enumeration() {
        let r = vec![0.0; 96];
        let c1 = [1e-6];
        let c2 = [1e-6, 10e-6];
        let l1 = [1e-3];
        let combos = Combinations::new(vec![&r[..], &r[..], &r[..], &c1[..], &c2[..], &l1[..]]);
        assert_eq!(combos.total(), 1_769_472);
    }

    #[test]
    fn reset_restarts_the_stream() {
        let a = [1.0, 2.0];
        let b = [5.0, 6.0];
        let mut combos = Combinations::new(vec![&a[..], &b[..]]);
        let head: Vec<Vec<f64>> = combos.by_ref().take(3).collect();
        combos.reset();
        let full: Vec<Vec<f64>> = combos.collect();
        assert_eq!(full.len(), 4);
        assert_eq!(&full[..3], &head[..]);
    }

    #[test]
    fn reset_after_exhaustion_restarts_too() {
        let a = [1.0, 2.0];
        let mut combos = Combinations::new(vec![&a[..]]);
        assert_eq!(combos.by_ref().count(), 2);
        combos.reset();
        assert_eq!(combos.count(), 2);
    }

    #[test]
    fn empty_list_yields_nothing() {
        let a = [1.0, 2.0];
        let empty: [f64; 0] = [];
        let combos = Combinations::new(vec![&a[..], &empty[..]]);
        assert_eq!(combos.total(), 0);
        assert_eq!(combos.count(), 0);
    }

    #[test]
    fn no_lists_yield_a_single_empty_combination() {
        let combos = Combinations::new(Vec::new());
        assert_eq!(combos.total(), 1);
        let all: Vec<Vec<f64>> = combos.collect();
        assert_eq!(all, vec![Vec::<f64>::new()]);
    }
}
