use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// A permutation of option indices computed once and then only read.
///
/// Position `p` on screen shows original option `order[p]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionOrder {
    order: Vec<usize>,
}

impl OptionOrder {
    pub fn identity(len: usize) -> Self {
        Self {
            order: (0..len).collect(),
        }
    }

    pub fn shuffled(len: usize, seed: u64) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);
        Self { order }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    pub fn original_index(&self, position: usize) -> Option<usize> {
        self.order.get(position).copied()
    }

    pub fn arrange<'a, T>(&self, options: &'a [T]) -> Vec<&'a T> {
        self.order
            .iter()
            .filter_map(|index| options.get(*index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_is_a_stable_permutation() {
        let first = OptionOrder::shuffled(6, 42);
        let again = OptionOrder::shuffled(6, 42);
        assert_eq!(first, again);

        let mut sorted = first.as_slice().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn original_index_inverts_arrangement() {
        let options = ["a", "b", "c", "d"];
        let order = OptionOrder::shuffled(options.len(), 7);
        let arranged = order.arrange(&options);

        for (position, shown) in arranged.iter().enumerate() {
            let original = order.original_index(position).expect("in range");
            assert_eq!(options[original], **shown);
        }
        assert_eq!(order.original_index(options.len()), None);
    }
}
