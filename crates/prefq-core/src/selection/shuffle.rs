use rand::Rng;

/// Source of uniformly distributed indices for Fisher–Yates shuffling.
///
/// Every [`Rng`] is a `ShuffleSource`. Tests can implement it directly to
/// script exact permutations.
pub trait ShuffleSource {
    /// Returns an index drawn uniformly from `0..=upper`.
    fn index_up_to(&mut self, upper: usize) -> usize;
}

impl<R> ShuffleSource for R
where
    R: Rng + ?Sized,
{
    fn index_up_to(&mut self, upper: usize) -> usize {
        self.random_range(0..=upper)
    }
}

/// Shuffles `items` in place with the Durstenfeld variant of Fisher–Yates.
///
/// Walks from the last position down to 1, swapping each element with one
/// drawn from `0..=i`. Given a uniform source every permutation is equally
/// likely. Slices shorter than two elements draw nothing.
pub fn fisher_yates<T, S>(items: &mut [T], source: &mut S)
where
    S: ShuffleSource + ?Sized,
{
    for i in (1..items.len()).rev() {
        let j = source.index_up_to(i);
        items.swap(i, j);
    }
}
