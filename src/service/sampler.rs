use rand::{Rng, seq::SliceRandom};

use crate::models::question::Question;

/// Picks `min(pool.len(), round_size)` distinct questions in random order and
/// shuffles the options of each picked question on its own.
pub fn sample_round<R>(pool: &[Question], round_size: usize, rng: &mut R) -> Vec<Question>
where
    R: Rng + ?Sized,
{
    let mut picked = pool.to_vec();
    picked.shuffle(rng);
    picked.truncate(round_size.min(pool.len()));

    for question in picked.iter_mut() {
        question.options_mut().shuffle(rng);
    }

    picked
}
