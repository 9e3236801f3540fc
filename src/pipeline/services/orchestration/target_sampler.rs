use crate::error::LabelError;
use crate::pipeline::types::{Label, LabelUniverse};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

/// Picks `rounds` distinct targets from the universe, in random order.
pub fn sample_targets<R: Rng + ?Sized>(
    universe: &LabelUniverse,
    rounds: usize,
    rng: &mut R,
) -> Result<Vec<Label>, LabelError> {
    universe.ensure_rounds(rounds)?;
    let labels: Vec<&Label> = universe.iter().collect();
    let mut targets: Vec<Label> = labels
        .choose_multiple(rng, rounds)
        .map(|label| (*label).clone())
        .collect();
    // choose_multiple does not promise a random order
    targets.shuffle(rng);
    Ok(targets)
}
