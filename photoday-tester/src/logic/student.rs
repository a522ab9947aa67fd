//! Seeded random students that press buttons the way a class might.
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use super::harness::Action;

const SPEED_CHOICES: [f64; 4] = [0.25, 0.5, 1.0, 2.0];

/// A start followed by `length` weighted random actions.
pub fn random_script(rng: &mut ChaCha8Rng, length: usize) -> Vec<Action> {
    let mut script = Vec::with_capacity(length + 1);
    script.push(Action::Start);
    for _ in 0..length {
        let action = match rng.gen_range(0..100_u8) {
            0..=39 => Action::Wait(f64::from(rng.gen_range(1..=40_u32)) * 250.0),
            40..=54 => Action::Light(if rng.gen_bool(0.5) { 0 } else { 100 }),
            55..=62 => Action::Pause,
            63..=72 => Action::Resume,
            73..=80 => Action::FastForward,
            81..=87 => Action::Reset,
            88..=94 => Action::Start,
            _ => Action::Speed(SPEED_CHOICES.choose(rng).copied().unwrap_or(1.0)),
        };
        script.push(action);
    }
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn scripts_are_reproducible_per_seed() {
        let first = random_script(&mut ChaCha8Rng::seed_from_u64(7), 50);
        let second = random_script(&mut ChaCha8Rng::seed_from_u64(7), 50);
        assert_eq!(first, second);
        assert_eq!(first.len(), 51);
        assert_eq!(first[0], Action::Start);
    }
}
