//! The random number source used when the caller doesn't supply one.

#[cfg(not(feature = "fixed-rng"))]
pub(crate) fn with_rng<T>(f: impl FnOnce(&mut rand::rngs::ThreadRng) -> T) -> T {
    f(&mut rand::thread_rng())
}

#[cfg(feature = "fixed-rng")]
pub(crate) use self::fixed::with_rng;

#[cfg(feature = "fixed-rng")]
mod fixed {
    use std::env;
    use std::sync::{Mutex, PoisonError};

    use once_cell::sync::Lazy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tracing::{info, warn};

    const DEFAULT_SEED: u64 = u64::from_be_bytes([0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);

    static RNG: Lazy<Mutex<StdRng>> = Lazy::new(|| {
        let seed = parse_seed(env::var("FIXED_RNG_SEED").ok());
        info!(?seed, "Initializing network rng.");
        Mutex::new(StdRng::seed_from_u64(seed))
    });

    pub(crate) fn with_rng<T>(f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = RNG.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *rng)
    }

    fn parse_seed(seed: Option<String>) -> u64 {
        match seed {
            Some(seed) => seed.parse::<u64>().unwrap_or_else(|_| {
                warn!(?seed, "Could not parse FIXED_RNG_SEED, using the default seed.");
                DEFAULT_SEED
            }),
            None => DEFAULT_SEED,
        }
    }

    #[cfg(test)]
    pub(super) fn reseed(seed: u64) {
        with_rng(|rng| *rng = StdRng::seed_from_u64(seed));
    }

}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, PoisonError};

    use crate::network::Network;
    use crate::training::Sample;

    // Tests that draw from the shared crate rng take this lock first.
    static CRATE_RNG: Mutex<()> = Mutex::new(());

    fn xor_samples() -> Vec<Sample> {
        vec![
            Sample::new([0.0, 0.0], [0.0]),
            Sample::new([0.0, 1.0], [1.0]),
            Sample::new([1.0, 0.0], [1.0]),
            Sample::new([1.0, 1.0], [0.0]),
        ]
    }

    #[test]
    fn train_with_crate_rng() {
        let _guard = CRATE_RNG.lock().unwrap_or_else(PoisonError::into_inner);

        let mut network = Network::new(&[2, 3, 1], 0.5);
        assert_eq!(network.topology(), vec![2, 3, 1]);
        assert_eq!(network.learning_rate(), 0.5);

        let original = network.clone();
        network.train(&mut xor_samples(), 10, 2).unwrap();
        assert_ne!(network, original);

        let mut mismatched = vec![Sample::new([0.0, 0.0, 0.0], [0.0])];
        assert!(network.train(&mut mismatched, 1, 1).is_err());
    }

    #[cfg(feature = "fixed-rng")]
    #[test]
    fn fixed_seed_replays_training() {
        let _guard = CRATE_RNG.lock().unwrap_or_else(PoisonError::into_inner);

        let run = || {
            super::fixed::reseed(42);
            let mut network = Network::new(&[2, 3, 1], 0.5);
            network.train(&mut xor_samples(), 20, 2).unwrap();
            network
        };

        assert_eq!(run(), run());

        super::fixed::reseed(42);
        let a = Network::new(&[2, 3, 1], 0.5);
        super::fixed::reseed(43);
        let b = Network::new(&[2, 3, 1], 0.5);
        assert_ne!(a, b);
    }
}
