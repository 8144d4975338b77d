use constants::texture::POSITION_COMPONENTS;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::PositionBuffer;
use crate::engine::config::SourceKind;
use crate::engine::error::ParticleError;

/// Reproducible generator when a seed is given, entropy-seeded otherwise.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Fill every channel of a `width × height` grid with `(u * 2 - 1) * scale`, `u ∈ [0, 1)`.
pub fn random_positions<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    scale: f32,
    rng: &mut R,
) -> Result<PositionBuffer, ParticleError> {
    let len = width as usize * height as usize * POSITION_COMPONENTS;
    let data = (0..len)
        .map(|_| (rng.r#gen::<f32>() * 2.0 - 1.0) * scale)
        .collect();

    PositionBuffer::new(width, height, data, SourceKind::Random)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn four_by_four_cloud_has_48_values_within_scale() {
        let mut rng = seeded_rng(Some(7));
        let buffer = random_positions(4, 4, 10.0, &mut rng).unwrap();

        assert_eq!(buffer.len(), 48);
        assert_eq!(buffer.active_count(), 16);
        assert!(buffer.as_slice().iter().all(|v| (-10.0..=10.0).contains(v)));
    }

    #[test]
    fn same_seed_same_cloud() {
        let a = random_positions(8, 8, 1.0, &mut seeded_rng(Some(42))).unwrap();
        let b = random_positions(8, 8, 1.0, &mut seeded_rng(Some(42))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_grid_is_rejected() {
        let err = random_positions(0, 4, 1.0, &mut seeded_rng(Some(1))).unwrap_err();
        assert!(matches!(err, ParticleError::MalformedAsset { .. }));
    }

    proptest! {
        #[test]
        fn values_stay_within_scale(
            width in 1u32..24,
            height in 1u32..24,
            scale in 0.01f32..1000.0,
            seed in any::<u64>(),
        ) {
            let buffer = random_positions(width, height, scale, &mut seeded_rng(Some(seed))).unwrap();
            prop_assert_eq!(buffer.len(), (width * height * 3) as usize);
            prop_assert!(buffer.as_slice().iter().all(|v| v.abs() <= scale));
        }
    }
}
