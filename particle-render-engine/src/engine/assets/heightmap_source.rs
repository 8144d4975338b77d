use bevy::asset::{AssetLoader, LoadContext, io::Reader};
use bevy::prelude::*;
use image::DynamicImage;

use crate::engine::error::ParticleError;

/// Decoded raster image used as a heightmap source.
#[derive(Asset, TypePath)]
pub struct HeightmapSource {
    pub image: DynamicImage,
}

#[derive(Default)]
pub struct HeightmapSourceLoader;

impl AssetLoader for HeightmapSourceLoader {
    type Asset = HeightmapSource;
    type Settings = ();
    type Error = ParticleError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &(),
        load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let path = load_context.path().display().to_string();

        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .await
            .map_err(|err| ParticleError::load(path.clone(), err))?;
        let image =
            image::load_from_memory(&bytes).map_err(|err| ParticleError::load(path.clone(), err))?;

        debug!("Decoded {} ({}x{})", path, image.width(), image.height());
        Ok(HeightmapSource { image })
    }

    fn extensions(&self) -> &[&str] {
        &["png", "jpg", "jpeg"]
    }
}
