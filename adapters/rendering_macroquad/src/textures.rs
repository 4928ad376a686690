use std::{fs, path::Path};

use anyhow::{Context, Result};
use forest_protector_core::{EnemyKind, TowerKind};
use forest_protector_rendering::{AssetLoader, ImageHandle};
use macroquad::texture::Texture2D;

/// Names of every image the scene may ask for.
#[must_use]
pub fn sprite_names() -> Vec<&'static str> {
    let mut names = vec!["grass"];
    names.extend(TowerKind::ALL.iter().map(|kind| kind.name()));
    names.extend(EnemyKind::ALL.iter().map(|kind| kind.name()));
    names
}

/// Textures loaded from the asset directory, addressed by image name.
///
/// Images that fail to load are skipped so the scene falls back to primitive
/// shapes for them.
#[derive(Debug, Default)]
pub struct TextureCache {
    entries: Vec<(&'static str, Texture2D)>,
}

impl TextureCache {
    /// Loads `<name>.png` for every known sprite from `directory`.
    #[must_use]
    pub fn load(directory: &Path) -> Self {
        Self::from_loader(&sprite_names(), |name| {
            read_texture(&directory.join(format!("{name}.png")))
        })
    }

    /// Loads the provided names with `loader`, keeping those that succeed.
    pub fn from_loader<L>(names: &[&'static str], mut loader: L) -> Self
    where
        L: FnMut(&str) -> Result<Texture2D>,
    {
        let mut entries = Vec::with_capacity(names.len());
        for &name in names {
            if entries.iter().any(|(known, _)| *known == name) {
                continue;
            }
            match loader(name) {
                Ok(texture) => entries.push((name, texture)),
                Err(error) => {
                    let error = format!("{error:#}");
                    tracing::warn!(sprite = name, %error, "using fallback shape");
                }
            }
        }
        tracing::debug!(loaded = entries.len(), requested = names.len(), "textures ready");
        Self { entries }
    }

    /// Number of textures held by the cache.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no texture was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Texture referenced by a handle returned from [`AssetLoader::resolve`].
    #[must_use]
    pub fn texture(&self, image: ImageHandle) -> Option<Texture2D> {
        let index = usize::try_from(image.get()).ok()?;
        self.entries.get(index).map(|(_, texture)| *texture)
    }
}

impl AssetLoader for TextureCache {
    fn resolve(&self, name: &str) -> Option<ImageHandle> {
        let index = self.entries.iter().position(|(known, _)| *known == name)?;
        u32::try_from(index).ok().map(ImageHandle::new)
    }
}

fn read_texture(path: &Path) -> Result<Texture2D> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite asset at {}", path.display()))?;
    Ok(Texture2D::from_file_with_format(&bytes, None))
}
