use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::RgbImage;
use log::{debug, info};
use pz_core::PuzzleError;

/// Samples the color of one pixel of an image asset as `#rrggbb`.
#[async_trait]
pub trait PixelSource: Send + Sync {
    async fn pixel_color(&self, asset_key: &str, x: i64, y: i64) -> Result<String, PuzzleError>;
}

/// Maps a logical asset key to a loadable file.
pub trait AssetResolver: Send + Sync {
    fn resolve_asset(&self, key: &str) -> Result<PathBuf, PuzzleError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoPixelSource;

#[async_trait]
impl PixelSource for NoPixelSource {
    async fn pixel_color(&self, asset_key: &str, _x: i64, _y: i64) -> Result<String, PuzzleError> {
        Err(PuzzleError::new(
            "ENGINE_PIXEL_SOURCE_MISSING",
            format!(
                "No pixel source is configured to read click map \"{}\".",
                asset_key
            ),
        ))
    }
}

/// Click maps decoded once per asset key and shared by every session that
/// holds this value.
pub struct ImageClickMaps {
    assets: Arc<dyn AssetResolver>,
    decoded: Mutex<HashMap<String, Arc<RgbImage>>>,
}

impl ImageClickMaps {
    pub fn new(assets: Arc<dyn AssetResolver>) -> Self {
        Self {
            assets,
            decoded: Mutex::new(HashMap::new()),
        }
    }

    fn cached(&self, asset_key: &str) -> Result<Option<Arc<RgbImage>>, PuzzleError> {
        let decoded = self.decoded.lock().map_err(|_| lock_poisoned())?;
        Ok(decoded.get(asset_key).cloned())
    }

    async fn decode(&self, asset_key: &str) -> Result<Arc<RgbImage>, PuzzleError> {
        if let Some(image) = self.cached(asset_key)? {
            return Ok(image);
        }

        let path = self.assets.resolve_asset(asset_key)?;
        info!("decoding click map \"{}\" from {}", asset_key, path.display());
        let decoded = tokio::task::spawn_blocking(move || {
            image::open(&path).map(|image| image.to_rgb8())
        })
        .await
        .map_err(|error| {
            PuzzleError::new(
                "ENGINE_CLICK_MAP_DECODE",
                format!("Click map decode task failed: {}", error),
            )
        })?
        .map_err(|error| {
            PuzzleError::new(
                "ENGINE_CLICK_MAP_DECODE",
                format!("Click map \"{}\" could not be decoded: {}", asset_key, error),
            )
        })?;

        let mut cache = self.decoded.lock().map_err(|_| lock_poisoned())?;
        let image = cache
            .entry(asset_key.to_string())
            .or_insert_with(|| Arc::new(decoded))
            .clone();
        Ok(image)
    }
}

#[async_trait]
impl PixelSource for ImageClickMaps {
    async fn pixel_color(&self, asset_key: &str, x: i64, y: i64) -> Result<String, PuzzleError> {
        let image = self.decode(asset_key).await?;
        let pixel = u32::try_from(x)
            .ok()
            .zip(u32::try_from(y).ok())
            .and_then(|(x, y)| image.get_pixel_checked(x, y))
            .ok_or_else(|| {
                PuzzleError::new(
                    "ENGINE_CLICK_OUT_OF_BOUNDS",
                    format!(
                        "Click ({}, {}) is outside click map \"{}\" ({}x{}).",
                        x,
                        y,
                        asset_key,
                        image.width(),
                        image.height()
                    ),
                )
            })?;
        let color = format_color(pixel.0);
        debug!("click ({}, {}) on \"{}\" -> {}", x, y, asset_key, color);
        Ok(color)
    }
}

pub fn format_color([r, g, b]: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

fn lock_poisoned() -> PuzzleError {
    PuzzleError::new("ENGINE_CLICK_MAP_LOCK", "Click map cache lock is poisoned.")
}

#[cfg(test)]
mod click_map_tests {
    use super::*;
    use image::Rgb;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    struct CountingAssets {
        path: PathBuf,
        lookups: AtomicUsize,
    }

    impl AssetResolver for CountingAssets {
        fn resolve_asset(&self, key: &str) -> Result<PathBuf, PuzzleError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if key == "map.png" {
                Ok(self.path.clone())
            } else {
                Err(PuzzleError::new("ASSET_NOT_FOUND", key.to_string()))
            }
        }
    }

    fn write_click_map(dir: &Path) -> PathBuf {
        std::fs::create_dir_all(dir).expect("temp dir");
        let mut image = RgbImage::from_pixel(4, 2, Rgb([0, 0, 0]));
        image.put_pixel(3, 1, Rgb([255, 8, 170]));
        let path = dir.join("map.png");
        image.save(&path).expect("png should be written");
        path
    }

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!("pz-runtime-{}-{}", name, nanos))
    }

    #[test]
    fn format_color_pads_hex_digits() {
        assert_eq!(format_color([0, 15, 255]), "#000fff");
    }

    #[tokio::test]
    async fn pixels_are_sampled_from_a_single_decode() {
        let path = write_click_map(&temp_dir("click-map"));
        let assets = Arc::new(CountingAssets {
            path,
            lookups: AtomicUsize::new(0),
        });
        let maps = ImageClickMaps::new(assets.clone());

        assert_eq!(
            maps.pixel_color("map.png", 3, 1).await.expect("pixel"),
            "#ff08aa"
        );
        assert_eq!(
            maps.pixel_color("map.png", 0, 0).await.expect("pixel"),
            "#000000"
        );
        assert_eq!(assets.lookups.load(Ordering::SeqCst), 1);

        let error = maps
            .pixel_color("map.png", 4, 0)
            .await
            .expect_err("out of bounds");
        assert_eq!(error.code, "ENGINE_CLICK_OUT_OF_BOUNDS");
        let error = maps
            .pixel_color("map.png", -1, 0)
            .await
            .expect_err("negative");
        assert_eq!(error.code, "ENGINE_CLICK_OUT_OF_BOUNDS");
    }

    #[tokio::test]
    async fn missing_pixel_source_is_reported() {
        let error = NoPixelSource
            .pixel_color("map.png", 0, 0)
            .await
            .expect_err("no source");
        assert_eq!(error.code, "ENGINE_PIXEL_SOURCE_MISSING");
    }
}
