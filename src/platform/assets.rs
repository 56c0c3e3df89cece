//! Sprite loading
//!
//! Images are fetched through `HtmlImageElement` and read back as RGBA pixels via
//! an offscreen 2D canvas. A sprite that fails to load is logged and left empty;
//! drawing falls back to procedural shapes.

use crate::renderer::SpriteImage;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AssetError {
    #[error("no browser window or document")]
    NoWindow,
    #[error("failed to load {url}")]
    Load { url: String },
    #[error("failed to decode {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Wrap raw RGBA8 pixels, checking the buffer matches the dimensions
pub fn decode_rgba(
    url: &str,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
) -> Result<SpriteImage, AssetError> {
    let decode_err = |reason: String| AssetError::Decode {
        url: url.to_string(),
        reason,
    };
    if width == 0 || height == 0 {
        return Err(decode_err(format!("empty image {width}x{height}")));
    }
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(decode_err(format!(
            "expected {expected} bytes for {width}x{height}, got {}",
            rgba.len()
        )));
    }
    Ok(SpriteImage {
        width,
        height,
        rgba,
    })
}

#[cfg(target_arch = "wasm32")]
pub use web::load_all;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

    use super::{AssetError, decode_rgba};
    use crate::renderer::{AssetTable, SpriteId, SpriteImage};

    /// Fetch and decode every sprite; failures are logged and skipped.
    ///
    /// All requests are issued up front so the browser downloads them in
    /// parallel; decoding then happens in table order.
    pub async fn load_all() -> AssetTable {
        let pending: Vec<_> = SpriteId::ALL
            .into_iter()
            .map(|id| (id, PendingImage::start(id.url())))
            .collect();

        let mut table = AssetTable::new();
        for (id, pending) in pending {
            match pending {
                Ok(pending) => match pending.finish().await {
                    Ok(image) => table.insert(id, image),
                    Err(e) => log::warn!("Sprite {:?} unavailable: {e}", id),
                },
                Err(e) => log::warn!("Sprite {:?} unavailable: {e}", id),
            }
        }
        log::info!(
            "Loaded {}/{} sprites",
            table.loaded_count(),
            SpriteId::COUNT
        );
        table
    }

    /// An image whose download has been started
    struct PendingImage {
        url: &'static str,
        img: HtmlImageElement,
        loaded: js_sys::Promise,
    }

    impl PendingImage {
        fn start(url: &'static str) -> Result<Self, AssetError> {
            let img = HtmlImageElement::new().map_err(|_| AssetError::Load {
                url: url.to_string(),
            })?;
            let loaded = js_sys::Promise::new(&mut |resolve, reject| {
                img.set_onload(Some(&resolve));
                img.set_onerror(Some(&reject));
            });
            img.set_src(url);
            Ok(Self { url, img, loaded })
        }

        async fn finish(self) -> Result<SpriteImage, AssetError> {
            let Self { url, img, loaded } = self;
            let decode_err = |reason: &str| AssetError::Decode {
                url: url.to_string(),
                reason: reason.to_string(),
            };

            JsFuture::from(loaded).await.map_err(|_| AssetError::Load {
                url: url.to_string(),
            })?;
            img.set_onload(None);
            img.set_onerror(None);

            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or(AssetError::NoWindow)?;
            let (width, height) = (img.natural_width(), img.natural_height());
            let canvas: HtmlCanvasElement = document
                .create_element("canvas")
                .ok()
                .and_then(|el| el.dyn_into().ok())
                .ok_or_else(|| decode_err("cannot create canvas"))?;
            canvas.set_width(width);
            canvas.set_height(height);

            let ctx: CanvasRenderingContext2d = canvas
                .get_context("2d")
                .ok()
                .flatten()
                .and_then(|c| c.dyn_into().ok())
                .ok_or_else(|| decode_err("no 2d context"))?;
            ctx.draw_image_with_html_image_element(&img, 0.0, 0.0)
                .map_err(|_| decode_err("draw failed"))?;
            let pixels = ctx
                .get_image_data(0.0, 0.0, width as f64, height as f64)
                .map_err(|_| decode_err("pixel readback failed"))?;

            decode_rgba(url, width, height, pixels.data().0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_accepts_matching_buffer() {
        let img = decode_rgba("/assets/x.png", 2, 3, vec![0; 24]).unwrap();
        assert_eq!((img.width, img.height), (2, 3));
    }

    #[test]
    fn test_decode_rejects_short_buffer() {
        let err = decode_rgba("/assets/x.png", 2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, AssetError::Decode { ref url, .. } if url == "/assets/x.png"));
        assert!(err.to_string().contains("expected 16 bytes"));
    }

    #[test]
    fn test_decode_rejects_empty_image() {
        assert!(decode_rgba("/assets/x.png", 0, 4, Vec::new()).is_err());
    }
}
