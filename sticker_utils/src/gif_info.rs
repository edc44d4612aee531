//! GIF metadata
//!
//! Frame count, frame delay and canvas size of an animated GIF, read with
//! the `image` crate. Pixel data is decoded frame by frame and dropped
//! immediately; only the metadata survives.

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageDecoder};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::errors::{Result, StickerError};

/// Canvas size at which a GIF is refused as a decompression bomb.
pub const DEFAULT_MAX_PIXELS: u64 = 178_956_970;

/// Read-only description of an input animation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceAsset {
    pub path: PathBuf,
    pub frame_count: u32,
    /// Delay of the first frame; `None` when the file carries no usable delay.
    pub frame_delay_ms: Option<u32>,
    pub width: u32,
    pub height: u32,
}

impl SourceAsset {
    pub fn delay_or(&self, default_ms: u32) -> u32 {
        self.frame_delay_ms.unwrap_or(default_ms)
    }
}

/// Decode/metadata capability.
pub trait Decoder {
    fn read_info(&self, path: &Path) -> Result<SourceAsset>;
}

#[derive(Debug, Clone)]
pub struct ImageGifDecoder {
    max_pixels: u64,
}

impl Default for ImageGifDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PIXELS)
    }
}

impl ImageGifDecoder {
    pub fn new(max_pixels: u64) -> Self {
        Self { max_pixels }
    }
}

impl Decoder for ImageGifDecoder {
    fn read_info(&self, path: &Path) -> Result<SourceAsset> {
        let file = File::open(path)?;
        let decoder = GifDecoder::new(BufReader::new(file)).map_err(|e| StickerError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let (width, height) = decoder.dimensions();
        let pixels = width as u64 * height as u64;
        if pixels > self.max_pixels {
            return Err(StickerError::ImageTooLarge {
                path: path.to_path_buf(),
                pixels,
                limit: self.max_pixels,
            });
        }

        let mut frame_count: u32 = 0;
        let mut first_delay_ms: Option<u32> = None;
        for frame in decoder.into_frames() {
            let frame = frame.map_err(|e| StickerError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            if first_delay_ms.is_none() {
                let (numer, denom) = frame.delay().numer_denom_ms();
                first_delay_ms = Some(if denom == 0 { 0 } else { numer / denom });
            }
            frame_count += 1;
        }

        if frame_count == 0 {
            return Err(StickerError::NoFrames(path.to_path_buf()));
        }

        Ok(SourceAsset {
            path: path.to_path_buf(),
            frame_count,
            // a zero delay means "unspecified" to every GIF player
            frame_delay_ms: first_delay_ms.filter(|&d| d > 0),
            width,
            height,
        })
    }
}
