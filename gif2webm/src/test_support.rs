//! Deterministic collaborators for tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use image::codecs::gif::GifEncoder;
use image::{Delay, Frame, Rgba, RgbaImage};
use sticker_utils::{EncodeRequest, Encoder, Prober, StickerError};

type SizeFn = Box<dyn Fn(&EncodeRequest) -> Option<u64>>;

/// Records every request and writes an output file whose size is chosen by
/// `size_of`; `None` simulates a non-zero encoder exit.
pub struct FakeEncoder {
    size_of: SizeFn,
    calls: RefCell<Vec<EncodeRequest>>,
}

impl FakeEncoder {
    pub fn from_fn(size_of: impl Fn(&EncodeRequest) -> Option<u64> + 'static) -> Self {
        Self {
            size_of: Box::new(size_of),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn constant(bytes: u64) -> Self {
        Self::from_fn(move |_| Some(bytes))
    }

    pub fn failing() -> Self {
        Self::from_fn(|_| None)
    }

    pub fn calls(&self) -> Vec<EncodeRequest> {
        self.calls.borrow().clone()
    }

    pub fn crfs(&self) -> Vec<u8> {
        self.calls.borrow().iter().map(|r| r.crf.value()).collect()
    }
}

impl Encoder for FakeEncoder {
    fn encode(&self, request: &EncodeRequest) -> sticker_utils::Result<()> {
        self.calls.borrow_mut().push(request.clone());
        match (self.size_of)(request) {
            Some(bytes) => {
                std::fs::write(&request.output, vec![0u8; bytes as usize])?;
                Ok(())
            }
            None => {
                // ffmpeg leaves a truncated file behind when it dies mid-write
                std::fs::write(&request.output, b"partial")?;
                Err(StickerError::Encode {
                    path: request.input.clone(),
                    exit_code: Some(1),
                    stderr: "Conversion failed!".to_string(),
                })
            }
        }
    }
}

/// Durations keyed by file name; dimensions shared by every clip.
#[derive(Default)]
pub struct FakeProber {
    durations: HashMap<String, f64>,
    dimensions: Option<(u32, u32)>,
    dimension_probes: RefCell<u32>,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, file_name: &str, seconds: f64) -> Self {
        self.durations.insert(file_name.to_string(), seconds);
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some((width, height));
        self
    }

    pub fn dimension_probes(&self) -> u32 {
        *self.dimension_probes.borrow()
    }
}

impl Prober for FakeProber {
    fn probe_duration(&self, path: &Path) -> Option<f64> {
        let name = path.file_name()?.to_string_lossy();
        self.durations.get(name.as_ref()).copied()
    }

    fn probe_dimensions(&self, _path: &Path) -> Option<(u32, u32)> {
        *self.dimension_probes.borrow_mut() += 1;
        self.dimensions
    }
}

/// Writes a real animated GIF with `frames` frames of `delay_ms` each.
pub fn write_gif(path: &Path, width: u32, height: u32, frames: u32, delay_ms: u32) {
    let file = File::create(path).unwrap();
    let mut encoder = GifEncoder::new(file);
    let frames = (0..frames).map(|i| {
        let shade = (i * 25 % 255) as u8;
        let buffer = RgbaImage::from_pixel(width, height, Rgba([shade, 128, 255 - shade, 255]));
        Frame::from_parts(buffer, 0, 0, Delay::from_numer_denom_ms(delay_ms, 1))
    });
    encoder.encode_frames(frames).unwrap();
}

/// Collects formatted log lines so tests can assert on emitted events.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Runs `f` with this capture installed as the thread's subscriber.
    pub fn during<T>(&self, f: impl FnOnce() -> T) -> T {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Lines logged at WARN level.
    pub fn warnings(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|l| l.contains(" WARN "))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
