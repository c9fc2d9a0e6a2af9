//! Asynchronous image decoding and request sequencing.
//!
//! Decodes are the only suspension points in the engine. Each request is
//! tagged with a [`Ticket`]; a completion whose ticket is no longer pending
//! is stale and must be dropped without touching state.

use crate::elements::ImageRef;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Decode errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("No image data")]
    Empty,
    #[error("Unsupported image format")]
    Unsupported,
    #[error("Invalid image data: {0}")]
    InvalidData(String),
}

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    rgba: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Wrap raw RGBA8 pixels, checking the buffer matches the dimensions.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, DecodeError> {
        if width == 0 || height == 0 {
            return Err(DecodeError::Empty);
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(DecodeError::InvalidData(format!(
                "expected {expected} bytes for {width}x{height}, got {}",
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba: Arc::new(rgba),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// RGBA of the pixel at (x, y), or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]])
    }
}

/// Something that can turn encoded bytes into pixels.
pub trait ImageDecoder {
    fn decode(&self, bytes: Vec<u8>) -> BoxFuture<'static, Result<DecodedImage, DecodeError>>;
}

/// Sequence number of one decode request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

/// Issues monotonically increasing tickets and tracks which are still wanted.
#[derive(Debug, Clone, Default)]
pub struct DecodeTasks {
    next: u64,
    pending: BTreeSet<u64>,
}

impl DecodeTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request alongside any already pending.
    pub fn issue(&mut self) -> Ticket {
        self.next += 1;
        self.pending.insert(self.next);
        Ticket(self.next)
    }

    /// Start a request that makes every older one stale.
    pub fn supersede(&mut self) -> Ticket {
        self.pending.clear();
        self.issue()
    }

    /// Mark every pending request stale.
    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("Cancelling {} pending decode(s)", self.pending.len());
        }
        self.pending.clear();
    }

    /// Consume a ticket. Returns `false` when the completion is stale.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        self.pending.remove(&ticket.0)
    }

    pub fn is_pending(&self, ticket: Ticket) -> bool {
        self.pending.contains(&ticket.0)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Decoded pixels for image elements.
///
/// Append-only, so references stay valid across undo and redo.
#[derive(Debug, Clone, Default)]
pub struct ImageStore {
    images: HashMap<ImageRef, DecodedImage>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image: DecodedImage) -> ImageRef {
        let image_ref = ImageRef::generate();
        self.images.insert(image_ref.clone(), image);
        image_ref
    }

    pub fn get(&self, image_ref: &ImageRef) -> Option<&DecodedImage> {
        self.images.get(image_ref)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
