//! Image element.

use super::{ElementId, ElementTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Handle to decoded pixels held by the [`ImageStore`](crate::decode::ImageStore).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef(pub String);

impl ImageRef {
    /// Allocate a fresh, unique reference.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A placed raster image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub(crate) id: ElementId,
    pub image_ref: ImageRef,
    /// Top-left corner.
    pub position: Point,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
}

impl Image {
    pub fn new(image_ref: ImageRef, position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_ref,
            position,
            width,
            height,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width, self.height))
    }
}

impl ElementTrait for Image {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.rect()
    }
}
