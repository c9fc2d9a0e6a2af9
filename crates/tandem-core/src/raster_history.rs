//! Undo/redo over bitmap snapshots.
//!
//! Entries hold an encoded bitmap plus the text overlays floating above it.
//! Restoring an entry needs an asynchronous decode, so each undo/redo moves the
//! logical position immediately and returns a [`RestoreRequest`]; the caller
//! decodes it and hands the result back to [`RasterHistory::complete`]. Only the
//! newest request can complete. A failed decode rolls the logical position
//! back to the last entry that was actually applied.

use crate::decode::{BoxFuture, DecodeError, DecodeTasks, DecodedImage, ImageDecoder, Ticket};
use crate::elements::Text;
use crate::history::History;

/// One bitmap snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RasterEntry {
    /// Encoded image bytes. Empty for a blank surface.
    pub bitmap: Vec<u8>,
    /// Vector text drawn above the bitmap.
    pub overlays: Vec<Text>,
}

impl RasterEntry {
    pub fn new(bitmap: Vec<u8>, overlays: Vec<Text>) -> Self {
        Self { bitmap, overlays }
    }

    /// A blank surface restores without decoding.
    pub fn is_blank(&self) -> bool {
        self.bitmap.is_empty()
    }
}

/// A pending restore handed to the caller for decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreRequest {
    pub ticket: Ticket,
    pub entry: RasterEntry,
}

impl RestoreRequest {
    /// Decode the entry's bitmap. Blank entries resolve to `None` immediately.
    pub fn decode(&self, decoder: &dyn ImageDecoder) -> BoxFuture<'static, Result<Option<DecodedImage>, DecodeError>> {
        if self.entry.is_blank() {
            return Box::pin(async { Ok(None) });
        }
        let decoding = decoder.decode(self.entry.bitmap.clone());
        Box::pin(async move { decoding.await.map(Some) })
    }
}

/// Result of handing a decode back to the history.
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    /// Draw this image (or a blank surface) with these overlays.
    Applied {
        image: Option<DecodedImage>,
        overlays: Vec<Text>,
    },
    /// A newer request superseded this one. Nothing changed.
    Stale,
    /// Decoding failed; the logical position was rolled back.
    Failed(DecodeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Undo,
    Redo,
}

/// Snapshot history whose entries are bitmaps.
#[derive(Debug, Clone)]
pub struct RasterHistory {
    current: RasterEntry,
    history: History<RasterEntry>,
    tasks: DecodeTasks,
    /// Moves made since the last applied restore, oldest first.
    unapplied: Vec<Step>,
}

impl Default for RasterHistory {
    fn default() -> Self {
        Self::with_limit(crate::history::MAX_UNDO_HISTORY)
    }
}

impl RasterHistory {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            current: RasterEntry::default(),
            history: History::with_limit(limit),
            tasks: DecodeTasks::new(),
            unapplied: Vec::new(),
        }
    }

    /// The logical current entry.
    pub fn current(&self) -> &RasterEntry {
        &self.current
    }

    /// Record a new surface state. Any restore still in flight is dropped.
    pub fn commit(&mut self, entry: RasterEntry) {
        self.tasks.cancel_all();
        self.unapplied.clear();
        let previous = std::mem::replace(&mut self.current, entry);
        self.history.push(previous);
    }

    pub fn undo(&mut self) -> Option<RestoreRequest> {
        let current = std::mem::take(&mut self.current);
        match self.history.undo(current) {
            Ok(entry) => Some(self.moved(Step::Undo, entry)),
            Err(current) => {
                self.current = current;
                None
            }
        }
    }

    pub fn redo(&mut self) -> Option<RestoreRequest> {
        let current = std::mem::take(&mut self.current);
        match self.history.redo(current) {
            Ok(entry) => Some(self.moved(Step::Redo, entry)),
            Err(current) => {
                self.current = current;
                None
            }
        }
    }

    /// Apply the decode result for `ticket`.
    pub fn complete(&mut self, ticket: Ticket, decoded: Result<Option<DecodedImage>, DecodeError>) -> RestoreOutcome {
        if !self.tasks.complete(ticket) {
            log::warn!("Dropping stale restore #{}", ticket.seq());
            return RestoreOutcome::Stale;
        }
        match decoded {
            Ok(image) => {
                self.unapplied.clear();
                RestoreOutcome::Applied {
                    image,
                    overlays: self.current.overlays.clone(),
                }
            }
            Err(err) => {
                log::warn!("Restore #{} failed: {}", ticket.seq(), err);
                self.roll_back();
                RestoreOutcome::Failed(err)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Whether a restore is waiting for its decode.
    pub fn is_restoring(&self) -> bool {
        self.tasks.pending_len() > 0
    }

    /// Start over with a blank surface and empty stacks.
    pub fn reset(&mut self) {
        self.tasks.cancel_all();
        self.unapplied.clear();
        self.history.reset();
        self.current = RasterEntry::default();
    }

    fn moved(&mut self, step: Step, entry: RasterEntry) -> RestoreRequest {
        self.current = entry;
        self.unapplied.push(step);
        RestoreRequest {
            ticket: self.tasks.supersede(),
            entry: self.current.clone(),
        }
    }

    fn roll_back(&mut self) {
        while let Some(step) = self.unapplied.pop() {
            let restored = std::mem::take(&mut self.current);
            let previous = match step {
                Step::Undo => self.history.revert_undo(restored),
                Step::Redo => self.history.revert_redo(restored),
            };
            match previous {
                Ok(previous) => self.current = previous,
                Err(restored) => {
                    self.current = restored;
                    break;
                }
            }
        }
    }
}
