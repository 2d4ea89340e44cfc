// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors raised by the engines and the orchestrator.

use failure::Fail;
use std::io;

/// Everything that can go wrong between receiving a region and
/// handing back an image.
#[derive(Debug, Fail)]
pub enum MandelbrotError {
    /// Both image dimensions must be greater than one; the pixel
    /// normalisation divides by `width - 1` and `height - 1`.
    #[fail(display = "image dimensions must both exceed 1, got {}x{}", _0, _1)]
    InvalidDimensions(u32, u32),

    /// The region has zero extent on at least one axis.
    #[fail(display = "the complex region is degenerate on at least one axis")]
    DegenerateRegion,

    /// The worker pool needs at least one worker.
    #[fail(display = "task count must be at least 1, got {}", _0)]
    InvalidTaskCount(usize),

    /// `render` was handed results for a different image size.
    #[fail(display = "expected {} pixel results, got {}", expected, actual)]
    ResultCountMismatch {
        /// Pixels in the requested image.
        expected: usize,
        /// Results supplied.
        actual: usize,
    },

    /// A palette must hold at least one color.
    #[fail(display = "the color palette is empty")]
    EmptyPalette,

    /// A packed palette entry uses bits above the 24-bit color.
    #[fail(display = "palette entry {} ({:#x}) is not a 24-bit color", index, value)]
    InvalidColor {
        /// Position in the palette.
        index: usize,
        /// The offending value.
        value: u32,
    },

    /// The palette file could not be read.
    #[fail(display = "could not read the color palette: {}", _0)]
    PaletteIo(#[cause] io::Error),

    /// The palette file is not a JSON array of integers.
    #[fail(display = "malformed color palette: {}", _0)]
    PaletteFormat(#[cause] serde_json::Error),

    /// GPU acceleration was requested but no usable device exists.
    /// Callers may recover by using the CPU engine.
    #[fail(display = "GPU acceleration is unavailable: {}", _0)]
    AcceleratorUnavailable(String),

    /// A kernel failed to compile or run.  Not recoverable.
    #[fail(display = "GPU kernel failure: {}", _0)]
    KernelFailure(String),

    /// A CPU worker panicked before returning its share of the work.
    #[fail(display = "a worker thread panicked")]
    WorkerPanicked,
}

impl From<io::Error> for MandelbrotError {
    fn from(err: io::Error) -> Self {
        MandelbrotError::PaletteIo(err)
    }
}

impl From<serde_json::Error> for MandelbrotError {
    fn from(err: serde_json::Error) -> Self {
        MandelbrotError::PaletteFormat(err)
    }
}

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, MandelbrotError>;
