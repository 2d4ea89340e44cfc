#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot set visualiser
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which the orbit of `z = z² + c` stays bounded.  This crate maps
//! a rectangle of the complex plane onto a grid of pixels, counts how
//! many iterations each pixel's orbit takes to escape, and colors the
//! pixel from a palette using a smoothed version of that count.
//!
//! Two engines do the work.  The CPU engine spreads pixels over a pool
//! of worker threads in double precision; the GPU engine runs one
//! compute-shader thread per pixel in single precision.  The
//! [`Mandelbrot`](visualiser/struct.Mandelbrot.html) orchestrator
//! picks one per request and falls back to the CPU when no GPU can be
//! found.

extern crate crossbeam;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;

pub mod config;
pub mod constants;
pub mod cpu;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod palette;
pub mod pixel;
pub mod planes;
pub mod visualiser;
pub mod workers;

pub use cpu::CpuEngine;
pub use engine::Engine;
pub use error::{MandelbrotError, Result};
pub use gpu::{GpuContext, GpuEngine, GpuResults};
pub use palette::ColorPalette;
pub use pixel::{PixelJob, PixelResult};
pub use planes::ComplexRegion;
pub use visualiser::{Backend, Mandelbrot, Render, Timings};
