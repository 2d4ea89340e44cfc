// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parsing and validation of frontend arguments.  The engines assume
//! their input has been through here, or something equivalent.

use crate::error::Result;
use crate::planes::{validate_dimensions, ComplexRegion};
use std::path::PathBuf;
use std::str::FromStr;

/// Default output size.
pub const DEFAULT_SIZE: &str = "500x500";
/// Default real and imaginary axis ranges, `rmin:rmax:imin:imax`.
pub const DEFAULT_PLANE: &str = "-2.0:1.0:-1.5:1.5";
/// Default worker count.
pub const DEFAULT_TASKS: &str = "1";
/// Default output path.
pub const DEFAULT_OUTPUT: &str = "mandelbrot.png";

/// Splits `s` at the first `separator` and parses both halves.  Sizes
/// are given as `WIDTHxHEIGHT`.
pub fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

/// Parses `WIDTHxHEIGHT`, with both dimensions greater than one.
pub fn parse_size(s: &str) -> Option<(u32, u32)> {
    parse_pair::<u32>(s, 'x').filter(|&(w, h)| validate_dimensions(w, h).is_ok())
}

/// Parses `rmin:rmax:imin:imax` into the real and imaginary axis
/// ranges.
pub fn parse_plane(s: &str) -> Option<((f64, f64), (f64, f64))> {
    let bounds: Vec<f64> = s
        .split(':')
        .map(|part| f64::from_str(part.trim()))
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    match bounds.as_slice() {
        [rmin, rmax, imin, imax] => Some(((*rmin, *rmax), (*imin, *imax))),
        _ => None,
    }
}

/// Parses a worker count of at least one.
pub fn parse_tasks(s: &str) -> Option<usize> {
    usize::from_str(s).ok().filter(|&n| n >= 1)
}

/// clap validator for `--size`.
pub fn validate_size(s: String) -> std::result::Result<(), String> {
    parse_size(&s)
        .map(|_| ())
        .ok_or_else(|| "Size must be WIDTHxHEIGHT with both greater than 1, e.g. 640x480".to_string())
}

/// clap validator for `--plane`; also rejects degenerate regions.
pub fn validate_plane(s: String) -> std::result::Result<(), String> {
    match parse_plane(&s) {
        Some((real, imag)) => ComplexRegion::new(real, imag)
            .map(|_| ())
            .map_err(|e| e.to_string()),
        None => Err("Plane must be rmin:rmax:imin:imax, e.g. -2:2:-2:2".to_string()),
    }
}

/// clap validator for `--tasks`.
pub fn validate_tasks(s: String) -> std::result::Result<(), String> {
    parse_tasks(&s)
        .map(|_| ())
        .ok_or_else(|| "Task count must be a whole number of at least 1".to_string())
}

/// One fully-validated invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// `(rmin, rmax)`.
    pub real_axis_range: (f64, f64),
    /// `(imin, imax)`.
    pub imag_axis_range: (f64, f64),
    /// CPU worker count.
    pub tasks: usize,
    /// Whether GPU acceleration was asked for.
    pub gpu: bool,
    /// Where the image is written.
    pub output: PathBuf,
    /// Palette file, if not the built-in one.
    pub palette: Option<PathBuf>,
    /// Log at info level instead of debug.
    pub quiet: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            width: 500,
            height: 500,
            real_axis_range: (-2.0, 1.0),
            imag_axis_range: (-1.5, 1.5),
            tasks: 1,
            gpu: false,
            output: PathBuf::from(DEFAULT_OUTPUT),
            palette: None,
            quiet: false,
        }
    }
}

impl Settings {
    /// The complex region the axis ranges describe.
    pub fn region(&self) -> Result<ComplexRegion> {
        ComplexRegion::new(self.real_axis_range, self.imag_axis_range)
    }
}
