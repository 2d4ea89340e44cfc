// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
extern crate failure;
#[macro_use]
extern crate log;
extern crate mandelbrot;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use mandelbrot::config::{self, Settings};
use mandelbrot::{ColorPalette, Mandelbrot};
use std::path::PathBuf;

const SIZE: &str = "size";
const PLANE: &str = "plane";
const TASKS: &str = "tasks";
const OUTPUT: &str = "output";
const GPU: &str = "gpu";
const PALETTE: &str = "palette";
const QUIET: &str = "quiet";

fn args<'a>() -> ArgMatches<'a> {
    App::new("mandelbrot")
        .version("0.1.0")
        .about("Generates a visualisation of the Mandelbrot set")
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value(config::DEFAULT_SIZE)
                .validator(config::validate_size)
                .help("The output image size, e.g. 640x480"),
        )
        .arg(
            Arg::with_name(PLANE)
                .long(PLANE)
                .short("p")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value(config::DEFAULT_PLANE)
                .validator(config::validate_plane)
                .help("The real and imaginary axis ranges, rmin:rmax:imin:imax"),
        )
        .arg(
            Arg::with_name(TASKS)
                .long(TASKS)
                .short("t")
                .takes_value(true)
                .default_value(config::DEFAULT_TASKS)
                .validator(config::validate_tasks)
                .help("Number of concurrent CPU workers"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value(config::DEFAULT_OUTPUT)
                .help("Output file; the format follows the extension"),
        )
        .arg(
            Arg::with_name(PALETTE)
                .long(PALETTE)
                .takes_value(true)
                .help("JSON color palette to use instead of the built-in one"),
        )
        .arg(
            Arg::with_name(GPU)
                .long(GPU)
                .short("g")
                .help("Use GPU acceleration when a device is available"),
        )
        .arg(
            Arg::with_name(QUIET)
                .long(QUIET)
                .short("q")
                .help("Only log timings, warnings and errors"),
        )
        .get_matches()
}

/// Values have already passed the validators, so a failed parse here
/// means the validators and parsers disagree.
fn settings(matches: &ArgMatches) -> Result<Settings, failure::Error> {
    let (width, height) = matches
        .value_of(SIZE)
        .and_then(config::parse_size)
        .ok_or_else(|| failure::err_msg("Error parsing image dimensions"))?;
    let (real_axis_range, imag_axis_range) = matches
        .value_of(PLANE)
        .and_then(config::parse_plane)
        .ok_or_else(|| failure::err_msg("Error parsing plane"))?;
    let tasks = matches
        .value_of(TASKS)
        .and_then(config::parse_tasks)
        .ok_or_else(|| failure::err_msg("Error parsing task count"))?;

    Ok(Settings {
        width,
        height,
        real_axis_range,
        imag_axis_range,
        tasks,
        gpu: matches.is_present(GPU),
        output: PathBuf::from(matches.value_of(OUTPUT).unwrap_or(config::DEFAULT_OUTPUT)),
        palette: matches.value_of(PALETTE).map(PathBuf::from),
        quiet: matches.is_present(QUIET),
    })
}

fn init_logging(quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Debug
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(settings: &Settings) -> Result<(), failure::Error> {
    let palette = match &settings.palette {
        Some(path) => ColorPalette::load(path)?,
        None => ColorPalette::builtin()?,
    };
    debug!("Loaded a palette of {} colors", palette.len());

    let cores = num_cpus::get();
    if settings.tasks > cores {
        warn!(
            "{} tasks requested but only {} CPUs are available",
            settings.tasks, cores
        );
    }

    let region = settings.region()?;
    let mut mandelbrot = Mandelbrot::new(&palette);
    let render = mandelbrot.generate(
        settings.width,
        settings.height,
        &region,
        settings.tasks,
        settings.gpu,
    )?;
    debug!("Rendered on {:?}", render.backend);

    render.image.save(&settings.output)?;
    info!("Visualisation saved to {}", settings.output.display());
    Ok(())
}

fn main() {
    let matches = args();
    let settings = match settings(&matches) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    init_logging(settings.quiet);

    if let Err(e) = run(&settings) {
        error!("{}", e);
        for cause in e.iter_causes() {
            error!("caused by: {}", cause);
        }
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
