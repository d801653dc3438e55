extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate mandelterm;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use mandelterm::signals;
use mandelterm::{Error, Grid, Renderer, WorkerPool};
use num::Complex;
use std::io;
use std::process;
use std::str::FromStr;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

/// The whole argument has to be a number, and a positive one.
fn parse_thread_count(s: &str) -> Option<usize> {
    match usize::from_str(s) {
        Ok(n) if n > 0 => Some(n),
        _ => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const THREADS: &str = "threads";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const ITERATIONS: &str = "iterations";

fn args<'a>() -> ArgMatches<'a> {
    App::new("mandelterm")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Draws the Mandelbrot set on a 256-color terminal")
        .arg(
            Arg::with_name(THREADS)
                .required(true)
                .index(1)
                .validator(|s| match parse_thread_count(&s) {
                    Some(_) => Ok(()),
                    None => Err(format!("`{}' is not valid for `thread_count'", s)),
                })
                .help("Number of worker threads"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("90x50")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output size"))
                .help("Columns and rows of output"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-1.8,-1.0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the mandelbrot space"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("1.0,1.0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the mandelbrot space"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("100000")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        10_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 10000000",
                    )
                })
                .help("Iterations per point before giving up on escape"),
        )
        .get_matches()
}

/// Anything wrong with the arguments that clap couldn't see ends the
/// program here, before a single byte reaches stdout.
fn usage_error(message: &str) -> ! {
    eprintln!("mandelterm: {}", message);
    process::exit(1);
}

fn value<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches
        .value_of(name)
        .unwrap_or_else(|| usage_error(&format!("missing value for {}", name)))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_micros()
        .init();

    let matches = args();
    let threads = parse_thread_count(value(&matches, THREADS))
        .unwrap_or_else(|| usage_error("could not parse thread count"));
    let size = parse_pair::<u16>(value(&matches, SIZE), 'x')
        .unwrap_or_else(|| usage_error("could not parse output size"));
    let leftlower = parse_complex(value(&matches, LEFTLOWER))
        .unwrap_or_else(|| usage_error("could not parse left lower corner"));
    let rightupper = parse_complex(value(&matches, RIGHTUPPER))
        .unwrap_or_else(|| usage_error("could not parse right upper corner"));
    let iterations = usize::from_str(value(&matches, ITERATIONS))
        .unwrap_or_else(|_| usage_error("could not parse iteration count"));

    let grid = Grid::new(size.0 as usize, size.1 as usize, leftlower, rightupper)
        .unwrap_or_else(|e| usage_error(&e.to_string()));

    let interrupted = signals::install().unwrap_or_else(|e| {
        eprintln!("mandelterm: could not install signal handlers: {}", e);
        process::exit(1);
    });

    let pool = WorkerPool::new(threads).unwrap_or_else(|e| usage_error(&e.to_string()));
    let cores = num_cpus::get();
    if pool.workers() > cores {
        warn!("{} threads requested but only {} cores available", pool.workers(), cores);
    }

    match pool.run(&Renderer::new(grid, iterations), io::stdout(), interrupted) {
        Ok(report) => debug!("{:?}", report),
        Err(Error::Interrupted) => {
            eprintln!("mandelterm: interrupted");
            process::exit(signals::exit_status());
        }
        Err(e) => {
            eprintln!("mandelterm: render failure: {}", e);
            process::exit(1);
        }
    }
}
