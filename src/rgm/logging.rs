// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: logging.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Diagnostic output for the `rgm` binary.
//!
//! Everything goes to stderr so MAC output on stdout stays parseable.
//! `RGM_LOG` takes `tracing-subscriber` filter directives and overrides
//! the level chosen with `-v`.

use std::io::IsTerminal;
use tracing::metadata::LevelFilter;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "RGM_LOG";

/// `0` → warn, `1` → info, `2` → debug, `3+` → trace.
pub fn level_for(verbosity: u8) -> LevelFilter {
	match verbosity {
		0 => LevelFilter::WARN,
		1 => LevelFilter::INFO,
		2 => LevelFilter::DEBUG,
		_ => LevelFilter::TRACE,
	}
}

/// Default level from `-v`, overridden by `directives` when present.
fn filter_for(verbosity: u8, directives: Option<&str>) -> EnvFilter {
	let builder = EnvFilter::builder()
		.with_default_directive(level_for(verbosity).into());
	match directives {
		None => builder.parse_lossy(""),
		Some(directives) => match builder.parse(directives) {
			Ok(filter) => filter,
			Err(err) => {
				eprintln!("rgm: ignoring invalid {}: {}", LOG_ENV, err);
				EnvFilter::builder()
					.with_default_directive(level_for(verbosity).into())
					.parse_lossy("")
			}
		},
	}
}

/// Installs the global subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init(verbosity: u8) {
	let directives = std::env::var(LOG_ENV).ok();
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter_for(verbosity, directives.as_deref()))
		.with_ansi(std::io::stderr().is_terminal())
		.with_target(false)
		.with_writer(std::io::stderr)
		.try_init();
}
