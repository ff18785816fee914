// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: app.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

use crate::rgm::logging;
use crate::rgm::mac::commands::{
	run_list, run_mac, MacInput, MacOptions,
};
use crate::rgm::mac::control::MacControl;
use crate::rgm::mac::key::KeySource;
use clap::{crate_name, Arg, ArgAction, ArgGroup};
use std::error::Error;
use std::path::PathBuf;
use zeroize::Zeroizing;

const HELP_TEMPLATE: &str = "{before-help}{name} {version}
Written by {author-with-newline}{about-with-newline}
Primary command families:
  rgm mac -a <algorithm>  Authenticate strings/files/stdin (e.g. rgm mac -a hmac --digest sha256 --key-hex 6b6579 'text')
  rgm list                Show the registered MAC algorithms
{usage-heading} {usage}

{all-args}{after-help}
";

fn build_cli() -> clap::Command {
	clap::Command::new(crate_name!())
		.color(clap::ColorChoice::Never)
		.help_template(HELP_TEMPLATE)
		.name("rgm")
		.bin_name("rgm")
		.version(clap::crate_version!())
		.author(clap::crate_authors!())
		.about("A generic message authentication code utility")
		.subcommand_required(true)
		.arg_required_else_help(true)
		.arg(
			Arg::new("verbose")
				.short('v')
				.long("verbose")
				.help("Increase diagnostic output on stderr (repeatable; RGM_LOG overrides)")
				.action(ArgAction::Count)
				.global(true),
		)
		.subcommand(
			clap::command!("mac")
				.about("Compute a MAC over a string, a file or stdin lines")
				.arg(
					Arg::new("algorithm")
						.short('a')
						.long("algorithm")
						.help("MAC algorithm name, alias or numeric id (see `rgm list`)")
						.required(true),
				)
				.arg(
					Arg::new("macopt")
						.long("macopt")
						.value_name("TYPE:VALUE")
						.help("Control option, e.g. digest:SHA256, hexkey:0011, hexiv:..., custom:..., size:16, xof:1")
						.action(ArgAction::Append),
				)
				.arg(
					Arg::new("key-file")
						.long("key-file")
						.value_name("PATH")
						.help("Read the key bytes from a file")
						.value_parser(clap::value_parser!(PathBuf)),
				)
				.arg(
					Arg::new("key-stdin")
						.long("key-stdin")
						.help("Read the key bytes from stdin")
						.action(ArgAction::SetTrue)
						.conflicts_with("stdin"),
				)
				.arg(
					Arg::new("key-hex")
						.long("key-hex")
						.value_name("HEX")
						.help("Hex-encoded key"),
				)
				.group(
					ArgGroup::new("key")
						.args(["key-file", "key-stdin", "key-hex"])
						.multiple(false),
				)
				.arg(
					Arg::new("digest")
						.long("digest")
						.value_name("NAME")
						.help("Underlying digest (same as --macopt digest:NAME)"),
				)
				.arg(
					Arg::new("cipher")
						.long("cipher")
						.value_name("NAME")
						.help("Underlying cipher (same as --macopt cipher:NAME)"),
				)
				.arg(
					Arg::new("size")
						.long("size")
						.value_name("BYTES")
						.help("Output size in bytes (same as --macopt size:N)")
						.value_parser(clap::value_parser!(usize)),
				)
				.arg(
					Arg::new("xof")
						.long("xof")
						.help("Enable extendable-output mode")
						.action(ArgAction::SetTrue),
				)
				.arg(
					Arg::new("input")
						.help("String to authenticate"),
				)
				.arg(
					Arg::new("file")
						.long("file")
						.value_name("PATH")
						.help("Authenticate the contents of a file")
						.value_parser(clap::value_parser!(PathBuf)),
				)
				.arg(
					Arg::new("stdin")
						.long("stdin")
						.help("Authenticate each newline-delimited stdin line")
						.action(ArgAction::SetTrue),
				)
				.group(
					ArgGroup::new("source")
						.args(["input", "file", "stdin"])
						.required(true)
						.multiple(false),
				)
				.arg(
					Arg::new("json")
						.long("json")
						.help("Emit one JSON object per MAC")
						.action(ArgAction::SetTrue),
				)
				.arg(
					Arg::new("hash-only")
						.long("hash-only")
						.help("Emit only the hex MAC")
						.action(ArgAction::SetTrue)
						.conflicts_with("json"),
				),
		)
		.subcommand(
			clap::command!("list")
				.about("List registered MAC algorithms")
				.arg(
					Arg::new("json")
						.long("json")
						.help("Emit the registry as JSON")
						.action(ArgAction::SetTrue),
				),
		)
}

fn collect_controls(
	matches: &clap::ArgMatches,
) -> Result<Vec<MacControl>, Box<dyn Error>> {
	let mut controls = Vec::new();
	if let Some(digest) = matches.get_one::<String>("digest") {
		controls.push(MacControl::from_str_pair("digest", digest)?);
	}
	if let Some(cipher) = matches.get_one::<String>("cipher") {
		controls.push(MacControl::from_str_pair("cipher", cipher)?);
	}
	if let Some(size) = matches.get_one::<usize>("size") {
		controls.push(MacControl::Size(*size));
	}
	if matches.get_flag("xof") {
		controls.push(MacControl::Xof(true));
	}
	if let Some(options) = matches.get_many::<String>("macopt") {
		for option in options {
			controls.push(MacControl::parse_option(option)?);
		}
	}
	Ok(controls)
}

fn mac_options(
	matches: &clap::ArgMatches,
) -> Result<MacOptions, Box<dyn Error>> {
	let algorithm = matches
		.get_one::<String>("algorithm")
		.cloned()
		.ok_or("missing --algorithm")?;
	let key_source = if let Some(path) = matches.get_one::<PathBuf>("key-file")
	{
		Some(KeySource::File(path.clone()))
	} else if matches.get_flag("key-stdin") {
		Some(KeySource::Stdin)
	} else {
		matches
			.get_one::<String>("key-hex")
			.map(|hex| KeySource::Hex(Zeroizing::new(hex.clone())))
	};
	let input = if let Some(text) = matches.get_one::<String>("input") {
		MacInput::Inline(text.clone())
	} else if let Some(path) = matches.get_one::<PathBuf>("file") {
		MacInput::File(path.clone())
	} else {
		MacInput::Stdin
	};
	Ok(MacOptions {
		algorithm: resolve_algorithm(&algorithm),
		controls: collect_controls(matches)?,
		key_source,
		input,
		hash_only: matches.get_flag("hash-only"),
		json: matches.get_flag("json"),
	})
}

/// Numeric ids are accepted wherever a name is.
fn resolve_algorithm(name: &str) -> String {
	name.trim()
		.parse::<u32>()
		.ok()
		.and_then(|id| crate::rgm::mac::registry::lookup_by_id(id).ok())
		.map(|algorithm| algorithm.name().to_string())
		.unwrap_or_else(|| name.to_string())
}

pub fn run() -> Result<(), Box<dyn Error>> {
	let matches = build_cli().get_matches();
	logging::init(matches.get_count("verbose"));

	match matches.subcommand() {
		Some(("mac", args)) => run_mac(mac_options(args)?),
		Some(("list", args)) => run_list(args.get_flag("json")),
		_ => Err("no subcommand given; see `rgm --help`".into()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cli_definition_is_consistent() {
		build_cli().debug_assert();
	}

	#[test]
	fn shorthands_become_controls() {
		let matches = build_cli()
			.try_get_matches_from([
				"rgm", "mac", "-a", "kmac128", "--size", "16", "--xof",
				"--macopt", "custom:app", "--key-hex", "00010203", "data",
			])
			.unwrap();
		let (_, args) = matches.subcommand().unwrap();
		let options = mac_options(args).unwrap();
		assert_eq!(
			options.controls,
			vec![
				MacControl::Size(16),
				MacControl::Xof(true),
				MacControl::Custom(b"app".to_vec()),
			]
		);
		assert!(matches!(options.key_source, Some(KeySource::Hex(_))));
		assert!(matches!(options.input, MacInput::Inline(ref s) if s == "data"));
	}

	#[test]
	fn input_sources_are_exclusive() {
		let result = build_cli().try_get_matches_from([
			"rgm", "mac", "-a", "hmac", "text", "--stdin",
		]);
		assert!(result.is_err());
		let result =
			build_cli().try_get_matches_from(["rgm", "mac", "-a", "hmac"]);
		assert!(result.is_err());
	}

	#[test]
	fn numeric_algorithm_ids_resolve() {
		assert_eq!(resolve_algorithm("855"), "hmac");
		assert_eq!(resolve_algorithm("blake3mac"), "blake3mac");
	}
}
