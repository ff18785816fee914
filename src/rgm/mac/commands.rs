// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: commands.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! CLI dispatch for `rgm mac` and `rgm list`.

use crate::rgm::mac::context::MacContext;
use crate::rgm::mac::control::{ControlCommand, MacControl};
use crate::rgm::mac::executor::{
	consume_bytes, consume_reader, digest_to_hex,
};
use crate::rgm::mac::key::{load_key, KeySource};
use crate::rgm::mac::poly1305::Poly1305ReuseTracker;
use crate::rgm::mac::registry::{self, MacAlgorithmMetadata};
use crate::rgm::provider::DigestAlgorithm;
use colored::*;
use serde::Serialize;
use serde_json::json;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::PathBuf;

#[derive(Debug)]
pub struct MacOptions {
	pub algorithm: String,
	/// Controls in command-line order; reordered before they are applied.
	pub controls: Vec<MacControl>,
	pub key_source: Option<KeySource>,
	pub input: MacInput,
	pub hash_only: bool,
	pub json: bool,
}

#[derive(Debug)]
pub enum MacInput {
	Inline(String),
	File(PathBuf),
	Stdin,
}

enum MacOutput<'a> {
	Inline(&'a str),
	File(&'a PathBuf),
	StdinLine(&'a str),
}

/// Primitive selection first, the key last, everything else in between.
fn control_rank(control: &MacControl) -> u8 {
	let command = control.command();
	if command.selects_primitive() {
		0
	} else if command == ControlCommand::SetKey {
		2
	} else {
		1
	}
}

pub fn ordered_controls(mut controls: Vec<MacControl>) -> Vec<MacControl> {
	controls.sort_by_key(control_rank);
	controls
}

pub fn run_mac(options: MacOptions) -> Result<(), Box<dyn Error>> {
	let mut ctx = MacContext::by_name(&options.algorithm)?;
	let metadata = ctx.algorithm().metadata;

	let mut controls = options.controls.clone();
	if let Some(source) = options.key_source.as_ref() {
		let key = load_key(source)?;
		controls.push(MacControl::key(key.as_slice()));
	}
	let controls = ordered_controls(controls);
	let key = controls.iter().rev().find_map(|control| match control {
		MacControl::Key(key) => Some(key.clone()),
		_ => None,
	});
	let legacy = legacy_digest(&controls);
	ctx.control_all(controls)?;
	if let Some(digest) = legacy {
		tracing::warn!("{}", legacy_warning_message(&metadata, digest));
	}

	let mut poly1305_tracker = (metadata.identifier == "poly1305")
		.then(Poly1305ReuseTracker::default);
	let mut check_reuse = || {
		if let (Some(tracker), Some(key)) =
			(poly1305_tracker.as_mut(), key.as_ref())
		{
			if let Some(warning) = tracker.check_reuse(key) {
				tracing::warn!("{}", warning);
			}
		}
	};

	match &options.input {
		MacInput::Inline(text) => {
			check_reuse();
			let tag = consume_bytes(text.as_bytes(), &mut ctx)?;
			emit_output(&options, &metadata, MacOutput::Inline(text), &tag)
		}
		MacInput::File(path) => {
			let file = File::open(path).map_err(|err| {
				io::Error::other(format!(
					"failed to open `{}`: {}",
					path.display(),
					err
				))
			})?;
			check_reuse();
			let tag = consume_reader(file, &mut ctx)?;
			emit_output(&options, &metadata, MacOutput::File(path), &tag)
		}
		MacInput::Stdin => {
			let mut warned_blank = false;
			let stdin = io::stdin();
			for line_result in stdin.lock().lines() {
				let line = line_result?;
				if line.is_empty() {
					if !warned_blank {
						tracing::warn!("skipping empty stdin line");
						warned_blank = true;
					}
					continue;
				}
				check_reuse();
				let tag = consume_bytes(line.as_bytes(), &mut ctx)?;
				emit_output(
					&options,
					&metadata,
					MacOutput::StdinLine(&line),
					&tag,
				)?;
			}
			Ok(())
		}
	}
}

/// The digest that will end up selected, when it is a legacy one.
fn legacy_digest(controls: &[MacControl]) -> Option<DigestAlgorithm> {
	controls
		.iter()
		.rev()
		.find_map(|control| match control {
			MacControl::Digest(digest) => Some(*digest),
			_ => None,
		})
		.filter(|digest| digest.is_legacy())
}

pub fn legacy_warning_message(
	metadata: &MacAlgorithmMetadata,
	digest: DigestAlgorithm,
) -> String {
	format!(
		"{}-{} is considered legacy per NIST SP 800-131A Rev.2 §3; prefer SHA-2, SHA-3, KMAC, or BLAKE3 keyed alternatives",
		metadata.display_name, digest
	)
}

fn emit_output(
	options: &MacOptions,
	metadata: &MacAlgorithmMetadata,
	context: MacOutput,
	tag: &[u8],
) -> Result<(), Box<dyn Error>> {
	let hex = digest_to_hex(tag);

	if options.hash_only {
		println!("{}", hex);
		return Ok(());
	}

	if options.json {
		let input_value = match &context {
			MacOutput::Inline(text) => {
				json!({ "type": "inline", "value": text })
			}
			MacOutput::File(path) => {
				json!({ "type": "file", "value": path.display().to_string() })
			}
			MacOutput::StdinLine(line) => {
				json!({ "type": "stdin", "value": line })
			}
		};
		let key_source = options
			.key_source
			.as_ref()
			.map(KeySource::description)
			.unwrap_or("macopt");
		let payload = json!({
			"algorithm": metadata.identifier,
			"display_name": metadata.display_name,
			"id": metadata.id,
			"oid": metadata.oid,
			"size": tag.len(),
			"mac": hex,
			"input": input_value,
			"key_source": key_source,
		});
		println!("{}", payload);
	} else {
		match &context {
			MacOutput::Inline(text) => println!("{} {}", hex, text),
			MacOutput::File(path) => println!("{} {}", hex, path.display()),
			MacOutput::StdinLine(line) => println!("{} {}", hex, line),
		};
	}

	Ok(())
}

#[derive(Debug, Serialize)]
pub struct AlgorithmSummary {
	pub name: &'static str,
	pub display_name: &'static str,
	pub aliases: &'static [&'static str],
	pub id: u32,
	pub oid: Option<&'static str>,
	pub family: &'static str,
	pub size: String,
	pub controls: Vec<&'static str>,
}

impl From<&MacAlgorithmMetadata> for AlgorithmSummary {
	fn from(metadata: &MacAlgorithmMetadata) -> Self {
		Self {
			name: metadata.identifier,
			display_name: metadata.display_name,
			aliases: metadata.aliases,
			id: metadata.id,
			oid: metadata.oid,
			family: metadata.family.label(),
			size: metadata.size_policy.describe(),
			controls: metadata
				.controls
				.iter()
				.map(|command| command.label())
				.collect(),
		}
	}
}

pub fn list_algorithms() -> Vec<AlgorithmSummary> {
	registry::metadata().iter().map(AlgorithmSummary::from).collect()
}

pub fn run_list(json: bool) -> Result<(), Box<dyn Error>> {
	let summaries = list_algorithms();
	if json {
		println!("{}", serde_json::to_string_pretty(&summaries)?);
		return Ok(());
	}
	for summary in &summaries {
		println!(
			"{:<14} {:>5}  {:<13} {}",
			summary.name.bold(),
			summary.id,
			summary.family,
			summary.size
		);
		if let Some(oid) = summary.oid {
			println!("{:<14} oid {}", "", oid);
		}
		println!(
			"{:<14} controls {}",
			"",
			summary.controls.join(", ").dimmed()
		);
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn key_is_applied_after_primitive() {
		let ordered = ordered_controls(vec![
			MacControl::key(b"k"),
			MacControl::Flags(1),
			MacControl::Digest(DigestAlgorithm::Sha256),
		]);
		let commands: Vec<_> =
			ordered.iter().map(MacControl::command).collect();
		assert_eq!(
			commands,
			vec![
				ControlCommand::SetMd,
				ControlCommand::SetFlags,
				ControlCommand::SetKey
			]
		);
	}

	#[test]
	fn legacy_message_names_the_digest() {
		let hmac = registry::lookup_by_name("hmac").unwrap();
		let message =
			legacy_warning_message(&hmac.metadata, DigestAlgorithm::Sha1);
		assert!(message.starts_with("HMAC-SHA1 is considered legacy"));
	}

	#[test]
	fn only_the_final_digest_decides_the_warning() {
		let sha1_then_sha256 = [
			MacControl::Digest(DigestAlgorithm::Sha1),
			MacControl::Digest(DigestAlgorithm::Sha256),
		];
		assert_eq!(legacy_digest(&sha1_then_sha256), None);
		assert_eq!(
			legacy_digest(&[
				MacControl::key(b"k"),
				MacControl::Digest(DigestAlgorithm::Md5),
			]),
			Some(DigestAlgorithm::Md5)
		);
		assert_eq!(legacy_digest(&[MacControl::key(b"k")]), None);
	}

	#[test]
	fn summaries_cover_registry() {
		let summaries = list_algorithms();
		let gmac = summaries.iter().find(|s| s.name == "gmac").unwrap();
		assert_eq!(gmac.oid, Some("1.0.9797.3.4"));
		assert!(gmac.controls.contains(&"SET_IV"));
		assert_eq!(summaries.len(), registry::algorithms().count());
	}
}
