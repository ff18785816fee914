// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: poly1305.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Poly1305 one-time authenticator with key reuse tracking.

use blake3::Hasher;
use poly1305::universal_hash::{KeyInit, UniversalHash};
use poly1305::{Block, Poly1305 as Poly1305Mac};
use zeroize::{Zeroize, Zeroizing};

use super::control::{ControlCommand, MacControl};
use super::error::MacError;
use super::method::{MacFamily, MacMethod, SizePolicy};
use super::registry::{MacAlgorithm, MacAlgorithmMetadata};

const DISPLAY_NAME: &str = "Poly1305";
pub const POLY1305_KEY_LENGTH: usize = 32;
const TAG_SIZE: usize = 16;
const BLOCK_SIZE: usize = 16;

/// Warning emitted when a Poly1305 key is reused during the same invocation.
pub const POLY1305_REUSE_WARNING: &str =
	"Poly1305 requires one-time keys; reuse detected";

#[derive(Clone, Copy)]
struct Poly1305Session {
	fingerprint: [u8; 16],
	usage_count: u32,
}

/// Tracks Poly1305 key reuse within a single command execution.
#[derive(Default)]
pub struct Poly1305ReuseTracker {
	session: Option<Poly1305Session>,
}

impl Poly1305ReuseTracker {
	/// Returns `Some(POLY1305_REUSE_WARNING)` on the second consecutive use
	/// of the same key, otherwise `None`.
	pub fn check_reuse(&mut self, key: &[u8]) -> Option<&'static str> {
		let fingerprint = fingerprint_key(key);
		match &mut self.session {
			Some(session) if session.fingerprint == fingerprint => {
				session.usage_count = session.usage_count.saturating_add(1);
				(session.usage_count == 2).then_some(POLY1305_REUSE_WARNING)
			}
			_ => {
				self.session = Some(Poly1305Session {
					fingerprint,
					usage_count: 1,
				});
				None
			}
		}
	}

	pub fn reset(&mut self) {
		self.session = None;
	}
}

fn fingerprint_key(key: &[u8]) -> [u8; 16] {
	let mut hasher = Hasher::new();
	hasher.update(key);
	let mut output = [0u8; 16];
	output.copy_from_slice(&hasher.finalize().as_bytes()[..16]);
	output
}

static ALGORITHMS: [MacAlgorithm; 1] = [MacAlgorithm::new(
	MacAlgorithmMetadata::new(
		"poly1305",
		DISPLAY_NAME,
		1061,
		MacFamily::DirectKeyed,
		SizePolicy::Fixed(TAG_SIZE),
		&[ControlCommand::SetKey],
	),
	create_poly1305,
)];

pub fn catalog() -> &'static [MacAlgorithm] {
	&ALGORITHMS
}

struct Poly1305State {
	key: Option<Zeroizing<Vec<u8>>>,
	mac: Option<Poly1305Mac>,
	buffer: [u8; BLOCK_SIZE],
	buffered: usize,
}

impl Poly1305State {
	fn running(&mut self) -> Result<&mut Poly1305Mac, MacError> {
		self.mac.as_mut().ok_or_else(|| {
			MacError::computation("Poly1305 computation was not started")
		})
	}
}

impl MacMethod for Poly1305State {
	fn size(&self) -> usize {
		TAG_SIZE
	}

	fn configure(&mut self, control: &MacControl) -> Result<(), MacError> {
		match control {
			MacControl::Key(key) => {
				if key.len() != POLY1305_KEY_LENGTH {
					return Err(MacError::invalid_value(format!(
						"Poly1305 requires a 32-byte one-time key but received {} bytes",
						key.len()
					)));
				}
				self.key = Some(key.clone());
				self.mac = None;
				Ok(())
			}
			other => {
				Err(MacError::unsupported(DISPLAY_NAME, other.command()))
			}
		}
	}

	fn init(&mut self) -> Result<(), MacError> {
		let key = self.key.as_ref().ok_or_else(|| {
			MacError::computation("Poly1305 requires a key (SET_KEY)")
		})?;
		self.mac = Some(Poly1305Mac::new(poly1305::Key::from_slice(key)));
		self.buffer.zeroize();
		self.buffered = 0;
		Ok(())
	}

	/// Whole blocks go straight into the accumulator; a trailing partial
	/// block waits for more input or for `finalize`.
	fn update(&mut self, data: &[u8]) -> Result<(), MacError> {
		self.running()?;
		let mut data = data;
		if self.buffered > 0 {
			let take = (BLOCK_SIZE - self.buffered).min(data.len());
			self.buffer[self.buffered..self.buffered + take]
				.copy_from_slice(&data[..take]);
			self.buffered += take;
			data = &data[take..];
			if self.buffered < BLOCK_SIZE {
				return Ok(());
			}
			let block = Block::clone_from_slice(&self.buffer);
			self.running()?.update(&[block]);
			self.buffered = 0;
		}
		let mut blocks = data.chunks_exact(BLOCK_SIZE);
		for chunk in blocks.by_ref() {
			self.running()?.update(&[Block::clone_from_slice(chunk)]);
		}
		let tail = blocks.remainder();
		self.buffer[..tail.len()].copy_from_slice(tail);
		self.buffered = tail.len();
		Ok(())
	}

	fn finalize(&mut self, out: &mut [u8]) -> Result<usize, MacError> {
		let mac = self.mac.take().ok_or_else(|| {
			MacError::computation("Poly1305 computation was not started")
		})?;
		let tag = mac.compute_unpadded(&self.buffer[..self.buffered]);
		out[..TAG_SIZE].copy_from_slice(tag.as_slice());
		self.buffer.zeroize();
		self.buffered = 0;
		Ok(TAG_SIZE)
	}

	fn duplicate(&self) -> Result<Box<dyn MacMethod>, MacError> {
		Ok(Box::new(Poly1305State {
			key: self.key.clone(),
			mac: self.mac.clone(),
			buffer: self.buffer,
			buffered: self.buffered,
		}))
	}
}

impl Drop for Poly1305State {
	fn drop(&mut self) {
		self.buffer.zeroize();
	}
}

fn create_poly1305() -> Result<Box<dyn MacMethod>, MacError> {
	Ok(Box::new(Poly1305State {
		key: None,
		mac: None,
		buffer: [0u8; BLOCK_SIZE],
		buffered: 0,
	}))
}
