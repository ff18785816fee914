// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: blake3.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! BLAKE3 keyed mode.

use zeroize::Zeroizing;

use super::control::{ControlCommand, MacControl};
use super::error::MacError;
use super::method::{MacFamily, MacMethod, SizePolicy};
use super::registry::{MacAlgorithm, MacAlgorithmMetadata};

const DISPLAY_NAME: &str = "BLAKE3 keyed";
const POLICY: SizePolicy = SizePolicy::Extendable {
	default: blake3::OUT_LEN,
	max: 65536,
};

static ALGORITHMS: [MacAlgorithm; 1] = [MacAlgorithm::new(
	MacAlgorithmMetadata::new(
		"blake3-keyed",
		DISPLAY_NAME,
		2001,
		MacFamily::XofBased,
		POLICY,
		&[
			ControlCommand::SetKey,
			ControlCommand::SetSize,
		],
	)
	.with_aliases(&["blake3mac"]),
	create_blake3_keyed,
)];

pub fn catalog() -> &'static [MacAlgorithm] {
	&ALGORITHMS
}

struct Blake3State {
	key: Option<Zeroizing<[u8; blake3::KEY_LEN]>>,
	size: usize,
	hasher: Option<blake3::Hasher>,
}

impl MacMethod for Blake3State {
	fn size(&self) -> usize {
		self.size
	}

	fn configure(&mut self, control: &MacControl) -> Result<(), MacError> {
		match control {
			MacControl::Key(key) => {
				let fixed: [u8; blake3::KEY_LEN] =
					key.as_slice().try_into().map_err(|_| {
						MacError::invalid_value(format!(
							"BLAKE3 keyed mode requires a {}-byte key (got {})",
							blake3::KEY_LEN,
							key.len()
						))
					})?;
				self.key = Some(Zeroizing::new(fixed));
				self.hasher = None;
				Ok(())
			}
			// The output length only matters when the reader is drained.
			MacControl::Size(size) => {
				self.size = POLICY.check(DISPLAY_NAME, *size)?;
				Ok(())
			}
			other => {
				Err(MacError::unsupported(DISPLAY_NAME, other.command()))
			}
		}
	}

	fn init(&mut self) -> Result<(), MacError> {
		let key = self.key.as_ref().ok_or_else(|| {
			MacError::computation("BLAKE3 keyed mode requires a key (SET_KEY)")
		})?;
		self.hasher = Some(blake3::Hasher::new_keyed(key));
		Ok(())
	}

	fn update(&mut self, data: &[u8]) -> Result<(), MacError> {
		let hasher = self.hasher.as_mut().ok_or_else(|| {
			MacError::computation("BLAKE3 computation was not started")
		})?;
		hasher.update(data);
		Ok(())
	}

	fn finalize(&mut self, out: &mut [u8]) -> Result<usize, MacError> {
		let hasher = self.hasher.take().ok_or_else(|| {
			MacError::computation("BLAKE3 computation was not started")
		})?;
		hasher.finalize_xof().fill(&mut out[..self.size]);
		Ok(self.size)
	}

	fn duplicate(&self) -> Result<Box<dyn MacMethod>, MacError> {
		Ok(Box::new(Blake3State {
			key: self.key.clone(),
			size: self.size,
			hasher: self.hasher.clone(),
		}))
	}

	fn runtime_controls(&self) -> &'static [ControlCommand] {
		&[ControlCommand::SetSize]
	}
}

fn create_blake3_keyed() -> Result<Box<dyn MacMethod>, MacError> {
	Ok(Box::new(Blake3State {
		key: None,
		size: POLICY.default_size(),
		hasher: None,
	}))
}

#[cfg(test)]
mod tests {
	use super::*;

	const KEY: [u8; 32] = [0x42; 32];

	fn mac(size: usize, chunks: &[&[u8]]) -> Vec<u8> {
		let mut state = create_blake3_keyed().unwrap();
		state.configure(&MacControl::key(KEY)).unwrap();
		state.configure(&MacControl::Size(size)).unwrap();
		state.init().unwrap();
		for chunk in chunks {
			state.update(chunk).unwrap();
		}
		let mut out = vec![0u8; state.size()];
		state.finalize(&mut out).unwrap();
		out
	}

	#[test]
	fn default_output_matches_keyed_hash() {
		let expected = blake3::keyed_hash(&KEY, b"The quick brown fox");
		assert_eq!(mac(32, &[b"The quick brown fox"]), expected.as_bytes());
		assert_eq!(
			mac(32, &[b"The quick", b" brown", b" fox"]),
			expected.as_bytes()
		);
	}

	#[test]
	fn longer_outputs_extend_the_default() {
		let short = mac(32, &[b"abc"]);
		let long = mac(100, &[b"abc"]);
		assert_eq!(long.len(), 100);
		assert_eq!(&long[..32], short.as_slice());
	}

	#[test]
	fn key_must_be_32_bytes() {
		let mut state = create_blake3_keyed().unwrap();
		let err = state.configure(&MacControl::key([1u8; 16])).unwrap_err();
		assert!(err.message().contains("32-byte"));
		assert!(state.configure(&MacControl::Size(65537)).is_err());
	}

	#[test]
	fn xof_control_is_unsupported() {
		let mut state = create_blake3_keyed().unwrap();
		let err = state.configure(&MacControl::Xof(true)).unwrap_err();
		assert!(err.is_unsupported());
	}

	#[test]
	fn size_can_change_mid_stream() {
		let mut state = create_blake3_keyed().unwrap();
		state.configure(&MacControl::key(KEY)).unwrap();
		state.init().unwrap();
		state.update(b"abc").unwrap();
		state.configure(&MacControl::Size(100)).unwrap();
		let mut out = vec![0u8; 100];
		assert_eq!(state.finalize(&mut out).unwrap(), 100);
		assert_eq!(out, mac(100, &[b"abc"]));
	}
}
