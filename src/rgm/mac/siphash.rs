// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: siphash.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! SipHash-2-4 with 64- or 128-bit output.

use siphasher::sip128::Hasher128;
use siphasher::{sip, sip128};
use std::hash::Hasher;
use zeroize::Zeroizing;

use super::control::{ControlCommand, MacControl};
use super::error::MacError;
use super::method::{MacFamily, MacMethod, SizePolicy};
use super::registry::{MacAlgorithm, MacAlgorithmMetadata};

const DISPLAY_NAME: &str = "SipHash";
const KEY_LENGTH: usize = 16;
const POLICY: SizePolicy = SizePolicy::Choice {
	sizes: &[8, 16],
	default: 16,
};

static ALGORITHMS: [MacAlgorithm; 1] = [MacAlgorithm::new(
	MacAlgorithmMetadata::new(
		"siphash",
		DISPLAY_NAME,
		1062,
		MacFamily::DirectKeyed,
		POLICY,
		&[ControlCommand::SetKey, ControlCommand::SetSize],
	),
	create_siphash,
)];

pub fn catalog() -> &'static [MacAlgorithm] {
	&ALGORITHMS
}

#[derive(Clone)]
enum Running {
	Short(sip::SipHasher24),
	Long(sip128::SipHasher24),
}

struct SipHashState {
	key: Option<Zeroizing<[u8; KEY_LENGTH]>>,
	size: usize,
	running: Option<Running>,
}

impl MacMethod for SipHashState {
	fn size(&self) -> usize {
		self.size
	}

	fn configure(&mut self, control: &MacControl) -> Result<(), MacError> {
		match control {
			MacControl::Key(key) => {
				let fixed: [u8; KEY_LENGTH] =
					key.as_slice().try_into().map_err(|_| {
						MacError::invalid_value(format!(
							"SipHash requires a {}-byte key but received {}",
							KEY_LENGTH,
							key.len()
						))
					})?;
				self.key = Some(Zeroizing::new(fixed));
			}
			MacControl::Size(size) => {
				self.size = POLICY.check(DISPLAY_NAME, *size)?;
			}
			other => {
				return Err(MacError::unsupported(
					DISPLAY_NAME,
					other.command(),
				))
			}
		}
		self.running = None;
		Ok(())
	}

	fn init(&mut self) -> Result<(), MacError> {
		let key = self.key.as_ref().ok_or_else(|| {
			MacError::computation("SipHash requires a key (SET_KEY)")
		})?;
		self.running = Some(if self.size == 8 {
			Running::Short(sip::SipHasher24::new_with_key(key))
		} else {
			Running::Long(sip128::SipHasher24::new_with_key(key))
		});
		Ok(())
	}

	fn update(&mut self, data: &[u8]) -> Result<(), MacError> {
		match self.running.as_mut() {
			Some(Running::Short(hasher)) => hasher.write(data),
			Some(Running::Long(hasher)) => hasher.write(data),
			None => {
				return Err(MacError::computation(
					"SipHash computation was not started",
				))
			}
		}
		Ok(())
	}

	fn finalize(&mut self, out: &mut [u8]) -> Result<usize, MacError> {
		match self.running.take() {
			Some(Running::Short(hasher)) => {
				out[..8].copy_from_slice(&hasher.finish().to_le_bytes());
				Ok(8)
			}
			Some(Running::Long(hasher)) => {
				out[..16].copy_from_slice(&hasher.finish128().as_bytes());
				Ok(16)
			}
			None => Err(MacError::computation(
				"SipHash computation was not started",
			)),
		}
	}

	fn duplicate(&self) -> Result<Box<dyn MacMethod>, MacError> {
		Ok(Box::new(SipHashState {
			key: self.key.clone(),
			size: self.size,
			running: self.running.clone(),
		}))
	}
}

fn create_siphash() -> Result<Box<dyn MacMethod>, MacError> {
	Ok(Box::new(SipHashState {
		key: None,
		size: POLICY.default_size(),
		running: None,
	}))
}

#[cfg(test)]
mod tests {
	use super::*;
	use hex_literal::hex;

	const KEY: [u8; 16] = hex!("000102030405060708090a0b0c0d0e0f");

	fn mac(size: usize, chunks: &[&[u8]]) -> Vec<u8> {
		let mut state = create_siphash().unwrap();
		state.configure(&MacControl::key(KEY)).unwrap();
		state.configure(&MacControl::Size(size)).unwrap();
		state.init().unwrap();
		for chunk in chunks {
			state.update(chunk).unwrap();
		}
		let mut out = vec![0u8; state.size()];
		let written = state.finalize(&mut out).unwrap();
		out.truncate(written);
		out
	}

	#[test]
	fn reference_vectors() {
		assert_eq!(mac(8, &[]), hex!("310e0edd47db6f72"));
		assert_eq!(mac(16, &[]), hex!("a3817f04ba25a8e66df67214c7550293"));
		assert_eq!(
			mac(16, &[b"The quick brown fox"]),
			hex!("938cbf5322cad55f882f4718ba02d999")
		);
		assert_eq!(
			mac(8, &[b"The qu", b"ick brow", b"n fox"]),
			hex!("38af6ea7f552c834")
		);
	}

	#[test]
	fn size_defaults_to_sixteen() {
		let state = create_siphash().unwrap();
		assert_eq!(state.size(), 16);
	}

	#[test]
	fn invalid_size_and_key_are_rejected() {
		let mut state = create_siphash().unwrap();
		assert!(state.configure(&MacControl::Size(12)).is_err());
		assert_eq!(state.size(), 16);
		assert!(state.configure(&MacControl::key([0u8; 15])).is_err());
		assert!(state
			.configure(&MacControl::Xof(true))
			.unwrap_err()
			.is_unsupported());
	}
}
