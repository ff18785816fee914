// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: cmac.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! CMAC (NIST SP 800-38B / RFC 4493) through the `cmac` crate.

use zeroize::Zeroizing;

use super::control::{ControlCommand, MacControl};
use super::error::MacError;
use super::method::{MacFamily, MacMethod, SizePolicy};
use super::registry::{MacAlgorithm, MacAlgorithmMetadata};
use crate::rgm::provider::{
	CipherAlgorithm, CipherMode, CmacContext, Computation, Engine,
};

const DISPLAY_NAME: &str = "CMAC";

const CONTROLS: &[ControlCommand] = &[
	ControlCommand::SetKey,
	ControlCommand::SetEngine,
	ControlCommand::SetCipher,
];

static ALGORITHMS: [MacAlgorithm; 1] = [MacAlgorithm::new(
	MacAlgorithmMetadata::new(
		"cmac",
		DISPLAY_NAME,
		894,
		MacFamily::CipherBased,
		SizePolicy::Delegated,
		CONTROLS,
	),
	create_cmac,
)];

pub fn catalog() -> &'static [MacAlgorithm] {
	&ALGORITHMS
}

struct CmacState {
	engine: Engine,
	mac: Option<CmacContext>,
	key: Option<Zeroizing<Vec<u8>>>,
}

impl CmacState {
	fn select(&mut self, algorithm: CipherAlgorithm) -> Result<(), MacError> {
		if !matches!(algorithm.mode, CipherMode::Cbc | CipherMode::Ecb) {
			return Err(MacError::invalid_value(format!(
				"CMAC requires a CBC or ECB block cipher, not {}",
				algorithm
			)));
		}
		self.mac = Some(CmacContext::bind(algorithm, self.engine)?);
		if let Some(key) = self.key.take() {
			if key.len() == algorithm.key_len() {
				self.apply_key(key)?;
			} else {
				tracing::debug!(
					cipher = algorithm.name(),
					"dropping CMAC key that does not fit the new cipher"
				);
			}
		}
		Ok(())
	}

	fn apply_key(
		&mut self,
		key: Zeroizing<Vec<u8>>,
	) -> Result<(), MacError> {
		let mac = self.mac.as_mut().ok_or_else(|| {
			MacError::invalid_value(
				"CMAC requires a cipher (SET_CIPHER) before the key",
			)
		})?;
		mac.set_key(&key)?;
		self.key = Some(key);
		Ok(())
	}

	fn keyed(&mut self) -> Result<&mut CmacContext, MacError> {
		match self.mac.as_mut() {
			Some(mac) if mac.is_keyed() => Ok(mac),
			Some(_) => {
				Err(MacError::computation("CMAC requires a key (SET_KEY)"))
			}
			None => Err(MacError::computation(
				"CMAC requires a cipher (SET_CIPHER)",
			)),
		}
	}
}

impl MacMethod for CmacState {
	fn size(&self) -> usize {
		self.mac
			.as_ref()
			.map(|mac| mac.algorithm().block_size())
			.unwrap_or(0)
	}

	fn configure(&mut self, control: &MacControl) -> Result<(), MacError> {
		match control {
			MacControl::Cipher(algorithm) => self.select(*algorithm),
			MacControl::Engine(engine) => {
				self.engine = *engine;
				match self.mac.as_ref().map(|mac| mac.algorithm()) {
					Some(algorithm) => self.select(algorithm),
					None => Ok(()),
				}
			}
			MacControl::Key(key) => self.apply_key(key.clone()),
			other => {
				Err(MacError::unsupported(DISPLAY_NAME, other.command()))
			}
		}
	}

	fn init(&mut self) -> Result<(), MacError> {
		self.keyed()?.reset();
		Ok(())
	}

	fn update(&mut self, data: &[u8]) -> Result<(), MacError> {
		self.keyed()?.feed(data)
	}

	fn finalize(&mut self, out: &mut [u8]) -> Result<usize, MacError> {
		self.keyed()?.finish(out)
	}

	fn duplicate(&self) -> Result<Box<dyn MacMethod>, MacError> {
		let mac = match &self.mac {
			Some(mac) => Some(mac.duplicate()?),
			None => None,
		};
		Ok(Box::new(CmacState {
			engine: self.engine,
			mac,
			key: self.key.clone(),
		}))
	}
}

fn create_cmac() -> Result<Box<dyn MacMethod>, MacError> {
	Ok(Box::new(CmacState {
		engine: Engine::default(),
		mac: None,
		key: None,
	}))
}

#[cfg(test)]
mod tests {
	use super::*;
	use hex_literal::hex;

	const RFC_KEY: [u8; 16] = hex!("2b7e151628aed2a6abf7158809cf4f3c");
	const RFC_MESSAGE: [u8; 64] = hex!("6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e5130c81c46a35ce411e5fbc1191a0a52eff69f2445df4f9b17ad2b417be66c3710");

	fn keyed(cipher: &str, key: &[u8]) -> Box<dyn MacMethod> {
		let mut state = create_cmac().unwrap();
		state
			.configure(&MacControl::Cipher(cipher.parse().unwrap()))
			.unwrap();
		state.configure(&MacControl::key(key)).unwrap();
		state
	}

	fn tag(state: &mut Box<dyn MacMethod>, chunks: &[&[u8]]) -> [u8; 16] {
		state.init().unwrap();
		for chunk in chunks {
			state.update(chunk).unwrap();
		}
		let mut out = [0u8; 16];
		assert_eq!(state.finalize(&mut out).unwrap(), 16);
		out
	}

	#[test]
	fn rfc4493_vectors() {
		let mut state = keyed("aes-128-cbc", &RFC_KEY);
		assert_eq!(tag(&mut state, &[]), hex!("bb1d6929e95937287fa37d129b756746"));
		assert_eq!(
			tag(&mut state, &[&RFC_MESSAGE[..16]]),
			hex!("070a16b46b4d4144f79bdd9dd04a287c")
		);
		assert_eq!(
			tag(&mut state, &[&RFC_MESSAGE[..40]]),
			hex!("dfa66747de9ae63030ca32611497c827")
		);
		assert_eq!(
			tag(&mut state, &[&RFC_MESSAGE[..]]),
			hex!("51f0bebf7e3b9d92fc49741779363cfe")
		);
	}

	#[test]
	fn block_boundary_chunks_are_invariant() {
		let mut state = keyed("aes-128-cbc", &RFC_KEY);
		let chunked = tag(
			&mut state,
			&[&RFC_MESSAGE[..16], &RFC_MESSAGE[16..32], &RFC_MESSAGE[32..]],
		);
		let uneven = tag(
			&mut state,
			&[&RFC_MESSAGE[..1], &RFC_MESSAGE[1..33], &[], &RFC_MESSAGE[33..]],
		);
		assert_eq!(chunked, hex!("51f0bebf7e3b9d92fc49741779363cfe"));
		assert_eq!(uneven, chunked);
	}

	#[test]
	fn key_requires_cipher() {
		let mut state = create_cmac().unwrap();
		assert_eq!(state.size(), 0);
		let err = state.configure(&MacControl::key(RFC_KEY)).unwrap_err();
		assert_eq!(
			err.kind(),
			crate::rgm::mac::error::MacErrorKind::InvalidControlValue
		);
	}

	#[test]
	fn gcm_cipher_is_rejected() {
		let mut state = create_cmac().unwrap();
		let err = state
			.configure(&MacControl::Cipher("aes-128-gcm".parse().unwrap()))
			.unwrap_err();
		assert!(!err.is_unsupported());
	}

	#[test]
	fn wrong_key_length_is_invalid() {
		let mut state = create_cmac().unwrap();
		state
			.configure(&MacControl::Cipher("aes-256-cbc".parse().unwrap()))
			.unwrap();
		assert!(state.configure(&MacControl::key(RFC_KEY)).is_err());
		assert!(state.init().is_err());
	}

	#[test]
	fn key_survives_a_cipher_change_when_it_fits() {
		let mut state = keyed("aes-128-ecb", &RFC_KEY);
		state
			.configure(&MacControl::Cipher("aes-128-cbc".parse().unwrap()))
			.unwrap();
		assert_eq!(
			tag(&mut state, &[&RFC_MESSAGE[..16]]),
			hex!("070a16b46b4d4144f79bdd9dd04a287c")
		);
		state
			.configure(&MacControl::Cipher("aes-256-cbc".parse().unwrap()))
			.unwrap();
		assert!(state.init().is_err());
	}

	#[test]
	fn duplicate_forks_a_running_tag() {
		let mut state = keyed("aes-128-cbc", &RFC_KEY);
		state.init().unwrap();
		state.update(&RFC_MESSAGE[..20]).unwrap();
		let mut fork = state.duplicate().unwrap();
		state.update(&RFC_MESSAGE[20..40]).unwrap();
		fork.update(&RFC_MESSAGE[20..]).unwrap();
		let mut left = [0u8; 16];
		let mut right = [0u8; 16];
		state.finalize(&mut left).unwrap();
		fork.finalize(&mut right).unwrap();
		assert_eq!(left, hex!("dfa66747de9ae63030ca32611497c827"));
		assert_eq!(right, hex!("51f0bebf7e3b9d92fc49741779363cfe"));
	}

	#[test]
	fn aes192_matches_a_one_shot_cmac() {
		use ::cmac::{Cmac, Mac};
		let key = hex!("8e73b0f7da0e6452c810f32b809079e562f8ead2522c6b7b");
		let mut oracle = Cmac::<aes::Aes192>::new_from_slice(&key).unwrap();
		oracle.update(&RFC_MESSAGE[..40]);
		let expected = oracle.finalize().into_bytes();
		let mut state = keyed("aes-192-cbc", &key);
		assert_eq!(
			tag(&mut state, &[&RFC_MESSAGE[..7], &RFC_MESSAGE[7..40]])
				.as_slice(),
			expected.as_slice()
		);
	}
}
