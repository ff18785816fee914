// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: hmac.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! HMAC (RFC 2104) over any digest exposed by the provider layer.

use zeroize::Zeroizing;

use super::control::{ControlCommand, MacControl};
use super::error::MacError;
use super::method::{MacFamily, MacMethod, SizePolicy};
use super::registry::{MacAlgorithm, MacAlgorithmMetadata};
use crate::rgm::provider::{
	Computation, DigestAlgorithm, DigestContext, Engine,
};

const DISPLAY_NAME: &str = "HMAC";
const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

const CONTROLS: &[ControlCommand] = &[
	ControlCommand::SetKey,
	ControlCommand::SetEngine,
	ControlCommand::SetMd,
];

static ALGORITHMS: [MacAlgorithm; 1] = [MacAlgorithm::new(
	MacAlgorithmMetadata::new(
		"hmac",
		DISPLAY_NAME,
		855,
		MacFamily::HashBased,
		SizePolicy::Delegated,
		CONTROLS,
	),
	create_hmac,
)];

pub fn catalog() -> &'static [MacAlgorithm] {
	&ALGORITHMS
}

/// Contexts primed with the padded key; cloned at every `init`.
struct Pads {
	inner: DigestContext,
	outer: DigestContext,
}

impl Pads {
	fn prepare(
		digest: DigestAlgorithm,
		engine: Engine,
		key: &[u8],
	) -> Result<Self, MacError> {
		let block_size = digest.block_size();
		let mut block = Zeroizing::new(vec![0u8; block_size]);
		if key.len() > block_size {
			let hashed =
				Zeroizing::new(DigestContext::digest(digest, engine, key)?);
			block[..hashed.len()].copy_from_slice(&hashed);
		} else {
			block[..key.len()].copy_from_slice(key);
		}

		let mut pad = Zeroizing::new(vec![0u8; block_size]);
		let mut inner = DigestContext::bind(digest, engine)?;
		for (p, k) in pad.iter_mut().zip(block.iter()) {
			*p = k ^ IPAD;
		}
		inner.feed(&pad)?;
		let mut outer = DigestContext::bind(digest, engine)?;
		for (p, k) in pad.iter_mut().zip(block.iter()) {
			*p = k ^ OPAD;
		}
		outer.feed(&pad)?;
		Ok(Self { inner, outer })
	}

	fn duplicate(&self) -> Result<Self, MacError> {
		Ok(Self {
			inner: self.inner.duplicate()?,
			outer: self.outer.duplicate()?,
		})
	}
}

struct HmacState {
	engine: Engine,
	digest: Option<DigestAlgorithm>,
	key: Option<Zeroizing<Vec<u8>>>,
	pads: Option<Pads>,
	running: Option<DigestContext>,
}

impl HmacState {
	fn rekey(&mut self) -> Result<(), MacError> {
		self.running = None;
		self.pads = match (self.digest, self.key.as_ref()) {
			(Some(digest), Some(key)) => {
				Some(Pads::prepare(digest, self.engine, key)?)
			}
			_ => None,
		};
		Ok(())
	}

	fn running(&mut self) -> Result<&mut DigestContext, MacError> {
		self.running.as_mut().ok_or_else(|| {
			MacError::computation("HMAC computation was not started")
		})
	}
}

impl MacMethod for HmacState {
	fn size(&self) -> usize {
		self.digest.map(DigestAlgorithm::output_size).unwrap_or(0)
	}

	fn configure(&mut self, control: &MacControl) -> Result<(), MacError> {
		match control {
			MacControl::Key(key) => {
				self.key = Some(key.clone());
				self.rekey()
			}
			MacControl::Digest(digest) => {
				self.digest = Some(*digest);
				self.rekey()
			}
			MacControl::Engine(engine) => {
				self.engine = *engine;
				self.rekey()
			}
			other => {
				Err(MacError::unsupported(DISPLAY_NAME, other.command()))
			}
		}
	}

	fn init(&mut self) -> Result<(), MacError> {
		let digest = self.digest.ok_or_else(|| {
			MacError::computation("HMAC requires a digest (SET_MD)")
		})?;
		let pads = self.pads.as_ref().ok_or_else(|| {
			MacError::computation("HMAC requires a key (SET_KEY)")
		})?;
		self.running = Some(pads.inner.duplicate()?);
		if digest.is_legacy() {
			tracing::debug!(
				digest = digest.name(),
				"HMAC started over a legacy digest"
			);
		}
		Ok(())
	}

	fn update(&mut self, data: &[u8]) -> Result<(), MacError> {
		self.running()?.feed(data)
	}

	fn finalize(&mut self, out: &mut [u8]) -> Result<usize, MacError> {
		let size = self.size();
		let mut inner_hash = Zeroizing::new(vec![0u8; size]);
		self.running()?.finish(&mut inner_hash)?;
		self.running = None;
		let pads = self.pads.as_ref().ok_or_else(|| {
			MacError::computation("HMAC key was cleared")
		})?;
		let mut outer = pads.outer.duplicate()?;
		outer.feed(&inner_hash)?;
		outer.finish(out)
	}

	fn duplicate(&self) -> Result<Box<dyn MacMethod>, MacError> {
		let pads = match &self.pads {
			Some(pads) => Some(pads.duplicate()?),
			None => None,
		};
		let running = match &self.running {
			Some(running) => Some(running.duplicate()?),
			None => None,
		};
		Ok(Box::new(HmacState {
			engine: self.engine,
			digest: self.digest,
			key: self.key.clone(),
			pads,
			running,
		}))
	}
}

fn create_hmac() -> Result<Box<dyn MacMethod>, MacError> {
	Ok(Box::new(HmacState {
		engine: Engine::default(),
		digest: None,
		key: None,
		pads: None,
		running: None,
	}))
}

#[cfg(test)]
mod tests {
	use super::*;
	use ::hmac::{Hmac, Mac};
	use hex_literal::hex;

	fn compute(
		digest: DigestAlgorithm,
		key: &[u8],
		chunks: &[&[u8]],
	) -> Vec<u8> {
		let mut state = create_hmac().unwrap();
		state.configure(&MacControl::Digest(digest)).unwrap();
		state.configure(&MacControl::key(key)).unwrap();
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
	fn empty_key_empty_message_vectors() {
		assert_eq!(
			compute(DigestAlgorithm::Sha256, b"", &[]),
			hex!("b613679a0814d9ec772f95d778c35fc5ff1697c493715653c6c712144292c5ad")
		);
		assert_eq!(
			compute(DigestAlgorithm::Sha1, b"", &[]),
			hex!("fbdb1d1b18aa6c08324b7d64b71fb76370690e1d")
		);
		assert_eq!(
			compute(DigestAlgorithm::Md5, b"", &[]),
			hex!("74e6f7298a9c2d168935f58c001bad88")
		);
		assert_eq!(
			compute(DigestAlgorithm::Sha3_256, b"", &[]),
			hex!("e841c164e5b4f10c9f3985587962af72fd607a951196fc92fb3a5251941784ea")
		);
	}

	#[test]
	fn long_keys_are_hashed_first() {
		let key = [b'k'; 200];
		assert_eq!(
			compute(DigestAlgorithm::Sha512, &key, &[b"The quick brown fox"]),
			hex!("3810596bd662c8dbf0e052d211e0b26af70219cc99c82c96898826595d3902b9549b3cac6d858e10fac63415eb3f56c1438b7cd0639e6f977f1ace0d79df4f2a")
		);
	}

	#[test]
	fn matches_hmac_crate() {
		let key = b"supersecretkey";
		let mut oracle = Hmac::<sha2::Sha384>::new_from_slice(key).unwrap();
		oracle.update(b"alpha beta");
		let expected = oracle.finalize().into_bytes();
		assert_eq!(
			compute(DigestAlgorithm::Sha384, key, &[b"alpha", b" beta"]),
			expected.as_slice()
		);
	}

	#[test]
	fn key_before_digest_is_remembered() {
		let mut state = create_hmac().unwrap();
		state.configure(&MacControl::key(b"key")).unwrap();
		assert_eq!(state.size(), 0);
		assert!(state.init().is_err());
		state
			.configure(&MacControl::Digest(DigestAlgorithm::Sha256))
			.unwrap();
		assert_eq!(state.size(), 32);
		state.init().unwrap();
		state.update(b"The quick brown fox").unwrap();
		let mut out = [0u8; 32];
		state.finalize(&mut out).unwrap();
		assert_eq!(
			out,
			hex!("203d1e5cedd2d18f8c5a3beff0bd9c1ebcb97097dfcb288c46b00c9227fde2c0")
		);
	}

	#[test]
	fn cipher_control_is_unsupported() {
		let mut state = create_hmac().unwrap();
		let cipher = "aes-128-cbc".parse().unwrap();
		let err = state.configure(&MacControl::Cipher(cipher)).unwrap_err();
		assert!(err.is_unsupported());
	}

	#[test]
	fn flags_are_unsupported() {
		let mut state = create_hmac().unwrap();
		state
			.configure(&MacControl::Digest(DigestAlgorithm::Sha256))
			.unwrap();
		let err = state.configure(&MacControl::Flags(0x100)).unwrap_err();
		assert!(err.is_unsupported());
		assert!(state.runtime_controls().is_empty());
		assert!(!ALGORITHMS[0]
			.metadata
			.controls
			.contains(&ControlCommand::SetFlags));
	}
}
