// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: gmac.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! GMAC: GCM authentication over additional data only
//! (NIST SP 800-38D).

use ghash::universal_hash::{KeyInit, UniversalHash};
use ghash::GHash;
use zeroize::{Zeroize, Zeroizing};

use super::control::{ControlCommand, MacControl};
use super::error::MacError;
use super::method::{MacFamily, MacMethod, SizePolicy};
use super::registry::{MacAlgorithm, MacAlgorithmMetadata};
use crate::rgm::provider::cipher::BLOCK_SIZE;
use crate::rgm::provider::{
	CipherAlgorithm, CipherContext, CipherMode, Engine,
};

const DISPLAY_NAME: &str = "GMAC";
const TAG_SIZE: usize = 16;
const NONCE_SIZE: usize = 12;

const CONTROLS: &[ControlCommand] = &[
	ControlCommand::SetKey,
	ControlCommand::SetIv,
	ControlCommand::SetEngine,
	ControlCommand::SetCipher,
];

static ALGORITHMS: [MacAlgorithm; 1] = [MacAlgorithm::new(
	MacAlgorithmMetadata::new(
		"gmac",
		DISPLAY_NAME,
		1195,
		MacFamily::CipherBased,
		SizePolicy::Fixed(TAG_SIZE),
		CONTROLS,
	)
	.with_oid("1.0.9797.3.4"),
	create_gmac,
)];

pub fn catalog() -> &'static [MacAlgorithm] {
	&ALGORITHMS
}

type Block = [u8; BLOCK_SIZE];

struct GmacState {
	engine: Engine,
	cipher: Option<CipherContext>,
	key: Option<Zeroizing<Vec<u8>>>,
	iv: Option<Vec<u8>>,
	ghash: Option<GHash>,
	j0: Block,
	buffer: Block,
	buffered: usize,
	aad_len: u64,
}

impl GmacState {
	fn select(&mut self, algorithm: CipherAlgorithm) -> Result<(), MacError> {
		if algorithm.mode != CipherMode::Gcm {
			return Err(MacError::invalid_value(format!(
				"GMAC requires a GCM cipher, not {}",
				algorithm
			)));
		}
		self.cipher = Some(CipherContext::bind(algorithm, self.engine)?);
		self.clear_stream();
		if let Some(key) = self.key.take() {
			if key.len() == algorithm.key_len() {
				self.apply_key(key)?;
			} else {
				tracing::debug!(
					cipher = algorithm.name(),
					"dropping GMAC key that does not fit the new cipher"
				);
			}
		}
		Ok(())
	}

	fn apply_key(
		&mut self,
		key: Zeroizing<Vec<u8>>,
	) -> Result<(), MacError> {
		let cipher = self.cipher.as_mut().ok_or_else(|| {
			MacError::invalid_value(
				"GMAC requires a cipher (SET_CIPHER) before the key",
			)
		})?;
		cipher.set_key(&key)?;
		self.key = Some(key);
		self.clear_stream();
		Ok(())
	}

	fn clear_stream(&mut self) {
		self.ghash = None;
		self.j0.zeroize();
		self.buffer.zeroize();
		self.buffered = 0;
		self.aad_len = 0;
	}

	fn keyed_cipher(&self) -> Result<&CipherContext, MacError> {
		match self.cipher.as_ref() {
			Some(cipher) if cipher.is_keyed() => Ok(cipher),
			Some(_) => {
				Err(MacError::computation("GMAC requires a key (SET_KEY)"))
			}
			None => Err(MacError::computation(
				"GMAC requires a cipher (SET_CIPHER)",
			)),
		}
	}

	fn ghash(&mut self) -> Result<&mut GHash, MacError> {
		self.ghash.as_mut().ok_or_else(|| {
			MacError::computation("GMAC computation was not started")
		})
	}
}

/// Pre-counter block: `IV || 0^31 || 1` for 96-bit IVs, otherwise
/// GHASH over the padded IV and its bit length.
fn pre_counter(hash_key: &Block, iv: &[u8]) -> Block {
	let mut j0 = [0u8; BLOCK_SIZE];
	if iv.len() == NONCE_SIZE {
		j0[..NONCE_SIZE].copy_from_slice(iv);
		j0[BLOCK_SIZE - 1] = 1;
		return j0;
	}
	let mut ghash = GHash::new(ghash::Key::from_slice(hash_key));
	ghash.update_padded(iv);
	let mut lengths = [0u8; BLOCK_SIZE];
	lengths[8..].copy_from_slice(&((iv.len() as u64) * 8).to_be_bytes());
	ghash.update_padded(&lengths);
	j0.copy_from_slice(ghash.finalize().as_slice());
	j0
}

impl MacMethod for GmacState {
	fn size(&self) -> usize {
		TAG_SIZE
	}

	fn configure(&mut self, control: &MacControl) -> Result<(), MacError> {
		match control {
			MacControl::Cipher(algorithm) => self.select(*algorithm),
			MacControl::Engine(engine) => {
				self.engine = *engine;
				match self.cipher.as_ref().map(|c| c.algorithm()) {
					Some(algorithm) => self.select(algorithm),
					None => Ok(()),
				}
			}
			MacControl::Key(key) => self.apply_key(key.clone()),
			MacControl::Iv(iv) => {
				if iv.is_empty() {
					return Err(MacError::invalid_value(
						"GMAC IV must not be empty",
					));
				}
				self.iv = Some(iv.clone());
				self.clear_stream();
				Ok(())
			}
			other => {
				Err(MacError::unsupported(DISPLAY_NAME, other.command()))
			}
		}
	}

	fn init(&mut self) -> Result<(), MacError> {
		let cipher = self.keyed_cipher()?;
		let iv = self.iv.as_ref().ok_or_else(|| {
			MacError::computation("GMAC requires an IV (SET_IV)")
		})?;
		let mut hash_key = [0u8; BLOCK_SIZE];
		cipher.encrypt_block(&mut hash_key)?;
		let j0 = pre_counter(&hash_key, iv);
		let ghash = GHash::new(ghash::Key::from_slice(&hash_key));
		hash_key.zeroize();
		self.clear_stream();
		self.j0 = j0;
		self.ghash = Some(ghash);
		Ok(())
	}

	fn update(&mut self, data: &[u8]) -> Result<(), MacError> {
		self.ghash()?;
		self.aad_len = self.aad_len.wrapping_add(data.len() as u64);
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
			let buffer = self.buffer;
			self.ghash()?.update_padded(&buffer);
			self.buffered = 0;
		}
		let whole = data.len() - data.len() % BLOCK_SIZE;
		let (blocks, tail) = data.split_at(whole);
		self.ghash()?.update_padded(blocks);
		self.buffer[..tail.len()].copy_from_slice(tail);
		self.buffered = tail.len();
		Ok(())
	}

	fn finalize(&mut self, out: &mut [u8]) -> Result<usize, MacError> {
		let mut ghash = self.ghash.take().ok_or_else(|| {
			MacError::computation("GMAC computation was not started")
		})?;
		ghash.update_padded(&self.buffer[..self.buffered]);
		let mut lengths = [0u8; BLOCK_SIZE];
		lengths[..8]
			.copy_from_slice(&self.aad_len.wrapping_mul(8).to_be_bytes());
		ghash.update_padded(&lengths);
		let mut mask = self.j0;
		self.keyed_cipher()?.encrypt_block(&mut mask)?;
		for ((o, s), m) in out
			.iter_mut()
			.zip(ghash.finalize().iter())
			.zip(mask.iter())
		{
			*o = s ^ m;
		}
		mask.zeroize();
		self.clear_stream();
		Ok(TAG_SIZE)
	}

	fn duplicate(&self) -> Result<Box<dyn MacMethod>, MacError> {
		Ok(Box::new(GmacState {
			engine: self.engine,
			cipher: self.cipher.clone(),
			key: self.key.clone(),
			iv: self.iv.clone(),
			ghash: self.ghash.clone(),
			j0: self.j0,
			buffer: self.buffer,
			buffered: self.buffered,
			aad_len: self.aad_len,
		}))
	}
}

impl Drop for GmacState {
	fn drop(&mut self) {
		self.j0.zeroize();
		self.buffer.zeroize();
	}
}

fn create_gmac() -> Result<Box<dyn MacMethod>, MacError> {
	Ok(Box::new(GmacState {
		engine: Engine::default(),
		cipher: None,
		key: None,
		iv: None,
		ghash: None,
		j0: [0u8; BLOCK_SIZE],
		buffer: [0u8; BLOCK_SIZE],
		buffered: 0,
		aad_len: 0,
	}))
}
