// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: adapter.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Computation contexts owned by delegating MAC algorithms.
//!
//! A [`DigestContext`] wraps a running hash, a [`CmacContext`] a running
//! CMAC and a [`CipherContext`] a bare keyed AES schedule. Each is owned
//! by exactly one algorithm state and deep-copied on duplication. None of
//! them interprets MAC-level controls.

use ::digest::DynDigest;
use aes::{Aes128, Aes192, Aes256};
use cmac::{Cmac, Mac};
use std::fmt;

use super::cipher::{
	AesKeySize, CipherAlgorithm, KeyedBlockCipher, BLOCK_SIZE,
};
use super::digest::DigestAlgorithm;
use super::Engine;
use crate::rgm::mac::error::{MacError, MacErrorKind};

/// Narrow surface shared by the digest and CMAC computations.
pub trait Computation: Sized {
	fn output_size(&self) -> usize;
	fn reset(&mut self);
	fn feed(&mut self, data: &[u8]) -> Result<(), MacError>;
	/// Writes `output_size()` bytes into `out` and resets.
	fn finish(&mut self, out: &mut [u8]) -> Result<usize, MacError>;
	fn duplicate(&self) -> Result<Self, MacError>;
}

fn check_output(out: &[u8], needed: usize) -> Result<(), MacError> {
	if out.len() < needed {
		return Err(MacError::new(
			MacErrorKind::BufferTooSmall,
			format!(
				"output buffer holds {} bytes but {} are required",
				out.len(),
				needed
			),
		));
	}
	Ok(())
}

pub struct DigestContext {
	algorithm: DigestAlgorithm,
	engine: Engine,
	hasher: Box<dyn DynDigest>,
}

impl DigestContext {
	pub fn bind(
		algorithm: DigestAlgorithm,
		engine: Engine,
	) -> Result<Self, MacError> {
		let hasher = match engine {
			Engine::Software => algorithm.new_hasher(),
		};
		Ok(Self {
			algorithm,
			engine,
			hasher,
		})
	}

	pub fn algorithm(&self) -> DigestAlgorithm {
		self.algorithm
	}

	pub fn engine(&self) -> Engine {
		self.engine
	}

	pub fn block_size(&self) -> usize {
		self.algorithm.block_size()
	}

	/// One-shot digest of `data` on a fresh context.
	pub fn digest(
		algorithm: DigestAlgorithm,
		engine: Engine,
		data: &[u8],
	) -> Result<Vec<u8>, MacError> {
		let mut ctx = Self::bind(algorithm, engine)?;
		ctx.feed(data)?;
		let mut out = vec![0u8; ctx.output_size()];
		ctx.finish(&mut out)?;
		Ok(out)
	}
}

impl Computation for DigestContext {
	fn output_size(&self) -> usize {
		self.algorithm.output_size()
	}

	fn reset(&mut self) {
		self.hasher.reset();
	}

	fn feed(&mut self, data: &[u8]) -> Result<(), MacError> {
		self.hasher.update(data);
		Ok(())
	}

	fn finish(&mut self, out: &mut [u8]) -> Result<usize, MacError> {
		let size = self.output_size();
		check_output(out, size)?;
		self.hasher
			.finalize_into_reset(&mut out[..size])
			.map_err(|_| {
				MacError::computation(format!(
					"{} rejected the output buffer",
					self.algorithm
				))
			})?;
		Ok(size)
	}

	fn duplicate(&self) -> Result<Self, MacError> {
		Ok(Self {
			algorithm: self.algorithm,
			engine: self.engine,
			hasher: self.hasher.box_clone(),
		})
	}
}

impl fmt::Debug for DigestContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DigestContext")
			.field("algorithm", &self.algorithm)
			.field("engine", &self.engine)
			.finish_non_exhaustive()
	}
}

#[derive(Clone)]
pub struct CipherContext {
	algorithm: CipherAlgorithm,
	engine: Engine,
	cipher: Option<KeyedBlockCipher>,
}

impl CipherContext {
	pub fn bind(
		algorithm: CipherAlgorithm,
		engine: Engine,
	) -> Result<Self, MacError> {
		match engine {
			Engine::Software => Ok(Self {
				algorithm,
				engine,
				cipher: None,
			}),
		}
	}

	pub fn algorithm(&self) -> CipherAlgorithm {
		self.algorithm
	}

	pub fn engine(&self) -> Engine {
		self.engine
	}

	pub fn is_keyed(&self) -> bool {
		self.cipher.is_some()
	}

	pub fn set_key(&mut self, key: &[u8]) -> Result<(), MacError> {
		let cipher =
			KeyedBlockCipher::new(self.algorithm.key_size, key)
				.map_err(|err| {
					MacError::invalid_value(format!(
						"{}: {}",
						self.algorithm,
						err.message()
					))
				})?;
		self.cipher = Some(cipher);
		Ok(())
	}

	/// Encrypts one block in place.
	pub fn encrypt_block(
		&self,
		block: &mut [u8; BLOCK_SIZE],
	) -> Result<(), MacError> {
		let cipher = self.cipher.as_ref().ok_or_else(|| {
			MacError::computation(format!("{} has no key", self.algorithm))
		})?;
		cipher.encrypt_block(block);
		Ok(())
	}
}

impl fmt::Debug for CipherContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CipherContext")
			.field("algorithm", &self.algorithm)
			.field("engine", &self.engine)
			.field("keyed", &self.is_keyed())
			.finish_non_exhaustive()
	}
}

type CmacAes128 = Cmac<Aes128>;
type CmacAes192 = Cmac<Aes192>;
type CmacAes256 = Cmac<Aes256>;

#[derive(Clone)]
enum CmacVariant {
	Aes128(CmacAes128),
	Aes192(CmacAes192),
	Aes256(CmacAes256),
}

/// Running CMAC from the `cmac` crate over the selected AES key size.
#[derive(Clone)]
pub struct CmacContext {
	algorithm: CipherAlgorithm,
	engine: Engine,
	mac: Option<CmacVariant>,
}

impl CmacContext {
	pub fn bind(
		algorithm: CipherAlgorithm,
		engine: Engine,
	) -> Result<Self, MacError> {
		match engine {
			Engine::Software => Ok(Self {
				algorithm,
				engine,
				mac: None,
			}),
		}
	}

	pub fn algorithm(&self) -> CipherAlgorithm {
		self.algorithm
	}

	pub fn engine(&self) -> Engine {
		self.engine
	}

	pub fn is_keyed(&self) -> bool {
		self.mac.is_some()
	}

	pub fn set_key(&mut self, key: &[u8]) -> Result<(), MacError> {
		let algorithm = self.algorithm;
		if key.len() != algorithm.key_len() {
			return Err(MacError::invalid_value(format!(
				"{}: expected a {}-byte key but received {}",
				algorithm,
				algorithm.key_len(),
				key.len()
			)));
		}
		let rejected = |_| {
			MacError::invalid_value(format!(
				"{} rejected the provided key",
				algorithm
			))
		};
		let mac = match algorithm.key_size {
			AesKeySize::Aes128 => CmacVariant::Aes128(
				CmacAes128::new_from_slice(key).map_err(rejected)?,
			),
			AesKeySize::Aes192 => CmacVariant::Aes192(
				CmacAes192::new_from_slice(key).map_err(rejected)?,
			),
			AesKeySize::Aes256 => CmacVariant::Aes256(
				CmacAes256::new_from_slice(key).map_err(rejected)?,
			),
		};
		self.mac = Some(mac);
		Ok(())
	}

	fn keyed(&mut self) -> Result<&mut CmacVariant, MacError> {
		let algorithm = self.algorithm;
		self.mac.as_mut().ok_or_else(|| {
			MacError::computation(format!("{} has no key", algorithm))
		})
	}
}

// `Cmac` also satisfies the blanket `DynDigest` impl, hence the
// qualified `Mac::` calls.
impl Computation for CmacContext {
	fn output_size(&self) -> usize {
		BLOCK_SIZE
	}

	fn reset(&mut self) {
		match self.mac.as_mut() {
			Some(CmacVariant::Aes128(mac)) => Mac::reset(mac),
			Some(CmacVariant::Aes192(mac)) => Mac::reset(mac),
			Some(CmacVariant::Aes256(mac)) => Mac::reset(mac),
			None => {}
		}
	}

	fn feed(&mut self, data: &[u8]) -> Result<(), MacError> {
		match self.keyed()? {
			CmacVariant::Aes128(mac) => Mac::update(mac, data),
			CmacVariant::Aes192(mac) => Mac::update(mac, data),
			CmacVariant::Aes256(mac) => Mac::update(mac, data),
		}
		Ok(())
	}

	fn finish(&mut self, out: &mut [u8]) -> Result<usize, MacError> {
		check_output(out, BLOCK_SIZE)?;
		let tag = match self.keyed()? {
			CmacVariant::Aes128(mac) => {
				Mac::finalize_reset(mac).into_bytes()
			}
			CmacVariant::Aes192(mac) => {
				Mac::finalize_reset(mac).into_bytes()
			}
			CmacVariant::Aes256(mac) => {
				Mac::finalize_reset(mac).into_bytes()
			}
		};
		out[..BLOCK_SIZE].copy_from_slice(&tag);
		Ok(BLOCK_SIZE)
	}

	fn duplicate(&self) -> Result<Self, MacError> {
		Ok(self.clone())
	}
}

impl fmt::Debug for CmacContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CmacContext")
			.field("algorithm", &self.algorithm)
			.field("engine", &self.engine)
			.field("keyed", &self.is_keyed())
			.finish_non_exhaustive()
	}
}
