// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: cipher.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Cipher provider: AES selection by name and keyed block encryption.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use std::fmt;
use std::str::FromStr;

use crate::rgm::mac::error::MacError;

pub const BLOCK_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AesKeySize {
	Aes128,
	Aes192,
	Aes256,
}

impl AesKeySize {
	pub fn key_len(self) -> usize {
		match self {
			Self::Aes128 => 16,
			Self::Aes192 => 24,
			Self::Aes256 => 32,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMode {
	Cbc,
	Ecb,
	Gcm,
}

/// A block cipher selection such as `aes-128-cbc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CipherAlgorithm {
	pub key_size: AesKeySize,
	pub mode: CipherMode,
}

const ALL: &[CipherAlgorithm] = &[
	CipherAlgorithm::new(AesKeySize::Aes128, CipherMode::Cbc),
	CipherAlgorithm::new(AesKeySize::Aes192, CipherMode::Cbc),
	CipherAlgorithm::new(AesKeySize::Aes256, CipherMode::Cbc),
	CipherAlgorithm::new(AesKeySize::Aes128, CipherMode::Ecb),
	CipherAlgorithm::new(AesKeySize::Aes192, CipherMode::Ecb),
	CipherAlgorithm::new(AesKeySize::Aes256, CipherMode::Ecb),
	CipherAlgorithm::new(AesKeySize::Aes128, CipherMode::Gcm),
	CipherAlgorithm::new(AesKeySize::Aes192, CipherMode::Gcm),
	CipherAlgorithm::new(AesKeySize::Aes256, CipherMode::Gcm),
];

impl CipherAlgorithm {
	pub const fn new(key_size: AesKeySize, mode: CipherMode) -> Self {
		Self { key_size, mode }
	}

	pub fn all() -> &'static [CipherAlgorithm] {
		ALL
	}

	pub fn name(self) -> &'static str {
		use AesKeySize::*;
		use CipherMode::*;
		match (self.key_size, self.mode) {
			(Aes128, Cbc) => "aes-128-cbc",
			(Aes192, Cbc) => "aes-192-cbc",
			(Aes256, Cbc) => "aes-256-cbc",
			(Aes128, Ecb) => "aes-128-ecb",
			(Aes192, Ecb) => "aes-192-ecb",
			(Aes256, Ecb) => "aes-256-ecb",
			(Aes128, Gcm) => "aes-128-gcm",
			(Aes192, Gcm) => "aes-192-gcm",
			(Aes256, Gcm) => "aes-256-gcm",
		}
	}

	/// Accepts `aes-128-cbc`, `AES128-CBC` and the bare `aes128`
	/// (CBC) spellings.
	pub fn from_name(name: &str) -> Option<Self> {
		let wanted: String = name
			.trim()
			.chars()
			.filter(|c| *c != '-' && *c != '_')
			.map(|c| c.to_ascii_lowercase())
			.collect();
		let bare = match wanted.as_str() {
			"aes128" => Some("aes128cbc"),
			"aes192" => Some("aes192cbc"),
			"aes256" => Some("aes256cbc"),
			_ => None,
		};
		let wanted = bare.map(str::to_string).unwrap_or(wanted);
		ALL.iter()
			.copied()
			.find(|alg| alg.name().replace('-', "") == wanted)
	}

	pub fn key_len(self) -> usize {
		self.key_size.key_len()
	}

	pub fn block_size(self) -> usize {
		BLOCK_SIZE
	}
}

impl fmt::Display for CipherAlgorithm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.name())
	}
}

impl FromStr for CipherAlgorithm {
	type Err = MacError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		Self::from_name(value).ok_or_else(|| {
			MacError::invalid_value(format!(
				"unknown cipher `{}`",
				value
			))
		})
	}
}

/// AES key schedule; zeroized on drop by the `aes` crate.
#[derive(Clone)]
pub enum KeyedBlockCipher {
	Aes128(Aes128),
	Aes192(Aes192),
	Aes256(Aes256),
}

impl KeyedBlockCipher {
	pub fn new(
		key_size: AesKeySize,
		key: &[u8],
	) -> Result<Self, MacError> {
		if key.len() != key_size.key_len() {
			return Err(MacError::invalid_value(format!(
				"expected a {}-byte key but received {}",
				key_size.key_len(),
				key.len()
			)));
		}
		let rejected = |_| {
			MacError::invalid_value("cipher rejected the provided key")
		};
		Ok(match key_size {
			AesKeySize::Aes128 => {
				Self::Aes128(Aes128::new_from_slice(key).map_err(rejected)?)
			}
			AesKeySize::Aes192 => {
				Self::Aes192(Aes192::new_from_slice(key).map_err(rejected)?)
			}
			AesKeySize::Aes256 => {
				Self::Aes256(Aes256::new_from_slice(key).map_err(rejected)?)
			}
		})
	}

	pub fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
		let block = GenericArray::from_mut_slice(block);
		match self {
			Self::Aes128(cipher) => cipher.encrypt_block(block),
			Self::Aes192(cipher) => cipher.encrypt_block(block),
			Self::Aes256(cipher) => cipher.encrypt_block(block),
		}
	}
}
