// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: digest.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Digest provider: name lookup and running-hash construction.

use digest::{Digest, DynDigest};
use std::fmt;
use std::str::FromStr;

use crate::rgm::mac::error::MacError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
	Md5,
	Sha1,
	Sha224,
	Sha256,
	Sha384,
	Sha512,
	Sha512_224,
	Sha512_256,
	Sha3_224,
	Sha3_256,
	Sha3_384,
	Sha3_512,
	Blake2b512,
	Blake2s256,
	Sm3,
	Ripemd160,
}

const ALL: &[DigestAlgorithm] = &[
	DigestAlgorithm::Md5,
	DigestAlgorithm::Sha1,
	DigestAlgorithm::Sha224,
	DigestAlgorithm::Sha256,
	DigestAlgorithm::Sha384,
	DigestAlgorithm::Sha512,
	DigestAlgorithm::Sha512_224,
	DigestAlgorithm::Sha512_256,
	DigestAlgorithm::Sha3_224,
	DigestAlgorithm::Sha3_256,
	DigestAlgorithm::Sha3_384,
	DigestAlgorithm::Sha3_512,
	DigestAlgorithm::Blake2b512,
	DigestAlgorithm::Blake2s256,
	DigestAlgorithm::Sm3,
	DigestAlgorithm::Ripemd160,
];

impl DigestAlgorithm {
	pub fn all() -> &'static [DigestAlgorithm] {
		ALL
	}

	pub fn name(self) -> &'static str {
		match self {
			Self::Md5 => "MD5",
			Self::Sha1 => "SHA1",
			Self::Sha224 => "SHA224",
			Self::Sha256 => "SHA256",
			Self::Sha384 => "SHA384",
			Self::Sha512 => "SHA512",
			Self::Sha512_224 => "SHA512-224",
			Self::Sha512_256 => "SHA512-256",
			Self::Sha3_224 => "SHA3-224",
			Self::Sha3_256 => "SHA3-256",
			Self::Sha3_384 => "SHA3-384",
			Self::Sha3_512 => "SHA3-512",
			Self::Blake2b512 => "BLAKE2B-512",
			Self::Blake2s256 => "BLAKE2S-256",
			Self::Sm3 => "SM3",
			Self::Ripemd160 => "RIPEMD160",
		}
	}

	fn aliases(self) -> &'static [&'static str] {
		match self {
			Self::Sha1 => &["SHA-1"],
			Self::Sha224 => &["SHA2-224", "SHA-224"],
			Self::Sha256 => &["SHA2-256", "SHA-256"],
			Self::Sha384 => &["SHA2-384", "SHA-384"],
			Self::Sha512 => &["SHA2-512", "SHA-512"],
			Self::Sha512_224 => &["SHA2-512/224", "SHA-512/224"],
			Self::Sha512_256 => &["SHA2-512/256", "SHA-512/256"],
			Self::Blake2b512 => &["BLAKE2B"],
			Self::Blake2s256 => &["BLAKE2S"],
			Self::Ripemd160 => &["RIPEMD-160", "RMD160"],
			_ => &[],
		}
	}

	/// Case-insensitive lookup; `-`, `_` and `/` are ignored.
	pub fn from_name(name: &str) -> Option<Self> {
		let wanted = normalize(name);
		ALL.iter().copied().find(|alg| {
			normalize(alg.name()) == wanted
				|| alg
					.aliases()
					.iter()
					.any(|alias| normalize(alias) == wanted)
		})
	}

	pub fn output_size(self) -> usize {
		match self {
			Self::Md5 => 16,
			Self::Sha1 | Self::Ripemd160 => 20,
			Self::Sha224 | Self::Sha512_224 | Self::Sha3_224 => 28,
			Self::Sha256
			| Self::Sha512_256
			| Self::Sha3_256
			| Self::Blake2s256
			| Self::Sm3 => 32,
			Self::Sha384 | Self::Sha3_384 => 48,
			Self::Sha512 | Self::Sha3_512 | Self::Blake2b512 => 64,
		}
	}

	/// Input block size in bytes (the HMAC padding width).
	pub fn block_size(self) -> usize {
		match self {
			Self::Md5
			| Self::Sha1
			| Self::Sha224
			| Self::Sha256
			| Self::Blake2s256
			| Self::Sm3
			| Self::Ripemd160 => 64,
			Self::Sha384
			| Self::Sha512
			| Self::Sha512_224
			| Self::Sha512_256
			| Self::Blake2b512 => 128,
			Self::Sha3_224 => 144,
			Self::Sha3_256 => 136,
			Self::Sha3_384 => 104,
			Self::Sha3_512 => 72,
		}
	}

	/// Digests considered legacy per NIST SP 800-131A Rev.2.
	pub fn is_legacy(self) -> bool {
		matches!(self, Self::Md5 | Self::Sha1)
	}

	pub fn new_hasher(self) -> Box<dyn DynDigest> {
		match self {
			Self::Md5 => Box::new(md5::Md5::new()),
			Self::Sha1 => Box::new(sha1::Sha1::new()),
			Self::Sha224 => Box::new(sha2::Sha224::new()),
			Self::Sha256 => Box::new(sha2::Sha256::new()),
			Self::Sha384 => Box::new(sha2::Sha384::new()),
			Self::Sha512 => Box::new(sha2::Sha512::new()),
			Self::Sha512_224 => Box::new(sha2::Sha512_224::new()),
			Self::Sha512_256 => Box::new(sha2::Sha512_256::new()),
			Self::Sha3_224 => Box::new(sha3::Sha3_224::new()),
			Self::Sha3_256 => Box::new(sha3::Sha3_256::new()),
			Self::Sha3_384 => Box::new(sha3::Sha3_384::new()),
			Self::Sha3_512 => Box::new(sha3::Sha3_512::new()),
			Self::Blake2b512 => Box::new(blake2::Blake2b512::new()),
			Self::Blake2s256 => Box::new(blake2::Blake2s256::new()),
			Self::Sm3 => Box::new(sm3::Sm3::new()),
			Self::Ripemd160 => Box::new(ripemd::Ripemd160::new()),
		}
	}
}

fn normalize(name: &str) -> String {
	name.trim()
		.chars()
		.filter(|c| !matches!(c, '-' | '_' | '/'))
		.map(|c| c.to_ascii_uppercase())
		.collect()
}

impl fmt::Display for DigestAlgorithm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.name())
	}
}

impl FromStr for DigestAlgorithm {
	type Err = MacError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		Self::from_name(value).ok_or_else(|| {
			MacError::invalid_value(format!(
				"unknown digest `{}`",
				value
			))
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use hex_literal::hex;

	#[test]
	fn names_and_aliases_resolve() {
		assert_eq!(
			DigestAlgorithm::from_name("sha256"),
			Some(DigestAlgorithm::Sha256)
		);
		assert_eq!(
			DigestAlgorithm::from_name("SHA2-256"),
			Some(DigestAlgorithm::Sha256)
		);
		assert_eq!(
			DigestAlgorithm::from_name("sha3_512"),
			Some(DigestAlgorithm::Sha3_512)
		);
		assert_eq!(
			DigestAlgorithm::from_name("SHA-512/256"),
			Some(DigestAlgorithm::Sha512_256)
		);
		assert!(DigestAlgorithm::from_name("sha999").is_none());
	}

	#[test]
	fn every_name_round_trips() {
		for alg in DigestAlgorithm::all() {
			assert_eq!(DigestAlgorithm::from_name(alg.name()), Some(*alg));
		}
	}

	#[test]
	fn hasher_output_matches_declared_size() {
		for alg in DigestAlgorithm::all() {
			let hasher = alg.new_hasher();
			assert_eq!(hasher.output_size(), alg.output_size(), "{}", alg);
		}
	}

	#[test]
	fn sha256_of_empty_input() {
		let mut hasher = DigestAlgorithm::Sha256.new_hasher();
		hasher.update(b"");
		let out = hasher.finalize_reset();
		assert_eq!(
			out.as_ref(),
			hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
		);
	}
}
