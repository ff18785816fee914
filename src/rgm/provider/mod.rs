// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: src/rgm/provider/mod.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
//
// Digest and cipher providers plus the computation contexts that MAC
// algorithms delegate to.

pub mod adapter;
pub mod cipher;
pub mod digest;

use crate::rgm::mac::error::MacError;

pub use adapter::{
	CipherContext, CmacContext, Computation, DigestContext,
};
pub use cipher::{AesKeySize, CipherAlgorithm, CipherMode};
pub use digest::DigestAlgorithm;

/// Execution provider backing the digest and cipher computations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Engine {
	/// Portable RustCrypto implementations.
	#[default]
	Software,
}

impl Engine {
	pub fn name(self) -> &'static str {
		match self {
			Engine::Software => "software",
		}
	}

	pub fn from_name(name: &str) -> Result<Self, MacError> {
		match name.trim().to_ascii_lowercase().as_str() {
			"software" | "default" | "rustcrypto" => {
				Ok(Engine::Software)
			}
			other => Err(MacError::invalid_value(format!(
				"unknown engine `{}`",
				other
			))),
		}
	}
}

impl std::fmt::Display for Engine {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}
