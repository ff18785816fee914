// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: key.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Helper utilities for loading MAC keys from files, stdin, or inline
//! hex values.

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use super::error::{MacError, MacErrorKind};
use zeroize::Zeroizing;

pub enum KeySource {
	File(PathBuf),
	Stdin,
	Hex(Zeroizing<String>),
}

impl KeySource {
	pub fn description(&self) -> &'static str {
		match self {
			KeySource::File(_) => "file",
			KeySource::Stdin => "stdin",
			KeySource::Hex(_) => "hex",
		}
	}
}

impl fmt::Debug for KeySource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			KeySource::File(path) => f.debug_tuple("File").field(path).finish(),
			KeySource::Stdin => f.write_str("Stdin"),
			KeySource::Hex(_) => f.write_str("Hex(<redacted>)"),
		}
	}
}

fn invalid_key(message: String) -> MacError {
	MacError::new(MacErrorKind::InvalidKey, message)
}

/// Reads the key bytes. File and hex keys may be empty (HMAC accepts an
/// empty key); an empty stdin is treated as a missing key.
pub fn load_key(
	source: &KeySource,
) -> Result<Zeroizing<Vec<u8>>, MacError> {
	match source {
		KeySource::File(path) => {
			fs::read(path).map(Zeroizing::new).map_err(|err| {
				invalid_key(format!(
					"failed to read key file `{}`: {}",
					path.display(),
					err
				))
			})
		}
		KeySource::Stdin => {
			let mut buf = Zeroizing::new(Vec::new());
			io::stdin().read_to_end(&mut buf).map_err(|err| {
				invalid_key(format!(
					"failed to read key from stdin: {}",
					err
				))
			})?;
			if buf.is_empty() {
				Err(invalid_key("stdin key input was empty".into()))
			} else {
				Ok(buf)
			}
		}
		KeySource::Hex(text) => hex::decode(text.trim())
			.map(Zeroizing::new)
			.map_err(|err| {
				invalid_key(format!("key is not valid hex: {}", err))
			}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn file_keys_are_read_verbatim() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(b"k\0y\n").unwrap();
		let key =
			load_key(&KeySource::File(file.path().to_path_buf())).unwrap();
		assert_eq!(key.as_slice(), b"k\0y\n");
	}

	#[test]
	fn hex_keys_are_decoded() {
		let source = KeySource::Hex(Zeroizing::new(" 00ff ".to_string()));
		assert_eq!(load_key(&source).unwrap().as_slice(), &[0x00, 0xff]);
		assert_eq!(source.description(), "hex");
	}

	#[test]
	fn failures_are_invalid_key() {
		let missing = KeySource::File(PathBuf::from("/nonexistent/rgm.key"));
		let bad_hex = KeySource::Hex(Zeroizing::new("xyz".to_string()));
		for source in [missing, bad_hex] {
			assert_eq!(
				load_key(&source).unwrap_err().kind(),
				MacErrorKind::InvalidKey
			);
		}
	}
}
