// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: control.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Standard control vocabulary.
//!
//! Every configuration directive is a [`MacControl`]. The string form
//! (`"hexkey", "00ff"`), the hex form (`SetKey, "00ff"`) and the
//! `type:value` option syntax used by the CLI all parse into the same
//! tagged value before it reaches an algorithm.

use std::fmt;
use zeroize::Zeroizing;

use super::error::{MacError, MacErrorKind};
use crate::rgm::provider::{CipherAlgorithm, DigestAlgorithm, Engine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlCommand {
	SetKey,
	SetIv,
	SetCustom,
	SetXof,
	SetFlags,
	SetEngine,
	SetMd,
	SetCipher,
	SetSize,
}

impl ControlCommand {
	pub const ALL: [ControlCommand; 9] = [
		ControlCommand::SetKey,
		ControlCommand::SetIv,
		ControlCommand::SetCustom,
		ControlCommand::SetXof,
		ControlCommand::SetFlags,
		ControlCommand::SetEngine,
		ControlCommand::SetMd,
		ControlCommand::SetCipher,
		ControlCommand::SetSize,
	];

	pub fn label(self) -> &'static str {
		match self {
			Self::SetKey => "SET_KEY",
			Self::SetIv => "SET_IV",
			Self::SetCustom => "SET_CUSTOM",
			Self::SetXof => "SET_XOF",
			Self::SetFlags => "SET_FLAGS",
			Self::SetEngine => "SET_ENGINE",
			Self::SetMd => "SET_MD",
			Self::SetCipher => "SET_CIPHER",
			Self::SetSize => "SET_SIZE",
		}
	}

	pub fn takes_bytes(self) -> bool {
		matches!(self, Self::SetKey | Self::SetIv | Self::SetCustom)
	}

	/// Commands that select the underlying primitive and must be
	/// applied before the key.
	pub fn selects_primitive(self) -> bool {
		matches!(self, Self::SetEngine | Self::SetMd | Self::SetCipher)
	}
}

impl fmt::Display for ControlCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.label())
	}
}

#[derive(Clone, PartialEq, Eq)]
pub enum MacControl {
	Key(Zeroizing<Vec<u8>>),
	Iv(Vec<u8>),
	Custom(Vec<u8>),
	Xof(bool),
	Flags(u64),
	Engine(Engine),
	Digest(DigestAlgorithm),
	Cipher(CipherAlgorithm),
	Size(usize),
}

impl MacControl {
	pub fn key(bytes: impl AsRef<[u8]>) -> Self {
		Self::Key(Zeroizing::new(bytes.as_ref().to_vec()))
	}

	pub fn command(&self) -> ControlCommand {
		match self {
			Self::Key(_) => ControlCommand::SetKey,
			Self::Iv(_) => ControlCommand::SetIv,
			Self::Custom(_) => ControlCommand::SetCustom,
			Self::Xof(_) => ControlCommand::SetXof,
			Self::Flags(_) => ControlCommand::SetFlags,
			Self::Engine(_) => ControlCommand::SetEngine,
			Self::Digest(_) => ControlCommand::SetMd,
			Self::Cipher(_) => ControlCommand::SetCipher,
			Self::Size(_) => ControlCommand::SetSize,
		}
	}

	/// Builds a byte-string control (`SET_KEY`, `SET_IV`, `SET_CUSTOM`).
	pub fn from_bytes(
		command: ControlCommand,
		bytes: &[u8],
	) -> Result<Self, MacError> {
		match command {
			ControlCommand::SetKey => Ok(Self::key(bytes)),
			ControlCommand::SetIv => Ok(Self::Iv(bytes.to_vec())),
			ControlCommand::SetCustom => {
				Ok(Self::Custom(bytes.to_vec()))
			}
			other => Err(MacError::invalid_value(format!(
				"{} does not take a byte string",
				other
			))),
		}
	}

	/// Hex front-end: decodes `hex` and builds a byte-string control.
	pub fn from_hex(
		command: ControlCommand,
		hex: &str,
	) -> Result<Self, MacError> {
		if !command.takes_bytes() {
			return Err(MacError::invalid_value(format!(
				"{} does not take a hex string",
				command
			)));
		}
		let bytes = Zeroizing::new(decode_hex(command, hex)?);
		Self::from_bytes(command, &bytes)
	}

	/// String front-end: `(type, value)` pairs such as `("digest",
	/// "SHA256")` or `("hexkey", "0011")`.
	pub fn from_str_pair(
		kind: &str,
		value: &str,
	) -> Result<Self, MacError> {
		let kind = kind.trim().to_ascii_lowercase();
		match kind.as_str() {
			"key" => Ok(Self::key(value.as_bytes())),
			"hexkey" => Self::from_hex(ControlCommand::SetKey, value),
			"iv" => Ok(Self::Iv(value.as_bytes().to_vec())),
			"hexiv" => Self::from_hex(ControlCommand::SetIv, value),
			"custom" => Ok(Self::Custom(value.as_bytes().to_vec())),
			"hexcustom" => {
				Self::from_hex(ControlCommand::SetCustom, value)
			}
			"xof" => parse_bool(value).map(Self::Xof),
			"flags" => parse_unsigned(ControlCommand::SetFlags, value)
				.map(Self::Flags),
			"size" | "outlen" => {
				let size = parse_unsigned(ControlCommand::SetSize, value)?;
				usize::try_from(size).map(Self::Size).map_err(|_| {
					MacError::invalid_value(format!(
						"size {} is out of range",
						size
					))
				})
			}
			"engine" => Engine::from_name(value).map(Self::Engine),
			"digest" | "md" => {
				value.parse::<DigestAlgorithm>().map(Self::Digest)
			}
			"cipher" => {
				value.parse::<CipherAlgorithm>().map(Self::Cipher)
			}
			other => Err(MacError::new(
				MacErrorKind::UnsupportedControl,
				format!("unknown control type `{}`", other),
			)),
		}
	}

	/// Parses the `type:value` option syntax (`hexkey:0011`).
	pub fn parse_option(option: &str) -> Result<Self, MacError> {
		let (kind, value) = option.split_once(':').ok_or_else(|| {
			MacError::invalid_value(format!(
				"control option `{}` must have the form type:value",
				redact_option(option)
			))
		})?;
		Self::from_str_pair(kind, value)
	}
}

impl fmt::Debug for MacControl {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Key(key) => {
				write!(f, "Key(<{} bytes redacted>)", key.len())
			}
			Self::Iv(iv) => write!(f, "Iv({})", hex::encode(iv)),
			Self::Custom(custom) => {
				write!(f, "Custom({})", hex::encode(custom))
			}
			Self::Xof(xof) => write!(f, "Xof({})", xof),
			Self::Flags(flags) => write!(f, "Flags({:#x})", flags),
			Self::Engine(engine) => write!(f, "Engine({})", engine),
			Self::Digest(digest) => write!(f, "Digest({})", digest),
			Self::Cipher(cipher) => write!(f, "Cipher({})", cipher),
			Self::Size(size) => write!(f, "Size({})", size),
		}
	}
}

fn redact_option(option: &str) -> &str {
	if option.to_ascii_lowercase().contains("key") {
		"<redacted>"
	} else {
		option
	}
}

fn decode_hex(
	command: ControlCommand,
	value: &str,
) -> Result<Vec<u8>, MacError> {
	hex::decode(value.trim()).map_err(|err| {
		MacError::invalid_value(format!(
			"{} must be valid hex: {}",
			command, err
		))
	})
}

fn parse_bool(value: &str) -> Result<bool, MacError> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		other => Err(MacError::invalid_value(format!(
			"SET_XOF expects a boolean but received `{}`",
			other
		))),
	}
}

fn parse_unsigned(
	command: ControlCommand,
	value: &str,
) -> Result<u64, MacError> {
	let value = value.trim();
	let parsed = match value
		.strip_prefix("0x")
		.or_else(|| value.strip_prefix("0X"))
	{
		Some(digits) => u64::from_str_radix(digits, 16),
		None => value.parse::<u64>(),
	};
	parsed.map_err(|_| {
		MacError::invalid_value(format!(
			"{} expects an unsigned integer but received `{}`",
			command, value
		))
	})
}
