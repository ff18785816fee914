// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: error.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Error type shared by the registry, contexts and algorithm modules.

use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacErrorKind {
	/// Registry lookup miss.
	NotFound,
	/// An algorithm factory could not create its private state.
	AllocationError,
	/// A name, alias, id or OID is already bound to another algorithm.
	DuplicateAlgorithm,
	/// The process-wide registry was already installed.
	RegistryLocked,
	/// The state cannot be duplicated.
	CopyError,
	/// The algorithm does not implement the command. Callers may treat
	/// this as "control skipped".
	UnsupportedControl,
	/// The payload was rejected (size, range, type).
	InvalidControlValue,
	/// The command is not accepted while a computation is streaming.
	ControlAfterInit,
	/// update/final outside the streaming phase.
	NotInitialized,
	/// Destination buffer is shorter than the MAC output.
	BufferTooSmall,
	/// Algorithm-internal failure during init/update/final.
	ComputationError,
	/// Key material could not be loaded.
	InvalidKey,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct MacError {
	kind: MacErrorKind,
	message: Cow<'static, str>,
}

impl MacError {
	pub fn new(
		kind: MacErrorKind,
		message: impl Into<Cow<'static, str>>,
	) -> Self {
		Self {
			kind,
			message: message.into(),
		}
	}

	pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
		Self::new(MacErrorKind::NotFound, message)
	}

	pub fn unsupported(
		algorithm: &str,
		command: impl std::fmt::Display,
	) -> Self {
		Self::new(
			MacErrorKind::UnsupportedControl,
			format!("{} does not support {}", algorithm, command),
		)
	}

	pub fn invalid_value(
		message: impl Into<Cow<'static, str>>,
	) -> Self {
		Self::new(MacErrorKind::InvalidControlValue, message)
	}

	pub fn computation(
		message: impl Into<Cow<'static, str>>,
	) -> Self {
		Self::new(MacErrorKind::ComputationError, message)
	}

	pub fn kind(&self) -> MacErrorKind {
		self.kind
	}

	pub fn message(&self) -> &str {
		self.message.as_ref()
	}

	pub fn is_unsupported(&self) -> bool {
		self.kind == MacErrorKind::UnsupportedControl
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_uses_message() {
		let err = MacError::unsupported("Poly1305", "SET_IV");
		assert_eq!(err.to_string(), "Poly1305 does not support SET_IV");
		assert!(err.is_unsupported());
	}

	#[test]
	fn kind_is_preserved() {
		let err = MacError::invalid_value("size must be 8 or 16");
		assert_eq!(err.kind(), MacErrorKind::InvalidControlValue);
		assert!(!err.is_unsupported());
		assert_eq!(err.message(), "size must be 8 or 16");
	}
}
