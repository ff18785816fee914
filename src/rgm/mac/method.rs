// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: method.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Operation table every MAC algorithm implements, plus the metadata
//! enums describing its shape.

use super::control::{ControlCommand, MacControl};
use super::error::MacError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacFamily {
	/// Keyed function with no delegated primitive.
	DirectKeyed,
	/// Wraps a digest chosen with `SET_MD`.
	HashBased,
	/// Wraps a block cipher chosen with `SET_CIPHER`.
	CipherBased,
	/// Extendable-output construction with customization string.
	XofBased,
}

impl MacFamily {
	pub fn label(self) -> &'static str {
		match self {
			Self::DirectKeyed => "direct-keyed",
			Self::HashBased => "hash-based",
			Self::CipherBased => "cipher-based",
			Self::XofBased => "xof-based",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePolicy {
	Fixed(usize),
	Choice {
		sizes: &'static [usize],
		default: usize,
	},
	Extendable {
		default: usize,
		max: usize,
	},
	/// Follows the selected digest or cipher; 0 until one is chosen.
	Delegated,
}

impl SizePolicy {
	pub fn default_size(&self) -> usize {
		match *self {
			Self::Fixed(size) => size,
			Self::Choice { default, .. } => default,
			Self::Extendable { default, .. } => default,
			Self::Delegated => 0,
		}
	}

	pub fn accepts(&self, size: usize) -> bool {
		match *self {
			Self::Fixed(fixed) => size == fixed,
			Self::Choice { sizes, .. } => sizes.contains(&size),
			Self::Extendable { max, .. } => (1..=max).contains(&size),
			Self::Delegated => false,
		}
	}

	/// Validates a `SET_SIZE` request.
	pub fn check(
		&self,
		algorithm: &str,
		size: usize,
	) -> Result<usize, MacError> {
		if self.accepts(size) {
			Ok(size)
		} else {
			Err(MacError::invalid_value(format!(
				"{} output size {} is not allowed ({})",
				algorithm,
				size,
				self.describe()
			)))
		}
	}

	pub fn describe(&self) -> String {
		match *self {
			Self::Fixed(size) => format!("fixed {} bytes", size),
			Self::Choice { sizes, default } => format!(
				"one of {:?} bytes, default {}",
				sizes, default
			),
			Self::Extendable { default, max } => {
				format!("1..={} bytes, default {}", max, default)
			}
			Self::Delegated => "follows underlying primitive".into(),
		}
	}
}

/// Algorithm callbacks behind a [`MacContext`].
///
/// The context enforces ordering: `update` and `finalize` are only
/// called after a successful `init`, and `finalize` always receives a
/// buffer of at least `size()` bytes. Dropping the state releases every
/// resource it owns, including delegated computation contexts.
///
/// [`MacContext`]: super::context::MacContext
pub trait MacMethod {
	/// Configured output size, or 0 when it cannot be determined yet.
	fn size(&self) -> usize;

	/// Applies one control. Returns `UnsupportedControl` for commands the
	/// algorithm does not implement.
	fn configure(&mut self, control: &MacControl) -> Result<(), MacError>;

	/// Starts (or restarts) a computation with the current configuration.
	fn init(&mut self) -> Result<(), MacError>;

	fn update(&mut self, data: &[u8]) -> Result<(), MacError>;

	/// Writes `size()` bytes into `out` and returns the count.
	fn finalize(&mut self, out: &mut [u8]) -> Result<usize, MacError>;

	/// Deep copy of the private state and any delegated context.
	fn duplicate(&self) -> Result<Box<dyn MacMethod>, MacError>;

	/// Controls that remain safe while a computation is streaming.
	fn runtime_controls(&self) -> &'static [ControlCommand] {
		&[]
	}
}
