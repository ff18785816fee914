// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: context.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! MAC context: binds one descriptor to its private state, dispatches
//! controls and drives init → update* → final.

use std::fmt;

use super::control::{ControlCommand, MacControl};
use super::error::{MacError, MacErrorKind};
use super::method::MacMethod;
use super::registry::{self, MacAlgorithm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	/// Created, controls may be applied.
	Configured,
	/// After `init`; updates accepted.
	Streaming,
	/// After `finalize`; `init` starts a fresh computation.
	Finalized,
}

pub struct MacContext {
	algorithm: &'static MacAlgorithm,
	method: Box<dyn MacMethod>,
	phase: Phase,
}

impl MacContext {
	pub fn new(algorithm: &'static MacAlgorithm) -> Result<Self, MacError> {
		let method = algorithm.instantiate()?;
		tracing::debug!(algorithm = algorithm.name(), "created MAC context");
		Ok(Self {
			algorithm,
			method,
			phase: Phase::Configured,
		})
	}

	pub fn by_name(name: &str) -> Result<Self, MacError> {
		Self::new(registry::lookup_by_name(name)?)
	}

	pub fn by_id(id: u32) -> Result<Self, MacError> {
		Self::new(registry::lookup_by_id(id)?)
	}

	pub fn by_oid(oid: &str) -> Result<Self, MacError> {
		Self::new(registry::lookup_by_oid(oid)?)
	}

	pub fn algorithm(&self) -> &'static MacAlgorithm {
		self.algorithm
	}

	pub fn name(&self) -> &'static str {
		self.algorithm.name()
	}

	pub fn id(&self) -> u32 {
		self.algorithm.id()
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// Current output size in bytes, 0 when not yet determined.
	pub fn size(&self) -> usize {
		self.method.size()
	}

	/// Applies one control.
	///
	/// While streaming, only the commands the algorithm lists as
	/// runtime-safe are accepted; anything else fails with
	/// `ControlAfterInit`. A control applied to a finalized context
	/// returns it to `Configured`.
	pub fn control(&mut self, control: MacControl) -> Result<(), MacError> {
		let command = control.command();
		if self.phase == Phase::Streaming
			&& !self.method.runtime_controls().contains(&command)
		{
			return Err(MacError::new(
				MacErrorKind::ControlAfterInit,
				format!(
					"{} cannot be applied to {} after init",
					command,
					self.algorithm.metadata.display_name
				),
			));
		}
		self.method.configure(&control)?;
		tracing::debug!(
			algorithm = self.name(),
			control = ?control,
			"applied MAC control"
		);
		if self.phase == Phase::Finalized {
			self.phase = Phase::Configured;
		}
		Ok(())
	}

	/// Like [`control`](Self::control) but treats `UnsupportedControl` as
	/// a skipped control, returning `Ok(false)`.
	pub fn try_control(
		&mut self,
		control: MacControl,
	) -> Result<bool, MacError> {
		match self.control(control) {
			Ok(()) => Ok(true),
			Err(err) if err.is_unsupported() => {
				tracing::debug!(
					algorithm = self.name(),
					%err,
					"control skipped"
				);
				Ok(false)
			}
			Err(err) => Err(err),
		}
	}

	/// Applies a pre-built list of controls, stopping at the first error.
	pub fn control_all<I>(&mut self, controls: I) -> Result<(), MacError>
	where
		I: IntoIterator<Item = MacControl>,
	{
		for control in controls {
			self.control(control)?;
		}
		Ok(())
	}

	/// String form, e.g. `("digest", "SHA256")` or `("hexkey", "00ff")`.
	pub fn control_str(
		&mut self,
		kind: &str,
		value: &str,
	) -> Result<(), MacError> {
		self.control(MacControl::from_str_pair(kind, value)?)
	}

	/// Hex form for byte-string commands.
	pub fn control_hex(
		&mut self,
		command: ControlCommand,
		hex: &str,
	) -> Result<(), MacError> {
		self.control(MacControl::from_hex(command, hex)?)
	}

	/// Starts a computation. Callable again after `finalize` to reuse the
	/// key and configuration.
	pub fn init(&mut self) -> Result<(), MacError> {
		self.method.init()?;
		self.phase = Phase::Streaming;
		tracing::trace!(algorithm = self.name(), "MAC init");
		Ok(())
	}

	pub fn update(&mut self, data: &[u8]) -> Result<(), MacError> {
		self.require_streaming("update")?;
		self.method.update(data)
	}

	/// Finishes the computation.
	///
	/// With `None`, returns the number of bytes a real call will write
	/// and leaves the stream untouched.
	pub fn finalize(
		&mut self,
		out: Option<&mut [u8]>,
	) -> Result<usize, MacError> {
		self.require_streaming("final")?;
		let size = self.method.size();
		let out = match out {
			Some(out) => out,
			None => return Ok(size),
		};
		if out.len() < size {
			return Err(MacError::new(
				MacErrorKind::BufferTooSmall,
				format!(
					"{} writes {} bytes but the buffer holds {}",
					self.algorithm.metadata.display_name,
					size,
					out.len()
				),
			));
		}
		let written = self.method.finalize(&mut out[..size])?;
		self.phase = Phase::Finalized;
		tracing::trace!(
			algorithm = self.name(),
			bytes = written,
			"MAC final"
		);
		Ok(written)
	}

	pub fn finalize_to_vec(&mut self) -> Result<Vec<u8>, MacError> {
		let mut out = vec![0u8; self.finalize(None)?];
		let written = self.finalize(Some(&mut out))?;
		out.truncate(written);
		Ok(out)
	}

	/// Makes `self` an independent copy of `src`. Both contexts must be
	/// bound to the same descriptor.
	pub fn copy_from(&mut self, src: &MacContext) -> Result<(), MacError> {
		if !self.algorithm.same(src.algorithm) {
			return Err(MacError::new(
				MacErrorKind::CopyError,
				format!(
					"cannot copy a {} context into a {} context",
					src.algorithm.metadata.display_name,
					self.algorithm.metadata.display_name
				),
			));
		}
		self.method = src.method.duplicate()?;
		self.phase = src.phase;
		Ok(())
	}

	/// Creates a fresh context against the same descriptor and copies
	/// `self` into it.
	pub fn try_clone(&self) -> Result<MacContext, MacError> {
		let mut dest = MacContext::new(self.algorithm)?;
		dest.copy_from(self)?;
		Ok(dest)
	}

	fn require_streaming(&self, operation: &str) -> Result<(), MacError> {
		if self.phase == Phase::Streaming {
			Ok(())
		} else {
			Err(MacError::new(
				MacErrorKind::NotInitialized,
				format!(
					"{} {} called in phase {:?}; call init first",
					self.algorithm.metadata.display_name, operation, self.phase
				),
			))
		}
	}
}

impl fmt::Debug for MacContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MacContext")
			.field("algorithm", &self.algorithm.name())
			.field("phase", &self.phase)
			.field("size", &self.size())
			.finish_non_exhaustive()
	}
}
