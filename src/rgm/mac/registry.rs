// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: registry.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025

//! Registry definitions for MAC algorithms: descriptors, the three lookup
//! tables (name, numeric id, OID) and the process-wide instance.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use super::control::ControlCommand;
use super::error::{MacError, MacErrorKind};
use super::method::{MacFamily, MacMethod, SizePolicy};
use super::{blake3, cmac, gmac, hmac, kmac, poly1305, siphash};

#[derive(Clone, Copy, Debug)]
pub struct MacAlgorithmMetadata {
	pub identifier: &'static str,
	pub display_name: &'static str,
	pub aliases: &'static [&'static str],
	pub id: u32,
	pub oid: Option<&'static str>,
	pub family: MacFamily,
	pub size_policy: SizePolicy,
	pub controls: &'static [ControlCommand],
}

impl MacAlgorithmMetadata {
	pub const fn new(
		identifier: &'static str,
		display_name: &'static str,
		id: u32,
		family: MacFamily,
		size_policy: SizePolicy,
		controls: &'static [ControlCommand],
	) -> Self {
		Self {
			identifier,
			display_name,
			aliases: &[],
			id,
			oid: None,
			family,
			size_policy,
			controls,
		}
	}

	pub const fn with_oid(mut self, oid: &'static str) -> Self {
		self.oid = Some(oid);
		self
	}

	pub const fn with_aliases(
		mut self,
		aliases: &'static [&'static str],
	) -> Self {
		self.aliases = aliases;
		self
	}

	pub fn supports(&self, command: ControlCommand) -> bool {
		self.controls.contains(&command)
	}
}

pub type MacFactory = fn() -> Result<Box<dyn MacMethod>, MacError>;

/// Immutable descriptor of one MAC algorithm. Descriptors are declared
/// as statics by each algorithm module; identity is address identity.
pub struct MacAlgorithm {
	pub metadata: MacAlgorithmMetadata,
	pub factory: MacFactory,
}

impl MacAlgorithm {
	pub const fn new(
		metadata: MacAlgorithmMetadata,
		factory: MacFactory,
	) -> Self {
		Self { metadata, factory }
	}

	pub fn name(&self) -> &'static str {
		self.metadata.identifier
	}

	pub fn id(&self) -> u32 {
		self.metadata.id
	}

	pub fn oid(&self) -> Option<&'static str> {
		self.metadata.oid
	}

	pub fn same(&self, other: &MacAlgorithm) -> bool {
		std::ptr::eq(self, other)
	}

	/// Runs the factory, producing fresh algorithm-private state.
	pub fn instantiate(&self) -> Result<Box<dyn MacMethod>, MacError> {
		(self.factory)().map_err(|err| {
			MacError::new(
				MacErrorKind::AllocationError,
				format!(
					"failed to create {} state: {}",
					self.metadata.display_name,
					err.message()
				),
			)
		})
	}

	fn name_keys(&self) -> impl Iterator<Item = String> + '_ {
		std::iter::once(self.metadata.identifier)
			.chain(self.metadata.aliases.iter().copied())
			.map(|name| name.to_ascii_lowercase())
	}
}

impl fmt::Debug for MacAlgorithm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MacAlgorithm")
			.field("metadata", &self.metadata)
			.finish_non_exhaustive()
	}
}

impl PartialEq for MacAlgorithm {
	fn eq(&self, other: &Self) -> bool {
		self.same(other)
	}
}

impl Eq for MacAlgorithm {}

#[derive(Default)]
pub struct Registry {
	by_name: HashMap<String, &'static MacAlgorithm>,
	by_id: HashMap<u32, &'static MacAlgorithm>,
	by_oid: HashMap<&'static str, &'static MacAlgorithm>,
	ordered: Vec<&'static MacAlgorithm>,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry holding every algorithm shipped with the crate.
	pub fn builtin() -> Self {
		let mut registry = Self::new();
		for algorithm in builtin_algorithms() {
			if let Err(err) = registry.register(algorithm) {
				tracing::error!(
					algorithm = algorithm.name(),
					%err,
					"builtin MAC registration failed"
				);
			}
		}
		registry
	}

	/// Inserts `algorithm` under its name, aliases, id and OID.
	///
	/// Every key is checked before anything is inserted. Registering the
	/// same descriptor again is a no-op.
	pub fn register(
		&mut self,
		algorithm: &'static MacAlgorithm,
	) -> Result<(), MacError> {
		if self.ordered.iter().any(|known| known.same(algorithm)) {
			tracing::debug!(
				algorithm = algorithm.name(),
				"MAC algorithm already registered"
			);
			return Ok(());
		}
		for key in algorithm.name_keys() {
			if let Some(existing) = self.by_name.get(&key) {
				return Err(duplicate(algorithm, existing, &key));
			}
		}
		if let Some(existing) = self.by_id.get(&algorithm.id()) {
			return Err(duplicate(
				algorithm,
				existing,
				&algorithm.id().to_string(),
			));
		}
		if let Some(oid) = algorithm.oid() {
			if let Some(existing) = self.by_oid.get(oid) {
				return Err(duplicate(algorithm, existing, oid));
			}
		}

		for key in algorithm.name_keys() {
			self.by_name.insert(key, algorithm);
		}
		self.by_id.insert(algorithm.id(), algorithm);
		if let Some(oid) = algorithm.oid() {
			self.by_oid.insert(oid, algorithm);
		}
		self.ordered.push(algorithm);
		tracing::debug!(
			algorithm = algorithm.name(),
			id = algorithm.id(),
			oid = algorithm.oid().unwrap_or("-"),
			"registered MAC algorithm"
		);
		Ok(())
	}

	pub fn lookup_by_name(
		&self,
		name: &str,
	) -> Result<&'static MacAlgorithm, MacError> {
		self.by_name
			.get(&name.trim().to_ascii_lowercase())
			.copied()
			.ok_or_else(|| {
				MacError::not_found(format!(
					"unsupported MAC algorithm `{}`",
					name
				))
			})
	}

	pub fn lookup_by_id(
		&self,
		id: u32,
	) -> Result<&'static MacAlgorithm, MacError> {
		self.by_id.get(&id).copied().ok_or_else(|| {
			MacError::not_found(format!("no MAC algorithm with id {}", id))
		})
	}

	pub fn lookup_by_oid(
		&self,
		oid: &str,
	) -> Result<&'static MacAlgorithm, MacError> {
		self.by_oid.get(oid.trim()).copied().ok_or_else(|| {
			MacError::not_found(format!(
				"no MAC algorithm with OID {}",
				oid
			))
		})
	}

	/// Algorithms in registration order.
	pub fn algorithms(
		&self,
	) -> impl Iterator<Item = &'static MacAlgorithm> + '_ {
		self.ordered.iter().copied()
	}

	pub fn len(&self) -> usize {
		self.ordered.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ordered.is_empty()
	}
}

impl fmt::Debug for Registry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list()
			.entries(self.ordered.iter().map(|alg| alg.name()))
			.finish()
	}
}

fn duplicate(
	algorithm: &MacAlgorithm,
	existing: &MacAlgorithm,
	key: &str,
) -> MacError {
	MacError::new(
		MacErrorKind::DuplicateAlgorithm,
		format!(
			"cannot register {}: `{}` is already bound to {}",
			algorithm.metadata.display_name,
			key,
			existing.metadata.display_name
		),
	)
}

fn builtin_algorithms() -> impl Iterator<Item = &'static MacAlgorithm> {
	hmac::catalog()
		.iter()
		.chain(cmac::catalog().iter())
		.chain(gmac::catalog().iter())
		.chain(kmac::catalog().iter())
		.chain(poly1305::catalog().iter())
		.chain(siphash::catalog().iter())
		.chain(blake3::catalog().iter())
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Installs the process-wide registry. Must happen before the first
/// lookup; afterwards the table is read-only.
pub fn install(registry: Registry) -> Result<(), MacError> {
	GLOBAL.set(registry).map_err(|_| {
		MacError::new(
			MacErrorKind::RegistryLocked,
			"the MAC registry is already initialized",
		)
	})
}

/// The process-wide registry, populated with [`Registry::builtin`] when
/// nothing was installed.
pub fn global() -> &'static Registry {
	GLOBAL.get_or_init(Registry::builtin)
}

pub fn lookup_by_name(
	name: &str,
) -> Result<&'static MacAlgorithm, MacError> {
	global().lookup_by_name(name)
}

pub fn lookup_by_id(id: u32) -> Result<&'static MacAlgorithm, MacError> {
	global().lookup_by_id(id)
}

pub fn lookup_by_oid(
	oid: &str,
) -> Result<&'static MacAlgorithm, MacError> {
	global().lookup_by_oid(oid)
}

pub fn find_algorithm(
	identifier: &str,
) -> Option<&'static MacAlgorithm> {
	lookup_by_name(identifier).ok()
}

pub fn algorithms() -> impl Iterator<Item = &'static MacAlgorithm> {
	global().algorithms()
}

pub fn metadata() -> Vec<MacAlgorithmMetadata> {
	algorithms().map(|alg| alg.metadata).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builtin_contains_every_family() {
		let registry = Registry::builtin();
		assert_eq!(registry.len(), 8);
		for family in [
			MacFamily::DirectKeyed,
			MacFamily::HashBased,
			MacFamily::CipherBased,
			MacFamily::XofBased,
		] {
			assert!(
				registry.algorithms().any(|a| a.metadata.family == family),
				"{:?}",
				family
			);
		}
	}

	#[test]
	fn names_are_case_insensitive_and_aliases_resolve() {
		let registry = Registry::builtin();
		let by_alias = registry.lookup_by_name("KMAC-128").unwrap();
		let by_name = registry.lookup_by_name("kmac128").unwrap();
		assert!(by_alias.same(by_name));
		assert_eq!(
			registry.lookup_by_name("HMAC").unwrap().id(),
			855
		);
	}

	#[test]
	fn reregistering_same_descriptor_is_noop() {
		let mut registry = Registry::builtin();
		let hmac = &hmac::catalog()[0];
		registry.register(hmac).unwrap();
		assert_eq!(registry.len(), 8);
	}

	#[test]
	fn misses_are_not_found() {
		let registry = Registry::new();
		assert!(registry.is_empty());
		for err in [
			registry.lookup_by_name("hmac").unwrap_err(),
			registry.lookup_by_id(855).unwrap_err(),
			registry.lookup_by_oid("1.0.9797.3.4").unwrap_err(),
		] {
			assert_eq!(err.kind(), MacErrorKind::NotFound);
		}
	}
}
