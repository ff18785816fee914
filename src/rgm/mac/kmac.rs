// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: kmac.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! KMAC (NIST SP 800-185) for the 128- and 256-bit variants, with
//! customization string, variable output length and XOF mode.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{CShake128, CShake128Core, CShake256, CShake256Core};
use zeroize::Zeroizing;

use super::control::{ControlCommand, MacControl};
use super::error::MacError;
use super::method::{MacFamily, MacMethod, SizePolicy};
use super::registry::{MacAlgorithm, MacAlgorithmMetadata};

const KMAC128_RATE: usize = 168; // bytes
const KMAC256_RATE: usize = 136; // bytes
const FUNCTION_NAME: &[u8] = b"KMAC";
const OUTPUT_LEN_128: usize = 32;
const OUTPUT_LEN_256: usize = 64;
const MIN_KEY_LEN: usize = 4;
const MAX_KEY_LEN: usize = 512;
const MAX_CUSTOM_LEN: usize = 512;
/// Largest output whose bit length fits the 3-byte right_encode.
pub const MAX_OUTPUT_LEN: usize = 0xFF_FFFF / 8;

const CONTROLS: &[ControlCommand] = &[
	ControlCommand::SetKey,
	ControlCommand::SetCustom,
	ControlCommand::SetXof,
	ControlCommand::SetSize,
];

static ALGORITHMS: [MacAlgorithm; 2] = [
	MacAlgorithm::new(
		MacAlgorithmMetadata::new(
			"kmac128",
			"KMAC128",
			1196,
			MacFamily::XofBased,
			SizePolicy::Extendable {
				default: OUTPUT_LEN_128,
				max: MAX_OUTPUT_LEN,
			},
			CONTROLS,
		)
		.with_aliases(&["kmac-128"])
		.with_oid("2.16.840.1.101.3.4.2.19"),
		create_kmac128,
	),
	MacAlgorithm::new(
		MacAlgorithmMetadata::new(
			"kmac256",
			"KMAC256",
			1197,
			MacFamily::XofBased,
			SizePolicy::Extendable {
				default: OUTPUT_LEN_256,
				max: MAX_OUTPUT_LEN,
			},
			CONTROLS,
		)
		.with_aliases(&["kmac-256"])
		.with_oid("2.16.840.1.101.3.4.2.20"),
		create_kmac256,
	),
];

pub fn catalog() -> &'static [MacAlgorithm] {
	&ALGORITHMS
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KmacVariant {
	Kmac128,
	Kmac256,
}

impl KmacVariant {
	fn display_name(self) -> &'static str {
		match self {
			Self::Kmac128 => "KMAC128",
			Self::Kmac256 => "KMAC256",
		}
	}

	fn default_size(self) -> usize {
		match self {
			Self::Kmac128 => OUTPUT_LEN_128,
			Self::Kmac256 => OUTPUT_LEN_256,
		}
	}

	fn policy(self) -> SizePolicy {
		SizePolicy::Extendable {
			default: self.default_size(),
			max: MAX_OUTPUT_LEN,
		}
	}

	/// cSHAKE keyed with `bytepad(encode_string(K), rate)`.
	fn start(self, key: &[u8], custom: &[u8]) -> Sponge {
		match self {
			Self::Kmac128 => {
				let core = CShake128Core::new_with_function_name(
					FUNCTION_NAME,
					custom,
				);
				let mut state = CShake128::from_core(core);
				state.update(&bytepad(&encode_string(key), KMAC128_RATE));
				Sponge::Kmac128(state)
			}
			Self::Kmac256 => {
				let core = CShake256Core::new_with_function_name(
					FUNCTION_NAME,
					custom,
				);
				let mut state = CShake256::from_core(core);
				state.update(&bytepad(&encode_string(key), KMAC256_RATE));
				Sponge::Kmac256(state)
			}
		}
	}
}

#[derive(Clone)]
enum Sponge {
	Kmac128(CShake128),
	Kmac256(CShake256),
}

impl Sponge {
	fn absorb(&mut self, data: &[u8]) {
		match self {
			Sponge::Kmac128(state) => state.update(data),
			Sponge::Kmac256(state) => state.update(data),
		}
	}

	fn squeeze(self, out: &mut [u8]) {
		match self {
			Sponge::Kmac128(state) => state.finalize_xof().read(out),
			Sponge::Kmac256(state) => state.finalize_xof().read(out),
		}
	}
}

struct KmacState {
	variant: KmacVariant,
	key: Option<Zeroizing<Vec<u8>>>,
	custom: Vec<u8>,
	xof: bool,
	size: usize,
	running: Option<Sponge>,
}

impl MacMethod for KmacState {
	fn size(&self) -> usize {
		self.size
	}

	fn configure(&mut self, control: &MacControl) -> Result<(), MacError> {
		let name = self.variant.display_name();
		match control {
			MacControl::Key(key) => {
				if !(MIN_KEY_LEN..=MAX_KEY_LEN).contains(&key.len()) {
					return Err(MacError::invalid_value(format!(
						"{} key must be {}..={} bytes but received {}",
						name,
						MIN_KEY_LEN,
						MAX_KEY_LEN,
						key.len()
					)));
				}
				self.key = Some(key.clone());
			}
			MacControl::Custom(custom) => {
				if custom.len() > MAX_CUSTOM_LEN {
					return Err(MacError::invalid_value(format!(
						"{} customization string exceeds {} bytes",
						name, MAX_CUSTOM_LEN
					)));
				}
				self.custom = custom.clone();
			}
			// Output length and XOF mode are absorbed at finalize, so a
			// running sponge survives them.
			MacControl::Xof(xof) => {
				self.xof = *xof;
				return Ok(());
			}
			MacControl::Size(size) => {
				self.size = self.variant.policy().check(name, *size)?;
				return Ok(());
			}
			other => return Err(MacError::unsupported(name, other.command())),
		}
		self.running = None;
		Ok(())
	}

	fn init(&mut self) -> Result<(), MacError> {
		let key = self.key.as_ref().ok_or_else(|| {
			MacError::computation(format!(
				"{} requires a key (SET_KEY)",
				self.variant.display_name()
			))
		})?;
		self.running = Some(self.variant.start(key, &self.custom));
		Ok(())
	}

	fn update(&mut self, data: &[u8]) -> Result<(), MacError> {
		let running = self.running.as_mut().ok_or_else(|| {
			MacError::computation("KMAC computation was not started")
		})?;
		running.absorb(data);
		Ok(())
	}

	/// Absorbs `right_encode(L)` (or `right_encode(0)` in XOF mode) and
	/// squeezes `size` bytes.
	fn finalize(&mut self, out: &mut [u8]) -> Result<usize, MacError> {
		let mut running = self.running.take().ok_or_else(|| {
			MacError::computation("KMAC computation was not started")
		})?;
		let bits = if self.xof { 0 } else { (self.size as u64) * 8 };
		running.absorb(&right_encode(bits));
		running.squeeze(&mut out[..self.size]);
		Ok(self.size)
	}

	fn duplicate(&self) -> Result<Box<dyn MacMethod>, MacError> {
		Ok(Box::new(KmacState {
			variant: self.variant,
			key: self.key.clone(),
			custom: self.custom.clone(),
			xof: self.xof,
			size: self.size,
			running: self.running.clone(),
		}))
	}

	fn runtime_controls(&self) -> &'static [ControlCommand] {
		&[ControlCommand::SetXof, ControlCommand::SetSize]
	}
}

fn create(variant: KmacVariant) -> Result<Box<dyn MacMethod>, MacError> {
	Ok(Box::new(KmacState {
		variant,
		key: None,
		custom: Vec::new(),
		xof: false,
		size: variant.default_size(),
		running: None,
	}))
}

fn create_kmac128() -> Result<Box<dyn MacMethod>, MacError> {
	create(KmacVariant::Kmac128)
}

fn create_kmac256() -> Result<Box<dyn MacMethod>, MacError> {
	create(KmacVariant::Kmac256)
}

fn encode_string(input: &[u8]) -> Zeroizing<Vec<u8>> {
	let mut result = Zeroizing::new(left_encode((input.len() * 8) as u64));
	result.extend_from_slice(input);
	result
}

fn left_encode(value: u64) -> Vec<u8> {
	let encoded = trim_be_bytes(value);
	let mut out = Vec::with_capacity(1 + encoded.len());
	out.push(encoded.len() as u8);
	out.extend_from_slice(&encoded);
	out
}

fn right_encode(value: u64) -> Vec<u8> {
	let mut out = trim_be_bytes(value);
	out.push(out.len() as u8);
	out
}

fn bytepad(encoded: &[u8], w: usize) -> Zeroizing<Vec<u8>> {
	let mut result = Zeroizing::new(left_encode(w as u64));
	result.extend_from_slice(encoded);
	while result.len() % w != 0 {
		result.push(0);
	}
	result
}

fn trim_be_bytes(value: u64) -> Vec<u8> {
	let bytes = value.to_be_bytes();
	let first = bytes
		.iter()
		.position(|&b| b != 0)
		.unwrap_or(bytes.len() - 1);
	bytes[first..].to_vec()
}
