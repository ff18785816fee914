// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: executor.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Streaming helpers for MAC computation.

use super::context::MacContext;
use super::error::MacError;
use hex::encode;
use std::io::{self, Read};

const MAC_BUFFER_SIZE: usize = 8192;

/// Feeds `reader` through a configured context in 8 KiB chunks and
/// returns the tag. The context is left `Finalized`.
pub fn consume_reader<R: Read>(
	mut reader: R,
	ctx: &mut MacContext,
) -> io::Result<Vec<u8>> {
	ctx.init().map_err(io::Error::other)?;
	let mut buffer = [0u8; MAC_BUFFER_SIZE];
	loop {
		let n = match reader.read(&mut buffer) {
			Ok(0) => break,
			Ok(n) => n,
			Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
			Err(err) => return Err(err),
		};
		ctx.update(&buffer[..n]).map_err(io::Error::other)?;
	}
	ctx.finalize_to_vec().map_err(io::Error::other)
}

pub fn consume_bytes(
	data: &[u8],
	ctx: &mut MacContext,
) -> Result<Vec<u8>, MacError> {
	ctx.init()?;
	ctx.update(data)?;
	ctx.finalize_to_vec()
}

pub fn digest_to_hex(bytes: &[u8]) -> String {
	encode(bytes)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rgm::mac::control::MacControl;
	use std::io::Cursor;

	fn siphash() -> MacContext {
		let mut ctx = MacContext::by_name("siphash").unwrap();
		ctx.control_hex(
			crate::rgm::mac::control::ControlCommand::SetKey,
			"000102030405060708090a0b0c0d0e0f",
		)
		.unwrap();
		ctx
	}

	#[test]
	fn reader_and_bytes_agree() {
		let data = vec![0x5au8; MAC_BUFFER_SIZE * 2 + 17];
		let mut ctx = siphash();
		let from_bytes = consume_bytes(&data, &mut ctx).unwrap();
		let from_reader = consume_reader(Cursor::new(&data), &mut ctx).unwrap();
		assert_eq!(from_bytes, from_reader);
	}

	#[test]
	fn hex_output() {
		let mut ctx = siphash();
		ctx.control(MacControl::Size(8)).unwrap();
		let tag = consume_bytes(b"", &mut ctx).unwrap();
		assert_eq!(digest_to_hex(&tag), "310e0edd47db6f72");
	}

	#[test]
	fn unkeyed_context_fails() {
		let mut ctx = MacContext::by_name("poly1305").unwrap();
		assert!(consume_bytes(b"x", &mut ctx).is_err());
		let err = consume_reader(Cursor::new(b"x"), &mut ctx).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::Other);
	}
}
