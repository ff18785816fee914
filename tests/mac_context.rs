// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: mac_context.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

use rustgenmac::rgm::mac::registry;
use rustgenmac::{
	ControlCommand, Engine, MacContext, MacControl, MacErrorKind, Phase,
};

fn keyed(name: &str, controls: &[(&str, &str)]) -> MacContext {
	let mut ctx = MacContext::by_name(name).unwrap();
	for (kind, value) in controls {
		ctx.control_str(kind, value).unwrap();
	}
	ctx
}

fn hmac() -> MacContext {
	keyed("hmac", &[("digest", "sha256"), ("key", "key")])
}

fn one_shot(mut ctx: MacContext, data: &[u8]) -> Vec<u8> {
	ctx.init().unwrap();
	ctx.update(data).unwrap();
	ctx.finalize_to_vec().unwrap()
}

#[test]
fn clones_diverge_independently() {
	let mut original = hmac();
	original.init().unwrap();
	original.update(b"common prefix ").unwrap();

	let mut copy = original.try_clone().unwrap();
	assert_eq!(copy.phase(), Phase::Streaming);
	original.update(b"left").unwrap();
	copy.update(b"right").unwrap();

	assert_eq!(
		original.finalize_to_vec().unwrap(),
		one_shot(hmac(), b"common prefix left")
	);
	assert_eq!(
		copy.finalize_to_vec().unwrap(),
		one_shot(hmac(), b"common prefix right")
	);
}

#[test]
fn copy_from_overwrites_destination_state() {
	let mut src = keyed(
		"kmac128",
		&[("hexkey", "000102030405060708090a0b0c0d0e0f")],
	);
	src.init().unwrap();
	src.update(b"abc").unwrap();

	let mut dest = MacContext::by_name("kmac-128").unwrap();
	dest.copy_from(&src).unwrap();
	src.update(b"def").unwrap();
	dest.update(b"xyz").unwrap();

	let fresh = || {
		keyed(
			"kmac128",
			&[("hexkey", "000102030405060708090a0b0c0d0e0f")],
		)
	};
	assert_eq!(dest.finalize_to_vec().unwrap(), one_shot(fresh(), b"abcxyz"));
	assert_eq!(src.finalize_to_vec().unwrap(), one_shot(fresh(), b"abcdef"));
}

#[test]
fn size_query_does_not_consume_the_stream() {
	let mut ctx = keyed(
		"siphash",
		&[("hexkey", "000102030405060708090a0b0c0d0e0f"), ("size", "8")],
	);
	ctx.init().unwrap();
	ctx.update(b"abc").unwrap();
	assert_eq!(ctx.finalize(None).unwrap(), 8);
	assert_eq!(ctx.phase(), Phase::Streaming);

	let mut out = [0xffu8; 12];
	assert_eq!(ctx.finalize(Some(&mut out)).unwrap(), 8);
	assert_eq!(&out[8..], &[0xff; 4]);
	assert_eq!(ctx.phase(), Phase::Finalized);
}

#[test]
fn update_before_init_is_rejected() {
	let mut ctx = hmac();
	assert_eq!(
		ctx.update(b"abc").unwrap_err().kind(),
		MacErrorKind::NotInitialized
	);
	assert_eq!(
		ctx.finalize(None).unwrap_err().kind(),
		MacErrorKind::NotInitialized
	);
}

#[test]
fn unsupported_controls_are_reported() {
	let mut ctx = MacContext::by_name("poly1305").unwrap();
	for control in [
		MacControl::Iv(vec![0; 12]),
		MacControl::Size(32),
		MacControl::Custom(b"app".to_vec()),
	] {
		let err = ctx.control(control).unwrap_err();
		assert_eq!(err.kind(), MacErrorKind::UnsupportedControl);
	}
	let err = ctx
		.control_str("tls-data-size", "16")
		.unwrap_err();
	assert!(err.is_unsupported());
}

#[test]
fn configuration_is_frozen_while_streaming() {
	let mut ctx = hmac();
	ctx.init().unwrap();
	let err = ctx.control(MacControl::key(b"other")).unwrap_err();
	assert_eq!(err.kind(), MacErrorKind::ControlAfterInit);
	let err = ctx.control_str("digest", "sha512").unwrap_err();
	assert_eq!(err.kind(), MacErrorKind::ControlAfterInit);
	assert_eq!(ctx.size(), 32);

	// HMAC has no runtime-safe controls, and flags are not an HMAC control
	let err = ctx.control(MacControl::Flags(0x100)).unwrap_err();
	assert_eq!(err.kind(), MacErrorKind::ControlAfterInit);
	ctx.update(b"abc").unwrap();
	assert_eq!(ctx.finalize_to_vec().unwrap(), one_shot(hmac(), b"abc"));
	let err = ctx.control(MacControl::Flags(0x100)).unwrap_err();
	assert_eq!(err.kind(), MacErrorKind::UnsupportedControl);
}

#[test]
fn kmac_output_controls_apply_while_streaming() {
	let key = "404142434445464748494a4b4c4d4e4f505152535455565758595a5b5c5d5e5f";
	let mut ctx = keyed("kmac128", &[("hexkey", key)]);
	ctx.init().unwrap();
	ctx.update(&[0x00, 0x01]).unwrap();
	ctx.control(MacControl::Size(16)).unwrap();
	ctx.control(MacControl::Xof(true)).unwrap();
	assert_eq!(ctx.phase(), Phase::Streaming);
	let err = ctx.control_str("custom", "late").unwrap_err();
	assert_eq!(err.kind(), MacErrorKind::ControlAfterInit);
	ctx.update(&[0x02, 0x03]).unwrap();
	let tag = ctx.finalize_to_vec().unwrap();

	let mut reference =
		keyed("kmac128", &[("hexkey", key), ("size", "16"), ("xof", "1")]);
	assert_eq!(tag.len(), 16);
	assert_eq!(tag, one_shot(reference.try_clone().unwrap(), &[0, 1, 2, 3]));
	reference.control(MacControl::Xof(false)).unwrap();
	assert_ne!(tag, one_shot(reference, &[0, 1, 2, 3]));
}

#[test]
fn controls_after_final_reconfigure() {
	let mut ctx = hmac();
	ctx.init().unwrap();
	ctx.finalize_to_vec().unwrap();
	ctx.control_str("digest", "sha512").unwrap();
	assert_eq!(ctx.phase(), Phase::Configured);
	assert_eq!(ctx.size(), 64);
}

#[test]
fn init_discards_a_partial_computation() {
	let mut ctx = hmac();
	ctx.init().unwrap();
	ctx.update(b"garbage").unwrap();
	ctx.init().unwrap();
	ctx.update(b"abc").unwrap();
	assert_eq!(ctx.finalize_to_vec().unwrap(), one_shot(hmac(), b"abc"));
}

#[test]
fn contexts_resolve_by_id_and_oid() {
	let by_id = MacContext::by_id(855).unwrap();
	assert_eq!(by_id.name(), "hmac");
	let by_oid = MacContext::by_oid("1.0.9797.3.4").unwrap();
	assert_eq!(by_oid.name(), "gmac");
	assert_eq!(by_oid.id(), 1195);
	assert!(by_oid
		.algorithm()
		.same(registry::lookup_by_name("GMAC").unwrap()));
	assert_eq!(
		MacContext::by_id(1).unwrap_err().kind(),
		MacErrorKind::NotFound
	);
}

#[test]
fn hex_front_end_rejects_non_byte_commands() {
	let mut ctx = MacContext::by_name("kmac256").unwrap();
	let err = ctx.control_hex(ControlCommand::SetSize, "20").unwrap_err();
	assert_eq!(err.kind(), MacErrorKind::InvalidControlValue);
	ctx.control_hex(ControlCommand::SetCustom, "00ff").unwrap();
}

#[test]
fn engine_selection_keeps_the_tag() {
	let mut ctx = hmac();
	ctx.control(MacControl::Engine(Engine::Software)).unwrap();
	assert_eq!(ctx.phase(), Phase::Configured);
	assert_eq!(one_shot(ctx, b"abc"), one_shot(hmac(), b"abc"));
}
