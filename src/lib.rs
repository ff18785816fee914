// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: lib.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Generic message authentication code layer.
//!
//! Algorithms are registered as descriptors in [`rgm::mac::registry`],
//! bound to a [`rgm::mac::context::MacContext`], configured through the
//! control vocabulary in [`rgm::mac::control`] and driven through
//! init/update/final.

pub mod rgm {
	pub mod app;
	pub mod logging;
	pub mod mac;
	pub mod provider;
}

pub use rgm::mac::context::{MacContext, Phase};
pub use rgm::mac::control::{ControlCommand, MacControl};
pub use rgm::mac::error::{MacError, MacErrorKind};
pub use rgm::mac::registry::{MacAlgorithm, Registry};
pub use rgm::provider::Engine;
