// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// Module: mac (message authentication codes)
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Generic MAC layer.
//! The registry and context are algorithm-agnostic; each algorithm module
//! contributes static descriptors and a [`method::MacMethod`]
//! implementation. Key loading, streaming helpers and CLI handlers sit on
//! top.

pub mod blake3;
pub mod cmac;
pub mod commands;
pub mod context;
pub mod control;
pub mod error;
pub mod executor;
pub mod gmac;
pub mod hmac;
pub mod key;
pub mod kmac;
pub mod method;
pub mod poly1305;
pub mod registry;
pub mod siphash;
