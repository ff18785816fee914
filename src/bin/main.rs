// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: rustgenmac
// File: main.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2022 Volker Schwaberow

use rustgenmac::rgm::app;

fn main() -> Result<(), Box<dyn std::error::Error>> {
	app::run()?;
	Ok(())
}
