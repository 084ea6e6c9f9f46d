// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

pub mod grammar;
pub mod analyzer;
pub mod options;
pub mod compile;

// package name & version
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
