// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Shared helpers for the `to_tree()` structural representation every node
//! supports, used in tests for deep-equality assertions independent of
//! `Display` rendering.

/// Two spaces per level, matching the indentation the original parser's
/// fixtures were written against.
pub fn indent(level: usize) -> String {
    "  ".repeat(level)
}
