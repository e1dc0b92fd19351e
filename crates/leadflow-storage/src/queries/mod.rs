// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules. All functions accept `&Database` and run on the
//! single writer thread via `conn.call()`.

pub mod agents;
pub mod assignments;
pub mod leads;
