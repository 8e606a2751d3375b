// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - STL and OBJ reading/writing.

pub mod obj;
pub mod stl;

pub use obj::write_obj;
pub use stl::{read_stl, write_stl};
