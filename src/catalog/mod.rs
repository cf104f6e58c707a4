// Copyright 2026 StreamLight Project Authors. Licensed under Apache-2.0.

//! Column descriptors received at channel open, and the per-column plans
//! the row buffer derives from them.

mod column;

pub use self::column::*;
