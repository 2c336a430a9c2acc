// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for formwork
//! diagnostics.
//!
//! - [`recorder::RecordingSurvey`]: a [`Survey`](formwork_core::survey::Survey)
//!   that records every structural notification and answers mode queries
//!   from settable flags.
//! - [`pretty::write_tree`] / [`pretty::write_changes`]: human-readable
//!   output of a container's rows and of drained change lists.
//! - [`chrome::export`]: writes recorded notifications and change batches as
//!   Chrome Trace Event Format JSON.

pub mod chrome;
pub mod pretty;
pub mod recorder;
