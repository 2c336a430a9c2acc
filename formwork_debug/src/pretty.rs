// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable tree and change output.
//!
//! [`write_tree`] prints a container as its rows, one element per line, with
//! the layout the row pass assigned:
//!
//! ```text
//! panel "page" sp_100 visible
//!   row 0 visible
//!     text "first" width=50% indent=1
//!     text "last" width=50% indent=0
//! ```
//!
//! [`write_changes`] prints a drained [`FormChanges`] one category per line.

use std::io::{self, Write};

use formwork_core::element::{ElementId, ElementKind, ElementStore, FormChanges, Row};
use formwork_core::survey::Survey;

/// Writes the subtree of `root`, grouped into rows.
///
/// Takes the store mutably because row layouts are built on demand.
pub fn write_tree<S: Survey, W: Write>(
    store: &mut ElementStore<S>,
    root: ElementId,
    writer: &mut W,
) -> io::Result<()> {
    write_element(store, root, 0, writer)
}

fn write_element<S: Survey, W: Write>(
    store: &mut ElementStore<S>,
    id: ElementId,
    depth: usize,
    writer: &mut W,
) -> io::Result<()> {
    let pad = depth * 2;
    match store.kind(id) {
        ElementKind::Question => writeln!(
            writer,
            "{:pad$}{} {:?} width={} indent={}{}",
            "",
            store.question_type(id).unwrap_or_default(),
            store.name(id),
            store.render_width(id),
            store.right_indent(id),
            if store.visible(id) { "" } else { " hidden" },
        ),
        ElementKind::Panel => {
            writeln!(
                writer,
                "{:pad$}panel {:?} {} {}",
                "",
                store.name(id),
                store.panel_id(id),
                visibility(store.is_visible(id)),
            )?;
            let rows: Vec<Row> = store.rows(id).to_vec();
            for (i, row) in rows.iter().enumerate() {
                writeln!(
                    writer,
                    "{:pad$}row {i} {}",
                    "",
                    visibility(row.visible()),
                    pad = pad + 2,
                )?;
                for &element in row.elements() {
                    write_element(store, element, depth + 2, writer)?;
                }
            }
            Ok(())
        }
    }
}

/// Writes each non-empty category of `changes` on its own line.
pub fn write_changes<W: Write>(changes: &FormChanges, writer: &mut W) -> io::Result<()> {
    if changes.is_empty() {
        return writeln!(writer, "[changes] none");
    }
    let lists = [
        ("visibility", &changes.visibility),
        ("rows_changed", &changes.rows_changed),
        ("layout", &changes.layout),
    ];
    for (name, ids) in lists {
        if !ids.is_empty() {
            writeln!(writer, "[{name}] {ids:?}")?;
        }
    }
    if !changes.row_visibility.is_empty() {
        writeln!(writer, "[row_visibility] {:?}", changes.row_visibility)?;
    }
    Ok(())
}

fn visibility(visible: bool) -> &'static str {
    if visible { "visible" } else { "hidden" }
}
