// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] writes recorded [`SurveyEvent`]s and drained [`FormChanges`]
//! batches as [Chrome Trace Event Format][spec] JSON, so an editing session
//! can be inspected in `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
//!
//! Form edits carry no clock, so `ts` is the event's sequence number in
//! microseconds. Survey notifications go on thread 0 and change batches on
//! thread 1.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use formwork_core::element::{ElementId, FormChanges};

use crate::recorder::SurveyEvent;

/// Exports survey notifications and change batches as a JSON array of trace
/// events.
pub fn export(
    events: &[SurveyEvent],
    batches: &[FormChanges],
    writer: &mut dyn Write,
) -> io::Result<()> {
    let mut out: Vec<Value> = Vec::with_capacity(events.len() + batches.len());

    for (seq, event) in events.iter().enumerate() {
        let args = match *event {
            SurveyEvent::QuestionAdded {
                element,
                index,
                container,
                root,
            }
            | SurveyEvent::PanelAdded {
                element,
                index,
                container,
                root,
            } => json!({
                "element": label(element),
                "index": index,
                "container": label(container),
                "root": label(root),
            }),
            SurveyEvent::QuestionRemoved { element } | SurveyEvent::PanelRemoved { element } => {
                json!({ "element": label(element) })
            }
        };
        out.push(json!({
            "ph": "i",
            "name": event.name(),
            "cat": "Survey",
            "ts": seq,
            "pid": 0,
            "tid": 0,
            "s": "t",
            "args": args,
        }));
    }

    for (seq, changes) in batches.iter().enumerate() {
        out.push(json!({
            "ph": "i",
            "name": "FormChanges",
            "cat": "Changes",
            "ts": seq,
            "pid": 0,
            "tid": 1,
            "s": "t",
            "args": {
                "visibility": labels(&changes.visibility),
                "row_visibility": changes
                    .row_visibility
                    .iter()
                    .map(|&(container, row)| format!("{}#{row}", label(container)))
                    .collect::<Vec<_>>(),
                "rows_changed": labels(&changes.rows_changed),
                "layout": labels(&changes.layout),
            }
        }));
    }

    serde_json::to_writer_pretty(&mut *writer, &out)?;
    writeln!(writer)
}

fn label(id: ElementId) -> String {
    format!("{}@{}", id.index(), id.generation())
}

fn labels(ids: &[ElementId]) -> Vec<String> {
    ids.iter().copied().map(label).collect()
}

#[cfg(test)]
mod tests {
    use formwork_core::element::ElementStore;

    use super::*;
    use crate::recorder::RecordingSurvey;

    #[test]
    fn exports_events_and_changes() {
        let mut store = ElementStore::with_survey(RecordingSurvey::new());
        let page = store.create_panel("page");
        store.connect(page);
        let q = store.add_new_question(page, "q");
        let _ = store.rows(page);
        store.set_visible(q, false);
        let batch = store.take_changes();

        let mut buf = Vec::new();
        export(store.survey().events(), &[batch], &mut buf).expect("write to Vec");
        let parsed: Value = serde_json::from_slice(&buf).expect("valid JSON");
        let entries = parsed.as_array().expect("top-level array");

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["name"], "QuestionAdded");
        assert_eq!(entries[0]["args"]["index"], 0);
        assert_eq!(entries[1]["cat"], "Changes");
        assert_eq!(
            entries[1]["args"]["visibility"],
            json!([label(q)]),
            "hidden question is listed"
        );
        assert_eq!(entries[1]["args"]["row_visibility"], json!([format!("{}#0", label(page))]));
    }

    #[test]
    fn empty_input_is_an_empty_array() {
        let mut buf = Vec::new();
        export(&[], &[], &mut buf).expect("write to Vec");
        let parsed: Value = serde_json::from_slice(&buf).expect("valid JSON");
        assert_eq!(parsed, json!([]));
    }
}
