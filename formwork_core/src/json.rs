// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON (de)serialization of element trees.
//!
//! A container is written as
//!
//! ```json
//! { "type": "panel", "name": "contact", "innerIndent": 1, "elements": [ ... ] }
//! ```
//!
//! and a question as `{ "type": "<question type>", "name": "..." }`. Properties
//! equal to their defaults are omitted on write and implied on read:
//!
//! | key                | default | applies to |
//! |--------------------|---------|------------|
//! | `visible`          | `true`  | all        |
//! | `startWithNewLine` | `true`  | all        |
//! | `width`            | none    | all        |
//! | `visibleIf`        | `""`    | all        |
//! | `title`, `body`    | `""`    | containers |
//! | `innerIndent`      | `0`     | containers |
//! | `elements`         | `[]`    | containers |
//!
//! On read, `questions` is accepted in place of `elements`.

use alloc::string::String;
use alloc::vec::Vec;

use serde_json::{Map, Value};
use tracing::debug;

use crate::element::{ElementId, ElementStore, INNER_INDENT_CHOICES};
use crate::error::JsonError;
use crate::survey::Survey;

/// `type` value written for containers.
pub const PANEL_TYPE: &str = "panel";

impl<S: Survey> ElementStore<S> {
    /// Serializes an element and its subtree.
    #[must_use]
    pub fn to_json(&self, id: ElementId) -> Value {
        self.validate(id);
        let idx = id.idx as usize;
        let mut obj = Map::new();

        let ty = self.question_type(id).unwrap_or(PANEL_TYPE);
        obj.insert("type".into(), ty.into());
        obj.insert("name".into(), self.name[idx].as_str().into());
        if !self.visible[idx] {
            obj.insert("visible".into(), false.into());
        }
        if !self.start_with_new_line[idx] {
            obj.insert("startWithNewLine".into(), false.into());
        }
        if let Some(width) = &self.width[idx] {
            obj.insert("width".into(), width.as_str().into());
        }
        if !self.visible_if[idx].is_empty() {
            obj.insert("visibleIf".into(), self.visible_if[idx].as_str().into());
        }

        if self.is_panel_at(id.idx) {
            let panel = self.panel(id.idx);
            for (key, text) in [
                ("title", &panel.title),
                ("body", &panel.body),
            ] {
                if !text.is_empty() {
                    obj.insert(key.into(), text.as_str().into());
                }
            }
            if panel.inner_indent != 0 {
                obj.insert("innerIndent".into(), panel.inner_indent.into());
            }
            if !panel.children.is_empty() {
                let elements: Vec<Value> = self.elements(id).map(|e| self.to_json(e)).collect();
                obj.insert("elements".into(), Value::Array(elements));
            }
        }

        Value::Object(obj)
    }

    /// Builds a detached element tree from JSON.
    ///
    /// Elements of type `"panel"` become containers; any other type becomes a
    /// question of that type. Row-change notifications are suppressed while
    /// loading. On error nothing is left allocated.
    pub fn from_json(&mut self, json: &Value) -> Result<ElementId, JsonError> {
        let was_loading = core::mem::replace(&mut self.loading, true);
        let result = self.load_element(json);
        self.loading = was_loading;
        result
    }

    fn load_element(&mut self, json: &Value) -> Result<ElementId, JsonError> {
        let obj = json.as_object().ok_or(JsonError::NotAnObject {
            found: kind(json),
        })?;
        let name = str_field(obj, "", "name")?.unwrap_or_default();
        let ty = str_field(obj, name, "type")?.ok_or_else(|| JsonError::MissingField {
            name: name.into(),
            field: "type",
        })?;

        let id = if ty == PANEL_TYPE {
            self.create_panel(name)
        } else {
            let question = self.create_question(name);
            self.set_question_type(question, ty);
            question
        };
        if let Err(err) = self.load_properties(id, name, obj) {
            debug!(element = name, %err, "discarding partially loaded element");
            self.destroy_element(id);
            return Err(err);
        }
        Ok(id)
    }

    fn load_properties(
        &mut self,
        id: ElementId,
        name: &str,
        obj: &Map<String, Value>,
    ) -> Result<(), JsonError> {
        let idx = id.idx as usize;
        // Direct writes: a freshly created element has no rows or observers.
        if let Some(visible) = bool_field(obj, name, "visible")? {
            self.visible[idx] = visible;
        }
        if let Some(start) = bool_field(obj, name, "startWithNewLine")? {
            self.start_with_new_line[idx] = start;
        }
        if let Some(width) = str_field(obj, name, "width")? {
            self.set_width(id, Some(width.into()));
        }
        if let Some(expression) = str_field(obj, name, "visibleIf")? {
            self.set_visible_if(id, expression);
        }
        if !self.is_panel_at(id.idx) {
            return Ok(());
        }

        if let Some(title) = str_field(obj, name, "title")? {
            self.set_title(id, title);
        }
        if let Some(body) = str_field(obj, name, "body")? {
            self.set_body(id, body);
        }
        if let Some(indent) = obj.get("innerIndent") {
            let value = indent.as_i64().ok_or_else(|| JsonError::InvalidType {
                name: name.into(),
                field: "innerIndent",
                expected: "an integer",
            })?;
            let indent = u8::try_from(value)
                .ok()
                .filter(|v| INNER_INDENT_CHOICES.contains(v))
                .ok_or_else(|| JsonError::InvalidChoice {
                    name: name.into(),
                    field: "innerIndent",
                    value,
                    choices: INNER_INDENT_CHOICES,
                })?;
            self.panel_mut(id.idx).inner_indent = indent;
        }

        let elements = match obj.get("elements").or_else(|| obj.get("questions")) {
            None => return Ok(()),
            Some(Value::Array(elements)) => elements,
            Some(_) => {
                return Err(JsonError::InvalidType {
                    name: name.into(),
                    field: "elements",
                    expected: "an array",
                });
            }
        };
        for element in elements {
            let child = self.load_element(element)?;
            self.add_element(id, child, None);
        }
        Ok(())
    }
}

fn bool_field(
    obj: &Map<String, Value>,
    name: &str,
    field: &'static str,
) -> Result<Option<bool>, JsonError> {
    match obj.get(field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(JsonError::InvalidType {
            name: name.into(),
            field,
            expected: "a boolean",
        }),
    }
}

fn str_field<'a>(
    obj: &'a Map<String, Value>,
    name: &str,
    field: &'static str,
) -> Result<Option<&'a str>, JsonError> {
    match obj.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(JsonError::InvalidType {
            name: name.into(),
            field,
            expected: "a string",
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
