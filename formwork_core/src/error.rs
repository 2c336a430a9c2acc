// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Structural operations never fail: adding a dead handle is a no-op and
//! removing an absent element returns `false`. Only condition evaluation and
//! JSON loading surface errors to the caller.

use alloc::string::String;
use alloc::vec::Vec;

use thiserror::Error;

use crate::element::ElementId;

/// Failure to parse or evaluate a `visibleIf` expression.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConditionError {
    /// The expression text is malformed.
    #[error("cannot parse condition '{expression}': {message}")]
    Parse {
        /// Source text of the expression.
        expression: String,
        /// What the parser expected or found.
        message: String,
    },

    /// The expression parsed but could not be evaluated against the data.
    #[error("cannot evaluate condition '{expression}': {message}")]
    Evaluation {
        /// Source text of the expression.
        expression: String,
        /// Evaluator-specific detail.
        message: String,
    },
}

/// One or more elements failed to evaluate their condition during a
/// [`run_condition`](crate::element::ElementStore::run_condition) pass.
///
/// Every failed element kept the visibility it had before the pass.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{} condition(s) failed to evaluate", .failures.len())]
pub struct RunConditionError {
    /// Failed elements in evaluation (depth-first, children first) order.
    pub failures: Vec<(ElementId, ConditionError)>,
}

/// Failure to load an element tree from JSON.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum JsonError {
    /// An element entry was not a JSON object.
    #[error("expected a JSON object for an element, found {found}")]
    NotAnObject {
        /// JSON kind that was found instead.
        found: &'static str,
    },

    /// A required field is absent.
    #[error("element '{name}' is missing required field '{field}'")]
    MissingField {
        /// Name of the element, empty if unknown.
        name: String,
        /// Missing field.
        field: &'static str,
    },

    /// A field holds a value of the wrong JSON type.
    #[error("field '{field}' of element '{name}' must be {expected}")]
    InvalidType {
        /// Name of the element, empty if unknown.
        name: String,
        /// Offending field.
        field: &'static str,
        /// Expected JSON kind.
        expected: &'static str,
    },

    /// A choice-constrained field holds a value outside its choices.
    #[error("field '{field}' of element '{name}' must be one of {choices:?}, found {value}")]
    InvalidChoice {
        /// Name of the element.
        name: String,
        /// Offending field.
        field: &'static str,
        /// Value that was found.
        value: i64,
        /// Allowed values.
        choices: &'static [u8],
    },
}
