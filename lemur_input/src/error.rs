// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration errors raised while wiring up functions and listeners.

use alloc::string::String;

/// Errors reported by [`FunctionRegistry`](crate::function::FunctionRegistry) and
/// [`InputMapper`](crate::mapper::InputMapper).
///
/// These indicate wiring bugs. They are reported at the call that caused them and are not
/// expected at steady state.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum InputError {
    /// A function with the same group and id was already registered.
    #[error("function `{group}:{id}` is already registered")]
    DuplicateFunction {
        /// Group of the rejected function.
        group: String,
        /// Id of the rejected function.
        id: String,
    },
    /// A listener registration named no functions.
    #[error("at least one function id is required to register a listener")]
    NoFunctions,
}
