// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM-backed email extraction.
//!
//! Free text goes to an OpenAI-compatible chat completions endpoint with
//! a strict-JSON prompt; the reply is parsed for an `email` field and
//! validated (`@` plus a dotted domain, lowercased). Without an API key
//! the [`DisabledExtractor`] stands in and never finds anything, which
//! keeps the funnel alive: the user just stays in the collection stage.

pub mod llm;
pub mod validate;

pub use llm::{DisabledExtractor, LlmExtractor};
pub use validate::normalize_email;
