//! Sanitization adapter for page bodies
//!
//! Wraps the whitelist [`Policy`] and turns its markup output into readable
//! text: line-break tags become newlines, entities are decoded and long
//! whitespace runs are collapsed.

mod policy;

pub use policy::{body_policy, Policy};

use regex::Regex;

/// Spellings of a line break left behind by the policy
const LINE_BREAKS: [&str; 3] = ["<br>", "<br/>", "<br />"];

/// Any run of two or more ASCII whitespace characters, capturing the first two
///
/// Non-breaking spaces from decoded `&nbsp;` are not whitespace here.
const WHITESPACE_RUN: &str = r"([\t\n\x0C\r ]{2})[\t\n\x0C\r ]*";

/// Pure string transform from raw body HTML to normalized text
#[derive(Debug, Clone)]
pub struct Sanitizer {
    policy: Policy,
    whitespace_run: Regex,
}

impl Sanitizer {
    /// Creates a sanitizer using [`body_policy`]
    pub fn new() -> Result<Self, regex::Error> {
        Self::with_policy(body_policy())
    }

    pub fn with_policy(policy: Policy) -> Result<Self, regex::Error> {
        Ok(Self {
            policy,
            whitespace_run: Regex::new(WHITESPACE_RUN)?,
        })
    }

    /// Sanitizes the inner HTML of a `<body>` element
    pub fn sanitize_body(&self, raw: &str) -> String {
        let mut text = self.policy.sanitize(raw);

        for line_break in LINE_BREAKS {
            text = text.replace(line_break, "\n");
        }

        let text = html_escape::decode_html_entities(&text);

        self.whitespace_run.replace_all(&text, "$1").into_owned()
    }
}
