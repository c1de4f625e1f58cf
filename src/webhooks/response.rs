//! Registry responses and the webhook list format.
//!
//! A successful list response is a JSON object mapping a group name (a gem
//! name, or `all gems`) to the hooks registered under it:
//!
//! ```json
//! {
//!   "rails": [{ "url": "https://ci.example.com/rails", "failure_count": 0 }],
//!   "all gems": [{ "url": "https://hooks.example.com/any" }]
//! }
//! ```
//!
//! Groups are kept in the order the server sent them.

use crate::{Error, Result};
use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};
use std::fmt;

/// Line shown before the decoder error when a list body cannot be parsed.
pub const PARSE_PROBLEM_MESSAGE: &str = "There was a problem parsing the data:";

/// Coarse classification of an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx.
    Success,
    /// Anything else.
    Failure,
}

/// Raw response from the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, unparsed.
    pub body: String,
}

impl WebhookResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Classifies the status code.
    #[must_use]
    pub const fn status_class(&self) -> StatusClass {
        if self.status >= 200 && self.status < 300 {
            StatusClass::Success
        } else {
            StatusClass::Failure
        }
    }

    /// Returns true for a 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status_class(), StatusClass::Success)
    }
}

/// A registered hook as reported by the list endpoint.
///
/// The `url` key must be present but may be `null`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HookRecord {
    /// Hook URL.
    #[serde(deserialize_with = "nullable_string")]
    pub url: Option<String>,
    /// Consecutive failed deliveries, when the registry reports a usable count.
    #[serde(default, deserialize_with = "lenient_count")]
    pub failure_count: Option<u64>,
}

fn nullable_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

/// Accepts integers and numeric strings; anything else is dropped.
fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok())))
}

/// Hooks registered under one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookGroup {
    /// Group name.
    pub name: String,
    /// Hooks in server order.
    pub hooks: Vec<HookRecord>,
}

/// Decoded list response, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookGroups(Vec<HookGroup>);

impl HookGroups {
    /// Parses a list response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseFailed`] if the body is not a JSON object of
    /// arrays of hook objects with a `url`.
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| Error::ParseFailed {
            cause: e.to_string(),
        })
    }

    /// Groups in server order.
    #[must_use]
    pub fn groups(&self) -> &[HookGroup] {
        &self.0
    }

    /// Returns true if the registry reported no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of hooks across all groups.
    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.0.iter().map(|group| group.hooks.len()).sum()
    }
}

impl<'de> Deserialize<'de> for HookGroups {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct GroupsVisitor;

        impl<'de> Visitor<'de> for GroupsVisitor {
            type Value = HookGroups;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of group names to lists of hooks")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut groups = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, hooks)) = map.next_entry::<String, Vec<HookRecord>>()? {
                    groups.push(HookGroup { name, hooks });
                }
                Ok(HookGroups(groups))
            }
        }

        deserializer.deserialize_map(GroupsVisitor)
    }
}

/// Renders groups as console lines: a `group:` header, then `- url` per hook.
///
/// A hook without a URL renders as a bare `- `.
#[must_use]
pub fn render_groups(groups: &HookGroups) -> Vec<String> {
    let mut lines = Vec::with_capacity(groups.groups().len() + groups.hook_count());
    for group in groups.groups() {
        lines.push(format!("{}:", group.name));
        lines.extend(
            group
                .hooks
                .iter()
                .map(|hook| format!("- {}", hook.url.as_deref().unwrap_or_default())),
        );
    }
    lines
}
