//! Webhook domain types.
//!
//! A webhook command moves through three stages:
//!
//! - **Action** (`action.rs`): resolve command line options into one
//!   [`WebhookAction`] (add, remove, fire, or list)
//! - **Request** (`request.rs`): derive the authenticated [`WebhookRequest`]
//!   for that action
//! - **Response** (`response.rs`): classify the [`WebhookResponse`] and decode
//!   the list body into [`HookGroups`]
//!
//! # Wire Contract
//!
//! | Action | Method | Path | Body |
//! |--------|--------|------|------|
//! | Add | `POST` | `web_hooks` | `gem_name`, `url` |
//! | Remove | `DELETE` | `web_hooks` | `gem_name`, `url` |
//! | Fire | `POST` | `web_hooks/fire` | `gem_name`, `url` |
//! | List | `GET` | `web_hooks` | none |
//!
//! Every request carries the caller's API key in the `Authorization` header.
//! Use `*` as the gem name to target all gems.

mod action;
mod request;
mod response;

pub use action::{ALL_GEMS, WebhookAction, WebhookOptions};
pub use request::{FIRE_PATH, HttpMethod, WEB_HOOKS_PATH, WebhookRequest};
pub use response::{
    HookGroup, HookGroups, HookRecord, PARSE_PROBLEM_MESSAGE, StatusClass, WebhookResponse,
    render_groups,
};
