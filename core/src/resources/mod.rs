//! Endpoint groups of the Nylas API.
//!
//! Each handle borrows the `NylasClient`. `build_*` methods validate and
//! assemble requests without I/O; the same-named method without the prefix
//! dispatches it.

mod authentication;
mod calendars;
mod contacts;
mod events;
mod management;
mod messages;

pub use authentication::Hosted;
pub use calendars::Calendars;
pub use contacts::Contacts;
pub use events::Events;
pub use management::Management;
pub use messages::Messages;

use serde_json::Value;

use crate::validation::{key_optional, KeyRule, Rule, ValidationError};

/// Every id in a pooled call must be a non-empty string.
pub(crate) fn check_ids(ids: &[&str]) -> Result<(), ValidationError> {
    let ids = Value::Array(ids.iter().map(|id| Value::from(*id)).collect());
    Rule::array_of(Rule::non_empty_string()).validate_named("ids", &ids)
}

/// `limit`/`offset` paging keys shared by list endpoints.
pub(crate) fn paging_rules() -> Vec<KeyRule> {
    vec![
        key_optional("limit", Rule::int_min(1)),
        key_optional("offset", Rule::int_min(0)),
    ]
}
