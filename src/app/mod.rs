//! Application module - the registration systems
//!
//! Each client drives one registration application over an injected
//! [`HttpClient`](crate::request::HttpClient): sign on, capture the session,
//! then list, add and delete courses. Every page is checked before it is
//! trusted; no operation is retried.

use std::collections::BTreeMap;

use crate::error::{Result, contract};
use crate::model::SessionInfo;

pub mod add_drop;
pub mod results;
pub mod stage2;

pub use add_drop::AddDropClient;
pub use results::ResultsClient;
pub use stage2::Stage2Client;

/// Takes the session identifiers out of a checked landing URL query.
fn session_from_query(mut query: BTreeMap<String, String>) -> Result<SessionInfo> {
    let mut take = |key: &str| {
        query
            .remove(key)
            .ok_or_else(|| contract(format!("landing URL has no {key:?}")))
    };
    Ok(SessionInfo {
        regno: take("regno")?,
        lang: take("lang")?,
        extid: take("extid")?,
    })
}
