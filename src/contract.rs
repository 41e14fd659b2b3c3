//! Response URL checks.
//!
//! Session identifiers only ever arrive in the query string of the page a
//! redirect chain lands on, so the landing URL is held to an exact contract
//! before anything is read from it.

use std::collections::{BTreeMap, BTreeSet};

use url::{Position, Url, form_urlencoded};

use crate::error::{Result, contract};

/// Checks that `response_url` is an https URL on the host of `base_url` with
/// exactly `path`, no path parameters, no fragment, and a query holding each
/// of `query_keys` exactly once. Returns the query values.
pub fn check_response_url(
    response_url: &str,
    base_url: &Url,
    path: &str,
    query_keys: &[&str],
) -> Result<BTreeMap<String, String>> {
    let url = Url::parse(response_url)
        .map_err(|e| contract(format!("cannot parse {response_url:?}: {e}")))?;

    if url.scheme() != "https" {
        return Err(contract(format!("{response_url:?} is not https")));
    }
    let netloc = &url[Position::BeforeUsername..Position::AfterPort];
    let expected_netloc = &base_url[Position::BeforeUsername..Position::AfterPort];
    if netloc != expected_netloc {
        return Err(contract(format!(
            "host {netloc:?} differs from {expected_netloc:?}"
        )));
    }
    if url.path().contains(';') {
        return Err(contract(format!("{response_url:?} carries path parameters")));
    }
    if url.path() != path {
        return Err(contract(format!(
            "path {:?} differs from {path:?}",
            url.path()
        )));
    }
    if url.fragment().is_some() {
        return Err(contract(format!("{response_url:?} carries a fragment")));
    }

    let mut query: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in parse_query_strict(url.query().unwrap_or_default())? {
        query.entry(key).or_default().push(value);
    }

    let expected: BTreeSet<&str> = query_keys.iter().copied().collect();
    let observed: BTreeSet<&str> = query.keys().map(String::as_str).collect();
    if observed != expected {
        let missing: Vec<_> = expected.difference(&observed).collect();
        let extra: Vec<_> = observed.difference(&expected).collect();
        return Err(contract(format!(
            "query keys of {path:?}: missing {missing:?}, unexpected {extra:?}"
        )));
    }

    query
        .into_iter()
        .map(|(key, mut values)| match values.len() {
            1 => Ok((key, values.remove(0))),
            n => Err(contract(format!("query key {key:?} has {n} values"))),
        })
        .collect()
}

/// Fails unless the response landed on exactly `expected`.
pub fn check_exact_url(response_url: &str, expected: &str) -> Result<()> {
    if response_url != expected {
        return Err(contract(format!(
            "landed on {response_url:?}, expected {expected:?}"
        )));
    }
    Ok(())
}

/// Parses `a=1&b=2`, rejecting empty segments and segments without `=`.
/// Pairs with an empty value are dropped.
pub fn parse_query_strict(query: &str) -> Result<Vec<(String, String)>> {
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let mut pairs = Vec::new();
    for segment in query.split('&') {
        let Some((_, raw_value)) = segment.split_once('=') else {
            return Err(contract(format!("malformed query segment {segment:?}")));
        };
        if raw_value.is_empty() {
            continue;
        }
        if let Some((key, value)) = form_urlencoded::parse(segment.as_bytes()).next() {
            pairs.push((key.into_owned(), value.into_owned()));
        }
    }
    Ok(pairs)
}
