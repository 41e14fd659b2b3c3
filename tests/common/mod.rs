//! Shared helpers for integration tests.
//!
//! Each integration test file compiles common/ as its own module, so not
//! every helper is used in every file.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;

use ntu_coursetake::Result;
use ntu_coursetake::request::{HttpClient, HttpResponse, Method, Request};
use ntu_coursetake::sso::SSO_LOGIN_URL;
use url::Url;

pub const BASE_URL: &str = "https://if192.aca.ntu.edu.tw/";
pub const REGNO: &str = "B09901001";
pub const EXTID: &str = "8c1f0e7a";

/// Reads a page from tests/fixtures.
pub fn fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("should read fixture {}: {e}", path.display()))
}

/// Reads a page from tests/fixtures without decoding it.
pub fn fixture_bytes(name: &str) -> Vec<u8> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("should read fixture {}: {e}", path.display()))
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub url: String,
    pub body: String,
    /// Raw body, when it is not the UTF-8 encoding of `body`.
    pub content: Option<Vec<u8>>,
}

impl MockResponse {
    pub fn ok(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status: 200,
            url: url.into(),
            body: body.into(),
            content: None,
        }
    }

    /// A page served as raw bytes in a legacy encoding. Like a transport that
    /// saw no charset in the headers, `text()` is the lossy UTF-8 reading.
    pub fn encoded(url: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            status: 200,
            url: url.into(),
            body: String::from_utf8_lossy(&content).into_owned(),
            content: Some(content),
        }
    }

    /// The sign-on page every login starts on.
    pub fn sso_page() -> Self {
        Self::ok(SSO_LOGIN_URL, fixture("sso_login.html"))
    }
}

impl HttpResponse for MockResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn text(&self) -> &str {
        &self.body
    }

    fn content(&self) -> &[u8] {
        self.content.as_deref().unwrap_or(self.body.as_bytes())
    }
}

/// A request as the client issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub method: Method,
    pub url: String,
    pub data: Option<Vec<(String, String)>>,
    pub params: Vec<(String, String)>,
    pub follow_redirects: bool,
}

impl Sent {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|(key, _)| key.as_str()).collect()
    }

    /// The submitted form, if the request carried one.
    pub fn form(&self) -> Option<Request> {
        Some(Request {
            method: self.method,
            url: self.url.clone(),
            data: self.data.clone()?,
        })
    }
}

/// Answers requests from a script, in order, and records what was sent.
pub struct MockClient {
    base_url: Url,
    script: RefCell<VecDeque<MockResponse>>,
    sent: RefCell<Vec<Sent>>,
}

impl MockClient {
    pub fn new(script: impl IntoIterator<Item = MockResponse>) -> Self {
        Self {
            base_url: Url::parse(BASE_URL).unwrap(),
            script: RefCell::new(script.into_iter().collect()),
            sent: RefCell::new(Vec::new()),
        }
    }

    pub fn push(&self, response: MockResponse) {
        self.script.borrow_mut().push_back(response);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.borrow().clone()
    }

    pub fn last_sent(&self) -> Sent {
        self.sent.borrow().last().cloned().expect("should have sent a request")
    }

    pub fn remaining(&self) -> usize {
        self.script.borrow().len()
    }
}

impl HttpClient for &MockClient {
    type Response = MockResponse;

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn request(
        &self,
        method: Method,
        url: &str,
        data: Option<&[(String, String)]>,
        params: &[(&str, &str)],
        follow_redirects: bool,
    ) -> Result<MockResponse> {
        self.sent.borrow_mut().push(Sent {
            method,
            url: url.to_string(),
            data: data.map(<[_]>::to_vec),
            params: params
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            follow_redirects,
        });
        let response = self
            .script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted {method} {url}"));
        Ok(response)
    }
}
