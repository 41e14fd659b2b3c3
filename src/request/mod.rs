//! Request module - the transport seam
//!
//! The clients only reach the server through [`HttpClient`], so any transport
//! that can follow redirects and keep cookies between requests can drive them.
//! The reqwest implementation lives behind the `reqwest-client` feature.

#![allow(async_fn_in_trait)] // the clients are driven on one task, Send futures are not needed

use std::fmt;

use url::Url;

use crate::error::{ErrorKind, Result};

#[cfg(feature = "reqwest-client")]
mod reqwest_client;
#[cfg(feature = "reqwest-client")]
pub use reqwest_client::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request for the caller to send. Building one performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    /// Form fields in document order.
    pub data: Vec<(String, String)>,
}

impl Request {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A fully read response.
pub trait HttpResponse {
    fn status(&self) -> u16;

    /// Final URL, after any redirects were followed.
    fn url(&self) -> &str;

    /// Body decoded with the charset the transport was told about, UTF-8 if
    /// none.
    fn text(&self) -> &str;

    /// Body bytes exactly as received.
    fn content(&self) -> &[u8];

    fn raise_for_status(&self) -> Result<()> {
        let status = self.status();
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(ErrorKind::HttpStatus {
                status,
                url: self.url().to_string(),
            }
            .into())
        }
    }
}

pub trait HttpClient {
    type Response: HttpResponse;

    /// Relative request URLs are resolved against this; response URLs must
    /// stay on its host.
    fn base_url(&self) -> &Url;

    async fn request(
        &self,
        method: Method,
        url: &str,
        data: Option<&[(String, String)]>,
        params: &[(&str, &str)],
        follow_redirects: bool,
    ) -> Result<Self::Response>;

    /// Sends a request produced by the sign-on flow.
    async fn send(&self, request: &Request, follow_redirects: bool) -> Result<Self::Response> {
        self.request(
            request.method,
            &request.url,
            Some(&request.data),
            &[],
            follow_redirects,
        )
        .await
    }
}
