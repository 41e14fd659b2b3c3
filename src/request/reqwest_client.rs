//! HTTP transport using reqwest
//!
//! Two reqwest clients share one cookie jar: one follows redirects, the other
//! stops at the first response so callers can see the redirect itself.

use std::sync::Arc;

use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, cookie::Jar, redirect::Policy};
use tracing::debug;
use url::Url;

use super::{HttpClient, HttpResponse, Method};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct ReqwestClient {
    base_url: Url,
    following: Client,
    direct: Client,
}

impl ReqwestClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let jar = Arc::new(Jar::default());
        let following = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()?;
        let direct = Client::builder()
            .cookie_provider(jar)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            base_url,
            following,
            direct,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestResponse {
    status: u16,
    url: String,
    text: String,
    content: Vec<u8>,
}

impl HttpResponse for ReqwestResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn content(&self) -> &[u8] {
        &self.content
    }
}

/// Encoding named by the `charset` parameter of a Content-Type header.
fn header_encoding(content_type: Option<&HeaderValue>) -> &'static Encoding {
    content_type
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            value.split(';').skip(1).find_map(|param| {
                let (name, label) = param.split_once('=')?;
                name.trim()
                    .eq_ignore_ascii_case("charset")
                    .then(|| label.trim().trim_matches('"'))
            })
        })
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8)
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

impl HttpClient for ReqwestClient {
    type Response = ReqwestResponse;

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
    ) -> Result<ReqwestResponse> {
        let url = self.base_url.join(url)?;
        debug!(%method, path = url.path(), follow_redirects, "sending request");

        let client = if follow_redirects {
            &self.following
        } else {
            &self.direct
        };
        let mut builder = client.request(method.into(), url);
        if !params.is_empty() {
            builder = builder.query(params);
        }
        if let Some(data) = data {
            builder = builder.form(data);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        debug!(status, path = resp.url().path(), "received response");
        let url = resp.url().to_string();
        let encoding = header_encoding(resp.headers().get(CONTENT_TYPE));
        let content = resp.bytes().await?.to_vec();
        let text = encoding.decode(&content).0.into_owned();

        Ok(ReqwestResponse {
            status,
            url,
            text,
            content,
        })
    }
}
