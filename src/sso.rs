//! University single sign-on.
//!
//! Every registration application starts its login by redirecting to the
//! same sign-on page. This module turns that page into the credential
//! submission request; it performs no I/O, the caller sends the request.

use scraper::ElementRef;
use tracing::debug;
use url::Url;

use crate::contract::check_exact_url;
use crate::dom;
use crate::error::{Result, structure};
use crate::request::{HttpResponse, Method, Request};

pub const SSO_LOGIN_URL: &str = "https://web2.cc.ntu.edu.tw/p/s/login2/p1.php";

const LOGIN_FORM: &str = r#"#content > form[name="p1"]"#;
const USERNAME_FIELD: &str = "user";
const PASSWORD_FIELD: &str = "pass";

/// Fields a browser would submit with `form`, in document order. `None` marks
/// a field without a value, such as an unchecked checkbox.
pub fn form_fields(form: ElementRef<'_>) -> Vec<(String, Option<String>)> {
    let mut fields: Vec<(String, Option<String>)> = Vec::new();
    for element in form.descendants().filter_map(ElementRef::wrap) {
        let Some(name) = element.value().attr("name") else {
            continue;
        };
        let value = match element.value().name() {
            "input" => input_value(element),
            "textarea" => Some(dom::text_content(element)),
            "select" => select_value(element),
            _ => continue,
        };
        match fields.iter_mut().find(|(key, _)| key == name) {
            // radio groups share a name, the checked one supplies the value
            Some(existing) => {
                if existing.1.is_none() {
                    existing.1 = value;
                }
            }
            None => fields.push((name.to_string(), value)),
        }
    }
    fields
}

fn input_value(input: ElementRef<'_>) -> Option<String> {
    let element = input.value();
    let kind = element.attr("type").unwrap_or("text").to_ascii_lowercase();
    if kind == "checkbox" || kind == "radio" {
        return element
            .attr("checked")
            .map(|_| element.attr("value").unwrap_or("on").to_string());
    }
    element.attr("value").map(str::to_string)
}

fn select_value(select: ElementRef<'_>) -> Option<String> {
    let options = dom::select_from(select, "option").ok()?;
    let option = options
        .iter()
        .find(|option| option.value().attr("selected").is_some())
        .or_else(|| options.first())?;
    Some(
        option
            .value()
            .attr("value")
            .map(str::to_string)
            .unwrap_or_else(|| dom::text_content(*option)),
    )
}

/// Builds the credential submission for the sign-on page in `response`.
///
/// All fields other than the username and password are carried over unchanged.
pub fn login(response: &impl HttpResponse, username: &str, password: &str) -> Result<Request> {
    response.raise_for_status()?;
    check_exact_url(response.url(), SSO_LOGIN_URL)?;

    let document = dom::document_from_string(response.text());
    let form = dom::select_one(&document, LOGIN_FORM)?;

    let mut fields = form_fields(form);
    for (field, credential) in [(USERNAME_FIELD, username), (PASSWORD_FIELD, password)] {
        let (_, value) = fields
            .iter_mut()
            .find(|(key, _)| key == field)
            .ok_or_else(|| structure(format!("sign-on form has no {field:?} field")))?;
        *value = Some(credential.to_string());
    }

    let method = form
        .value()
        .attr("method")
        .unwrap_or("GET")
        .to_ascii_uppercase();
    if method != "POST" {
        return Err(structure(format!("sign-on form method is {method:?}")));
    }

    let action = form
        .value()
        .attr("action")
        .ok_or_else(|| structure("sign-on form has no action"))?;
    let url = Url::parse(response.url())?.join(action)?;

    let data = fields
        .into_iter()
        .map(|(key, value)| match value {
            Some(value) => Ok((key, value)),
            None => Err(structure(format!("sign-on form field {key:?} has no value"))),
        })
        .collect::<Result<Vec<_>>>()?;
    debug!(fields = data.len(), action = url.path(), "built sign-on request");

    Ok(Request {
        method: Method::Post,
        url: url.into(),
        data,
    })
}
