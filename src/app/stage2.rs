//! The stage-2 preregistration system under `/coursetake`.

use scraper::ElementRef;
use tracing::{info, warn};

use crate::contract::check_response_url;
use crate::dom::{self, remove_prefix, remove_suffix, text_content};
use crate::error::{ErrorKind, Result, structure};
use crate::model::{SessionInfo, Stage2ListItem};
use crate::request::{HttpClient, HttpResponse, Method};
use crate::sso;
use crate::table::{Headers, RowLayout, TableRows, TableSchema};
use crate::validate::{check_priority, check_serial_number};

pub const LOGIN_PATH: &str = "/coursetake/login.aspx";
pub const LANDING_PATH: &str = "/coursetake/index.php/survey-note";
pub const MAIN_PATH: &str = "/coursetake/index.php/ctake/mainscr";
pub const ADD_PATH: &str = "/coursetake/index.php/ctake/add-cou";
pub const DELETE_PATH: &str = "/coursetake/index.php/ctake/del-cou";

const LIST_ROWS: RowLayout = RowLayout::HeaderFirst(":root > body > div > table > tbody > tr");
const ADD_RESULT: &str = "#card1 > div > table > tbody > tr > td > div";
const ADD_FAILURE: &str = ":root > body > div > div";
const DELETE_RESULT: &str = "#card1 > div > div";

const ADD_CONFIRM: &str = "確定登記";
const DELETE_CONFIRM: &str = "確定退選";
const ADD_SUCCEEDED: &str = "\n\t\t\t\t\t加選登記成功\t\t\t\t";

fn delete_succeeded(serial_number: &str) -> String {
    format!("\n\t\t\t\t\t\t\t\t\t退選科目流水號: {serial_number}完成退選\t\t\t\t\t\t\t\t")
}

/// The stage-2 listing. Its header texts are not checked, only their number.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stage2List;

fn font_text(cell: ElementRef<'_>) -> Result<String> {
    Ok(text_content(dom::select_one_from(cell, ":scope > font")?))
}

impl TableSchema for Stage2List {
    type Record = Stage2ListItem;

    fn headers(&self) -> Headers {
        Headers::Count(9)
    }

    fn parse_row(&self, cells: &[ElementRef<'_>]) -> Result<Stage2ListItem> {
        // "3\u{a0}\u{a0} (" followed by an element holding the change link
        let priority_font = dom::select_one_from(cells[7], ":scope > font")?;
        let priority = dom::leading_text(priority_font)
            .ok_or_else(|| structure("priority cell has no leading text"))?;
        let priority = remove_suffix(priority, "\u{a0}\u{a0} (")?.trim();
        let priority = priority
            .parse::<i64>()
            .map_err(|_| structure(format!("priority {priority:?} is not a number")))?;
        let priority = check_priority(priority)
            .map_err(|_| structure(format!("priority {priority} is out of range")))?;

        let instructor = font_text(cells[5])?;
        let schedule = font_text(cells[6])?;

        Ok(Stage2ListItem {
            serial_number: font_text(cells[0])?,
            curriculum_number: font_text(cells[1])?,
            class: font_text(cells[2])?,
            curriculum_name: font_text(cells[3])?.trim_end_matches(' ').to_string(),
            credits: font_text(cells[4])?,
            instructor: remove_suffix(&instructor, "    ")?.to_string(),
            course_schedule: remove_suffix(remove_prefix(&schedule, " ")?, " ")?.to_string(),
            priority,
            remark: remove_suffix(&text_content(cells[8]), "\u{a0}")?.to_string(),
        })
    }
}

/// Client for the stage-2 preregistration.
#[derive(Debug)]
pub struct Stage2Client<C> {
    http_client: C,
    session_info: Option<SessionInfo>,
}

impl<C: HttpClient> Stage2Client<C> {
    pub fn new(http_client: C) -> Self {
        Self {
            http_client,
            session_info: None,
        }
    }

    /// Uses a session that was captured by another login.
    pub fn with_session(http_client: C, session_info: SessionInfo) -> Self {
        Self {
            http_client,
            session_info: Some(session_info),
        }
    }

    pub fn session_info(&self) -> Option<&SessionInfo> {
        self.session_info.as_ref()
    }

    fn snapshot(&self) -> Result<SessionInfo> {
        self.session_info
            .clone()
            .ok_or_else(|| ErrorKind::NotLoggedIn.into())
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let response = self
            .http_client
            .request(Method::Get, LOGIN_PATH, None, &[], true)
            .await?;
        let request = sso::login(&response, username, password)?;

        let response = self.http_client.send(&request, true).await?;
        response.raise_for_status()?;
        let query = check_response_url(
            response.url(),
            self.http_client.base_url(),
            LANDING_PATH,
            &["regno", "lang", "extid"],
        )?;
        let session_info = super::session_from_query(query)?;

        info!(lang = %session_info.lang, "stage-2 session captured");
        self.session_info = Some(session_info);
        Ok(())
    }

    pub async fn list_courses(&self) -> Result<TableRows<Stage2List>> {
        let session = self.snapshot()?;
        let params = [
            ("regno", session.regno.as_str()),
            ("extid", session.extid.as_str()),
        ];
        let response = self
            .http_client
            .request(Method::Get, MAIN_PATH, None, &params, false)
            .await?;
        response.raise_for_status()?;

        let document = dom::document_from_string(response.text());
        TableRows::new(document, LIST_ROWS, Stage2List)
    }

    pub async fn add_course(&self, serial_number: &str, priority: i64) -> Result<()> {
        check_serial_number(serial_number)?;
        let priority = check_priority(priority)?.to_string();
        let session = self.snapshot()?;

        let params = [
            ("serno", serial_number),
            ("cougrp", ""),
            ("regno", session.regno.as_str()),
            ("extid", session.extid.as_str()),
            ("code", "2"),
            ("sure", ADD_CONFIRM),
            ("priority", priority.as_str()),
        ];
        let response = self
            .http_client
            .request(Method::Get, ADD_PATH, None, &params, false)
            .await?;
        response.raise_for_status()?;

        let document = dom::document_from_string(response.text());
        let divisions = dom::select(&document, ADD_RESULT)?;
        let message = match divisions.as_slice() {
            [division] => {
                let text = text_content(*division);
                if text == ADD_SUCCEEDED {
                    info!(serial_number, %priority, "course registered");
                    return Ok(());
                }
                text
            }
            // a rejected registration renders a bare message page
            [] => text_content(dom::select_one(&document, ADD_FAILURE)?),
            _ => {
                return Err(structure(format!(
                    "{} result divisions on the registration page",
                    divisions.len()
                )));
            }
        };
        warn!(serial_number, %message, "registration rejected");
        Err(ErrorKind::ServerMessage(message).into())
    }

    pub async fn delete_course(&self, serial_number: &str) -> Result<()> {
        check_serial_number(serial_number)?;
        let session = self.snapshot()?;

        let params = [
            ("serno", serial_number),
            ("regno", session.regno.as_str()),
            ("extid", session.extid.as_str()),
            ("sure", DELETE_CONFIRM),
        ];
        let response = self
            .http_client
            .request(Method::Get, DELETE_PATH, None, &params, false)
            .await?;
        response.raise_for_status()?;

        let document = dom::document_from_string(response.text());
        let message = text_content(dom::select_one(&document, DELETE_RESULT)?);
        if message != delete_succeeded(serial_number) {
            warn!(serial_number, %message, "deregistration rejected");
            return Err(ErrorKind::ServerMessage(message).into());
        }

        info!(serial_number, "course deregistered");
        Ok(())
    }
}
