//! The add/drop registration system under `/coursetake2`.

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;
use tracing::{debug, info, warn};
use url::Url;

use crate::contract::check_response_url;
use crate::dom::{self, remove_prefix, remove_suffix, text_content};
use crate::error::{ErrorKind, Result, structure};
use crate::locale::{ADD_SUCCEEDED, Locale};
use crate::model::{CourseSelectionListItem, SessionInfo};
use crate::request::{HttpClient, HttpResponse, Method};
use crate::sso;
use crate::table::{Headers, RowLayout, TableRows, TableSchema};
use crate::validate::check_serial_number;

pub const LOGIN_PATH: &str = "/coursetake2/login.aspx";
pub const LANDING_PATH: &str = "/coursetake2/user/coursetake2";
pub const MAIN_PATH: &str = "/coursetake2/coutake/mainscr";
pub const ADD_PATH: &str = "/coursetake2/coutake/add-cou";
pub const DELETE_PATH: &str = "/coursetake2/coutake/del-cou";

// The header row sits directly under <table>, the rows in the first explicit
// <tbody>. Any further tbody is not part of the listing.
const LIST_ROWS: RowLayout = RowLayout::Split {
    header: "#div-main > center > table > tbody:nth-of-type(1) > tr",
    data: "#div-main > center > table > tbody:nth-of-type(2) > tr",
};
const MAIN_DIVISION: &str = "#div-main";
const ADD_BANNER: &str = "#div-main > h3 > font";
const ADD_SERIAL_NUMBER_LABEL: &str = "#div-main > table > tbody > tr:nth-of-type(2) > td:nth-of-type(1) \
     > center > table > tbody > tr:nth-of-type(1) > th > font";
const ADD_SERIAL_NUMBER: &str = "#div-main > table > tbody > tr:nth-of-type(2) > td:nth-of-type(1) \
     > center > table > tbody > tr:nth-of-type(1) > td > font";
const DELETE_STUDENT_ID_LABEL: &str =
    "#div-main > table > tbody > tr:nth-of-type(1) > td:nth-of-type(1)";
const DELETE_STUDENT_ID: &str = "#div-main > table > tbody > tr:nth-of-type(1) > td:nth-of-type(2)";
const DELETE_SERIAL_NUMBER_LABEL: &str =
    "#div-main > table > tbody > tr:nth-of-type(2) > td:nth-of-type(1)";
const DELETE_SERIAL_NUMBER: &str =
    "#div-main > table > tbody > tr:nth-of-type(2) > td:nth-of-type(2)";

// The landing page after sign-on is nothing but this script.
static SESSION_REDIRECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\A<script type="text/javascript">\r\nwindow\.location\.href = '(/coursetake2/user/chk-sess\?sess=[0-9a-f]{32}[0-9A-Z]{9}[0-9]{12}&language=)';\r\n</script>\z"#,
    )
    .expect("session redirect pattern is valid")
});

/// Course selection listing, headers depend on the session language.
#[derive(Debug, Clone, Copy)]
pub struct CourseSelectionList {
    pub locale: Locale,
}

impl TableSchema for CourseSelectionList {
    type Record = CourseSelectionListItem;

    fn headers(&self) -> Headers {
        Headers::Texts(&self.locale.add_drop_texts().list_headers)
    }

    fn parse_row(&self, cells: &[ElementRef<'_>]) -> Result<CourseSelectionListItem> {
        // curriculum number and identity number share a cell, split by a <br>
        let texts = dom::texts(cells[2]);
        let &[number, identity] = texts.as_slice() else {
            return Err(structure("curriculum cell does not hold two texts"));
        };
        let schedule = text_content(cells[7]);
        let schedule = remove_suffix(&schedule, "\t\n  ")?;

        Ok(CourseSelectionListItem {
            status: text_content(cells[0]),
            serial_number: text_content(cells[1]),
            curriculum_number: remove_suffix(number, " ")?.to_string(),
            curriculum_identity_number: remove_prefix(identity, "\n\t    ")?.to_string(),
            course_name: text_content(cells[3]).trim_end_matches(' ').to_string(),
            course_class: remove_suffix(&text_content(cells[4]), "\u{a0}")?.to_string(),
            credits: text_content(cells[5]),
            instructor: text_content(cells[6]).trim_end_matches(' ').to_string(),
            course_schedule: schedule.strip_prefix(' ').unwrap_or(schedule).to_string(),
            conflict_wish: remove_suffix(&text_content(cells[8]), "\u{a0}")?.to_string(),
            remarks: remove_suffix(&text_content(cells[9]), "\u{a0}")?.to_string(),
        })
    }
}

/// Client for the add/drop period.
///
/// Holds at most one session; operations run one at a time and each works on
/// its own copy of the session identifiers.
#[derive(Debug)]
pub struct AddDropClient<C> {
    http_client: C,
    session_info: Option<SessionInfo>,
}

impl<C: HttpClient> AddDropClient<C> {
    pub fn new(http_client: C) -> Self {
        Self {
            http_client,
            session_info: None,
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

    /// Signs on and captures the session. On failure the previously held
    /// session, if any, is left untouched.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let response = self
            .http_client
            .request(Method::Get, LOGIN_PATH, None, &[], true)
            .await?;
        let request = sso::login(&response, username, password)?;

        let response = self.http_client.send(&request, true).await?;
        response.raise_for_status()?;
        check_response_url(
            response.url(),
            self.http_client.base_url(),
            LANDING_PATH,
            &["regno", "lang"],
        )?;
        let captures = SESSION_REDIRECT
            .captures(response.text())
            .ok_or_else(|| structure("landing page is not the session redirect script"))?;
        let url = Url::parse(response.url())?.join(&captures[1])?;
        debug!("following session redirect");

        let response = self
            .http_client
            .request(Method::Get, url.as_str(), None, &[], true)
            .await?;
        response.raise_for_status()?;
        let query = check_response_url(
            response.url(),
            self.http_client.base_url(),
            MAIN_PATH,
            &["regno", "lang", "extid"],
        )?;
        let session_info = super::session_from_query(query)?;
        Locale::from_lang(&session_info.lang)?;

        info!(lang = %session_info.lang, "add/drop session captured");
        self.session_info = Some(session_info);
        Ok(())
    }

    /// Courses currently selected, parsed row by row as the result is consumed.
    pub async fn list_courses(&self) -> Result<TableRows<CourseSelectionList>> {
        let session = self.snapshot()?;
        let locale = Locale::from_lang(&session.lang)?;

        let params = [
            ("regno", session.regno.as_str()),
            ("lang", locale.lang()),
            ("extid", session.extid.as_str()),
        ];
        let response = self
            .http_client
            .request(Method::Get, MAIN_PATH, None, &params, false)
            .await?;
        response.raise_for_status()?;

        let document = dom::document_from_string(response.text());
        TableRows::new(document, LIST_ROWS, CourseSelectionList { locale })
    }

    pub async fn add_course(&self, serial_number: &str) -> Result<()> {
        check_serial_number(serial_number)?;
        let session = self.snapshot()?;
        let locale = Locale::from_lang(&session.lang)?;
        let texts = locale.add_drop_texts();

        let params = [
            ("serno", serial_number),
            ("cougrp", ""),
            ("opFld", "serno"),
            ("cou_no", ""),
            ("cou_cls", ""),
            ("couid_1", ""),
            ("couid_2", ""),
            ("couid_cls", ""),
            ("authno", ""),
            ("regno", session.regno.as_str()),
            ("extid", session.extid.as_str()),
            ("txtRank", ""),
            ("sure", texts.add_confirm),
            ("lang", locale.lang()),
        ];
        let response = self
            .http_client
            .request(Method::Get, ADD_PATH, None, &params, false)
            .await?;
        response.raise_for_status()?;

        let document = dom::document_from_string(response.text());
        let banner = text_content(dom::select_one(&document, ADD_BANNER)?);
        if banner != ADD_SUCCEEDED {
            warn!(serial_number, %banner, "add rejected");
            return Err(ErrorKind::ServerMessage(banner).into());
        }
        dom::check_text_content(
            &document,
            ADD_SERIAL_NUMBER_LABEL,
            texts.add_serial_number_label,
        )?;
        dom::check_text_content(&document, ADD_SERIAL_NUMBER, serial_number)?;

        info!(serial_number, "course added");
        Ok(())
    }

    pub async fn delete_course(&self, serial_number: &str) -> Result<()> {
        check_serial_number(serial_number)?;
        let session = self.snapshot()?;
        let locale = Locale::from_lang(&session.lang)?;
        let texts = locale.add_drop_texts();

        let params = [
            ("serno", serial_number),
            ("regno", session.regno.as_str()),
            ("extid", session.extid.as_str()),
            ("sure", texts.delete_confirm),
            ("lang", locale.lang()),
        ];
        let response = self
            .http_client
            .request(Method::Get, DELETE_PATH, None, &params, false)
            .await?;
        response.raise_for_status()?;

        let document = dom::document_from_string(response.text());
        let main = dom::select_one(&document, MAIN_DIVISION)?;
        let completed = dom::own_texts(main);
        if completed != texts.delete_completed {
            let message = completed.concat();
            warn!(serial_number, %message, "delete rejected");
            return Err(ErrorKind::ServerMessage(message).into());
        }
        dom::check_text_content(
            &document,
            DELETE_STUDENT_ID_LABEL,
            texts.delete_student_id_label,
        )?;
        dom::check_text_content(&document, DELETE_STUDENT_ID, &session.regno)?;
        dom::check_text_content(
            &document,
            DELETE_SERIAL_NUMBER_LABEL,
            texts.delete_serial_number_label,
        )?;
        dom::check_text_content(&document, DELETE_SERIAL_NUMBER, serial_number)?;

        info!(serial_number, "course deleted");
        Ok(())
    }
}
