//! Preregistration results, served from a fixed host.

use scraper::ElementRef;
use tracing::{debug, info};

use crate::contract::check_exact_url;
use crate::dom::{self, text_content};
use crate::error::{ErrorKind, Result};
use crate::model::{FailedCourse, OperationLogItem, ResultItem, ResultKind};
use crate::request::{HttpClient, HttpResponse, Method};
use crate::sso;
use crate::table::{Headers, RowLayout, TableRows, TableSchema};

pub const LOGIN_URL: &str = "https://if177.aca.ntu.edu.tw/qcaureg/stulogin.asp";
pub const INDEX_URL: &str = "https://if177.aca.ntu.edu.tw/qcaureg/index.asp";
pub const OPERATION_LOG_URL: &str = "https://if177.aca.ntu.edu.tw/qcaureg/displayLog.asp";
pub const FAILED_COURSES_URL: &str = "https://if177.aca.ntu.edu.tw/qcaureg/DistFailCourses.asp";

const RESULT_ROWS: &str = "#content > center:nth-of-type(1) > table > tbody > tr";
const OPERATION_LOG_ROWS: &str = "#content > center > table > tbody > tr";
const OPERATION_LOG_HEADING: &str = "#content > center > h2";
const FAILED_COURSES_ROWS: &str = "#content > table > tbody > tr";

const RESULT_HEADERS: [&str; 8] = [
    "流水號",
    "課號",
    "課程識別碼",
    "班次",
    "課程名稱",
    "學分",
    "教師姓名",
    "備註",
];
const OPERATION_LOG_HEADERS: [&str; 2] = ["時間", "訊息"];
const FAILED_COURSES_HEADERS: [&str; 8] = [
    "流水號",
    "課號",
    "課程識別碼",
    "班次",
    "課程名稱",
    "學分",
    "教師姓名",
    "未分發上原因",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultTable;

impl TableSchema for ResultTable {
    type Record = ResultItem;

    fn header_path(&self) -> &'static str {
        ":scope > th > strong"
    }

    fn headers(&self) -> Headers {
        Headers::Texts(&RESULT_HEADERS)
    }

    fn parse_row(&self, cells: &[ElementRef<'_>]) -> Result<ResultItem> {
        Ok(ResultItem {
            serial_number: text_content(cells[0]),
            curriculum_number: text_content(cells[1]),
            curriculum_identity_number: text_content(cells[2]),
            class: text_content(cells[3]),
            course_name: text_content(cells[4]).trim_end_matches(' ').to_string(),
            credits: text_content(cells[5]),
            instructor: text_content(cells[6]).trim_end_matches(' ').to_string(),
            mark: text_content(cells[7]),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OperationLog;

impl TableSchema for OperationLog {
    type Record = OperationLogItem;

    fn header_path(&self) -> &'static str {
        ":scope > th > strong"
    }

    fn headers(&self) -> Headers {
        Headers::Texts(&OPERATION_LOG_HEADERS)
    }

    fn parse_row(&self, cells: &[ElementRef<'_>]) -> Result<OperationLogItem> {
        Ok(OperationLogItem {
            time: text_content(cells[0]),
            message: text_content(cells[1]),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FailedCourses;

impl TableSchema for FailedCourses {
    type Record = FailedCourse;

    fn header_path(&self) -> &'static str {
        ":scope > th > strong"
    }

    fn headers(&self) -> Headers {
        Headers::Texts(&FAILED_COURSES_HEADERS)
    }

    fn parse_row(&self, cells: &[ElementRef<'_>]) -> Result<FailedCourse> {
        Ok(FailedCourse {
            serial_number: text_content(cells[0]),
            curriculum_number: text_content(cells[1]),
            curriculum_identity_number: text_content(cells[2]),
            class: text_content(cells[3]),
            course_name: text_content(cells[4]).trim_end().to_string(),
            credits: text_content(cells[5]),
            instructor: text_content(cells[6]).trim_end().to_string(),
            reason: text_content(cells[7]).trim_end().to_string(),
        })
    }
}

/// Client for the results pages. The server keeps the session in cookies, so
/// the client itself holds no state.
#[derive(Debug)]
pub struct ResultsClient<C> {
    http_client: C,
}

impl<C: HttpClient> ResultsClient<C> {
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let response = self
            .http_client
            .request(Method::Get, LOGIN_URL, None, &[], true)
            .await?;
        let request = sso::login(&response, username, password)?;

        let response = self.http_client.send(&request, true).await?;
        response.raise_for_status()?;
        check_exact_url(response.url(), INDEX_URL)?;

        info!("results session established");
        Ok(())
    }

    async fn fetch(&self, url: &str, kind: ResultKind) -> Result<scraper::Html> {
        let response = self
            .http_client
            .request(Method::Get, url, None, &[("kind", kind.as_param())], false)
            .await?;
        response.raise_for_status()?;
        // these pages declare their charset in a <meta> tag, not in the headers
        Ok(dom::document_from_bytes(response.content()))
    }

    pub async fn get_result(&self, kind: ResultKind) -> Result<TableRows<ResultTable>> {
        let document = self.fetch(INDEX_URL, kind).await?;
        TableRows::new(document, RowLayout::HeaderFirst(RESULT_ROWS), ResultTable)
    }

    /// Fails with [`ErrorKind::TableNotFound`] when the page shows a heading
    /// in place of the log, which is how the server reports an empty log.
    pub async fn get_operation_log(&self, kind: ResultKind) -> Result<TableRows<OperationLog>> {
        let document = self.fetch(OPERATION_LOG_URL, kind).await?;
        if dom::select(&document, OPERATION_LOG_ROWS)?.is_empty() {
            let heading = text_content(dom::select_one(&document, OPERATION_LOG_HEADING)?);
            debug!(%heading, "operation log table absent");
            return Err(ErrorKind::TableNotFound { heading }.into());
        }
        TableRows::new(document, RowLayout::HeaderFirst(OPERATION_LOG_ROWS), OperationLog)
    }

    pub async fn get_failed_courses(&self, kind: ResultKind) -> Result<TableRows<FailedCourses>> {
        let document = self.fetch(FAILED_COURSES_URL, kind).await?;
        TableRows::new(document, RowLayout::HeaderFirst(FAILED_COURSES_ROWS), FailedCourses)
    }
}
