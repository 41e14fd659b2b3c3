use serde::{Deserialize, Serialize};

/// Hosts serving the registration applications.
pub const BASE_URLS: [&str; 2] = [
    "https://if192.aca.ntu.edu.tw/",
    "https://if177.aca.ntu.edu.tw/",
];

/// Identifiers the server hands out after login; every authenticated page
/// expects them back as query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionInfo {
    pub regno: String,
    pub lang: String,
    pub extid: String,
}

// One row of the add/drop course selection listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CourseSelectionListItem {
    pub status: String,
    pub serial_number: String,
    pub curriculum_number: String,
    pub curriculum_identity_number: String,
    pub course_name: String,
    pub course_class: String,
    pub credits: String,
    pub instructor: String,
    pub course_schedule: String,
    pub conflict_wish: String,
    pub remarks: String,
}

// One row of the stage-2 registration listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Stage2ListItem {
    pub serial_number: String,
    pub curriculum_number: String,
    pub class: String,
    pub curriculum_name: String,
    pub credits: String,
    pub instructor: String,
    pub course_schedule: String,
    /// Always within `1..=99`.
    pub priority: u8,
    pub remark: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResultItem {
    pub serial_number: String,
    pub curriculum_number: String,
    pub curriculum_identity_number: String,
    pub class: String,
    pub course_name: String,
    pub credits: String,
    pub instructor: String,
    pub mark: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OperationLogItem {
    pub time: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FailedCourse {
    pub serial_number: String,
    pub curriculum_number: String,
    pub curriculum_identity_number: String,
    pub class: String,
    pub course_name: String,
    pub credits: String,
    pub instructor: String,
    pub reason: String,
}

/// Which preregistration round a results page reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ResultKind {
    PreregistrationStage1,
    PreregistrationStage2,
}

impl ResultKind {
    /// Value of the `kind` query parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            ResultKind::PreregistrationStage1 => "1",
            ResultKind::PreregistrationStage2 => "2",
        }
    }
}
