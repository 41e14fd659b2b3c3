//! Literal page texts selected by the session language.
//!
//! The add/drop system renders every label, table header and confirmation in
//! the language chosen at login. The `lang` query value is the only thing that
//! decides which bundle applies, and an unknown value is rejected outright.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    /// Traditional Chinese, `lang=tw` on the wire.
    Chinese,
    /// English, `lang=en` on the wire.
    English,
}

pub const LANG_CHINESE: &str = "tw";
pub const LANG_ENGLISH: &str = "en";

impl Locale {
    pub fn from_lang(lang: &str) -> Result<Locale> {
        match lang {
            LANG_CHINESE => Ok(Locale::Chinese),
            LANG_ENGLISH => Ok(Locale::English),
            other => Err(ErrorKind::UnknownLanguage(other.to_string()).into()),
        }
    }

    pub fn lang(self) -> &'static str {
        match self {
            Locale::Chinese => LANG_CHINESE,
            Locale::English => LANG_ENGLISH,
        }
    }

    pub fn add_drop_texts(self) -> &'static AddDropTexts {
        match self {
            Locale::Chinese => &ADD_DROP_CHINESE,
            Locale::English => &ADD_DROP_ENGLISH,
        }
    }
}

/// Everything the add/drop pages print that depends on the language.
#[derive(Debug)]
pub struct AddDropTexts {
    /// Header row of the course selection listing. The last column is a
    /// padding cell holding a single no-break space.
    pub list_headers: [&'static str; 11],
    /// `sure` parameter of an add request.
    pub add_confirm: &'static str,
    pub add_serial_number_label: &'static str,
    /// `sure` parameter of a delete request.
    pub delete_confirm: &'static str,
    pub delete_student_id_label: &'static str,
    pub delete_serial_number_label: &'static str,
    /// Text nodes directly under the main division after a delete.
    pub delete_completed: [&'static str; 4],
}

/// Banner of a successful add, printed in Chinese in both languages.
pub const ADD_SUCCEEDED: &str = "加選成功";

static ADD_DROP_CHINESE: AddDropTexts = AddDropTexts {
    list_headers: [
        "狀態",
        "流水號",
        "課號/識別碼",
        "課程名稱",
        "班次",
        "學分",
        "授課老師",
        "上 課 時 間",
        "衝堂志願",
        "備註",
        "\u{a0}",
    ],
    add_confirm: "確定選課",
    add_serial_number_label: "流水號：",
    delete_confirm: "確定退選",
    delete_student_id_label: "學號： ",
    delete_serial_number_label: "退選科目流水號:",
    delete_completed: ["\n", " 完成退選", " ", "\n\n"],
};

static ADD_DROP_ENGLISH: AddDropTexts = AddDropTexts {
    list_headers: [
        "Status",
        "Serial number",
        "Curriculum number",
        "Course name",
        "Course class",
        "Credits",
        "Instructor",
        "Course schedule",
        "Conflict Wish",
        "Remarks",
        "\u{a0}",
    ],
    add_confirm: "Confirm registration",
    add_serial_number_label: "Serial number：",
    delete_confirm: "Confirm de-registration",
    delete_student_id_label: "Student ID number:  ",
    delete_serial_number_label: "Serial number of the de-registered course:",
    delete_completed: ["\n", " De-registration completed.", " ", "\n\n"],
};
