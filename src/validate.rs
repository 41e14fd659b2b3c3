//! Argument checks run before anything is sent to the server.

use std::collections::HashSet;

use crate::error::{ErrorKind, Result};
use crate::model::Stage2ListItem;

/// A serial number is exactly five ASCII digits.
pub fn check_serial_number(serial_number: &str) -> Result<()> {
    if serial_number.len() == 5 && serial_number.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ErrorKind::InvalidArgument(format!(
            "serial number {serial_number:?} is not five digits"
        ))
        .into())
    }
}

/// Stage-2 priorities run from 1 to 99.
pub fn check_priority(priority: i64) -> Result<u8> {
    match u8::try_from(priority) {
        Ok(priority @ 1..=99) => Ok(priority),
        _ => Err(ErrorKind::InvalidArgument(format!(
            "priority {priority} is outside 1..=99"
        ))
        .into()),
    }
}

/// Fails on the first repeated serial number or priority.
pub fn check_course_selection<'a>(
    items: impl IntoIterator<Item = &'a Stage2ListItem>,
) -> Result<()> {
    let mut serial_numbers = HashSet::new();
    let mut priorities = HashSet::new();
    for item in items {
        check_serial_number(&item.serial_number)?;
        if !serial_numbers.insert(item.serial_number.as_str()) {
            return Err(ErrorKind::DuplicateSerialNumber(item.serial_number.clone()).into());
        }
        let priority = check_priority(item.priority.into())?;
        if !priorities.insert(priority) {
            return Err(ErrorKind::DuplicatePriority(priority).into());
        }
    }
    Ok(())
}
