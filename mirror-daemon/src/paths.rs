use std::path::{Path, PathBuf};

use chrono::NaiveDate;

pub const LOG_EXTENSION: &str = "log";

/// `DD-MM-YYYY.log`: one file per day the process was started.
pub fn log_file_name(date: NaiveDate) -> String {
    format!("{}.{LOG_EXTENSION}", date.format("%d-%m-%Y"))
}

pub fn log_file_path(log_folder: &Path, date: NaiveDate) -> PathBuf {
    log_folder.join(log_file_name(date))
}
