// CSV export of the realm's users.
//
// Columns are declared once in `COLUMNS`; the header row and every data row
// are generated from that table so they cannot drift apart.

use crate::api::User;
use crate::error::{AppError, AppResult};
use chrono::NaiveDate;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Date format shared by result and log file names.
pub const FILE_DATE_FORMAT: &str = "%d.%m.%Y";

/// A CSV column: header text and how to render the cell for a user.
pub struct Column {
    pub header: &'static str,
    pub value: fn(&User) -> String,
}

pub const COLUMNS: &[Column] = &[
    Column { header: "Email", value: |u| u.email.clone() },
    Column { header: "Givenname", value: |u| u.given_name.clone() },
    Column { header: "MemberOf", value: |u| format_list(&u.member_of) },
    Column { header: "Mobile", value: |u| u.mobile.clone() },
    Column { header: "Phone", value: |u| u.phone.clone() },
    Column { header: "Resolver", value: |u| u.resolver.clone() },
    Column { header: "Surname", value: |u| u.surname.clone() },
    Column { header: "Username", value: |u| u.username.clone() },
];

/// Lists render as `[a b c]`, the layout older result files already use.
pub fn format_list(items: &[String]) -> String {
    format!("[{}]", items.join(" "))
}

pub fn headers() -> Vec<&'static str> {
    COLUMNS.iter().map(|c| c.header).collect()
}

pub fn row(user: &User) -> Vec<String> {
    COLUMNS.iter().map(|c| (c.value)(user)).collect()
}

/// Write the header row followed by one row per user.
pub fn write_users<W: Write>(writer: W, users: &[User]) -> AppResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(headers())?;
    for user in users {
        wtr.write_record(row(user))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// `result_<realm>_<dd.mm.yyyy>.csv`, with path separators in the realm
/// replaced so the file always lands in the results directory.
pub fn result_file_name(realm: &str, date: NaiveDate) -> String {
    let realm: String = realm
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("result_{}_{}.csv", realm, date.format(FILE_DATE_FORMAT))
}

/// Create `results_dir` if needed and write the users into the day's
/// result file, replacing any earlier file from the same day.
pub fn write_result_file(
    results_dir: &Path,
    realm: &str,
    date: NaiveDate,
    users: &[User],
) -> AppResult<PathBuf> {
    fs::create_dir_all(results_dir)
        .map_err(|e| AppError::fs("failed to create results dir", results_dir, e))?;
    let path = results_dir.join(result_file_name(realm, date));
    let file =
        fs::File::create(&path).map_err(|e| AppError::fs("failed to create result file", &path, e))?;
    write_users(file, users)?;
    Ok(path)
}
