// Library root
// ------------
// The binary (`main.rs`) wires these modules into one linear run.
//
// Module responsibilities:
// - `cli`: command-line flags and their defaults.
// - `config`: the JSON data file with the server URL, API user and realm.
// - `api`: blocking HTTP calls to privacyIDEA (token, users by realm).
// - `ui`: masked password prompt and progress spinner.
// - `export`: CSV output with a fixed column table.
// - `logging`: daily append-mode log file and subscriber setup.
// - `rotation`: bounded retention of the log directory.
// - `app`: the run itself, tying the above together.
// - `error`: error types shared by all of the above.
pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod rotation;
pub mod ui;
