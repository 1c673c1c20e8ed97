// Library root
// -----------
// The binary (`main.rs`) parses the command line and hands the pieces to
// these modules.
//
// Module responsibilities:
// - `cli`: flag definitions, legacy flag rewriting, password resolution.
// - `api`: blocking ONTAP REST client, request payloads, job polling.
// - `error`: typed errors for the client, including ONTAP error bodies.
// - `provision`: the qtree + quota rule flow and its printed outcome.
// - `ui`: hidden password prompt and request spinner.
// - `logging`: env_logger setup.
pub mod api;
pub mod cli;
pub mod error;
pub mod logging;
pub mod provision;
pub mod ui;
