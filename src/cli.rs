// Command-line surface. Everything the tool needs is given as flags; nothing
// is read from or written to disk between runs.

use crate::api;
use anyhow::Result;
use clap::Parser;
use std::ffi::OsString;
use std::time::Duration;

pub const DEFAULT_API_USER: &str = "admin";
pub const DEFAULT_TIMEOUT_SECS: u64 = api::DEFAULT_TIMEOUT.as_secs();

/// Two-letter flags that take a single dash. clap only knows one-character
/// short flags, so these are rewritten to their long form before parsing.
const LEGACY_FLAGS: &[(&str, &str)] = &[
    ("-vs", "--vserver_name"),
    ("-sh", "--space_hard"),
    ("-fh", "--files_hard"),
];

/// Create a new qtree and a tree quota rule capping its usage.
#[derive(Debug, Parser)]
#[command(name = "qtree-provision", version)]
pub struct Args {
    /// API server IP:port details
    #[arg(short = 'c', long = "cluster", value_parser = parse_cluster)]
    pub cluster: String,

    /// Volume to create the qtree in
    #[arg(short = 'v', long = "volume_name")]
    pub volume_name: String,

    /// SVM that owns the volume (also accepted as -vs)
    #[arg(long = "vserver_name")]
    pub vserver_name: String,

    /// Qtree to create
    #[arg(short = 'q', long = "qtree_name")]
    pub qtree_name: String,

    /// Hard limit for qtree space, in bytes (also accepted as -sh)
    #[arg(long = "space_hard")]
    pub space_hard: u64,

    /// Hard limit for qtree number of files (also accepted as -fh)
    #[arg(long = "files_hard")]
    pub files_hard: u64,

    /// API Username
    #[arg(short = 'u', long = "api_user", default_value = DEFAULT_API_USER)]
    pub api_user: String,

    /// API Password. Prompted for without echo when not given.
    #[arg(short = 'p', long = "api_pass")]
    pub api_pass: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Return as soon as a create request is accepted instead of
    /// following its job to completion
    #[arg(long = "no_wait")]
    pub no_wait: bool,

    /// Exit with status 1 when either REST call fails
    #[arg(long)]
    pub strict: bool,

    /// Log debug output (requests, job polling)
    #[arg(short = 'd', long, conflicts_with = "silent")]
    pub debug: bool,

    /// Turn logging off
    #[arg(short = 's', long)]
    pub silent: bool,
}

impl Args {
    /// Parse the process arguments, exiting with a usage message on error.
    pub fn parse_env() -> Self {
        Args::parse_from(normalize_args(std::env::args_os()))
    }

    /// Parse an explicit argv (first element is the program name).
    pub fn try_parse_args<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Args::try_parse_from(normalize_args(argv))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Return the password, asking `prompt` for it when none (or an empty
    /// one) was given on the command line.
    pub fn resolve_password<F>(&mut self, prompt: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        match &self.api_pass {
            Some(pass) if !pass.is_empty() => Ok(pass.clone()),
            _ => {
                let pass = prompt()?;
                self.api_pass = Some(pass.clone());
                Ok(pass)
            }
        }
    }
}

/// Reject cluster addresses that cannot form a URL, so they surface as a
/// usage error before any network activity.
fn parse_cluster(s: &str) -> Result<String, String> {
    api::base_url_for(s)
        .map(|_| s.to_string())
        .map_err(|e| e.to_string())
}

/// Rewrite `-vs`, `-sh` and `-fh` (optionally written `-vs=value`) to the
/// long flags clap understands. Other arguments pass through untouched.
pub fn normalize_args<I, T>(argv: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    argv.into_iter()
        .map(|arg| {
            let arg: OsString = arg.into();
            match arg.to_str().and_then(rewrite_legacy) {
                Some(rewritten) => rewritten,
                None => arg,
            }
        })
        .collect()
}

fn rewrite_legacy(arg: &str) -> Option<OsString> {
    LEGACY_FLAGS.iter().find_map(|(short, long)| {
        if arg == *short {
            return Some(OsString::from(*long));
        }
        arg.strip_prefix(short)
            .and_then(|rest| rest.strip_prefix('='))
            .map(|value| OsString::from(format!("{}={}", long, value)))
    })
}
