// Entrypoint for the CLI application.
// - Parses flags (clap exits with status 2 on a usage error).
// - Builds one authenticated client and runs the provisioning flow.
// - Exits 0 whatever the REST calls returned, unless `--strict` is set.

use anyhow::Context;
use qtree_provision::api::OntapClient;
use qtree_provision::cli::Args;
use qtree_provision::provision::{self, Plan};
use qtree_provision::{logging, ui};
use std::io;

fn main() {
    let args = Args::parse_env();
    logging::init(logging::level_for(args.debug, args.silent));

    match run(args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when `--strict` is set and a REST call failed.
fn run(mut args: Args) -> anyhow::Result<bool> {
    let user = args.api_user.clone();
    let password = args.resolve_password(|| ui::prompt_password(&user))?;

    let api = OntapClient::builder(&args.cluster, &args.api_user, &password)?
        .timeout(args.timeout())
        .wait_for_jobs(!args.no_wait)
        .build()
        .context("Failed to build HTTP client")?;
    log::debug!("connected to {} as {}", api.base_url(), args.api_user);

    let plan = Plan::from(&args);
    let stdout = io::stdout();
    let outcome = provision::run(&api, &plan, &mut stdout.lock())?;

    Ok(!args.strict || outcome.all_succeeded())
}
