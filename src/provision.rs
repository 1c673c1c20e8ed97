// Provisioning flow: create the qtree, then its tree quota rule. Each step
// reports its own failure and the flow always moves on to the next step.

use crate::api::{OntapClient, QtreeRequest, QuotaRuleRequest};
use crate::cli::Args;
use crate::error::ApiError;
use crate::ui;
use log::{debug, info, warn};
use std::io::{self, Write};

/// Quota rule type used for qtree quotas.
pub const TREE_RULE: &str = "tree";

/// What to create, taken from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub volume_name: String,
    pub vserver_name: String,
    pub qtree_name: String,
    pub space_hard: u64,
    pub files_hard: u64,
}

impl From<&Args> for Plan {
    fn from(args: &Args) -> Self {
        Plan {
            volume_name: args.volume_name.clone(),
            vserver_name: args.vserver_name.clone(),
            qtree_name: args.qtree_name.clone(),
            space_hard: args.space_hard,
            files_hard: args.files_hard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub qtree_created: bool,
    pub quota_rule_created: bool,
}

impl Outcome {
    pub fn all_succeeded(&self) -> bool {
        self.qtree_created && self.quota_rule_created
    }
}

/// Creates a new qtree in a volume of an SVM. Prints a confirmation or the
/// error; returns whether the qtree was created.
pub fn create_qtree<W: Write>(
    api: &OntapClient,
    volume_name: &str,
    vserver_name: &str,
    qtree_name: &str,
    out: &mut W,
) -> io::Result<bool> {
    let req = QtreeRequest::new(volume_name, vserver_name, qtree_name);
    let spinner = ui::spinner("Creating qtree...");
    let res = api.create_qtree(&req);
    spinner.finish_and_clear();
    match res {
        Ok(()) => {
            info!("qtree {} created in {}/{}", req.name, vserver_name, volume_name);
            writeln!(out, "Qtree {} created successfully", req.name)?;
            Ok(true)
        }
        Err(e) => {
            warn!("qtree {} create failed [{}]: {}", qtree_name, status_label(&e), e);
            writeln!(out, "Error: Qtree was not created: {}", e)?;
            Ok(false)
        }
    }
}

/// Creates a quota policy rule scoped to a qtree. Only failures are printed.
#[allow(clippy::too_many_arguments)]
pub fn create_quota_policy_rule<W: Write>(
    api: &OntapClient,
    volume_name: &str,
    vserver_name: &str,
    qtree_name: &str,
    rule_type: &str,
    space_hard: u64,
    files_hard: u64,
    out: &mut W,
) -> io::Result<bool> {
    let req = QuotaRuleRequest::new(
        volume_name,
        vserver_name,
        qtree_name,
        rule_type,
        space_hard,
        files_hard,
    );
    let spinner = ui::spinner("Creating quota rule...");
    let res = api.create_quota_rule(&req);
    spinner.finish_and_clear();
    match res {
        Ok(()) => {
            debug!(
                "{} quota rule for {} created (space {} bytes, {} files)",
                rule_type, qtree_name, space_hard, files_hard
            );
            Ok(true)
        }
        Err(e) => {
            warn!(
                "quota rule for {} create failed [{}]: {}",
                qtree_name,
                status_label(&e),
                e
            );
            writeln!(out, "Error: Quota Rule was not created: {}", e)?;
            Ok(false)
        }
    }
}

fn status_label(e: &ApiError) -> String {
    e.status()
        .map_or_else(|| "no status".to_string(), |s| s.to_string())
}

/// Run both steps in order. The quota rule is attempted even when the qtree
/// step failed.
pub fn run<W: Write>(api: &OntapClient, plan: &Plan, out: &mut W) -> io::Result<Outcome> {
    let qtree_created = create_qtree(
        api,
        &plan.volume_name,
        &plan.vserver_name,
        &plan.qtree_name,
        out,
    )?;
    let quota_rule_created = create_quota_policy_rule(
        api,
        &plan.volume_name,
        &plan.vserver_name,
        &plan.qtree_name,
        TREE_RULE,
        plan.space_hard,
        plan.files_hard,
        out,
    )?;
    Ok(Outcome {
        qtree_created,
        quota_rule_created,
    })
}
