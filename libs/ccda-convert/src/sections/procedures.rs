//! Procedure activity (procedure, act or observation) → Procedure

use super::{is_negated, status_code, Location, MapContext};
use crate::datatypes::{codeable_concept, codeable_concepts, effective_date_time, identifiers, period};
use crate::error::MappingError;
use cobalt_ccda_model::CcdaNode;
use cobalt_models::{Procedure, Resource};

const STATEMENTS: [&str; 3] = ["procedure", "act", "observation"];

pub(super) fn map_entry(
    entry: &CcdaNode,
    at: &Location,
    ctx: &mut MapContext,
) -> Result<Vec<Resource>, MappingError> {
    let activity = STATEMENTS
        .iter()
        .find_map(|name| {
            entry
                .child(name)
                .and_then(CcdaNode::first)
                .filter(|node| node.as_element().is_some())
        })
        .ok_or_else(|| at.missing("procedure"))?;

    let status = if is_negated(activity) {
        "not-done"
    } else {
        match status_code(activity) {
            Some("completed") => "completed",
            Some("active") => "in-progress",
            Some("aborted" | "cancelled") => "stopped",
            Some("nullified") => "entered-in-error",
            _ => "unknown",
        }
    };

    let effective = activity.child("effectiveTime");
    let performed_period = period(effective);
    let performed_date_time = match performed_period {
        Some(_) => None,
        None => effective_date_time(effective),
    };

    let procedure = Procedure {
        id: Some(ctx.next_id("Procedure")),
        identifier: identifiers(activity, "id"),
        status: status.to_string(),
        code: codeable_concept(activity.child("code")),
        subject: ctx.subject(),
        performed_date_time,
        performed_period,
        body_site: codeable_concepts(activity, "targetSiteCode"),
    };
    Ok(vec![procedure.into()])
}
