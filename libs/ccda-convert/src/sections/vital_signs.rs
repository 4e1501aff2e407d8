//! Vital signs organizer → one Observation per component

use super::observation::{map_observation, Category};
use super::{Location, MapContext};
use crate::error::MappingError;
use cobalt_ccda_model::CcdaNode;
use cobalt_models::Resource;

pub(super) fn map_entry(
    entry: &CcdaNode,
    at: &Location,
    ctx: &mut MapContext,
) -> Result<Vec<Resource>, MappingError> {
    let Some(organizer) = entry.child("organizer").and_then(CcdaNode::first) else {
        // A bare vital sign observation without its organizer
        let observation = entry
            .child("observation")
            .and_then(CcdaNode::first)
            .ok_or_else(|| at.missing("organizer"))?;
        let id = ctx.next_id("Observation");
        let at = at.join("observation");
        return Ok(vec![map_observation(id, observation, Category::VitalSigns, &at, ctx)?.into()]);
    };
    let at = at.join("organizer");

    let mut resources = Vec::new();
    for (index, observation) in organizer.find_all("component/observation").into_iter().enumerate() {
        let at = at.join(&format!("component[{index}]/observation"));
        let id = ctx.next_id("Observation");
        resources.push(map_observation(id, observation, Category::VitalSigns, &at, ctx)?.into());
    }
    Ok(resources)
}
