//! Bundle assembly

use crate::mapper::MappedResource;
use cobalt_models::{Bundle, BundleEntry, BundleType};

/// Collect mapped resources into one Bundle.
///
/// Entry order is production order and each entry's `fullUrl` is the
/// resource's `urn:uuid:` reference. An empty input yields a Bundle without
/// an `entry` field.
pub fn assemble(resources: Vec<MappedResource>, bundle_type: BundleType) -> Bundle {
    let mut bundle = Bundle::new(bundle_type);
    for mapped in resources {
        bundle.add_entry(BundleEntry {
            full_url: mapped.resource.urn(),
            resource: Some(mapped.resource),
        });
    }
    bundle
}
