//! Software, its versions, and the requirements jobs/job-types place on them.

use serde::{Deserialize, Serialize};

crate::define_id!(SoftwareId);
crate::define_id!(SoftwareVersionId);

/// A named piece of software agents may have installed (e.g. "maya").
/// `(software)` is globally unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Software {
    pub id: SoftwareId,
    pub name: String,
}

/// One version of a [`Software`], carrying an orderable `rank` used for
/// min/max comparisons in [`SoftwareRequirement`] satisfaction. `(name,
/// version)` is unique per software.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftwareVersion {
    pub id: SoftwareVersionId,
    pub software_id: SoftwareId,
    pub version: String,
    pub rank: i32,
}

/// A constraint attached to a job or job-type version: the agent must carry
/// some version of `software_id` whose rank falls within `[min_rank,
/// max_rank]` (either bound may be absent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftwareRequirement {
    pub software_id: SoftwareId,
    pub min_rank: Option<i32>,
    pub max_rank: Option<i32>,
}

impl SoftwareRequirement {
    /// Whether an agent carrying `agent_versions` satisfies this requirement.
    pub fn is_satisfied_by(&self, agent_versions: &[SoftwareVersion]) -> bool {
        agent_versions.iter().any(|v| {
            v.software_id == self.software_id
                && self.min_rank.map_or(true, |min| v.rank >= min)
                && self.max_rank.map_or(true, |max| v.rank <= max)
        })
    }
}
