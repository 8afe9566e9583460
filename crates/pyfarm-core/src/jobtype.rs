//! Job type and its versions: the executable definition a job pins to.

use serde::{Deserialize, Serialize};

use crate::software::SoftwareRequirement;

crate::define_id!(JobTypeId);
crate::define_id!(JobTypeVersionId);

/// A family of executable work (e.g. "maya_render"). Carries many
/// [`JobTypeVersion`]s; a job pins exactly one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobType {
    pub id: JobTypeId,
    pub name: String,
}

/// One version of a [`JobType`]. `(jobtype_id, version)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobTypeVersion {
    pub id: JobTypeVersionId,
    pub jobtype_id: JobTypeId,
    pub version: i32,
    pub class_name: String,
    pub code: String,
    /// Upper bound on tasks per `/assign` batch; `None` is unbounded.
    pub max_batch: Option<u32>,
    pub batch_contiguous: bool,
    pub software_requirements: Vec<SoftwareRequirement>,
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct JobTypeVersionBuilder => JobTypeVersion {
        set {
            id: JobTypeVersionId = JobTypeVersionId::from_raw(1),
            jobtype_id: JobTypeId = JobTypeId::from_raw(1),
            version: i32 = 1,
            max_batch: Option<u32> = None,
            batch_contiguous: bool = false,
        }
        into {
            class_name: String = "TestJobType",
            code: String = "",
        }
        computed {
            software_requirements: Vec<SoftwareRequirement> = Vec::new(),
        }
    }
}
