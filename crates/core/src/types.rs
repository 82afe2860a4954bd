use serde::{Deserialize, Deserializer, Serialize};

use crate::id::JobPostId;

/// A persisted job listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPost {
    #[serde(rename = "_id")]
    pub id: JobPostId,
    pub job_title: Option<String>,
    pub job_description: Option<String>,
}

/// Fields accepted when creating a job post.
///
/// Both fields are optional and anything else in the payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJobPost {
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
}

/// Partial update of a job post.
///
/// The outer `Option` tells whether a field was present in the payload; the
/// inner one carries an explicit `null`, which clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobPostPatch {
    #[serde(default, deserialize_with = "present")]
    pub job_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub job_description: Option<Option<String>>,
}

impl JobPostPatch {
    /// Returns `true` when the patch does not touch any field.
    pub fn is_empty(&self) -> bool {
        self.job_title.is_none() && self.job_description.is_none()
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn job_post_serializes_with_wire_names() {
        let post = JobPost {
            id: "64b7f0c2a1b2c3d4e5f60718".parse().unwrap(),
            job_title: Some("Engineer".into()),
            job_description: None,
        };

        let value = serde_json::to_value(&post).expect("serialize");
        assert_eq!(
            value,
            json!({
                "_id": "64b7f0c2a1b2c3d4e5f60718",
                "jobTitle": "Engineer",
                "jobDescription": null,
            })
        );
    }

    #[test]
    fn new_job_post_ignores_unknown_fields() {
        let body: NewJobPost = serde_json::from_value(json!({
            "jobTitle": "A",
            "salary": 100,
        }))
        .expect("unknown fields are ignored");
        assert_eq!(body.job_title.as_deref(), Some("A"));
        assert_eq!(body.job_description, None);
    }

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let patch: JobPostPatch =
            serde_json::from_value(json!({ "jobDescription": null })).expect("patch");
        assert_eq!(patch.job_title, None);
        assert_eq!(patch.job_description, Some(None));
        assert!(!patch.is_empty());

        let empty: JobPostPatch = serde_json::from_value(json!({})).expect("empty patch");
        assert!(empty.is_empty());
    }

    #[test]
    fn patch_rejects_unknown_and_mistyped_fields() {
        let unknown = serde_json::from_value::<JobPostPatch>(json!({ "_id": "x" }));
        assert!(unknown.is_err());

        let mistyped = serde_json::from_value::<JobPostPatch>(json!({ "jobTitle": 7 }));
        assert!(mistyped.is_err());
    }
}
