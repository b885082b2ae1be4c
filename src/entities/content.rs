//! Content entities owned by an organization, plus messages and bookmarks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::EntityKind;
use crate::entity::{
    amount, boolean, count, date_time, http_url, literal, literal_enum, nullable_literal,
    object_schema, optional_string, required_string, Entity,
};
use crate::formats::{optional_timestamp, optional_whole_number};

literal_enum! {
    /// Skill level a course targets
    pub enum Difficulty {
        Beginner => "beginner",
        Intermediate => "intermediate",
        Advanced => "advanced",
    }
}

literal_enum! {
    /// Employment type of a job posting
    #[derive(Default)]
    pub enum JobType {
        #[default]
        FullTime => "full-time",
        PartTime => "part-time",
        Internship => "internship",
        Freelance => "freelance",
    }
}

literal_enum! {
    /// Where a job is performed
    #[derive(Default)]
    pub enum WorkLocation {
        #[default]
        Remote => "remote",
        OnSite => "on-site",
        Hybrid => "hybrid",
    }
}

literal_enum! {
    /// Kind of content a saved item points at
    pub enum SavedItemType {
        Post => "post",
        Course => "course",
        Event => "event",
        Job => "job",
    }
}

fn default_true() -> bool {
    true
}

// A missing `remote` means the default; an explicit null means absent.
fn default_remote() -> Option<WorkLocation> {
    Some(WorkLocation::Remote)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub organization_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<DateTime<Utc>>,
}

impl Entity for Post {
    const NAME: &'static str = "Post";
    const KIND: EntityKind = EntityKind::Post;

    fn json_schema() -> Value {
        object_schema(
            Self::NAME,
            "An article published by an organization",
            &["organization_id", "title"],
            vec![
                ("organization_id", required_string()),
                ("title", required_string()),
                ("description", optional_string()),
                ("image_url", http_url()),
                ("category", optional_string()),
                ("published_at", date_time()),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub organization_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(
        default,
        deserialize_with = "optional_whole_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_hours: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Entity for Course {
    const NAME: &'static str = "Course";
    const KIND: EntityKind = EntityKind::Course;

    fn json_schema() -> Value {
        object_schema(
            Self::NAME,
            "A course offered by an organization",
            &["organization_id", "title"],
            vec![
                ("organization_id", required_string()),
                ("title", required_string()),
                ("description", optional_string()),
                ("thumbnail_url", http_url()),
                ("price", amount()),
                ("difficulty", nullable_literal::<Difficulty>(None)),
                ("duration_hours", count()),
                ("category", optional_string()),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub organization_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateTime<Utc>>,
    /// Free-form time of day, e.g. "18:30"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_true")]
    pub online: bool,
    #[serde(
        default,
        deserialize_with = "optional_whole_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub capacity: Option<u64>,
}

impl Entity for Event {
    const NAME: &'static str = "Event";
    const KIND: EntityKind = EntityKind::Event;

    fn json_schema() -> Value {
        object_schema(
            Self::NAME,
            "An event hosted by an organization",
            &["organization_id", "title"],
            vec![
                ("organization_id", required_string()),
                ("title", required_string()),
                ("description", optional_string()),
                ("image_url", http_url()),
                ("date", date_time()),
                ("time", optional_string()),
                ("location", optional_string()),
                ("price", amount()),
                ("online", boolean(true)),
                ("capacity", count()),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub organization_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub job_type: JobType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default = "default_remote")]
    pub remote: Option<WorkLocation>,
    #[serde(
        default,
        deserialize_with = "optional_whole_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub salary_min: Option<u64>,
    #[serde(
        default,
        deserialize_with = "optional_whole_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub salary_max: Option<u64>,
}

impl Entity for Job {
    const NAME: &'static str = "Job";
    const KIND: EntityKind = EntityKind::Job;

    fn json_schema() -> Value {
        object_schema(
            Self::NAME,
            "A job posting published by an organization",
            &["organization_id", "title"],
            vec![
                ("organization_id", required_string()),
                ("title", required_string()),
                ("description", optional_string()),
                ("type", literal(Some(JobType::FullTime))),
                ("location", optional_string()),
                ("remote", nullable_literal(Some(WorkLocation::Remote))),
                ("salary_min", count()),
                ("salary_max", count()),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub organization_id: String,
    pub user_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl Entity for Message {
    const NAME: &'static str = "Message";
    const KIND: EntityKind = EntityKind::Message;

    fn json_schema() -> Value {
        object_schema(
            Self::NAME,
            "A message between a user and an organization",
            &["organization_id", "user_id", "content"],
            vec![
                ("organization_id", required_string()),
                ("user_id", required_string()),
                ("content", required_string()),
                ("thread_id", optional_string()),
            ],
        )
    }
}

/// A bookmark linking a user to a content item of a given type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedItem {
    pub user_id: String,
    pub item_id: String,
    pub item_type: SavedItemType,
}

impl Entity for SavedItem {
    const NAME: &'static str = "SavedItem";
    const KIND: EntityKind = EntityKind::SavedItem;

    fn json_schema() -> Value {
        object_schema(
            Self::NAME,
            "A bookmark linking a user to a content item",
            &["user_id", "item_id", "item_type"],
            vec![
                ("user_id", required_string()),
                ("item_id", required_string()),
                ("item_type", literal::<SavedItemType>(None)),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_type_uses_wire_name() {
        let job: Job = serde_json::from_value(json!({
            "organization_id": "o1",
            "title": "Dev",
            "type": "part-time"
        }))
        .unwrap();
        assert_eq!(job.job_type, JobType::PartTime);
        assert_eq!(job.remote, Some(WorkLocation::Remote));

        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["type"], "part-time");
        assert!(value.get("job_type").is_none());
    }

    #[test]
    fn test_job_remote_null_is_absent() {
        let job: Job = serde_json::from_value(json!({
            "organization_id": "o1",
            "title": "Dev",
            "remote": null
        }))
        .unwrap();
        assert_eq!(job.remote, None);
        // Serialized as null so a round trip keeps it absent
        assert_eq!(serde_json::to_value(&job).unwrap()["remote"], Value::Null);
    }

    #[test]
    fn test_event_defaults() {
        let event: Event =
            serde_json::from_value(json!({"organization_id": "o1", "title": "Launch"})).unwrap();
        assert!(event.online);
        assert_eq!(event.price, 0.0);
        assert_eq!(event.capacity, None);
    }

    #[test]
    fn test_course_difficulty_schema_allows_null() {
        let schema = Course::json_schema();
        assert_eq!(
            schema["properties"]["difficulty"]["enum"],
            json!(["beginner", "intermediate", "advanced", null])
        );
        assert!(schema["properties"]["difficulty"].get("default").is_none());
    }

    #[test]
    fn test_saved_item_type_is_required() {
        assert_eq!(
            SavedItem::json_schema()["required"],
            json!(["user_id", "item_id", "item_type"])
        );
    }
}
