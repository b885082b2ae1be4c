//! Entity catalog
//!
//! Names every entity, derives its collection, and holds one compiled
//! validator per entity so untyped records can be validated by name.

use std::fmt;
use std::sync::OnceLock;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ValidationConfig;
use crate::entities::{
    Course, Event, Job, Message, Organization, Post, SavedItem, Subscription, TeamMembership, User,
};
use crate::entity::Entity;
use crate::error::{Result, SchemaError};
use crate::manifest::Manifest;
use crate::validation::{validate_with, EntityValidator};

/// Every entity known to the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    User,
    Organization,
    TeamMembership,
    Subscription,
    Post,
    Course,
    Event,
    Job,
    Message,
    SavedItem,
}

impl EntityKind {
    pub const ALL: [EntityKind; 10] = [
        EntityKind::User,
        EntityKind::Organization,
        EntityKind::TeamMembership,
        EntityKind::Subscription,
        EntityKind::Post,
        EntityKind::Course,
        EntityKind::Event,
        EntityKind::Job,
        EntityKind::Message,
        EntityKind::SavedItem,
    ];

    /// Class name, e.g. "SavedItem"
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::User => User::NAME,
            EntityKind::Organization => Organization::NAME,
            EntityKind::TeamMembership => TeamMembership::NAME,
            EntityKind::Subscription => Subscription::NAME,
            EntityKind::Post => Post::NAME,
            EntityKind::Course => Course::NAME,
            EntityKind::Event => Event::NAME,
            EntityKind::Job => Job::NAME,
            EntityKind::Message => Message::NAME,
            EntityKind::SavedItem => SavedItem::NAME,
        }
    }

    /// Collection name, e.g. "saveditem"
    pub fn collection(&self) -> String {
        self.name().to_lowercase()
    }

    /// Whether the entity is content owned by an organization
    pub fn is_content(&self) -> bool {
        matches!(
            self,
            EntityKind::Post | EntityKind::Course | EntityKind::Event | EntityKind::Job
        )
    }

    pub fn json_schema(&self) -> Value {
        match self {
            EntityKind::User => User::json_schema(),
            EntityKind::Organization => Organization::json_schema(),
            EntityKind::TeamMembership => TeamMembership::json_schema(),
            EntityKind::Subscription => Subscription::json_schema(),
            EntityKind::Post => Post::json_schema(),
            EntityKind::Course => Course::json_schema(),
            EntityKind::Event => Event::json_schema(),
            EntityKind::Job => Job::json_schema(),
            EntityKind::Message => Message::json_schema(),
            EntityKind::SavedItem => SavedItem::json_schema(),
        }
    }

    /// Look up by class or collection name, ignoring case
    ///
    /// Unknown names fail with the closest entity name as a suggestion.
    pub fn from_name(name: &str) -> Result<Self> {
        let wanted = name.trim().to_lowercase();
        if let Some(kind) = Self::ALL.iter().find(|k| k.collection() == wanted) {
            return Ok(*kind);
        }

        let suggestion = Self::suggest(name).map(|k| k.name().to_string());
        warn!(entity = name, suggestion = suggestion.as_deref(), "unknown entity name");
        Err(SchemaError::UnknownEntity {
            name: name.to_string(),
            suggestion,
        })
    }

    /// Closest entity to a misspelled name (fuzzy)
    pub fn suggest(query: &str) -> Option<Self> {
        let matcher = SkimMatcherV2::default().ignore_case();
        Self::ALL
            .iter()
            .filter_map(|kind| {
                matcher
                    .fuzzy_match(kind.name(), query.trim())
                    .map(|score| (score, *kind))
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, kind)| kind)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// A validated record of any entity
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    User(User),
    Organization(Organization),
    TeamMembership(TeamMembership),
    Subscription(Subscription),
    Post(Post),
    Course(Course),
    Event(Event),
    Job(Job),
    Message(Message),
    SavedItem(SavedItem),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::User(_) => EntityKind::User,
            Record::Organization(_) => EntityKind::Organization,
            Record::TeamMembership(_) => EntityKind::TeamMembership,
            Record::Subscription(_) => EntityKind::Subscription,
            Record::Post(_) => EntityKind::Post,
            Record::Course(_) => EntityKind::Course,
            Record::Event(_) => EntityKind::Event,
            Record::Job(_) => EntityKind::Job,
            Record::Message(_) => EntityKind::Message,
            Record::SavedItem(_) => EntityKind::SavedItem,
        }
    }

    /// Collection the record belongs to
    pub fn collection(&self) -> String {
        self.kind().collection()
    }

    /// Serialize with defaults filled in
    pub fn to_value(&self) -> Result<Value> {
        let value = match self {
            Record::User(r) => serde_json::to_value(r)?,
            Record::Organization(r) => serde_json::to_value(r)?,
            Record::TeamMembership(r) => serde_json::to_value(r)?,
            Record::Subscription(r) => serde_json::to_value(r)?,
            Record::Post(r) => serde_json::to_value(r)?,
            Record::Course(r) => serde_json::to_value(r)?,
            Record::Event(r) => serde_json::to_value(r)?,
            Record::Job(r) => serde_json::to_value(r)?,
            Record::Message(r) => serde_json::to_value(r)?,
            Record::SavedItem(r) => serde_json::to_value(r)?,
        };
        Ok(value)
    }
}

/// Compiled validators for every entity
#[derive(Debug)]
pub struct Catalog {
    /// Indexed by `EntityKind` declaration order
    validators: Vec<EntityValidator>,
}

impl Catalog {
    /// Catalog with default validation settings
    pub fn new() -> Result<Self> {
        Self::with_config(&ValidationConfig::default())
    }

    /// Compile every entity schema under the given settings
    pub fn with_config(config: &ValidationConfig) -> Result<Self> {
        let mut validators = Vec::with_capacity(EntityKind::ALL.len());
        for kind in EntityKind::ALL {
            let mut schema = kind.json_schema();
            if config.reject_unknown_fields {
                schema["additionalProperties"] = Value::Bool(false);
            }
            let validator = EntityValidator::compile(kind.name(), schema)?
                .with_max_violations(config.max_violations);
            validators.push(validator);
        }

        debug!(
            entities = validators.len(),
            strict = config.reject_unknown_fields,
            "entity catalog compiled"
        );
        Ok(Self { validators })
    }

    /// Shared catalog with default settings
    pub fn global() -> &'static Catalog {
        static GLOBAL: OnceLock<Catalog> = OnceLock::new();
        GLOBAL.get_or_init(|| Catalog::new().expect("built-in entity schemas must compile"))
    }

    pub fn validator(&self, kind: EntityKind) -> &EntityValidator {
        &self.validators[kind.index()]
    }

    /// Check a record without decoding it
    pub fn check(&self, kind: EntityKind, value: &Value) -> Result<()> {
        self.validator(kind).check(value)?;
        Ok(())
    }

    /// Validate and decode into a specific entity
    pub fn validate_as<E: Entity>(&self, value: &Value) -> Result<E> {
        validate_with(self.validator(E::KIND), value)
    }

    /// Validate and decode into whichever entity `kind` names
    pub fn validate(&self, kind: EntityKind, value: &Value) -> Result<Record> {
        let record = match kind {
            EntityKind::User => Record::User(self.validate_as(value)?),
            EntityKind::Organization => Record::Organization(self.validate_as(value)?),
            EntityKind::TeamMembership => Record::TeamMembership(self.validate_as(value)?),
            EntityKind::Subscription => Record::Subscription(self.validate_as(value)?),
            EntityKind::Post => Record::Post(self.validate_as(value)?),
            EntityKind::Course => Record::Course(self.validate_as(value)?),
            EntityKind::Event => Record::Event(self.validate_as(value)?),
            EntityKind::Job => Record::Job(self.validate_as(value)?),
            EntityKind::Message => Record::Message(self.validate_as(value)?),
            EntityKind::SavedItem => Record::SavedItem(self.validate_as(value)?),
        };
        debug!(entity = %kind, "record accepted");
        Ok(record)
    }

    /// Validate against an entity looked up by class or collection name
    pub fn validate_named(&self, name: &str, value: &Value) -> Result<Record> {
        self.validate(EntityKind::from_name(name)?, value)
    }

    /// Manifest of the schemas this catalog enforces
    pub fn manifest(&self) -> Manifest {
        Manifest::new(
            self.validators
                .iter()
                .zip(EntityKind::ALL)
                .map(|(validator, kind)| (kind, validator.schema().clone()))
                .collect(),
        )
    }
}
