//! Account entities: users, organizations and the joins between them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::EntityKind;
use crate::entity::{
    amount, date_time, described, http_url, literal, literal_enum, object_schema,
    optional_string, required_string, Entity,
};
use crate::formats::optional_timestamp;

literal_enum! {
    /// Whether an account acts as a person or as an organization
    #[derive(Default)]
    pub enum AccountType {
        #[default]
        User => "user",
        Organization => "organization",
    }
}

literal_enum! {
    /// Role of a user inside an organization's team
    #[derive(Default)]
    pub enum TeamRole {
        Owner => "owner",
        Admin => "admin",
        #[default]
        Member => "member",
    }
}

literal_enum! {
    /// Billing lifecycle of a subscription
    #[derive(Default)]
    pub enum SubscriptionStatus {
        #[default]
        Active => "active",
        Canceled => "canceled",
        PastDue => "past_due",
    }
}

/// Account root entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub account_type: AccountType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl User {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            account_type: AccountType::default(),
            avatar_url: None,
            bio: None,
        }
    }
}

impl Entity for User {
    const NAME: &'static str = "User";
    const KIND: EntityKind = EntityKind::User;

    fn json_schema() -> Value {
        object_schema(
            Self::NAME,
            "Account root entity",
            &["email", "name"],
            vec![
                ("email", described(required_string(), "Email address")),
                ("name", described(required_string(), "Full name")),
                ("account_type", literal(Some(AccountType::User))),
                ("avatar_url", http_url()),
                ("bio", optional_string()),
            ],
        )
    }
}

/// A group entity owned by a user; owns posts, courses, events and jobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub owner_user_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub subscription_price: f64,
}

impl Organization {
    pub fn new(owner_user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner_user_id: owner_user_id.into(),
            name: name.into(),
            description: None,
            category: None,
            location: None,
            logo_url: None,
            cover_url: None,
            subscription_price: 0.0,
        }
    }
}

impl Entity for Organization {
    const NAME: &'static str = "Organization";
    const KIND: EntityKind = EntityKind::Organization;

    fn json_schema() -> Value {
        object_schema(
            Self::NAME,
            "A group entity owning content",
            &["owner_user_id", "name"],
            vec![
                ("owner_user_id", described(required_string(), "Owner user id")),
                ("name", required_string()),
                ("description", optional_string()),
                ("category", optional_string()),
                ("location", optional_string()),
                ("logo_url", http_url()),
                ("cover_url", http_url()),
                ("subscription_price", amount()),
            ],
        )
    }
}

/// Membership of a user in an organization's team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMembership {
    pub user_id: String,
    pub organization_id: String,
    #[serde(default)]
    pub role: TeamRole,
}

impl Entity for TeamMembership {
    const NAME: &'static str = "TeamMembership";
    const KIND: EntityKind = EntityKind::TeamMembership;

    fn json_schema() -> Value {
        object_schema(
            Self::NAME,
            "Membership of a user in an organization's team",
            &["user_id", "organization_id"],
            vec![
                ("user_id", required_string()),
                ("organization_id", required_string()),
                ("role", literal(Some(TeamRole::Member))),
            ],
        )
    }
}

/// A user's paid subscription to an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: String,
    pub organization_id: String,
    #[serde(default)]
    pub status: SubscriptionStatus,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub started_at: Option<DateTime<Utc>>,
}

impl Entity for Subscription {
    const NAME: &'static str = "Subscription";
    const KIND: EntityKind = EntityKind::Subscription;

    fn json_schema() -> Value {
        object_schema(
            Self::NAME,
            "A user's subscription to an organization",
            &["user_id", "organization_id"],
            vec![
                ("user_id", required_string()),
                ("organization_id", required_string()),
                ("status", literal(Some(SubscriptionStatus::Active))),
                ("started_at", date_time()),
            ],
        )
    }
}
