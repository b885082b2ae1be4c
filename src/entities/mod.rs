//! Entity record definitions
//!
//! - **Accounts**: `User`, `Organization`, `TeamMembership`, `Subscription`
//! - **Content**: `Post`, `Course`, `Event`, `Job`, `Message`, `SavedItem`
//!
//! Relationships (`user_id`, `organization_id`, `item_id`) are plain string
//! references; nothing here resolves or enforces them.

pub mod accounts;
pub mod content;

pub use accounts::{AccountType, Organization, Subscription, SubscriptionStatus, TeamMembership, TeamRole, User};
pub use content::{
    Course, Difficulty, Event, Job, JobType, Message, Post, SavedItem, SavedItemType, WorkLocation,
};
