//! User Model
//!
//! Read-only here: the zone editor only looks volunteers up by id to obtain
//! the display name stored on a SubZone.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::LatLng;

/// Dashboard role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Organizer,
    Volunteer,
    Audience,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Organizer => "organizer",
            Role::Volunteer => "volunteer",
            Role::Audience => "audience",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Document id
    #[serde(default)]
    pub id: String,
    /// Auth provider uid
    #[serde(default)]
    pub uid: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub assigned_zones: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            uid: String::new(),
            name: name.into(),
            email: String::new(),
            role,
            assigned_zones: Vec::new(),
            avatar: None,
            location: None,
            status: None,
        }
    }

    pub fn is_volunteer(&self) -> bool {
        self.role == Role::Volunteer
    }
}
