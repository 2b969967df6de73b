//! Project entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::id::uuid_id;
use crate::domain::storage::StorageEntity;
use crate::domain::user::UserId;

uuid_id!(
    /// Project identifier
    ProjectId,
    "project"
);

/// A project owned by one user and shared with a set of members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    id: ProjectId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    owner: UserId,
    #[serde(default)]
    members: Vec<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project with no members
    pub fn new(name: impl Into<String>, description: Option<String>, owner: UserId) -> Self {
        let now = Utc::now();

        Self {
            id: ProjectId::generate(),
            name: name.into(),
            description,
            owner,
            members: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the user owns the project or is one of its members
    pub fn involves(&self, user: &UserId) -> bool {
        &self.owner == user || self.members.contains(user)
    }

    /// Owner followed by every member
    pub fn participants(&self) -> impl Iterator<Item = &UserId> {
        std::iter::once(&self.owner).chain(self.members.iter())
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    /// Adds a member; returns false when already present
    pub fn add_member(&mut self, user: UserId) -> bool {
        if self.members.contains(&user) {
            return false;
        }

        self.members.push(user);
        self.touch();
        true
    }

    /// Removes a member; returns false when not present
    pub fn remove_member(&mut self, user: &UserId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != user);

        if self.members.len() == before {
            return false;
        }

        self.touch();
        true
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for Project {
    type Key = ProjectId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_has_no_members() {
        let owner = UserId::generate();
        let project = Project::new("Launch", None, owner.clone());

        assert!(project.members().is_empty());
        assert_eq!(project.owner(), &owner);
        assert!(project.involves(&owner));
    }

    #[test]
    fn test_member_set_semantics() {
        let mut project = Project::new("Launch", None, UserId::generate());
        let member = UserId::generate();

        assert!(project.add_member(member.clone()));
        assert!(!project.add_member(member.clone()));
        assert_eq!(project.members(), &[member.clone()]);
        assert!(project.involves(&member));

        assert!(project.remove_member(&member));
        assert!(!project.remove_member(&member));
        assert!(!project.involves(&member));
    }

    #[test]
    fn test_participants_lists_owner_first() {
        let owner = UserId::generate();
        let member = UserId::generate();
        let mut project = Project::new("Launch", Some("Q3".to_string()), owner.clone());
        project.add_member(member.clone());

        let participants: Vec<_> = project.participants().cloned().collect();
        assert_eq!(participants, vec![owner, member]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let project = Project::new("Launch", None, UserId::generate());
        let json = serde_json::to_value(&project).unwrap();

        assert!(json.get("createdAt").is_some());
        assert!(json.get("description").is_none());
        assert_eq!(json["members"], serde_json::json!([]));
    }
}
