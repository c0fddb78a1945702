// common/src/models/user.rs
use serde::{Deserialize, Serialize};

use super::claims::Claims;

/// Authoritative identity record as returned by the backend API.
///
/// The token alone is only trusted for a provisional render; anything the
/// application decides on (admin surfaces, group scoping) comes from this
/// record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    #[serde(alias = "userName")]
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub group_id: Option<i64>,
    /// Folders owned by this user. Read-only from the session manager's
    /// perspective.
    #[serde(default)]
    pub folders: Vec<Folder>,
}

/// A folder belongs to exactly one client and holds zero or more documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: i64,
    pub name: String,
    pub client_id: i64,
    #[serde(default)]
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: i64,
    pub name: String,
    pub folder_id: i64,
}

impl User {
    /// Best-effort user view derived from token claims alone.
    ///
    /// Used for optimistic rendering when the authoritative fetch is
    /// undesirable. The folder list is unknown until the real record is
    /// fetched, so it comes back empty.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.sub.parse().unwrap_or(0),
            username: claims.name.clone().unwrap_or_default(),
            email: claims.email.clone().unwrap_or_default(),
            is_admin: claims.is_admin,
            group_id: claims.group_id,
            folders: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_claims_fills_identity_fields() {
        let claims = Claims {
            sub: "42".to_string(),
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            is_admin: true,
            group_id: Some(7),
            iat: None,
            exp: 2_000_000_000,
        };

        let user = User::from_claims(&claims);

        assert_eq!(user.id, 42);
        assert_eq!(user.username, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert!(user.is_admin);
        assert_eq!(user.group_id, Some(7));
        assert!(user.folders.is_empty());
    }

    #[test]
    fn test_user_deserializes_camel_case_wire_names() {
        let json = r#"{
            "id": 1,
            "userName": "A",
            "email": "a@x.com",
            "isAdmin": false,
            "groupId": 3,
            "folders": [
                {"id": 9, "name": "Case 9", "clientId": 2, "documents": []}
            ]
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.username, "A");
        assert_eq!(user.group_id, Some(3));
        assert_eq!(user.folders[0].client_id, 2);
    }
}
