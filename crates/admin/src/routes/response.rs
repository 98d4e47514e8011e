//! Success payloads for mutating routes.

use serde::Serialize;

/// Response for a successful mutating action.
///
/// The message names the entity and the action performed, e.g.
/// `"Category created successfully."`.
#[derive(Debug, Serialize)]
pub struct ActionResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ActionResponse<T> {
    /// Entity created.
    #[must_use]
    pub fn created(entity: &str, data: T) -> Self {
        Self {
            success: true,
            message: format!("{entity} created successfully."),
            data: Some(data),
        }
    }

    /// Entity updated.
    #[must_use]
    pub fn updated(entity: &str, data: T) -> Self {
        Self {
            success: true,
            message: format!("{entity} updated successfully."),
            data: Some(data),
        }
    }
}

impl ActionResponse<()> {
    /// Entity deleted. Carries no payload.
    #[must_use]
    pub fn deleted(entity: &str) -> Self {
        Self {
            success: true,
            message: format!("{entity} deleted successfully."),
            data: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_entity_and_action() {
        assert_eq!(
            ActionResponse::created("Category", ()).message,
            "Category created successfully."
        );
        assert_eq!(
            ActionResponse::updated("Role", ()).message,
            "Role updated successfully."
        );
        assert_eq!(
            ActionResponse::deleted("User").message,
            "User deleted successfully."
        );
    }

    #[test]
    fn test_deleted_omits_data() {
        let json = serde_json::to_value(ActionResponse::deleted("Role")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "message": "Role deleted successfully."})
        );
    }
}
