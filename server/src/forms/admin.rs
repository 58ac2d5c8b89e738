use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FormErrors;

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct GroupForm {
    #[garde(length(min = 1, max = 150))]
    pub name: String,
}

impl GroupForm {
    pub fn clean(&self) -> Result<String, FormErrors> {
        let mut trimmed = self.clone();
        trimmed.name = self.name.trim().to_string();
        FormErrors::from_garde(&trimmed).into_result(trimmed.name)
    }
}

/// The selected group, by id.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AssignRoleForm {
    pub role: String,
}

impl AssignRoleForm {
    pub fn clean(&self) -> Result<Uuid, FormErrors> {
        Uuid::parse_str(self.role.trim()).map_err(|_| {
            let mut errors = FormErrors::new();
            errors.add(
                "role",
                "Select a valid choice. That choice is not one of the available choices.",
            );
            errors
        })
    }
}
