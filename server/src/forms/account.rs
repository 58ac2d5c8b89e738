use garde::Validate;
use serde::{Deserialize, Serialize};

use super::{optional, FormErrors, NON_FIELD};
use crate::auth::password::password_problems;
use crate::models::{ProfileUpdate, User};

const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
const USERNAME_RULE: &str =
    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";

fn username_is_valid(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct RegistrationForm {
    #[garde(length(min = 1, max = 150))]
    pub username: String,
    #[garde(length(max = 150))]
    pub first_name: String,
    #[garde(length(max = 150))]
    pub last_name: String,
    #[garde(email)]
    pub email: String,
    #[serde(skip_serializing)]
    #[garde(skip)]
    pub password: String,
    #[serde(skip_serializing)]
    #[garde(skip)]
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Checks that do not need the store; uniqueness is checked by the handler.
    pub fn errors(&self) -> FormErrors {
        let mut errors = FormErrors::from_garde(self);
        if !username_is_valid(&self.username) {
            errors.add("username", USERNAME_RULE);
        }
        for problem in password_problems(&self.password) {
            errors.add("password", problem);
        }
        if self.password != self.confirm_password {
            errors.add("confirm_password", PASSWORD_MISMATCH);
        }
        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[garde(length(min = 1))]
    pub username: String,
    #[serde(skip_serializing)]
    #[garde(length(min = 1))]
    pub password: String,
}

impl LoginForm {
    pub const INVALID_LOGIN: &'static str =
        "Please enter a correct username and password. Note that both fields may be case-sensitive.";
    pub const INACTIVE: &'static str = "This account is inactive.";

    pub fn errors(&self) -> FormErrors {
        FormErrors::from_garde(self)
    }

    pub fn rejected(message: &str) -> FormErrors {
        let mut errors = FormErrors::new();
        errors.add(NON_FIELD, message);
        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct ProfileForm {
    #[garde(length(max = 150))]
    pub first_name: String,
    #[garde(length(max = 150))]
    pub last_name: String,
    #[garde(email)]
    pub email: String,
    #[garde(skip)]
    pub bio: String,
    #[garde(length(max = 11))]
    pub phone_number: String,
    #[garde(length(max = 500))]
    pub profile_image: String,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            bio: user.bio.clone(),
            phone_number: user.phone_number.clone().unwrap_or_default(),
            profile_image: user.profile_image.clone().unwrap_or_default(),
        }
    }

    pub fn clean(&self) -> Result<ProfileUpdate, FormErrors> {
        let trimmed = Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            bio: self.bio.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            profile_image: self.profile_image.trim().to_string(),
        };
        let mut errors = FormErrors::from_garde(&trimmed);
        let phone = optional(&trimmed.phone_number);
        if let Some(phone) = &phone {
            if !phone.chars().all(|c| c.is_ascii_digit() || c == '+') {
                errors.add("phone_number", "Enter a valid phone number.");
            }
        }
        errors.into_result(ProfileUpdate {
            profile_image: optional(&trimmed.profile_image),
            phone_number: phone,
            first_name: trimmed.first_name,
            last_name: trimmed.last_name,
            email: trimmed.email,
            bio: trimmed.bio,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PasswordChangeForm {
    #[garde(length(min = 1))]
    pub old_password: String,
    #[garde(skip)]
    pub new_password1: String,
    #[garde(skip)]
    pub new_password2: String,
}

impl PasswordChangeForm {
    /// `old_password_ok` is the result of verifying the old password.
    pub fn errors(&self, old_password_ok: bool) -> FormErrors {
        let mut errors = FormErrors::from_garde(self);
        if !old_password_ok && !errors.has("old_password") {
            errors.add(
                "old_password",
                "Your old password was entered incorrectly. Please enter it again.",
            );
        }
        new_password_errors(&mut errors, &self.new_password1, &self.new_password2);
        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct PasswordResetForm {
    #[garde(email)]
    pub email: String,
}

impl PasswordResetForm {
    pub fn errors(&self) -> FormErrors {
        FormErrors::from_garde(self)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SetPasswordForm {
    pub new_password1: String,
    pub new_password2: String,
}

impl SetPasswordForm {
    pub fn errors(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        new_password_errors(&mut errors, &self.new_password1, &self.new_password2);
        errors
    }
}

fn new_password_errors(errors: &mut FormErrors, first: &str, second: &str) {
    for problem in password_problems(first) {
        errors.add("new_password1", problem);
    }
    if first != second {
        errors.add("new_password2", PASSWORD_MISMATCH);
    }
}
