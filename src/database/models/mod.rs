pub mod article;
pub mod category;
pub mod organization;
pub mod user;

pub use article::{Article, ArticleAuthor, ArticleCategory, ArticleView};
pub use category::{Category, CategoryWithCount};
pub use organization::Organization;
pub use user::{User, UserProfile, UserSummary};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid {kind} value: {value}")]
    InvalidValue { kind: &'static str, value: String },
}

/// Declares a string-backed enum stored in a TEXT column.
///
/// Values are SCREAMING_CASE on the wire and in the database.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::database::models::ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::database::models::ModelError::InvalidValue {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::database::models::ModelError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

text_enum!(
    /// Two-role allow-list used by the authorization layer
    Role, "role" {
        Admin => "ADMIN",
        User => "USER",
    }
);

text_enum!(
    UserStatus, "user status" {
        Active => "ACTIVE",
        Inactive => "INACTIVE",
    }
);

text_enum!(
    CategoryStatus, "category status" {
        Active => "ACTIVE",
        Inactive => "INACTIVE",
    }
);

text_enum!(
    ArticleStatus, "article status" {
        Published => "PUBLISHED",
        Draft => "DRAFT",
        Archived => "ARCHIVED",
    }
);

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl Default for ArticleStatus {
    fn default() -> Self {
        ArticleStatus::Published
    }
}
