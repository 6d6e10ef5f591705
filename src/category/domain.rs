//! Core category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Error, TransactionType, UserID};

/// The maximum number of characters in a category name.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 255;

/// The maximum number of characters in a category icon.
pub const MAX_ICON_LENGTH: usize = 50;

/// The maximum number of characters in a category color.
pub const MAX_COLOR_LENGTH: usize = 200;

/// The color given to categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#3b82f6";

/// Database identifier for a category.
pub type CategoryId = i64;

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyName] if `name` is empty or only whitespace,
    /// or [Error::FieldTooLong] if it is longer than [MAX_CATEGORY_NAME_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyName("category name"))
        } else if name.chars().count() > MAX_CATEGORY_NAME_LENGTH {
            Err(Error::FieldTooLong {
                field: "category name",
                max: MAX_CATEGORY_NAME_LENGTH,
            })
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A CSS color for drawing a category in charts, e.g. "#3b82f6".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryColor(String);

impl CategoryColor {
    /// Create a category color.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyName] for a blank color or [Error::FieldTooLong] for
    /// one longer than [MAX_COLOR_LENGTH] characters.
    pub fn new(color: &str) -> Result<Self, Error> {
        let color = color.trim();

        if color.is_empty() {
            Err(Error::EmptyName("color"))
        } else if color.chars().count() > MAX_COLOR_LENGTH {
            Err(Error::FieldTooLong {
                field: "color",
                max: MAX_COLOR_LENGTH,
            })
        } else {
            Ok(Self(color.to_string()))
        }
    }

    /// Create a category color without validation.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_string())
    }
}

impl Default for CategoryColor {
    fn default() -> Self {
        Self(DEFAULT_CATEGORY_COLOR.to_owned())
    }
}

impl AsRef<str> for CategoryColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Check an optional icon name. Blank icons are treated as no icon.
///
/// # Errors
///
/// Returns [Error::FieldTooLong] if the icon is longer than [MAX_ICON_LENGTH] characters.
pub fn validate_icon(icon: Option<&str>) -> Result<Option<String>, Error> {
    match icon.map(str::trim) {
        None | Some("") => Ok(None),
        Some(icon) if icon.chars().count() > MAX_ICON_LENGTH => Err(Error::FieldTooLong {
            field: "icon",
            max: MAX_ICON_LENGTH,
        }),
        Some(icon) => Ok(Some(icon.to_owned())),
    }
}

/// A user defined grouping for transactions (e.g., 'Groceries', 'Salary').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The ID of the user that owns the category.
    pub user_id: UserID,
    /// The display name of the category.
    pub name: CategoryName,
    /// Whether the category is meant for income or expenses.
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    /// The chart color, e.g. "hsl(210, 70%, 50%)".
    pub color: CategoryColor,
    /// An optional icon name.
    pub icon: Option<String>,
    /// False for the categories every user starts with.
    pub is_custom: bool,
}

/// A validated category that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    /// The display name of the category.
    pub name: CategoryName,
    /// Whether the category is meant for income or expenses.
    pub category_type: TransactionType,
    /// The chart color.
    pub color: CategoryColor,
    /// An optional icon name.
    pub icon: Option<String>,
    /// False for the default categories.
    pub is_custom: bool,
}

/// The JSON body for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryForm {
    /// The display name of the category.
    pub name: String,
    /// Whether the category is meant for income or expenses.
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    /// The chart color. A default color is used if this is missing.
    #[serde(default)]
    pub color: Option<String>,
    /// An optional icon name.
    #[serde(default)]
    pub icon: Option<String>,
}

impl TryFrom<CategoryForm> for NewCategory {
    type Error = Error;

    fn try_from(form: CategoryForm) -> Result<Self, Self::Error> {
        let color = match form.color {
            Some(color) => CategoryColor::new(&color)?,
            None => CategoryColor::default(),
        };

        Ok(Self {
            name: CategoryName::new(&form.name)?,
            category_type: form.category_type,
            color,
            icon: validate_icon(form.icon.as_deref())?,
            is_custom: true,
        })
    }
}

/// The JSON body for a partial category update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub category_type: Option<TransactionType>,
    #[serde(default)]
    pub color: Option<String>,
    /// `null` removes the icon.
    #[serde(default, deserialize_with = "crate::patch::deserialize_patch")]
    pub icon: Option<Option<String>>,
}

impl CategoryUpdate {
    /// Apply the update to `category`, validating every changed field.
    ///
    /// # Errors
    ///
    /// Returns the same validation errors as creating a category.
    pub fn apply(self, category: Category) -> Result<Category, Error> {
        let name = match self.name {
            Some(name) => CategoryName::new(&name)?,
            None => category.name,
        };
        let color = match self.color {
            Some(color) => CategoryColor::new(&color)?,
            None => category.color,
        };
        let icon = match self.icon {
            Some(icon) => validate_icon(icon.as_deref())?,
            None => category.icon,
        };

        Ok(Category {
            name,
            category_type: self.category_type.unwrap_or(category.category_type),
            color,
            icon,
            ..category
        })
    }
}
