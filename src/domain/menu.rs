use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Category {
    Hot,
    Cold,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Hot => "hot",
            Category::Cold => "cold",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hot" => Ok(Category::Hot),
            "cold" => Ok(Category::Cold),
            _ => Err(ParseEnumError::new("category", s)),
        }
    }
}

impl TryFrom<String> for Category {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for &'static str {
    fn from(category: Category) -> Self {
        category.as_str()
    }
}

/// A drink on the menu board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: Category,
    pub image_url: Option<String>,
}

/// Payload for adding a menu item.
#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: Category,
    pub image_url: Option<String>,
}

impl MenuItemCreate {
    pub fn new(name: impl Into<String>, price: Decimal, category: Category) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            category,
            image_url: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<Category>,
    pub image_url: Option<String>,
}
