//! General-purpose collection schemas.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Collection holding [`User`] documents.
pub const USER_COLLECTION: &str = "user";

/// Collection holding [`Product`] documents.
pub const PRODUCT_COLLECTION: &str = "product";

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
pub struct User {
    /// Full name
    pub name: String,

    /// Email address
    pub email: String,

    pub address: String,

    /// Age in years
    #[validate(range(min = 0, max = 120, message = "must be between 0 and 120"))]
    pub age: Option<i64>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
pub struct Product {
    pub title: String,

    pub description: Option<String>,

    /// Price in dollars
    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub price: f64,

    pub category: String,

    #[serde(default = "default_true")]
    pub in_stock: bool,
}
