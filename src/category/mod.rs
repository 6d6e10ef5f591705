//! Per-user income and expense categories.

mod db;
mod domain;
mod handlers;

pub use db::{
    create_category, create_category_table, create_default_categories, delete_category,
    get_all_categories, get_category, update_category,
};
pub use domain::{
    Category, CategoryColor, CategoryForm, CategoryId, CategoryName, CategoryUpdate,
    DEFAULT_CATEGORY_COLOR, NewCategory,
};
pub use handlers::{
    create_category_endpoint, delete_category_endpoint, get_category_endpoint,
    list_categories_endpoint, update_category_endpoint,
};
