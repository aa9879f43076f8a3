//! Categories for income and expenses.

mod core;
mod create;
mod delete;
mod list;

pub use core::{
    Category, create_category, create_category_table, delete_category, get_categories,
    get_category, seed_default_categories,
};
pub use create::create_category_endpoint;
pub use delete::delete_category_endpoint;
pub use list::list_categories_endpoint;
