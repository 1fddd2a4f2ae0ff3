//! Accounts and the pages and endpoints for managing them.

mod accounts_page;
mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod delete_page;
mod edit_endpoint;
mod edit_page;

pub use self::core::{Account, AccountId, create_account_table, get_account, get_accounts_by_user};
pub(crate) use self::core::get_all_accounts;
pub use accounts_page::get_accounts_page;
pub use create_endpoint::create_account_endpoint;
pub use create_page::get_create_account_page;
pub use delete_endpoint::delete_account_endpoint;
pub use delete_page::get_delete_account_page;
pub use edit_endpoint::edit_account_endpoint;
pub use edit_page::get_edit_account_page;
