//! Types that represent the core data model, such as `Transaction`, `Category` and `Budget`.
mod amount;
mod budget;
mod category;
mod entry_type;
mod month;
mod transaction;

pub use amount::{Amount, AmountError, AmountFormat};
pub use budget::Budget;
pub use category::{Category, CategoryRef, WithCategory, DEFAULT_ICON};
pub(crate) use category::display_icon;
pub use entry_type::EntryType;
pub use month::Month;
pub use transaction::{Entry, Transaction};
