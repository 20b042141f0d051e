// Result-set model shared by every backend and the formatter.

mod result_set;
mod row;

pub use result_set::ResultSet;
pub use row::ResultRow;
