//! Operations composed from the db layer, the document store and the report
//! engine. Everything here returns [`AppError`](crate::error::AppError).

pub mod concepts;
pub mod contractors;
pub mod reports;
