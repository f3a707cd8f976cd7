pub mod concepts;
pub mod contractor_projects;
pub mod contractors;
pub mod payments;
pub mod projects;
pub mod specialties;
