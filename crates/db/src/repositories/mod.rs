//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod property;
pub mod rents;
pub mod tenant;

pub use property::PropertyRepository;
pub use rents::RentsRepository;
pub use tenant::TenantRepository;
