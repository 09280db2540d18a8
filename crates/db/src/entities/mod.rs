//! `SeaORM` entity definitions.

pub mod companies;
pub mod payables;
pub mod properties;
pub mod receivables;
pub mod tenants;
pub mod unoccupied_markers;
