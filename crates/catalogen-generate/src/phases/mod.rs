//! Generation phases, in run order.
//!
//! Every phase reads what it needs from the metadata store, allocates
//! fresh ids and pushes rows to the output buffers; the values a later
//! phase depends on are returned and passed on explicitly.

pub mod assignments;
pub mod attribute_groups;
pub mod attribute_sets;
pub mod attributes;
pub mod categories;
pub mod customer_groups;
pub mod products;
