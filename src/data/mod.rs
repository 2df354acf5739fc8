//! Row data: the book column layout, the row registry and input loaders

pub mod cell_compare;
pub mod loaders;
pub mod row;
pub mod row_registry;
