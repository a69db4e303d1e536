//! Akoma Ntoso 3.0 output.

pub mod writer;

pub use writer::section_to_akn;
