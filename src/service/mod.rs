//! Request-facing operations over the stores, with the checks the stores leave to callers.

mod catalog;

pub use catalog::{Ack, Catalog, PAGE_SIZE, Page};
