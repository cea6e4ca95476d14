#![deny(rust_2018_idioms)]
#![deny(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod error;
pub mod format;
pub mod load;
pub mod model;

pub use load::{LoadOptions, Loader};
pub use model::toc::{KeyPath, Node, TableOfContents};
