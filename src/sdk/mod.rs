/// Entry points for processes embedding Bucket Store.
///
/// This module turns a [`crate::config::Config`] into a ready-to-use
/// [`crate::Store`] trait object.
pub mod discovery;

pub use discovery::new;
