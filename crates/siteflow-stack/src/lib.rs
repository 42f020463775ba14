//! The blog hosting stack definition
//!
//! One construction pass builds the complete resource graph for a statically
//! generated blog: origin storage, certificate, CDN distributions, DNS
//! records, the pending source connection, and the four-stage build/deploy
//! pipeline. Outputs of earlier descriptors thread into later ones through
//! typed handles; the finished template is graph-validated before it is
//! returned.

pub mod jekyll;
mod stack;

pub use stack::blog_stack;
