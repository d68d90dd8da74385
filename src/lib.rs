//! Resource description compiler, pack format and lazy runtime loader.
//!
//! [`pack`] holds the value model, the dict document and its binary codec, the
//! JSON resource compiler with its cache validator, the factory registry, the
//! runtime resource container and the tree visitor.

pub mod pack;
