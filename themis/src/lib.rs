#![deny(missing_docs)]

//! # Themis
//!
//! A Notation3 reasoner: forward- and backward-chaining inference over
//! RDF data with the SWAP builtin vocabularies.
//!
//! The [`Reasoner`](reason/struct.Reasoner.html) loads N3 documents,
//! saturates the fact store to a fixed point and reports the closure,
//! the derivation records and the ordered `log:outputString` texts.

pub mod common;
pub mod error;
pub mod ns;

pub mod deref;
pub mod explain;
pub mod parse;
pub mod reason;
pub mod serialize;
pub mod skolem;
pub mod store;
pub mod subst;
pub mod term;
pub mod unify;

mod builtin;
mod forward;
mod prove;

pub use self::common::*;
pub use self::error::{Error, Result};
pub use self::reason::{Config, Reasoner, RunOutput};
pub use self::term::{DerivedFact, Rule, Term, Triple};
