//! Session handling: the stored credential and the gate that checks it.
//!
//! This module provides:
//! - `TokenStore`: the single bearer token, persisted to the data directory
//! - `Verifier`: the seam used to ask the backend whether a token is valid
//! - `SessionGate`: decides between placeholder, protected views, and login
//!
//! Tokens carry no local expiry; validity is recomputed by the backend each
//! time the gate is mounted.

pub mod gate;
pub mod token_store;
pub mod verifier;

pub use gate::{verify_with_timeout, GateState, GateView, SessionGate};
pub use token_store::TokenStore;
pub use verifier::{Refusal, Verdict, Verifier};
