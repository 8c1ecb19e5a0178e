//! DSC Engine Backend
//!
//! Typed HTTP client for the DSC engine API, the backend that holds all
//! protocol logic (collateral accounting, DSC mint/burn, liquidations).
//! The gateway never talks to the chain itself; every operation is a
//! request to this service.

mod client;

pub use client::{
    AccountInformation, ApproveOutcome, EngineClient, EngineConfig, EngineError,
};
