//! Core library for the udm-import command line application.
//!
//! The library bulk-applies create, modify or remove operations to UDM
//! objects from the rows of a CSV file. CSV ingestion lives under
//! [`udm::import::io`], the directory service interface under
//! [`udm::import::directory`], header validation in
//! [`udm::import::preconditions`], per-row work in [`udm::import::executor`]
//! and the run loop in [`udm::import::run`].

pub mod udm;

pub use udm::import::{
    ImportError, Result, directory, error, executor, io, model, preconditions, report, run,
};
