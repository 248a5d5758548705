//! Command implementations for the fhirpkg CLI

pub mod snapshot;
