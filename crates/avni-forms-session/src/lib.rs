//! Editing a form against the Avni server
//!
//! This crate provides:
//! - [`FormSession`]: load a form, apply edits, validate and save it
//! - [`FormsBackend`]: the server operations a session needs, with
//!   [`HttpFormsBackend`] as the REST implementation
//! - [`ClientConfig`]: where the server is and how to authenticate
//! - [`normalize`] and [`to_wire`]: the transformations applied to a form
//!   on its way in from and out to the server

mod backend;
mod config;
mod error;
mod normalize;
mod persist;
mod session;

pub use backend::{
    AUTH_TOKEN_HEADER, BackendError, EncounterTypeSummary, FormsBackend, HttpFormsBackend,
    IdentifierSource, OperationalModules, SubjectTypeSummary,
};
pub use config::{AUTH_TOKEN_ENV, ClientConfig, ConfigError, SERVER_URL_ENV};
pub use error::SessionError;
pub use normalize::normalize;
pub use persist::{renumber, server_error_message, to_wire};
pub use session::{
    FORM_LOAD_FAILED, FormSession, INITIAL_DATA_FAILED, SessionState, TeardownHandle,
    UnsavedChanges,
};
