//! Domain primitives, ports, and services.
//!
//! Purpose: hold the preference normalisation and persistence policy without
//! depending on HTTP or database frameworks. Inbound adapters call the driving
//! ports in [`ports`]; outbound adapters implement [`ports::PreferenceStore`].
//!
//! Public surface:
//! - Error (alias to `error::Error`) — transport-agnostic failure payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - Username / UserId — external and internal user identities.
//! - PreferenceDocument / PreferenceRecord / PreferenceShape — the stored
//!   document and its wire representations.
//! - PreferencesService — orchestration implementing the driving ports.

pub mod error;
pub mod ports;
pub mod preferences;
pub mod preferences_service;
pub mod trace_id;
pub mod user;

pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::preferences::{
    PreferenceDocument, PreferenceParseError, PreferenceRecord, PreferenceShape, WriteMethod,
};
pub use self::preferences_service::PreferencesService;
pub use self::trace_id::TraceId;
pub use self::user::{UserId, Username, UsernameValidationError};
