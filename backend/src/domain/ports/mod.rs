//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod preference_store;
mod preferences_command;
mod preferences_query;

#[cfg(test)]
pub use preference_store::MockPreferenceStore;
pub use preference_store::{FixturePreferenceStore, PreferenceStore, PreferenceStoreError};
#[cfg(test)]
pub use preferences_command::MockPreferencesCommand;
pub use preferences_command::PreferencesCommand;
#[cfg(test)]
pub use preferences_query::MockPreferencesQuery;
pub use preferences_query::PreferencesQuery;
