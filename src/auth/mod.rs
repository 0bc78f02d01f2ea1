pub mod gate;

pub use gate::{hash_credential, AuthGate, AuthOutcome, CredentialStore};
