// src/nav/mod.rs
// =============================================================================
// Navigation state: which repository is selected, and how it gets changed.
//
// - selection: the process-wide RepoSelection (watch channel + generation)
// - switcher:  passkey gate and the "paste a GitHub link" switch flow
// =============================================================================

mod selection;
mod switcher;

pub use selection::{RepoSelection, RepoSnapshot};
pub use switcher::{PasskeyGate, RepoSwitcher, SwitchError};
