//! FocusDetector service: responsibility and boundaries
//!
//! This module and its submodules answer exactly one question: is the terminal
//! this process runs in the thing the user is looking at right now? Detectors
//! capture a `TerminalIdentity` once and compare a fresh query against it on
//! every check. They MUST NOT decide whether a notification is wanted; that
//! belongs to the NotificationGate.
//!
//! Every probe failure resolves to "not focused", so a broken tool can only
//! cause an extra notification, never a missing one.

mod always_notify;
mod environment;
mod tmux;
mod xdotool;
mod r#trait;

pub use self::always_notify::AlwaysNotifyDetector;
pub use self::environment::EnvironmentSnapshot;
pub use self::r#trait::{create_focus_detector, DetectorKind, FocusDetector, TerminalIdentity};
pub use self::tmux::TmuxDetector;
pub use self::xdotool::XdotoolDetector;
