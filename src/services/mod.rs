pub mod event_source;
pub mod focus_detector;
pub mod notification_gate;
pub mod notifier;
pub mod probe;

pub use event_source::run_event_loop;
pub use focus_detector::{create_focus_detector, EnvironmentSnapshot};
pub use notification_gate::NotificationGate;
pub use notifier::create_notifier;
pub use probe::SystemProbe;
