pub mod notification;

pub use notification::{EventContext, EventKind, IncomingEvent};
