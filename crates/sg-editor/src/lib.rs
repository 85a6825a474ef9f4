pub mod clipboard;
pub mod editor;
pub mod input;
pub mod notify;
pub mod persist;
pub mod registry;
pub mod session;
pub mod shortcuts;

pub use clipboard::{Clipboard, ClipboardSnapshot};
pub use editor::{Editor, Response};
pub use notify::{BridgeEvent, EventSink, NotificationBridge};
pub use registry::{InsertOutcome, PositionChange, Registry};
pub use session::{InteractionController, SessionEnd};
