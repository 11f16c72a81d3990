//! Real-time notification channel.
//!
//! One WebSocket per authenticated session, connected to
//! `<ws_base>/ws/notifications/?token=<access>`. Pushed frames carry a
//! `{type, data}` envelope; recognized ones surface a transient alert and
//! invalidate the notification cache partitions so the next REST read
//! re-fetches. The connection reconnects on abnormal closure with capped
//! exponential backoff and stays down after an explicit disconnect.

pub mod dispatch;
pub mod policy;
pub mod socket;

pub use policy::ReconnectPolicy;
pub use socket::{ConnectionState, NotificationSocket};
