//! # Notification Queue
//!
//! Producer side lives in the state machine (enqueue happens inside the
//! originating transaction); this module owns everything downstream of the
//! queue table: template rendering, the delivery channel seam, and the
//! periodic drain consumer with bounded exponential backoff.
//!
//! The queue is strictly a best-effort side channel: delivery failures never
//! roll back or otherwise touch the authoritative participant state.

pub mod delivery;
pub mod drain;
pub mod templates;

pub use delivery::{DeliveryChannel, DeliveryError, DeliveryReceipt, LogOnlyChannel};
pub use drain::{DrainSummary, NotificationDrain};
pub use templates::TemplateKind;

use crate::error::Result;
use crate::models::NotificationTask;

/// Render a queued task without delivering it (admin preview surface)
pub fn preview(task: &NotificationTask) -> Result<String> {
    let kind = TemplateKind::parse(&task.template_kind)?;
    Ok(kind.render(&task.payload))
}
