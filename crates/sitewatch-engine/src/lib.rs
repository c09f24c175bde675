//! sitewatch engine - fetch, detect, record and notify
//!
//! One run is a batch: every resolved target is fetched, compared against
//! its latest recorded hash and, when changed, recorded into the state
//! store. The changes of the whole run are then composed into one
//! notification and fanned out to webhooks and email recipients.

pub mod clock;
pub mod detect;
pub mod fetch;
pub mod notify;
pub mod run;

pub use clock::{Clock, SystemClock};
pub use detect::{ChangeDetector, ChangeRecord, CheckOutcome};
pub use fetch::{ContentFetcher, Fetch, FetchOutcome};
pub use notify::{
    DeliveryReport, MailTransport, Notification, NotificationComposer, NotificationDispatcher,
    WebhookSender,
};
pub use run::{run_cycle, RunOutcome, RunReport, TargetResult, TargetStatus};
