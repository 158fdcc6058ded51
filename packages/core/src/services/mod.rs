//! External collaborators: the OS service manager and the messaging provider.

pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod notifier;
pub mod prober;
pub mod twilio;

pub use error::{NotifyError, ProbeError};
pub use notifier::{deliver, MessageSid, Notifier};
pub use prober::{is_running, CommandProber, ServiceManager, ServiceProber};
pub use twilio::TwilioClient;
