//! Message templates and the payloads rendered into them.
//!
//! Templates are plain strings with `{{.key}}` placeholders. There are no
//! loops, conditionals or nested lookups; rendering is a single
//! find-and-replace pass over the template.
//!
//! # Example
//!
//! ```
//! use telegram_webhook_relay::template::{render, Payload};
//!
//! let payload = Payload::new()
//!     .with("host", "ci")
//!     .with("version", "1.2.3");
//!
//! assert_eq!(
//!     render("🚀 {{.host}} deployed {{.version}}", &payload),
//!     "🚀 ci deployed 1.2.3"
//! );
//! ```

mod payload;
mod render;

pub use payload::{Payload, PayloadValue};
pub use render::render;
