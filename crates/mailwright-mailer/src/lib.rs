//! # mailwright-mailer
//!
//! Mailers built on [`mailwright_mime`].
//!
//! A mailer is a set of named actions. Each action receives a [`Context`],
//! registers custom headers and attachments, and calls
//! [`Context::mail`] (bodies from templates or the `body` option) or
//! [`Context::mail_with`] (explicitly declared formats). The resulting
//! message is returned by [`Mailer::build`] or handed to a [`Delivery`] by
//! [`Mailer::deliver`].
//!
//! ## Example
//!
//! ```
//! use mailwright_mailer::{
//!     Context, MailOptions, Mailer, MailerActions, MemoryViewPath, Result, Template, TestDelivery,
//! };
//!
//! #[derive(Debug, Clone, Copy)]
//! enum Notifier {
//!     Welcome,
//! }
//!
//! impl MailerActions for Notifier {
//!     const MAILER: &'static str = "notifier";
//!     const ALL: &'static [Self] = &[Self::Welcome];
//!
//!     fn name(self) -> &'static str {
//!         "welcome"
//!     }
//!
//!     fn run(self, ctx: &mut Context<'_>, options: MailOptions) -> Result<()> {
//!         ctx.attachments_mut().insert("invoice.pdf", "%PDF-1.4");
//!         ctx.mail(options)
//!     }
//! }
//!
//! let deliveries = TestDelivery::new();
//! let mailer = Mailer::<Notifier>::new()
//!     .with_view_path(
//!         MemoryViewPath::new()
//!             .with_template("notifier", "welcome", Template::text("Hi!"))
//!             .with_template("notifier", "welcome", Template::html("<p>Hi!</p>")),
//!     )
//!     .with_delivery(deliveries.clone());
//!
//! let message = mailer.deliver(Notifier::Welcome, MailOptions::new().to("user@example.com"))?;
//! assert_eq!(message.mime_type(), "multipart/mixed");
//! assert_eq!(message.subject(), Some("Welcome"));
//! assert_eq!(deliveries.len(), 1);
//! # Ok::<(), mailwright_mailer::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;
mod context;
mod delivery;
mod error;
mod format;
mod i18n;
mod mailer;
mod options;
mod view;

pub use config::Defaults;
pub use context::{AttachmentSpec, Attachments, Context};
pub use delivery::{Delivery, FileDelivery, TestDelivery};
pub use error::{Error, Result};
pub use format::{Format, FormatCollector};
pub use i18n::{Translations, Translator};
pub use mailer::{Mailer, MailerActions};
pub use options::MailOptions;
pub use view::{DirectoryViewPath, MemoryViewPath, Template, ViewPath};
