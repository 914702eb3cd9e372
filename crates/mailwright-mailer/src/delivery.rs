//! Delivery methods.

use crate::error::Result;
use mailwright_mime::Message;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Hands a built message to its destination.
pub trait Delivery: Send + Sync {
    /// Delivers the message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be delivered.
    fn deliver(&self, message: &Message) -> Result<()>;
}

/// Records delivered messages in memory.
///
/// Clones share the same list, so a test can keep one handle and give
/// another to the mailer.
#[derive(Debug, Clone, Default)]
pub struct TestDelivery {
    deliveries: Arc<Mutex<Vec<Message>>>,
}

impl TestDelivery {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of delivered messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Checks whether nothing has been delivered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forgets every delivered message.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Returns a copy of the delivered messages.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.lock().clone()
    }

    /// Returns the most recently delivered message.
    #[must_use]
    pub fn last(&self) -> Option<Message> {
        self.lock().last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Message>> {
        self.deliveries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Delivery for TestDelivery {
    fn deliver(&self, message: &Message) -> Result<()> {
        self.lock().push(message.clone());
        Ok(())
    }
}

/// Appends the wire form of each message to `<dir>/<recipient>`, once per
/// To, Cc and Bcc recipient.
#[derive(Debug, Clone)]
pub struct FileDelivery {
    dir: PathBuf,
}

impl FileDelivery {
    /// Creates a file delivery writing into `dir`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Returns the mailbox file of a recipient.
    #[must_use]
    pub fn mailbox(&self, recipient: &str) -> PathBuf {
        self.dir.join(recipient.replace(['/', '\\'], "_"))
    }
}

impl Delivery for FileDelivery {
    fn deliver(&self, message: &Message) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let wire = message.to_bytes();

        let recipients = message
            .to()
            .into_iter()
            .chain(message.cc())
            .chain(message.bcc());
        for recipient in recipients {
            let path = self.mailbox(recipient);
            debug!(path = %path.display(), "Appending message to mailbox");
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
            file.write_all(&wire)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailwright_mime::MessageBuilder;

    fn message(to: &str) -> Message {
        MessageBuilder::new()
            .from("jose@test.plataformatec.com")
            .to(to)
            .subject("The first email on new API!")
            .text_body("Welcome")
            .build()
            .unwrap()
    }

    #[test]
    fn test_clones_share_deliveries() {
        let deliveries = TestDelivery::new();
        let handle = deliveries.clone();
        assert!(handle.is_empty());

        deliveries.deliver(&message("mikel@test.lindsaar.net")).unwrap();
        deliveries.deliver(&message("other@test.lindsaar.net")).unwrap();

        assert_eq!(handle.len(), 2);
        assert_eq!(handle.last().unwrap().to(), ["other@test.lindsaar.net"]);

        handle.clear();
        assert!(deliveries.is_empty());
    }

    #[test]
    fn test_file_delivery_appends_per_recipient() {
        let dir = std::env::temp_dir().join(format!("mailwright-mailbox-{}", std::process::id()));
        let delivery = FileDelivery::new(&dir);
        let mail = message("mikel@test.lindsaar.net");

        delivery.deliver(&mail).unwrap();
        delivery.deliver(&mail).unwrap();

        let written = fs::read(delivery.mailbox("mikel@test.lindsaar.net")).unwrap();
        let wire = mail.to_bytes();
        assert_eq!(written.len(), wire.len() * 2);
        assert!(written.starts_with(&wire));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_delivery_keeps_quoted_display_name_whole() {
        let dir = std::env::temp_dir().join(format!("mailwright-quoted-{}", std::process::id()));
        let delivery = FileDelivery::new(&dir);
        let recipient = "\"Doe, John\" <j@example.com>";

        delivery.deliver(&message(recipient)).unwrap();

        assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);
        assert!(delivery.mailbox(recipient).exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
