//! Per-mail options passed to actions and to `mail`.

use chrono::{DateTime, FixedOffset};
use std::collections::BTreeSet;

/// Headers and settings for one mail.
///
/// Unset fields fall back to the mailer [`Defaults`](crate::Defaults).
/// [`merge`](Self::merge) layers one set of options over another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailOptions {
    to: Vec<String>,
    from: Vec<String>,
    cc: Vec<String>,
    bcc: Vec<String>,
    reply_to: Vec<String>,
    // `Some(None)` clears a subject inherited through `merge`.
    subject: Option<Option<String>>,
    date: Option<DateTime<FixedOffset>>,
    content_type: Option<String>,
    charset: Option<String>,
    mime_version: Option<String>,
    body: Option<String>,
    parts_order: Option<Vec<String>>,
    flags: BTreeSet<String>,
}

impl MailOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a recipient.
    #[must_use]
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Adds a sender.
    #[must_use]
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from.push(address.into());
        self
    }

    /// Adds a CC recipient.
    #[must_use]
    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    /// Adds a BCC recipient.
    #[must_use]
    pub fn bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }

    /// Adds a Reply-To address.
    #[must_use]
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to.push(address.into());
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(Some(subject.into()));
        self
    }

    /// Clears the subject so that it is looked up in the translations.
    #[must_use]
    pub fn without_subject(mut self) -> Self {
        self.subject = Some(None);
        self
    }

    /// Sets the Date header.
    #[must_use]
    pub const fn date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets the content type of the message.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the charset for text parts.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Sets the `MIME-Version` header.
    #[must_use]
    pub fn mime_version(mut self, version: impl Into<String>) -> Self {
        self.mime_version = Some(version.into());
        self
    }

    /// Uses the given text as the body instead of templates.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the preference order for implicit representations.
    #[must_use]
    pub fn parts_order<S: AsRef<str>>(mut self, order: &[S]) -> Self {
        self.parts_order = Some(order.iter().map(|s| s.as_ref().to_string()).collect());
        self
    }

    /// Sets a boolean parameter for the action.
    #[must_use]
    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.flags.insert(name.into());
        self
    }

    /// Checks whether a parameter flag is set.
    #[must_use]
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// Removes a parameter flag, returning whether it was set.
    pub fn take_flag(&mut self, name: &str) -> bool {
        self.flags.remove(name)
    }

    /// Layers `overrides` over `self`: every field set there wins.
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        fn pick(base: Vec<String>, over: Vec<String>) -> Vec<String> {
            if over.is_empty() { base } else { over }
        }

        let mut flags = self.flags;
        flags.extend(overrides.flags);

        Self {
            to: pick(self.to, overrides.to),
            from: pick(self.from, overrides.from),
            cc: pick(self.cc, overrides.cc),
            bcc: pick(self.bcc, overrides.bcc),
            reply_to: pick(self.reply_to, overrides.reply_to),
            subject: overrides.subject.or(self.subject),
            date: overrides.date.or(self.date),
            content_type: overrides.content_type.or(self.content_type),
            charset: overrides.charset.or(self.charset),
            mime_version: overrides.mime_version.or(self.mime_version),
            body: overrides.body.or(self.body),
            parts_order: overrides.parts_order.or(self.parts_order),
            flags,
        }
    }

    pub(crate) fn recipients(&self) -> impl Iterator<Item = &str> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(String::as_str)
    }

    pub(crate) fn to_list(&self) -> &[String] {
        &self.to
    }

    pub(crate) fn from_list(&self) -> &[String] {
        &self.from
    }

    pub(crate) fn cc_list(&self) -> &[String] {
        &self.cc
    }

    pub(crate) fn bcc_list(&self) -> &[String] {
        &self.bcc
    }

    pub(crate) fn reply_to_list(&self) -> &[String] {
        &self.reply_to
    }

    pub(crate) fn subject_value(&self) -> Option<&str> {
        self.subject.as_ref().and_then(Option::as_deref)
    }

    pub(crate) const fn date_value(&self) -> Option<DateTime<FixedOffset>> {
        self.date
    }

    pub(crate) fn content_type_value(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub(crate) fn charset_value(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub(crate) fn mime_version_value(&self) -> Option<&str> {
        self.mime_version.as_deref()
    }

    pub(crate) fn body_value(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub(crate) fn parts_order_value(&self) -> Option<&[String]> {
        self.parts_order.as_deref()
    }
}
