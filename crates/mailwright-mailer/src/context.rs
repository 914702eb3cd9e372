//! The mail context an action fills in.

use crate::error::{Error, Result};
use crate::format::{Declared, FormatCollector};
use crate::i18n::humanize;
use crate::mailer::Settings;
use crate::options::MailOptions;
use crate::view::{resolve_format, resolve_implicit};
use chrono::Utc;
use mailwright_mime::{
    Attachment, ContentPart, ContentType, Headers, Message, MessageBuilder, TransferEncoding,
};
use tracing::{debug, warn};

/// Attachment data with explicit metadata.
///
/// When `transfer_encoding` is set, `data` is taken to be already encoded
/// that way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentSpec {
    /// File content, raw or pre-encoded.
    pub data: Vec<u8>,
    /// Content type; guessed from the file name when absent.
    pub mime_type: Option<String>,
    /// Encoding `data` is already in.
    pub transfer_encoding: Option<TransferEncoding>,
}

/// Attachments registered by an action, keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct Attachments {
    entries: Vec<Attachment>,
}

impl Attachments {
    /// Attaches raw data; the content type is guessed from the file name.
    ///
    /// A second attachment with the same file name replaces the first.
    pub fn insert(&mut self, filename: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.put(Attachment::new(filename, data));
    }

    /// Attaches data described by an [`AttachmentSpec`].
    ///
    /// # Errors
    ///
    /// Returns an error if the mime type cannot be parsed or the data is
    /// not valid for its declared transfer encoding.
    pub fn insert_spec(&mut self, filename: impl Into<String>, spec: AttachmentSpec) -> Result<()> {
        let filename = filename.into();
        let mut attachment = match spec.transfer_encoding {
            Some(encoding) => Attachment::from_encoded(filename, &spec.data, encoding)?,
            None => Attachment::new(filename, spec.data),
        };
        if let Some(mime_type) = spec.mime_type {
            attachment = attachment.with_content_type(ContentType::parse(&mime_type)?);
        }
        self.put(attachment);
        Ok(())
    }

    /// Returns the attachment with the given file name.
    #[must_use]
    pub fn get(&self, filename: &str) -> Option<&Attachment> {
        self.entries.iter().find(|a| a.filename() == filename)
    }

    /// Returns the number of attachments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether no attachment has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn put(&mut self, attachment: Attachment) {
        match self.entries.iter_mut().find(|a| a.filename() == attachment.filename()) {
            Some(existing) => *existing = attachment,
            None => self.entries.push(attachment),
        }
    }
}

/// State of one action invocation.
///
/// Custom headers and attachments must be set before
/// [`mail`](Self::mail) or [`mail_with`](Self::mail_with) is called.
pub struct Context<'a> {
    settings: &'a Settings,
    mailer: &'static str,
    action: &'static str,
    headers: Headers,
    attachments: Attachments,
    message: Option<Message>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(settings: &'a Settings, mailer: &'static str, action: &'static str) -> Self {
        Self {
            settings,
            mailer,
            action,
            headers: Headers::new(),
            attachments: Attachments::default(),
            message: None,
        }
    }

    /// Returns the name of the running action.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        self.action
    }

    /// Returns the current locale.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.settings.locale
    }

    /// Custom message headers such as `X-SPAM`.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// The attachment registry.
    pub fn attachments_mut(&mut self) -> &mut Attachments {
        &mut self.attachments
    }

    /// Builds the mail from the `body` option or the action's templates.
    ///
    /// # Errors
    ///
    /// Returns an error if no template exists or the message cannot be
    /// assembled.
    pub fn mail(&mut self, options: MailOptions) -> Result<()> {
        self.compose(&options, None)
    }

    /// Builds the mail from explicitly declared formats.
    ///
    /// # Errors
    ///
    /// Returns an error if a declared format has no body and no template,
    /// or the message cannot be assembled.
    pub fn mail_with<F>(&mut self, options: MailOptions, declare: F) -> Result<()>
    where
        F: FnOnce(&mut FormatCollector),
    {
        let mut collector = FormatCollector::new();
        declare(&mut collector);
        self.compose(&options, Some(collector.into_declared()))
    }

    pub(crate) fn finish(self) -> Result<Message> {
        self.message
            .ok_or_else(|| Error::MailNotCalled(self.action.to_string()))
    }

    fn compose(&mut self, options: &MailOptions, explicit: Option<Vec<Declared>>) -> Result<()> {
        if self.message.is_some() {
            warn!(
                mailer = self.mailer,
                action = self.action,
                "mail called more than once, replacing message"
            );
        }

        let settings = self.settings;
        let defaults = &settings.defaults;
        let body_type = options
            .content_type_value()
            .filter(|ct| !ct.trim().to_ascii_lowercase().starts_with("multipart/"))
            .unwrap_or(defaults.content_type.as_str());

        let (representations, preference) = match explicit {
            Some(declared) => (self.explicit_parts(declared)?, Vec::new()),
            None => {
                let preference = options
                    .parts_order_value()
                    .unwrap_or(defaults.implicit_parts_order.as_slice())
                    .to_vec();
                (self.implicit_parts(options, body_type)?, preference)
            }
        };

        let mut builder = MessageBuilder::new()
            .parts_order(&preference)
            .charset(options.charset_value().unwrap_or(defaults.charset.as_str()))
            .mime_version(
                options
                    .mime_version_value()
                    .unwrap_or(defaults.mime_version.as_str()),
            );

        let from = options.from_list();
        if from.is_empty() {
            if let Some(sender) = &defaults.from {
                builder = builder.from(sender);
            }
        }
        for address in from {
            builder = builder.from(address);
        }
        for address in options.to_list() {
            builder = builder.to(address);
        }
        for address in options.cc_list() {
            builder = builder.cc(address);
        }
        for address in options.bcc_list() {
            builder = builder.bcc(address);
        }
        for address in options.reply_to_list() {
            builder = builder.reply_to(address);
        }

        builder = builder.subject(self.subject(options));
        builder = match options.date_value() {
            Some(date) => builder.date(&date),
            None => builder.date(&Utc::now()),
        };
        for (name, value) in self.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(content_type) = options.content_type_value() {
            builder = builder.content_type(ContentType::parse(content_type)?);
        }

        debug!(
            mailer = self.mailer,
            action = self.action,
            representations = representations.len(),
            attachments = self.attachments.len(),
            "Assembling message"
        );
        for attachment in &self.attachments.entries {
            builder = builder.attach(attachment.clone());
        }
        for part in representations {
            builder = builder.representation(part);
        }

        self.message = Some(builder.build()?);
        Ok(())
    }

    fn implicit_parts(&self, options: &MailOptions, body_type: &str) -> Result<Vec<ContentPart>> {
        if let Some(body) = options.body_value() {
            return Ok(vec![ContentPart::parse(body_type, body)?]);
        }

        let templates = resolve_implicit(
            &self.settings.view_paths,
            self.mailer,
            self.action,
            &self.settings.locale,
        )?;
        if templates.is_empty() {
            return Err(self.missing_template(None));
        }
        templates
            .into_iter()
            .map(|t| {
                ContentPart::parse(t.mime_type().unwrap_or(body_type), t.body())
                    .map_err(Error::from)
            })
            .collect()
    }

    fn explicit_parts(&self, declared: Vec<Declared>) -> Result<Vec<ContentPart>> {
        let mut parts = Vec::with_capacity(declared.len());
        for Declared { format, body } in declared {
            let body = match body {
                Some(body) => body,
                None => resolve_format(
                    &self.settings.view_paths,
                    self.mailer,
                    self.action,
                    format.mime_type(),
                    &self.settings.locale,
                )?
                .ok_or_else(|| self.missing_template(Some(format.mime_type())))?
                .body()
                .to_string(),
            };
            parts.push(ContentPart::parse(format.mime_type(), body)?);
        }
        Ok(parts)
    }

    fn subject(&self, options: &MailOptions) -> String {
        if let Some(subject) = options.subject_value() {
            return subject.to_string();
        }
        let key = format!("actionmailer.{}.{}.subject", self.mailer, self.action);
        self.settings
            .translator
            .translate(&self.settings.locale, &key)
            .unwrap_or_else(|| humanize(self.action))
    }

    fn missing_template(&self, format: Option<&str>) -> Error {
        Error::MissingTemplate {
            mailer: self.mailer.to_string(),
            action: self.action.to_string(),
            format: format.map(str::to_string),
        }
    }
}
