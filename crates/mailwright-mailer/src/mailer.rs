//! Mailers: named actions plus the settings they share.

use crate::config::Defaults;
use crate::context::Context;
use crate::delivery::{Delivery, TestDelivery};
use crate::error::{Error, Result};
use crate::i18n::{Translations, Translator};
use crate::options::MailOptions;
use crate::view::ViewPath;
use mailwright_mime::Message;
use std::marker::PhantomData;
use tracing::{debug, info};

/// The actions of a mailer, usually a fieldless enum.
///
/// ```
/// use mailwright_mailer::{Context, MailOptions, MailerActions, Result};
///
/// #[derive(Debug, Clone, Copy)]
/// enum Notifier {
///     Welcome,
/// }
///
/// impl MailerActions for Notifier {
///     const MAILER: &'static str = "notifier";
///     const ALL: &'static [Self] = &[Self::Welcome];
///
///     fn name(self) -> &'static str {
///         match self {
///             Self::Welcome => "welcome",
///         }
///     }
///
///     fn run(self, ctx: &mut Context<'_>, options: MailOptions) -> Result<()> {
///         match self {
///             Self::Welcome => ctx.mail(options.body("Welcome!")),
///         }
///     }
/// }
///
/// assert_eq!(Notifier::from_name("welcome").map(Notifier::name), Some("welcome"));
/// assert!(Notifier::from_name("mail").is_none());
/// ```
pub trait MailerActions: Copy + Send + Sync + 'static {
    /// Mailer name used for template directories and translation keys.
    const MAILER: &'static str;

    /// Every action of the mailer.
    const ALL: &'static [Self];

    /// Returns the action name.
    fn name(self) -> &'static str;

    /// Runs the action, which must call [`Context::mail`] or
    /// [`Context::mail_with`].
    ///
    /// # Errors
    ///
    /// Returns whatever error the action or mail assembly produces.
    fn run(self, ctx: &mut Context<'_>, options: MailOptions) -> Result<()>;

    /// Looks up an action by name.
    #[must_use]
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|action| action.name() == name)
    }
}

/// Settings shared by every action of a mailer.
pub(crate) struct Settings {
    pub(crate) defaults: Defaults,
    pub(crate) view_paths: Vec<Box<dyn ViewPath>>,
    pub(crate) translator: Box<dyn Translator>,
    pub(crate) locale: String,
}

type DeliveredHook = Box<dyn Fn(&Message) + Send + Sync>;

/// A mailer running the actions `A`.
///
/// Messages go to a [`TestDelivery`] unless another delivery is set.
pub struct Mailer<A> {
    settings: Settings,
    delivery: Box<dyn Delivery>,
    hooks: Vec<DeliveredHook>,
    actions: PhantomData<A>,
}

impl<A: MailerActions> Default for Mailer<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: MailerActions> Mailer<A> {
    /// Creates a mailer with default settings, no view paths and no
    /// translations.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: Settings {
                defaults: Defaults::default(),
                view_paths: Vec::new(),
                translator: Box::new(Translations::new()),
                locale: "en".to_string(),
            },
            delivery: Box::new(TestDelivery::new()),
            hooks: Vec::new(),
            actions: PhantomData,
        }
    }

    /// Replaces the defaults.
    #[must_use]
    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.settings.defaults = defaults;
        self
    }

    /// Appends a view path; earlier paths take precedence.
    #[must_use]
    pub fn with_view_path(mut self, path: impl ViewPath + 'static) -> Self {
        self.settings.view_paths.push(Box::new(path));
        self
    }

    /// Sets the translator used for subjects.
    #[must_use]
    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.settings.translator = Box::new(translator);
        self
    }

    /// Sets the locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.settings.locale = locale.into();
        self
    }

    /// Sets the delivery method.
    #[must_use]
    pub fn with_delivery(mut self, delivery: impl Delivery + 'static) -> Self {
        self.delivery = Box::new(delivery);
        self
    }

    /// Returns the defaults.
    #[must_use]
    pub const fn defaults(&self) -> &Defaults {
        &self.settings.defaults
    }

    /// Returns the defaults for modification.
    pub fn defaults_mut(&mut self) -> &mut Defaults {
        &mut self.settings.defaults
    }

    /// Inserts a view path in front of the existing ones.
    pub fn prepend_view_path(&mut self, path: impl ViewPath + 'static) {
        self.settings.view_paths.insert(0, Box::new(path));
    }

    /// Changes the locale.
    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.settings.locale = locale.into();
    }

    /// Returns the current locale.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.settings.locale
    }

    /// Registers a hook called once for every delivered message.
    pub fn on_delivered<F>(&mut self, hook: F)
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    /// Checks whether the mailer has an action with this name.
    #[must_use]
    pub fn responds_to(&self, name: &str) -> bool {
        A::from_name(name).is_some()
    }

    /// Runs an action and returns its message without delivering it.
    ///
    /// # Errors
    ///
    /// Returns an error if the action fails or never calls `mail`.
    pub fn build(&self, action: A, options: MailOptions) -> Result<Message> {
        debug!(mailer = A::MAILER, action = action.name(), "Running mailer action");
        let mut ctx = Context::new(&self.settings, A::MAILER, action.name());
        action.run(&mut ctx, options)?;
        ctx.finish()
    }

    /// Runs an action looked up by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAction`] if no action has this name, or any
    /// error from [`build`](Self::build).
    pub fn build_named(&self, name: &str, options: MailOptions) -> Result<Message> {
        let action = A::from_name(name).ok_or_else(|| Error::UnknownAction(name.to_string()))?;
        self.build(action, options)
    }

    /// Builds and delivers a message, then runs the delivery hooks.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be built, has no recipient,
    /// or the delivery method fails.
    pub fn deliver(&self, action: A, options: MailOptions) -> Result<Message> {
        let message = self.build(action, options)?;
        self.deliver_message(&message)?;
        Ok(message)
    }

    /// Delivers an action looked up by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAction`] if no action has this name, or any
    /// error from [`deliver`](Self::deliver).
    pub fn deliver_named(&self, name: &str, options: MailOptions) -> Result<Message> {
        let action = A::from_name(name).ok_or_else(|| Error::UnknownAction(name.to_string()))?;
        self.deliver(action, options)
    }

    /// Delivers an already built message, then runs the delivery hooks.
    ///
    /// # Errors
    ///
    /// Returns an error if the message has no recipient or the delivery
    /// method fails.
    pub fn deliver_message(&self, message: &Message) -> Result<()> {
        if message.to().is_empty() && message.cc().is_empty() && message.bcc().is_empty() {
            return Err(Error::MissingRecipient);
        }

        self.delivery.deliver(message)?;
        info!(
            mailer = A::MAILER,
            to = ?message.to(),
            subject = message.subject().unwrap_or_default(),
            "Message delivered"
        );

        for hook in &self.hooks {
            hook(message);
        }
        Ok(())
    }
}
