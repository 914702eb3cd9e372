//! Integration tests for mailers.
//!
//! A small mailer with in-memory templates is run through every way of
//! producing a body: templates, the `body` option and explicit formats.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::DateTime;
use serde_json::json;

use mailwright_mailer::{
    AttachmentSpec, Context, DirectoryViewPath, Error, FileDelivery, Format, MailOptions, Mailer,
    MailerActions, MemoryViewPath, Result, Template, TestDelivery, Translations,
};
use mailwright_mime::{Node, TransferEncoding};

#[derive(Debug, Clone, Copy)]
enum BaseMailer {
    Welcome,
    AttachmentWithContent,
    AttachmentWithHash,
    ImplicitMultipart,
    ImplicitWithLocale,
    ExplicitMultipart,
    ExplicitMultipartTemplates,
    ExplicitMultipartWithAny,
}

fn default_headers() -> MailOptions {
    MailOptions::new()
        .to("mikel@test.lindsaar.net")
        .from("jose@test.plataformatec.com")
        .subject("The first email on new API!")
}

impl MailerActions for BaseMailer {
    const MAILER: &'static str = "base_mailer";
    const ALL: &'static [Self] = &[
        Self::Welcome,
        Self::AttachmentWithContent,
        Self::AttachmentWithHash,
        Self::ImplicitMultipart,
        Self::ImplicitWithLocale,
        Self::ExplicitMultipart,
        Self::ExplicitMultipartTemplates,
        Self::ExplicitMultipartWithAny,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::AttachmentWithContent => "attachment_with_content",
            Self::AttachmentWithHash => "attachment_with_hash",
            Self::ImplicitMultipart => "implicit_multipart",
            Self::ImplicitWithLocale => "implicit_with_locale",
            Self::ExplicitMultipart => "explicit_multipart",
            Self::ExplicitMultipartTemplates => "explicit_multipart_templates",
            Self::ExplicitMultipartWithAny => "explicit_multipart_with_any",
        }
    }

    fn run(self, ctx: &mut Context<'_>, mut options: MailOptions) -> Result<()> {
        let attach = options.take_flag("attachments");
        if attach {
            ctx.attachments_mut()
                .insert("invoice.pdf", "This is test File content");
        }
        let options = default_headers().merge(options);

        match self {
            Self::Welcome => {
                ctx.headers_mut().set("X-SPAM", "Not SPAM");
                ctx.mail(options)
            }
            Self::AttachmentWithContent => {
                ctx.attachments_mut()
                    .insert("invoice.pdf", "This is test File content");
                ctx.mail(options)
            }
            Self::AttachmentWithHash => {
                ctx.attachments_mut().insert_spec(
                    "invoice.jpg",
                    AttachmentSpec {
                        data: b"you smiling".to_vec(),
                        mime_type: Some("image/x-jpg".to_string()),
                        transfer_encoding: Some(TransferEncoding::Base64),
                    },
                )?;
                ctx.mail(options)
            }
            Self::ImplicitMultipart | Self::ImplicitWithLocale => ctx.mail(options),
            Self::ExplicitMultipart => ctx.mail_with(options, |format| {
                format
                    .text_with("TEXT Explicit Multipart")
                    .html_with("HTML Explicit Multipart");
            }),
            Self::ExplicitMultipartTemplates => ctx.mail_with(options, |format| {
                format.html().text();
            }),
            Self::ExplicitMultipartWithAny => ctx.mail_with(options, |format| {
                format.any(&[Format::Text, Format::Html], "Format with any!");
            }),
        }
    }
}

fn fixtures() -> MemoryViewPath {
    MemoryViewPath::new()
        .with_template("base_mailer", "welcome", Template::new("Welcome"))
        .with_template(
            "base_mailer",
            "attachment_with_content",
            Template::html("Attachment with content"),
        )
        .with_template(
            "base_mailer",
            "attachment_with_hash",
            Template::html("Attachment with hash"),
        )
        .with_template(
            "base_mailer",
            "implicit_multipart",
            Template::html("HTML Implicit Multipart"),
        )
        .with_template(
            "base_mailer",
            "implicit_multipart",
            Template::text("TEXT Implicit Multipart"),
        )
        .with_template(
            "base_mailer",
            "implicit_with_locale",
            Template::html("Implicit with locale EN HTML").with_locale("en"),
        )
        .with_template(
            "base_mailer",
            "implicit_with_locale",
            Template::html("Implicit with locale HTML"),
        )
        .with_template(
            "base_mailer",
            "implicit_with_locale",
            Template::text("Implicit with locale PL TEXT").with_locale("pl"),
        )
        .with_template(
            "base_mailer",
            "implicit_with_locale",
            Template::text("Implicit with locale TEXT"),
        )
        .with_template(
            "base_mailer",
            "explicit_multipart_templates",
            Template::text("TEXT Explicit Multipart Templates"),
        )
        .with_template(
            "base_mailer",
            "explicit_multipart_templates",
            Template::html("HTML Explicit Multipart Templates"),
        )
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn mailer() -> Mailer<BaseMailer> {
    init_tracing();
    Mailer::new().with_view_path(fixtures())
}

fn build(mailer: &Mailer<BaseMailer>, action: BaseMailer) -> mailwright_mime::Message {
    mailer.build(action, MailOptions::new()).unwrap()
}

fn types(nodes: &[Node]) -> Vec<String> {
    nodes.iter().map(Node::mime_type).collect()
}

fn body(node: &Node) -> &str {
    std::str::from_utf8(node.encoded_body().unwrap()).unwrap()
}

// Headers

#[test]
fn test_mail_sets_headers() {
    let email = build(&mailer(), BaseMailer::Welcome);
    assert_eq!(email.to(), ["mikel@test.lindsaar.net"]);
    assert_eq!(email.from(), ["jose@test.plataformatec.com"]);
    assert_eq!(email.subject(), Some("The first email on new API!"));
}

#[test]
fn test_mail_with_bcc_cc_content_type_charset_mime_version_reply_to_and_date() {
    let date = DateTime::parse_from_rfc3339("2009-10-25T12:30:00+01:00").unwrap();
    let email = mailer()
        .build(
            BaseMailer::Welcome,
            MailOptions::new()
                .bcc("bcc@test.lindsaar.net")
                .cc("cc@test.lindsaar.net")
                .content_type("multipart/mixed")
                .charset("iso-8559-1")
                .mime_version("2.0")
                .reply_to("reply-to@test.lindsaar.net")
                .date(date),
        )
        .unwrap();

    assert_eq!(email.bcc(), ["bcc@test.lindsaar.net"]);
    assert_eq!(email.cc(), ["cc@test.lindsaar.net"]);
    assert_eq!(email.mime_type(), "multipart/mixed");
    assert_eq!(email.charset(), "iso-8559-1");
    assert_eq!(email.mime_version(), "2.0");
    assert_eq!(email.reply_to(), ["reply-to@test.lindsaar.net"]);
    assert_eq!(email.date(), Some(date));
}

#[test]
fn test_mail_renders_template_of_running_action() {
    let email = build(&mailer(), BaseMailer::Welcome);
    assert_eq!(email.encoded_body(), Some(&b"Welcome"[..]));
}

#[test]
fn test_body_option() {
    let email = mailer()
        .build(BaseMailer::Welcome, MailOptions::new().body("Hello there"))
        .unwrap();
    assert_eq!(email.mime_type(), "text/plain");
    assert_eq!(email.encoded_body(), Some(&b"Hello there"[..]));
}

#[test]
fn test_custom_headers() {
    let email = build(&mailer(), BaseMailer::Welcome);
    assert_eq!(email.header("X-SPAM"), Some("Not SPAM"));

    let wire = String::from_utf8(email.to_bytes()).unwrap();
    assert!(wire.contains("X-SPAM: Not SPAM\r\n"));
}

// Attachments

#[test]
fn test_attachment_with_content() {
    let email = build(&mailer(), BaseMailer::AttachmentWithContent);
    let attachments = email.attachments();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].filename(), Some("invoice.pdf"));
    assert_eq!(attachments[0].mime_type(), "application/pdf");
    assert_eq!(
        email.attachment("invoice.pdf").unwrap().decoded_body(),
        b"This is test File content"
    );
}

#[test]
fn test_attachment_with_spec() {
    let email = build(&mailer(), BaseMailer::AttachmentWithHash);
    let attachments = email.attachments();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].filename(), Some("invoice.jpg"));
    assert_eq!(attachments[0].mime_type(), "image/x-jpg");
    assert_eq!(
        email.attachment("invoice.jpg").unwrap().decoded_body(),
        b"\xCA\x8B\xAC\x9A)b"
    );
}

#[test]
fn test_rendered_template_comes_before_attachment() {
    let email = build(&mailer(), BaseMailer::AttachmentWithContent);
    assert_eq!(email.mime_type(), "multipart/mixed");
    assert_eq!(types(email.parts()), ["text/html", "application/pdf"]);
    assert_eq!(body(&email.parts()[0]), "Attachment with content");
    assert_eq!(
        body(&email.parts()[1]),
        "VGhpcyBpcyB0ZXN0IEZpbGUgY29udGVudA==\r\n"
    );
}

#[test]
fn test_body_option_comes_before_attachment() {
    let email = mailer()
        .build(
            BaseMailer::AttachmentWithContent,
            MailOptions::new().body("I'm the eggman"),
        )
        .unwrap();
    assert_eq!(email.mime_type(), "multipart/mixed");
    assert_eq!(types(email.parts()), ["text/plain", "application/pdf"]);
    assert_eq!(body(&email.parts()[0]), "I'm the eggman");
}

// Defaults

#[test]
fn test_default_charset() {
    let mut mailer = mailer();
    mailer.defaults_mut().charset = "US-ASCII".to_string();

    assert_eq!(build(&mailer, BaseMailer::Welcome).charset(), "US-ASCII");
    let email = mailer
        .build(BaseMailer::Welcome, MailOptions::new().charset("iso-8559-1"))
        .unwrap();
    assert_eq!(email.charset(), "iso-8559-1");
}

#[test]
fn test_default_content_type() {
    let mut mailer = mailer();
    mailer.defaults_mut().content_type = "text/html".to_string();

    assert_eq!(build(&mailer, BaseMailer::Welcome).mime_type(), "text/html");
    let email = mailer
        .build(BaseMailer::Welcome, MailOptions::new().content_type("text/plain"))
        .unwrap();
    assert_eq!(email.mime_type(), "text/plain");
}

#[test]
fn test_default_mime_version() {
    let mut mailer = mailer();
    mailer.defaults_mut().mime_version = "2.0".to_string();

    assert_eq!(build(&mailer, BaseMailer::Welcome).mime_version(), "2.0");
    let email = mailer
        .build(BaseMailer::Welcome, MailOptions::new().mime_version("1.0"))
        .unwrap();
    assert_eq!(email.mime_version(), "1.0");
}

#[test]
fn test_subject_from_translations() {
    let email = mailer()
        .build(BaseMailer::Welcome, MailOptions::new().without_subject())
        .unwrap();
    assert_eq!(email.subject(), Some("Welcome"));

    let mut translations = Translations::new();
    translations.store(
        "en",
        json!({"actionmailer": {"base_mailer": {"welcome": {"subject": "New Subject!"}}}}),
    );
    let email = mailer()
        .with_translator(translations)
        .build(BaseMailer::Welcome, MailOptions::new().without_subject())
        .unwrap();
    assert_eq!(email.subject(), Some("New Subject!"));
}

// Implicit multipart

#[test]
fn test_implicit_multipart() {
    let email = build(&mailer(), BaseMailer::ImplicitMultipart);
    assert_eq!(email.mime_type(), "multipart/alternative");
    assert_eq!(types(email.parts()), ["text/plain", "text/html"]);
    assert_eq!(body(&email.parts()[0]), "TEXT Implicit Multipart");
    assert_eq!(body(&email.parts()[1]), "HTML Implicit Multipart");
}

#[test]
fn test_implicit_multipart_with_sort_order() {
    let order = ["text/html", "text/plain"];
    let mut mailer = mailer();
    mailer.defaults_mut().implicit_parts_order = order.map(String::from).to_vec();

    let email = build(&mailer, BaseMailer::ImplicitMultipart);
    assert_eq!(types(email.parts()), ["text/html", "text/plain"]);

    let reversed = ["text/plain", "text/html"];
    let email = mailer
        .build(
            BaseMailer::ImplicitMultipart,
            MailOptions::new().parts_order(&reversed),
        )
        .unwrap();
    assert_eq!(types(email.parts()), ["text/plain", "text/html"]);
}

#[test]
fn test_implicit_multipart_with_attachments_nests_parts() {
    let email = mailer()
        .build(
            BaseMailer::ImplicitMultipart,
            MailOptions::new().flag("attachments"),
        )
        .unwrap();
    assert_eq!(email.mime_type(), "multipart/mixed");
    assert_eq!(
        types(email.parts()),
        ["application/pdf", "multipart/alternative"]
    );
    let nested = email.parts()[1].parts();
    assert_eq!(types(nested), ["text/plain", "text/html"]);
    assert_eq!(body(&nested[0]), "TEXT Implicit Multipart");
    assert_eq!(body(&nested[1]), "HTML Implicit Multipart");
}

#[test]
fn test_implicit_multipart_with_attachments_and_sort_order() {
    let mut mailer = mailer();
    mailer.defaults_mut().implicit_parts_order = vec!["text/html".into(), "text/plain".into()];

    let email = mailer
        .build(
            BaseMailer::ImplicitMultipart,
            MailOptions::new().flag("attachments"),
        )
        .unwrap();
    assert_eq!(
        types(email.parts()),
        ["application/pdf", "multipart/alternative"]
    );
    assert_eq!(types(email.parts()[1].parts()), ["text/html", "text/plain"]);
}

#[test]
fn test_implicit_multipart_with_default_locale() {
    let email = build(&mailer(), BaseMailer::ImplicitWithLocale);
    assert_eq!(email.mime_type(), "multipart/alternative");
    assert_eq!(types(email.parts()), ["text/plain", "text/html"]);
    assert_eq!(body(&email.parts()[0]), "Implicit with locale TEXT");
    assert_eq!(body(&email.parts()[1]), "Implicit with locale EN HTML");
}

#[test]
fn test_implicit_multipart_with_other_locale() {
    let mut mailer = mailer();
    mailer.set_locale("pl");

    let email = build(&mailer, BaseMailer::ImplicitWithLocale);
    assert_eq!(email.parts().len(), 2);
    assert_eq!(types(email.parts()), ["text/plain", "text/html"]);
    assert_eq!(body(&email.parts()[0]), "Implicit with locale PL TEXT");
    assert_eq!(body(&email.parts()[1]), "Implicit with locale HTML");
}

#[test]
fn test_first_view_path_with_template_wins() {
    let mut mailer = mailer();
    mailer.prepend_view_path(MemoryViewPath::new().with_template(
        "base_mailer",
        "welcome",
        Template::new("Welcome from another path"),
    ));

    let email = build(&mailer, BaseMailer::Welcome);
    assert_eq!(email.encoded_body(), Some(&b"Welcome from another path"[..]));
}

#[test]
fn test_view_path_without_templates_falls_through() {
    let unknown = std::env::temp_dir().join(format!("mailwright-unknown-{}", std::process::id()));
    let mut mailer = mailer();
    mailer.prepend_view_path(DirectoryViewPath::new(&unknown));

    let email = build(&mailer, BaseMailer::Welcome);
    assert_eq!(email.encoded_body(), Some(&b"Welcome"[..]));
}

#[test]
fn test_directory_view_path_templates() {
    let root = std::env::temp_dir().join(format!("mailwright-fixtures-{}", std::process::id()));
    let dir = root.join("base_mailer");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("welcome"), "Welcome from disk").unwrap();

    let mut mailer = mailer();
    mailer.prepend_view_path(DirectoryViewPath::new(&root));
    let email = build(&mailer, BaseMailer::Welcome);
    assert_eq!(email.encoded_body(), Some(&b"Welcome from disk"[..]));

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_directory_template_line_ends_on_the_wire() {
    let root = std::env::temp_dir().join(format!("mailwright-crlf-{}", std::process::id()));
    let dir = root.join("base_mailer");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("welcome"), "Hello\nfrom disk\n").unwrap();

    let mut mailer = mailer();
    mailer.prepend_view_path(DirectoryViewPath::new(&root));
    let email = build(&mailer, BaseMailer::Welcome);
    let wire = String::from_utf8(email.to_bytes()).unwrap();

    assert_eq!(email.encoded_body(), Some(&b"Hello\r\nfrom disk\r\n"[..]));
    assert!(wire.ends_with("\r\n\r\nHello\r\nfrom disk\r\n"));
    assert!(!wire.replace("\r\n", "").contains('\n'));

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_missing_template() {
    let err = Mailer::<BaseMailer>::new()
        .build(BaseMailer::ImplicitMultipart, MailOptions::new())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::MissingTemplate { ref action, format: None, .. } if action == "implicit_multipart"
    ));
}

// Explicit multipart

#[test]
fn test_explicit_multipart() {
    let email = build(&mailer(), BaseMailer::ExplicitMultipart);
    assert_eq!(email.mime_type(), "multipart/alternative");
    assert_eq!(types(email.parts()), ["text/plain", "text/html"]);
    assert_eq!(body(&email.parts()[0]), "TEXT Explicit Multipart");
    assert_eq!(body(&email.parts()[1]), "HTML Explicit Multipart");
}

#[test]
fn test_explicit_multipart_ignores_sort_order() {
    let order = ["text/html", "text/plain"];
    let mut mailer = mailer();
    mailer.defaults_mut().implicit_parts_order = order.map(String::from).to_vec();

    let email = build(&mailer, BaseMailer::ExplicitMultipart);
    assert_eq!(types(email.parts()), ["text/plain", "text/html"]);

    let email = mailer
        .build(
            BaseMailer::ExplicitMultipart,
            MailOptions::new().parts_order(&order),
        )
        .unwrap();
    assert_eq!(types(email.parts()), ["text/plain", "text/html"]);
}

#[test]
fn test_explicit_multipart_with_attachments_nests_parts() {
    let email = mailer()
        .build(
            BaseMailer::ExplicitMultipart,
            MailOptions::new().flag("attachments"),
        )
        .unwrap();
    assert_eq!(
        types(email.parts()),
        ["application/pdf", "multipart/alternative"]
    );
    let nested = email.parts()[1].parts();
    assert_eq!(types(nested), ["text/plain", "text/html"]);
    assert_eq!(body(&nested[0]), "TEXT Explicit Multipart");
}

#[test]
fn test_explicit_multipart_with_templates() {
    let email = build(&mailer(), BaseMailer::ExplicitMultipartTemplates);
    assert_eq!(email.mime_type(), "multipart/alternative");
    assert_eq!(types(email.parts()), ["text/html", "text/plain"]);
    assert_eq!(body(&email.parts()[0]), "HTML Explicit Multipart Templates");
    assert_eq!(body(&email.parts()[1]), "TEXT Explicit Multipart Templates");
}

#[test]
fn test_explicit_format_without_template() {
    let err = Mailer::<BaseMailer>::new()
        .build(BaseMailer::ExplicitMultipartTemplates, MailOptions::new())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::MissingTemplate { format: Some(ref f), .. } if f == "text/html"
    ));
}

#[test]
fn test_explicit_multipart_with_any() {
    let email = build(&mailer(), BaseMailer::ExplicitMultipartWithAny);
    assert_eq!(email.mime_type(), "multipart/alternative");
    assert_eq!(types(email.parts()), ["text/plain", "text/html"]);
    assert_eq!(body(&email.parts()[0]), "Format with any!");
    assert_eq!(body(&email.parts()[1]), "Format with any!");
}

// Action lookup and delivery

#[test]
fn test_responds_to_action_names() {
    let mailer = mailer();
    assert!(mailer.responds_to("welcome"));
    assert!(mailer.responds_to("implicit_multipart"));
    assert!(!mailer.responds_to("mail"));
    assert!(!mailer.responds_to("headers"));

    let email = mailer.build_named("welcome", MailOptions::new()).unwrap();
    assert_eq!(email.subject(), Some("The first email on new API!"));
}

#[test]
fn test_build_does_not_deliver() {
    let deliveries = TestDelivery::new();
    let mailer = mailer().with_delivery(deliveries.clone());

    let email = build(&mailer, BaseMailer::Welcome);
    assert!(deliveries.is_empty());
    assert_eq!(email.subject(), Some("The first email on new API!"));
}

#[test]
fn test_deliver_records_message_and_runs_hook_once() {
    let deliveries = TestDelivery::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut mailer = mailer().with_delivery(deliveries.clone());
    let counter = Arc::clone(&calls);
    mailer.on_delivered(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let email = mailer
        .deliver_named("welcome", MailOptions::new())
        .unwrap();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(deliveries.last().unwrap(), email);

    deliveries.clear();
    assert!(deliveries.is_empty());
}

#[test]
fn test_file_delivery() {
    let dir = std::env::temp_dir().join(format!("mailwright-deliveries-{}", std::process::id()));
    let delivery = FileDelivery::new(&dir);
    let mailer = mailer().with_delivery(delivery.clone());

    let email = mailer
        .deliver(BaseMailer::Welcome, MailOptions::new().cc("cc@test.lindsaar.net"))
        .unwrap();

    let wire = email.to_bytes();
    assert_eq!(fs::read(delivery.mailbox("mikel@test.lindsaar.net")).unwrap(), wire);
    assert_eq!(fs::read(delivery.mailbox("cc@test.lindsaar.net")).unwrap(), wire);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_wire_form_of_nested_message() {
    let email = mailer()
        .build(
            BaseMailer::ImplicitMultipart,
            MailOptions::new().flag("attachments"),
        )
        .unwrap();
    let wire = String::from_utf8(email.to_bytes()).unwrap();

    assert!(wire.contains("Content-Type: multipart/mixed; boundary="));
    assert!(wire.contains("Content-Type: multipart/alternative; boundary="));
    assert!(wire.contains("Content-Disposition: attachment; filename=\"invoice.pdf\"\r\n"));
    assert!(wire.contains("VGhpcyBpcyB0ZXN0IEZpbGUgY29udGVudA==\r\n"));
    assert!(!wire.contains("Bcc:"));
}
