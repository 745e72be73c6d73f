//! Stateless classifiers for the rescue pipeline.
//!
//! Every function here is pure: patterns are compiled once and only used
//! through non-mutating `Regex` calls, so concurrent callers never share
//! match state.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;

use crate::core::error::{AppError, Result};
use crate::features::rescue::models::{AttachmentInfo, ResourceKind};
use crate::modules::discord::{PlatformAttachment, PlatformMessage};

/// Messages shorter than this never pass the gate without attachments
const MIN_GATE_CHARS: usize = 10;
/// Long-form threshold for the gate
const LONG_FORM_CHARS: usize = 200;
const MIN_CODE_LINES: usize = 5;
const MIN_CODE_CHARS: usize = 100;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx"];
const FILE_EXTENSIONS: &[&str] = &[
    // archives
    "zip", "rar", "7z", "tar", "tar.gz", "tgz",
    // data
    "json", "xml", "csv", "yaml", "yml", "toml", "sql",
    // code
    "py", "js", "ts", "java", "cpp", "c", "h", "cs", "go", "rs", "rb", "php", "html", "css",
    "sh", "kt", "swift",
    // text
    "md", "txt",
    // media
    "mp3", "wav", "mp4", "webm", "mov",
];

lazy_static! {
    static ref CODE_BLOCK: Regex = Regex::new(r"```(?:(\w+)\n)?([\s\S]*?)```").unwrap();

    static ref LINK: Regex =
        Regex::new(r"https?://[\w\-.]+\.\w+(?:/[\w\-./?&=#%+~:@]*)?").unwrap();

    static ref SOURCE_HOSTING: Regex = Regex::new(
        r"(?i)^https?://(?:www\.)?(?:github\.com|gitlab\.com|bitbucket\.org|codeberg\.org)/[\w\-.]+/[\w\-.]+"
    )
    .unwrap();

    static ref DOCUMENTATION: Regex = Regex::new(
        r"(?i)^https?://(?:(?:docs|documentation|wiki|developer)\.[\w\-.]*\w|[\w\-]+\.readthedocs\.io)(?:[/?#]|$)"
    )
    .unwrap();

    static ref TUTORIAL: Regex = Regex::new(
        r"(?i)^https?://(?:www\.)?(?:tutorial|learn|course|guide)[\w\-.]*\.\w+"
    )
    .unwrap();

    static ref QUESTION_ANSWER: Regex = Regex::new(
        r"(?i)^https?://(?:[\w\-]+\.)?(?:stackoverflow\.com|stackexchange\.com|serverfault\.com|superuser\.com)/[\w\-./]*\d+"
    )
    .unwrap();

    static ref VIDEO: Regex = Regex::new(
        r"(?i)^https?://(?:www\.|m\.)?(?:youtube\.com/watch\?v=|youtu\.be/)[\w\-]+"
    )
    .unwrap();

    /// Invite and promo markers inside a URL
    static ref LINK_SPAM: Regex = Regex::new(
        r"(?i)(?:discord\.gg/|discord(?:app)?\.com/invite|\binvite\b|\bjoin\b|\bnitro\b|\bfree\b|click[-_ ]?here|amazing[-_ ]?deal)"
    )
    .unwrap();

    /// Invite and promo markers in free text
    static ref CONTENT_SPAM: Regex = Regex::new(
        r"(?i)(?:discord\.gg/|\binvite\b|\bjoin\b|\bserver\b|\bnitro\b|\bfree\b|click here|amazing deal)"
    )
    .unwrap();
}

/// Which curated domain family a link belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkCategory {
    SourceHosting,
    Documentation,
    Tutorial,
    QuestionAnswer,
    Video,
}

impl LinkCategory {
    /// Video links are rescued but do not make a live message valuable on their own.
    fn counts_toward_gate(self) -> bool {
        !matches!(self, LinkCategory::Video)
    }
}

/// Fast gate for live messages.
pub fn has_valuable_content(content: &str, has_attachments: bool) -> bool {
    if has_attachments {
        return true;
    }

    let length = content.chars().count();
    if length < MIN_GATE_CHARS {
        return false;
    }

    if CODE_BLOCK.is_match(content) {
        return true;
    }

    if extract_links(content)
        .filter_map(classify_link)
        .any(LinkCategory::counts_toward_gate)
    {
        return true;
    }

    length > LONG_FORM_CHARS && !CONTENT_SPAM.is_match(content)
}

/// Runs the four classifiers in order: attachments, links, code blocks, pin.
pub fn classify_message(message: &PlatformMessage) -> Result<Vec<ResourceKind>> {
    let mut found = Vec::new();

    for attachment in &message.attachments {
        if let Some(kind) = classify_attachment(attachment)? {
            found.push(kind);
        }
    }

    found.extend(classify_links(&message.content)?);
    found.extend(classify_code_blocks(&message.content));

    if message.pinned {
        found.push(ResourceKind::Pin {
            content: pin_content(message),
        });
    }

    Ok(found)
}

/// Message text, or the attachment names when a pin carries no text
fn pin_content(message: &PlatformMessage) -> String {
    if !message.content.trim().is_empty() {
        return message.content.clone();
    }
    message
        .attachments
        .iter()
        .map(|a| a.filename.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Maps an attachment to FILE/IMAGE/DOCUMENT, or `None` when off the allow-list.
pub fn classify_attachment(attachment: &PlatformAttachment) -> Result<Option<ResourceKind>> {
    let Some(extension) = file_extension(&attachment.filename) else {
        return Ok(None);
    };

    let ext = extension.as_str();
    let is_image = IMAGE_EXTENSIONS.contains(&ext);
    let is_document = DOCUMENT_EXTENSIONS.contains(&ext);
    if !is_image && !is_document && !FILE_EXTENSIONS.contains(&ext) {
        return Ok(None);
    }

    Url::parse(&attachment.url).map_err(|e| {
        AppError::ExtractionFailure(format!(
            "Attachment {} has an invalid url: {}",
            attachment.id, e
        ))
    })?;

    let info = AttachmentInfo {
        url: attachment.url.clone(),
        file_name: attachment.filename.clone(),
        file_size: attachment.size,
        extension,
    };

    Ok(Some(if is_image {
        ResourceKind::Image(info)
    } else if is_document {
        ResourceKind::Document(info)
    } else {
        ResourceKind::File(info)
    }))
}

/// Lowercased extension without the dot; compound `tar.gz` is kept whole.
pub fn file_extension(file_name: &str) -> Option<String> {
    let lower = file_name.trim().to_lowercase();
    if lower.ends_with(".tar.gz") && lower.len() > ".tar.gz".len() {
        return Some("tar.gz".to_string());
    }

    match lower.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_string()),
        _ => None,
    }
}

pub fn extract_links(content: &str) -> impl Iterator<Item = &str> {
    LINK.find_iter(content)
        .map(|m| m.as_str().trim_end_matches(['.', ':']))
}

/// `None` for spam/invite links and links outside the curated families.
pub fn classify_link(url: &str) -> Option<LinkCategory> {
    if LINK_SPAM.is_match(url) {
        return None;
    }

    if SOURCE_HOSTING.is_match(url) {
        Some(LinkCategory::SourceHosting)
    } else if DOCUMENTATION.is_match(url) {
        Some(LinkCategory::Documentation)
    } else if TUTORIAL.is_match(url) {
        Some(LinkCategory::Tutorial)
    } else if QUESTION_ANSWER.is_match(url) {
        Some(LinkCategory::QuestionAnswer)
    } else if VIDEO.is_match(url) {
        Some(LinkCategory::Video)
    } else {
        None
    }
}

/// Hostname with any leading `www.` removed
pub fn link_domain(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|e| AppError::ExtractionFailure(format!("Invalid link {}: {}", url, e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| AppError::ExtractionFailure(format!("Link {} has no host", url)))?;
    Ok(host.trim_start_matches("www.").to_string())
}

pub fn classify_links(content: &str) -> Result<Vec<ResourceKind>> {
    extract_links(content)
        .filter(|url| classify_link(url).is_some())
        .map(|url| {
            Ok(ResourceKind::Link {
                url: url.to_string(),
                domain: link_domain(url)?,
            })
        })
        .collect()
}

/// Fenced blocks with at least five lines or more than 100 characters.
pub fn classify_code_blocks(content: &str) -> Vec<ResourceKind> {
    CODE_BLOCK
        .captures_iter(content)
        .filter_map(|caps| {
            let code = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
            let lines = code.lines().count();
            if lines < MIN_CODE_LINES && code.chars().count() <= MIN_CODE_CHARS {
                return None;
            }

            let language = caps
                .get(1)
                .map(|m| m.as_str().to_lowercase())
                .unwrap_or_else(|| "unknown".to_string());

            Some(ResourceKind::Code {
                content: code.to_string(),
                language,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::discord::MessageAuthor;
    use chrono::Utc;

    fn message(content: &str) -> PlatformMessage {
        PlatformMessage {
            id: "1".to_string(),
            author: MessageAuthor {
                id: "10".to_string(),
                username: "grace".to_string(),
                global_name: None,
            },
            content: content.to_string(),
            timestamp: Utc::now(),
            pinned: false,
            attachments: vec![],
        }
    }

    fn attachment(name: &str) -> PlatformAttachment {
        PlatformAttachment {
            id: "a1".to_string(),
            filename: name.to_string(),
            url: format!("https://cdn.discordapp.com/attachments/1/2/{}", name),
            size: 1024,
        }
    }

    #[test]
    fn test_gate_short_content() {
        assert!(!has_valuable_content("hi", false));
        assert!(!has_valuable_content("", false));
        assert!(has_valuable_content("", true));
        assert!(has_valuable_content("hi", true));
    }

    #[test]
    fn test_gate_valuable_links_and_code() {
        assert!(has_valuable_content(
            "see https://github.com/tokio-rs/tokio for details",
            false
        ));
        assert!(has_valuable_content(
            "docs at https://docs.rs/serde/latest/serde/",
            false
        ));
        assert!(has_valuable_content("```rust\nfn main() {}\n```", false));
        assert!(!has_valuable_content(
            "watch https://youtu.be/dQw4w9WgXcQ",
            false
        ));
        assert!(!has_valuable_content("just chatting about lunch", false));
    }

    #[test]
    fn test_gate_long_form_excludes_spam() {
        let essay = "a thoughtful explanation of ownership ".repeat(8);
        assert!(has_valuable_content(&essay, false));

        let promo = format!("{} click here for a free gift", essay);
        assert!(!has_valuable_content(&promo, false));
    }

    #[test]
    fn test_four_line_block_is_rejected() {
        let content = "```python\na = 1\nb = 2\nc = 3\nd = 4\n```";
        assert!(classify_code_blocks(content).is_empty());
    }

    #[test]
    fn test_blank_lines_count_toward_block_length() {
        let content = "```\na = 1\n\nc = 3\nd = 4\ne = 5\n```";
        let found = classify_code_blocks(content);
        assert_eq!(found.len(), 1);
        assert!(matches!(&found[0], ResourceKind::Code { content, .. } if content.contains("\n\n")));
    }

    #[test]
    fn test_five_line_block_is_tagged_with_language() {
        let content = "```Python\na = 1\nb = 2\nc = 3\nd = 4\ne = 5\n```";
        let found = classify_code_blocks(content);
        assert_eq!(found.len(), 1);
        match &found[0] {
            ResourceKind::Code { content, language } => {
                assert_eq!(language, "python");
                assert!(content.starts_with("a = 1"));
                assert!(content.ends_with("e = 5"));
            }
            other => panic!("expected code, got {:?}", other),
        }
    }

    #[test]
    fn test_long_single_line_block_defaults_to_unknown() {
        let content = format!("```\n{}\n```", "x".repeat(120));
        let found = classify_code_blocks(&content);
        assert_eq!(
            found,
            vec![ResourceKind::Code {
                content: "x".repeat(120),
                language: "unknown".to_string()
            }]
        );
    }

    #[test]
    fn test_link_classification() {
        assert_eq!(
            classify_link("https://github.com/rust-lang/rust/issues/1"),
            Some(LinkCategory::SourceHosting)
        );
        assert_eq!(
            classify_link("https://wiki.archlinux.org/title/Systemd"),
            Some(LinkCategory::Documentation)
        );
        assert_eq!(
            classify_link("https://learn.microsoft.com/en-us/azure"),
            Some(LinkCategory::Tutorial)
        );
        assert_eq!(
            classify_link("https://serverfault.com/questions/12345/nginx"),
            Some(LinkCategory::QuestionAnswer)
        );
        assert_eq!(
            classify_link("https://www.youtube.com/watch?v=abc123"),
            Some(LinkCategory::Video)
        );
        assert_eq!(classify_link("https://example.com/blog"), None);
    }

    #[test]
    fn test_invite_links_are_discarded() {
        assert_eq!(classify_link("https://discord.gg/abcdef"), None);
        assert_eq!(
            classify_link("https://github.com/someone/free-nitro"),
            None
        );
        assert!(classify_links("join us https://discord.gg/xyz")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_links_carry_domain_without_www() {
        let found =
            classify_links("read https://www.github.com/serde-rs/json. and thanks").unwrap();
        assert_eq!(
            found,
            vec![ResourceKind::Link {
                url: "https://www.github.com/serde-rs/json".to_string(),
                domain: "github.com".to_string(),
            }]
        );
    }

    #[test]
    fn test_attachment_types() {
        assert!(matches!(
            classify_attachment(&attachment("report.PDF")).unwrap(),
            Some(ResourceKind::Document(ref a)) if a.extension == "pdf"
        ));
        assert!(matches!(
            classify_attachment(&attachment("diagram.png")).unwrap(),
            Some(ResourceKind::Image(_))
        ));
        assert!(matches!(
            classify_attachment(&attachment("backup.tar.gz")).unwrap(),
            Some(ResourceKind::File(ref a)) if a.extension == "tar.gz"
        ));
        assert!(classify_attachment(&attachment("setup.exe")).unwrap().is_none());
        assert!(classify_attachment(&attachment("README")).unwrap().is_none());
    }

    #[test]
    fn test_invalid_attachment_url_is_extraction_failure() {
        let mut bad = attachment("notes.md");
        bad.url = "not a url".to_string();
        assert!(matches!(
            classify_attachment(&bad),
            Err(AppError::ExtractionFailure(_))
        ));
    }

    #[test]
    fn test_pipeline_order_and_pin() {
        let mut msg = message(
            "pinned guide https://docs.python.org/3/library/asyncio.html\n```py\n1\n2\n3\n4\n5\n```",
        );
        msg.pinned = true;
        msg.attachments.push(attachment("slides.pptx"));

        let kinds: Vec<_> = classify_message(&msg)
            .unwrap()
            .iter()
            .map(|k| k.resource_type())
            .collect();

        use crate::features::rescue::models::ResourceType::*;
        assert_eq!(kinds, vec![Document, Link, Code, Pin]);
    }

    #[test]
    fn test_pinned_attachment_without_text_still_pins() {
        let mut msg = message("");
        msg.pinned = true;
        msg.attachments.push(attachment("diagram.png"));
        msg.attachments.push(attachment("notes.pdf"));

        let kinds = classify_message(&msg).unwrap();

        assert_eq!(kinds.len(), 3);
        match &kinds[2] {
            ResourceKind::Pin { content } => assert_eq!(content, "diagram.png, notes.pdf"),
            other => panic!("expected pin, got {:?}", other),
        }
    }

    #[test]
    fn test_file_extension_edge_cases() {
        assert_eq!(file_extension("a.JSON"), Some("json".to_string()));
        assert_eq!(file_extension(".bashrc"), None);
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension("x.tar.gz"), Some("tar.gz".to_string()));
    }
}
