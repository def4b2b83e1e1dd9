//! RSS and sitemap rendering.
//!
//! Output is built directly as strings; every interpolated value goes
//! through [`xml_escape`].

use std::fmt::Write;

use crate::domain::Post;
use crate::domain::text::excerpt;

/// Cache keys for rendered documents share this prefix.
pub const FEED_CACHE_PREFIX: &str = "feed:";
/// Number of posts in the RSS feed.
pub const FEED_SIZE: u64 = 5;
/// Words kept in each feed item description.
pub const FEED_EXCERPT_WORDS: usize = 30;

pub const SITEMAP_CHANGEFREQ: &str = "weekly";
pub const SITEMAP_PRIORITY: &str = "0.9";

/// Channel-level metadata for the RSS feed.
#[derive(Debug, Clone)]
pub struct FeedChannel {
    pub title: String,
    /// Site root without a trailing slash, e.g. `https://blog.example`.
    pub link: String,
    pub description: String,
}

impl FeedChannel {
    pub fn new(title: &str, link: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            link: link.trim_end_matches('/').to_string(),
            description: description.to_string(),
        }
    }

    pub fn url_for(&self, post: &Post) -> String {
        format!("{}{}", self.link, post.permalink())
    }
}

pub fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// RSS 2.0 document for `posts`, which are expected newest first.
pub fn render_rss(channel: &FeedChannel, posts: &[Post]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    xml.push_str(r#"<rss version="2.0"><channel>"#);
    let _ = write!(
        xml,
        "<title>{}</title><link>{}/</link><description>{}</description>",
        xml_escape(&channel.title),
        xml_escape(&channel.link),
        xml_escape(&channel.description),
    );
    if let Some(latest) = posts.iter().map(|p| p.publish_at).max() {
        let _ = write!(xml, "<lastBuildDate>{}</lastBuildDate>", latest.to_rfc2822());
    }

    for post in posts {
        let url = xml_escape(&channel.url_for(post));
        let _ = write!(
            xml,
            "<item><title>{}</title><link>{url}</link><description>{}</description>\
             <pubDate>{}</pubDate><guid>{url}</guid></item>",
            xml_escape(&post.title),
            xml_escape(&excerpt(&post.body, FEED_EXCERPT_WORDS)),
            post.publish_at.to_rfc2822(),
        );
    }

    xml.push_str("</channel></rss>");
    xml
}

/// Sitemap listing every post in `posts`.
pub fn render_sitemap(channel: &FeedChannel, posts: &[Post]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    for post in posts {
        let _ = write!(
            xml,
            "<url><loc>{}</loc><lastmod>{}</lastmod><changefreq>{SITEMAP_CHANGEFREQ}</changefreq>\
             <priority>{SITEMAP_PRIORITY}</priority></url>",
            xml_escape(&channel.url_for(post)),
            post.updated_at.format("%Y-%m-%d"),
        );
    }
    xml.push_str("</urlset>");
    xml
}
