use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeFrequency::Always => "always",
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
            ChangeFrequency::Never => "never",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// Absolute URL.
    pub loc: String,
    pub lastmod: DateTime<Utc>,
    pub changefreq: ChangeFrequency,
    pub priority: f32,
}

/// Paths kept out of the sitemap and disallowed for crawlers.
pub const PRIVATE_PATHS: &[&str] = &["/api/", "/dashboard/", "/login", "/register"];

/// Public pages served by the application: the home page daily at top
/// priority, the demo page weekly.
pub fn server_sitemap_entries(site: &SiteConfig, now: DateTime<Utc>) -> Vec<SitemapEntry> {
    vec![
        SitemapEntry {
            loc: site.url.trim_end_matches('/').to_string(),
            lastmod: now,
            changefreq: ChangeFrequency::Daily,
            priority: 1.0,
        },
        SitemapEntry {
            loc: site.absolute("/demo"),
            lastmod: now,
            changefreq: ChangeFrequency::Weekly,
            priority: 0.8,
        },
    ]
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
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

/// Render a `urlset` document per the sitemaps.org 0.9 schema.
pub fn render_sitemap(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str(&format!(
            "<url><loc>{}</loc><lastmod>{}</lastmod><changefreq>{}</changefreq><priority>{:.1}</priority></url>\n",
            escape_xml(&entry.loc),
            entry.lastmod.to_rfc3339_opts(SecondsFormat::Millis, true),
            entry.changefreq,
            entry.priority,
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

/// `robots.txt` allowing everything but [`PRIVATE_PATHS`], pointing at both sitemaps.
pub fn robots_txt(site: &SiteConfig) -> String {
    let mut txt = String::from("User-agent: *\nAllow: /\n");
    for path in PRIVATE_PATHS {
        txt.push_str(&format!("Disallow: {}\n", path));
    }
    txt.push_str(&format!("\nHost: {}\n", site.url.trim_end_matches('/')));
    txt.push_str(&format!("Sitemap: {}\n", site.absolute("/sitemap.xml")));
    txt.push_str(&format!("Sitemap: {}\n", site.absolute("/server-sitemap.xml")));
    txt
}
