use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;

pub const OG_IMAGE_WIDTH: u32 = 1200;
pub const OG_IMAGE_HEIGHT: u32 = 630;
const DEFAULT_OG_IMAGE_PATH: &str = "/og-image.png";
const TWITTER_CARD: &str = "summary_large_image";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OpenGraphType {
    #[default]
    Website,
    Article,
}

/// Open Graph overrides; anything missing falls back to the page title and description.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenGraphInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<OpenGraphType>,
}

/// Twitter overrides; missing values fall back to Open Graph, then to the page.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TwitterInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsInput {
    pub index: Option<bool>,
    pub follow: Option<bool>,
    pub noarchive: Option<bool>,
    pub nosnippet: Option<bool>,
    pub noimageindex: Option<bool>,
}

/// What a page states about itself.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SeoInput {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Site-relative canonical path, e.g. `/demo`.
    pub canonical: Option<String>,
    pub open_graph: Option<OpenGraphInput>,
    pub twitter: Option<TwitterInput>,
    pub robots: Option<RobotsInput>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Alternates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OpenGraphImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub alt: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: OpenGraphType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<OpenGraphImage>,
    pub site_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TwitterCard {
    pub card: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GoogleBot {
    pub index: bool,
    pub follow: bool,
    #[serde(rename = "max-video-preview")]
    pub max_video_preview: i32,
    #[serde(rename = "max-image-preview")]
    pub max_image_preview: String,
    #[serde(rename = "max-snippet")]
    pub max_snippet: i32,
}

impl GoogleBot {
    fn new(index: bool, follow: bool) -> Self {
        GoogleBot {
            index,
            follow,
            max_video_preview: -1,
            max_image_preview: "large".to_string(),
            max_snippet: -1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Robots {
    pub index: bool,
    pub follow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noarchive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nosnippet: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noimageindex: Option<bool>,
    pub google_bot: GoogleBot,
}

/// Resolved page metadata, ready to be turned into `<meta>` tags.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    pub alternates: Alternates,
    pub open_graph: OpenGraph,
    pub twitter: TwitterCard,
    pub robots: Robots,
}

/// Options for [`page_metadata`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOptions {
    #[serde(default)]
    pub keywords: Vec<String>,
    pub image: Option<String>,
    pub kind: Option<OpenGraphType>,
    #[serde(default)]
    pub noindex: bool,
}

/// Blank strings count as missing, so an empty override does not hide its fallback.
fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

/// Resolve page metadata. Twitter values fall back to Open Graph and then to
/// the page itself; robots default to index and follow.
pub fn seo_metadata(site: &SiteConfig, input: &SeoInput) -> PageMetadata {
    let og = input.open_graph.clone().unwrap_or_default();
    let tw = input.twitter.clone().unwrap_or_default();
    let robots = input.robots.clone().unwrap_or_default();

    let canonical = present(input.canonical.as_ref()).map(|path| site.absolute(path));
    let og_title = present(og.title.as_ref()).unwrap_or(&input.title).to_string();
    let og_description = present(og.description.as_ref())
        .unwrap_or(&input.description)
        .to_string();
    let og_image = present(og.image.as_ref());

    let index = robots.index.unwrap_or(true);
    let follow = robots.follow.unwrap_or(true);

    PageMetadata {
        title: input.title.clone(),
        description: input.description.clone(),
        keywords: input.keywords.clone(),
        open_graph: OpenGraph {
            title: og_title.clone(),
            description: og_description.clone(),
            url: canonical.clone().unwrap_or_else(|| site.url.clone()),
            kind: og.kind.unwrap_or_default(),
            images: og_image
                .map(|url| OpenGraphImage {
                    url: url.to_string(),
                    width: OG_IMAGE_WIDTH,
                    height: OG_IMAGE_HEIGHT,
                    alt: og_title.clone(),
                })
                .into_iter()
                .collect(),
            site_name: site.name.clone(),
        },
        twitter: TwitterCard {
            card: TWITTER_CARD.to_string(),
            title: present(tw.title.as_ref()).unwrap_or(&og_title).to_string(),
            description: present(tw.description.as_ref())
                .unwrap_or(&og_description)
                .to_string(),
            images: present(tw.image.as_ref())
                .or(og_image)
                .map(str::to_string)
                .into_iter()
                .collect(),
            creator: site.twitter_creator.clone(),
        },
        robots: Robots {
            index,
            follow,
            noarchive: robots.noarchive,
            nosnippet: robots.nosnippet,
            noimageindex: robots.noimageindex,
            google_bot: GoogleBot::new(index, follow),
        },
        alternates: Alternates { canonical },
    }
}

/// Metadata for a page at `path`: canonical URL always set, the site's default
/// social image unless one is given, and `noindex` switching off both robots flags.
pub fn page_metadata(
    site: &SiteConfig,
    title: &str,
    description: &str,
    path: &str,
    options: &PageOptions,
) -> PageMetadata {
    let url = site.absolute(path);
    let image = options
        .image
        .clone()
        .unwrap_or_else(|| site.absolute(DEFAULT_OG_IMAGE_PATH));
    let indexable = !options.noindex;

    PageMetadata {
        title: title.to_string(),
        description: description.to_string(),
        keywords: options.keywords.clone(),
        alternates: Alternates {
            canonical: Some(url.clone()),
        },
        open_graph: OpenGraph {
            title: title.to_string(),
            description: description.to_string(),
            url,
            kind: options.kind.unwrap_or_default(),
            images: vec![OpenGraphImage {
                url: image.clone(),
                width: OG_IMAGE_WIDTH,
                height: OG_IMAGE_HEIGHT,
                alt: title.to_string(),
            }],
            site_name: site.name.clone(),
        },
        twitter: TwitterCard {
            card: TWITTER_CARD.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            images: vec![image],
            creator: site.twitter_creator.clone(),
        },
        robots: Robots {
            index: indexable,
            follow: indexable,
            noarchive: None,
            nosnippet: None,
            noimageindex: None,
            google_bot: GoogleBot::new(indexable, indexable),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig {
            url: "https://example.org".into(),
            name: "Example".into(),
            twitter_creator: Some("@example".into()),
        }
    }

    fn input() -> SeoInput {
        SeoInput {
            title: "Page".into(),
            description: "About the page".into(),
            ..SeoInput::default()
        }
    }

    #[test]
    fn bare_input_falls_back_to_page_and_site() {
        let meta = seo_metadata(&site(), &input());

        assert_eq!(meta.alternates.canonical, None);
        assert_eq!(meta.open_graph.title, "Page");
        assert_eq!(meta.open_graph.url, "https://example.org");
        assert_eq!(meta.open_graph.kind, OpenGraphType::Website);
        assert!(meta.open_graph.images.is_empty());
        assert_eq!(meta.open_graph.site_name, "Example");
        assert_eq!(meta.twitter.title, "Page");
        assert_eq!(meta.twitter.description, "About the page");
        assert!(meta.twitter.images.is_empty());
        assert!(meta.robots.index && meta.robots.follow);
        assert!(meta.robots.google_bot.index);
    }

    #[test]
    fn twitter_falls_back_to_open_graph_before_page() {
        let mut page = input();
        page.canonical = Some("/demo".into());
        page.open_graph = Some(OpenGraphInput {
            title: Some("OG title".into()),
            description: None,
            image: Some("https://cdn.example.org/og.png".into()),
            kind: Some(OpenGraphType::Article),
        });
        page.twitter = Some(TwitterInput {
            description: Some("Tweet text".into()),
            ..TwitterInput::default()
        });

        let meta = seo_metadata(&site(), &page);
        assert_eq!(meta.alternates.canonical.as_deref(), Some("https://example.org/demo"));
        assert_eq!(meta.open_graph.url, "https://example.org/demo");
        assert_eq!(meta.open_graph.description, "About the page");
        assert_eq!(meta.open_graph.images[0].alt, "OG title");
        assert_eq!(meta.twitter.title, "OG title");
        assert_eq!(meta.twitter.description, "Tweet text");
        assert_eq!(meta.twitter.images, vec!["https://cdn.example.org/og.png"]);
    }

    #[test]
    fn empty_override_does_not_hide_fallback() {
        let mut page = input();
        page.twitter = Some(TwitterInput {
            title: Some(String::new()),
            ..TwitterInput::default()
        });
        assert_eq!(seo_metadata(&site(), &page).twitter.title, "Page");
    }

    #[test]
    fn robots_overrides_reach_google_bot() {
        let mut page = input();
        page.robots = Some(RobotsInput {
            index: Some(false),
            noarchive: Some(true),
            ..RobotsInput::default()
        });
        let meta = seo_metadata(&site(), &page);
        assert!(!meta.robots.index);
        assert!(meta.robots.follow);
        assert_eq!(meta.robots.noarchive, Some(true));
        assert!(!meta.robots.google_bot.index);

        let value = serde_json::to_value(&meta.robots).unwrap();
        assert_eq!(value["googleBot"]["max-image-preview"], "large");
        assert_eq!(value["googleBot"]["max-snippet"], -1);
        assert!(value.get("nosnippet").is_none());
    }

    #[test]
    fn page_metadata_uses_default_image_and_noindex() {
        let options = PageOptions {
            noindex: true,
            ..PageOptions::default()
        };
        let meta = page_metadata(&site(), "Dashboard", "Your account", "/dashboard", &options);

        assert_eq!(meta.alternates.canonical.as_deref(), Some("https://example.org/dashboard"));
        assert_eq!(meta.open_graph.images[0].url, "https://example.org/og-image.png");
        assert_eq!(meta.twitter.images, vec!["https://example.org/og-image.png"]);
        assert!(!meta.robots.index && !meta.robots.follow);
        assert_eq!(meta.twitter.creator.as_deref(), Some("@example"));
    }
}
