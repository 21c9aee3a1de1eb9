//! schema.org structured data builders.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::SiteConfig;

const CONTEXT: &str = "https://schema.org";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HowToStep {
    pub name: String,
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub name: String,
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub headline: String,
    pub description: String,
    pub author: String,
    pub date_published: String,
    pub date_modified: Option<String>,
    pub image: Option<String>,
    pub url: String,
}

/// Contact details published with the organization schema.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Organization {
    pub name: String,
    #[serde(default)]
    pub same_as: Vec<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
}

pub fn organization_schema(site: &SiteConfig, org: &Organization) -> Value {
    let mut schema = json!({
        "@context": CONTEXT,
        "@type": "Organization",
        "name": org.name,
        "url": site.url,
        "logo": site.absolute("/logo.png"),
        "sameAs": org.same_as,
    });
    if org.telephone.is_some() || org.email.is_some() {
        schema["contactPoint"] = json!({
            "@type": "ContactPoint",
            "telephone": org.telephone,
            "contactType": "customer service",
            "email": org.email,
        });
    }
    schema
}

pub fn website_schema(site: &SiteConfig, description: &str) -> Value {
    json!({
        "@context": CONTEXT,
        "@type": "WebSite",
        "name": site.name,
        "url": site.url,
        "description": description,
        "potentialAction": {
            "@type": "SearchAction",
            "target": {
                "@type": "EntryPoint",
                "urlTemplate": site.absolute("/search?q={search_term_string}"),
            },
            "query-input": "required name=search_term_string",
        },
    })
}

pub fn web_application_schema(site: &SiteConfig, description: &str, author: &str) -> Value {
    json!({
        "@context": CONTEXT,
        "@type": "WebApplication",
        "name": site.name,
        "url": site.url,
        "description": description,
        "applicationCategory": "WebApplication",
        "operatingSystem": "Web Browser",
        "browserRequirements": "Requires JavaScript. Requires HTML5.",
        "screenshot": site.absolute("/screenshot.png"),
        "offers": {"@type": "Offer", "price": "0", "priceCurrency": "USD"},
        "author": {"@type": "Person", "name": author},
    })
}

/// Positions are 1-based, in the order given.
pub fn breadcrumb_schema(items: &[Breadcrumb]) -> Value {
    let elements: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": item.name,
                "item": item.url,
            })
        })
        .collect();
    json!({
        "@context": CONTEXT,
        "@type": "BreadcrumbList",
        "itemListElement": elements,
    })
}

/// `dateModified` defaults to `datePublished`, the image to the site's social image.
pub fn article_schema(site: &SiteConfig, publisher: &str, article: &Article) -> Value {
    json!({
        "@context": CONTEXT,
        "@type": "Article",
        "headline": article.headline,
        "description": article.description,
        "author": {"@type": "Person", "name": article.author},
        "datePublished": article.date_published,
        "dateModified": article.date_modified.as_deref().unwrap_or(&article.date_published),
        "image": article.image.clone().unwrap_or_else(|| site.absolute("/og-image.png")),
        "url": article.url,
        "publisher": {
            "@type": "Organization",
            "name": publisher,
            "logo": {"@type": "ImageObject", "url": site.absolute("/logo.png")},
        },
    })
}

pub fn faq_schema(faqs: &[Faq]) -> Value {
    let questions: Vec<Value> = faqs
        .iter()
        .map(|faq| {
            json!({
                "@type": "Question",
                "name": faq.question,
                "acceptedAnswer": {"@type": "Answer", "text": faq.answer},
            })
        })
        .collect();
    json!({
        "@context": CONTEXT,
        "@type": "FAQPage",
        "mainEntity": questions,
    })
}

pub fn how_to_schema(name: &str, description: &str, steps: &[HowToStep]) -> Value {
    let steps: Vec<Value> = steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            json!({
                "@type": "HowToStep",
                "position": i + 1,
                "name": step.name,
                "text": step.text,
            })
        })
        .collect();
    json!({
        "@context": CONTEXT,
        "@type": "HowTo",
        "name": name,
        "description": description,
        "step": steps,
    })
}

/// Embed structured data in a `<script type="application/ld+json">` tag.
/// `<` is escaped so string values cannot close the tag.
pub fn script_tag(data: &Value) -> String {
    format!(
        r#"<script type="application/ld+json">{}</script>"#,
        data.to_string().replace('<', "\\u003c")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig {
            url: "https://example.org".into(),
            name: "Example".into(),
            twitter_creator: None,
        }
    }

    #[test]
    fn breadcrumbs_are_numbered_from_one() {
        let schema = breadcrumb_schema(&[
            Breadcrumb {
                name: "Home".into(),
                url: "https://example.org".into(),
            },
            Breadcrumb {
                name: "Demo".into(),
                url: "https://example.org/demo".into(),
            },
        ]);
        assert_eq!(schema["@type"], "BreadcrumbList");
        assert_eq!(schema["itemListElement"][0]["position"], 1);
        assert_eq!(schema["itemListElement"][1]["position"], 2);
        assert_eq!(schema["itemListElement"][1]["item"], "https://example.org/demo");
    }

    #[test]
    fn article_defaults_modified_date_and_image() {
        let article = Article {
            headline: "Launch".into(),
            description: "We launched".into(),
            author: "Ada".into(),
            date_published: "2026-01-01".into(),
            date_modified: None,
            image: None,
            url: "https://example.org/blog/launch".into(),
        };
        let schema = article_schema(&site(), "Example Inc", &article);
        assert_eq!(schema["dateModified"], "2026-01-01");
        assert_eq!(schema["image"], "https://example.org/og-image.png");
        assert_eq!(schema["publisher"]["logo"]["url"], "https://example.org/logo.png");
    }

    #[test]
    fn faq_and_how_to_shapes() {
        let faq = faq_schema(&[Faq {
            question: "Is it free?".into(),
            answer: "Yes".into(),
        }]);
        assert_eq!(faq["mainEntity"][0]["acceptedAnswer"]["text"], "Yes");

        let how_to = how_to_schema(
            "Sign up",
            "Create an account",
            &[HowToStep {
                name: "Register".into(),
                text: "Fill the form".into(),
            }],
        );
        assert_eq!(how_to["step"][0]["@type"], "HowToStep");
        assert_eq!(how_to["step"][0]["position"], 1);
    }

    #[test]
    fn organization_contact_point_only_when_known() {
        let bare = organization_schema(&site(), &Organization {
            name: "Example Inc".into(),
            ..Organization::default()
        });
        assert!(bare.get("contactPoint").is_none());

        let with_contact = organization_schema(&site(), &Organization {
            name: "Example Inc".into(),
            email: Some("support@example.org".into()),
            ..Organization::default()
        });
        assert_eq!(with_contact["contactPoint"]["email"], "support@example.org");
    }

    #[test]
    fn script_tag_cannot_be_closed_early() {
        let tag = script_tag(&json!({"name": "</script><b>"}));
        assert!(tag.starts_with(r#"<script type="application/ld+json">"#));
        assert_eq!(tag.matches("</script>").count(), 1);
        assert!(tag.contains("\\u003c/script>"));
    }

    #[test]
    fn website_search_action_targets_site() {
        let schema = website_schema(&site(), "Starter");
        assert_eq!(
            schema["potentialAction"]["target"]["urlTemplate"],
            "https://example.org/search?q={search_term_string}"
        );
    }
}
