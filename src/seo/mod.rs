//! Search engine metadata: page metadata resolution, schema.org structured
//! data, the server-side sitemap and `robots.txt`.

pub mod json_ld;
pub mod metadata;
pub mod sitemap;

pub use metadata::{page_metadata, seo_metadata, PageMetadata, PageOptions, SeoInput};
pub use sitemap::{render_sitemap, robots_txt, server_sitemap_entries, SitemapEntry};
