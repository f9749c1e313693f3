//! Blog plugin: dated posts, paginated lists and tag pages.
//!
//! ```text
//! blog/2019-05-30-welcome.md  → /blog/2019/05/30/welcome
//! blog/2019-05-28-hola.md     → /blog/2019/05/28/hola
//!
//! /blog               list page 1 (newest posts)
//! /blog/page/2        list page 2
//! /blog/tags          every tag
//! /blog/tags/<tag>    posts with that tag
//! ```
//!
//! List and tag pages carry their metadata inline; their post items load the
//! post body with a `truncated` query so only the summary is shipped.

use crate::config::BlogOptions;
use crate::frontmatter::{self, FrontMatter};
use crate::metadata::resolve;
use crate::naming::parse_post_name;
use crate::plugin::{Actions, LoadContext, Plugin, PluginError};
use crate::routes::{Module, RouteConfig};
use crate::scan::{IncludeSet, scan_root};
use crate::types::{BlogPost, NavLink};
use crate::url::{docu_hash, kebab_case, normalize_url, site_alias, strip_extension};
use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const PLUGIN_NAME: &str = "content-blog";

/// One page of the paginated post list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListPage {
    pub permalink: String,
    /// 1-based.
    pub page: usize,
    pub posts_per_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,
    /// Permalinks of the posts on this page, newest first.
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogTag {
    /// Tag as first written in front-matter.
    pub name: String,
    pub permalink: String,
    /// Permalinks of the tagged posts, newest first.
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogContent {
    /// Newest first.
    pub posts: Vec<BlogPost>,
    pub list_pages: Vec<BlogListPage>,
    /// Keyed by kebab-cased tag.
    pub tags: BTreeMap<String, BlogTag>,
    pub tags_permalink: String,
}

pub struct BlogPlugin {
    options: BlogOptions,
}

impl BlogPlugin {
    pub fn new(options: BlogOptions) -> Self {
        Self { options }
    }
}

/// Front-matter date → file-name date → file modification time.
fn post_date(
    path: &Path,
    front_matter: &FrontMatter,
    from_name: Option<NaiveDate>,
) -> Result<NaiveDate, PluginError> {
    if let Some(value) = &front_matter.date {
        return value
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
            .ok_or_else(|| PluginError::InvalidDate {
                path: path.to_path_buf(),
                value: value.clone(),
            });
    }
    if let Some(date) = from_name {
        return Ok(date);
    }
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|source| PluginError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(DateTime::<Local>::from(modified).date_naive())
}

fn read_post(
    dir: &Path,
    relative: &str,
    ctx: &LoadContext,
    options: &BlogOptions,
) -> Result<(NaiveDate, BlogPost), PluginError> {
    let path = dir.join(relative);
    let content = fs::read_to_string(&path).map_err(|source| PluginError::Io {
        path: path.clone(),
        source,
    })?;
    let parsed = frontmatter::parse(&content).map_err(|source| PluginError::Content {
        path: path.clone(),
        source,
    })?;
    let fm = &parsed.front_matter;
    let name = parse_post_name(strip_extension(relative));
    let date = post_date(&path, fm, name.date)?;

    let slug = match &fm.slug {
        Some(slug) => slug.clone(),
        None => format!("{}/{}", date.format("%Y/%m/%d"), name.name),
    };
    let permalink = normalize_url(&[ctx.base_url(), &options.route_base_path, &slug]);
    let paragraph = frontmatter::first_paragraph(parsed.body);

    let post = BlogPost {
        id: fm.id.clone().unwrap_or_else(|| name.name.clone()),
        source: site_alias(ctx.site_dir, &path),
        permalink,
        title: resolve(&[fm.title.as_deref(), Some(&name.name)]).unwrap_or_default(),
        description: resolve(&[fm.description.as_deref(), paragraph.as_deref()]).unwrap_or_default(),
        date: date.format("%Y-%m-%d").to_string(),
        tags: fm.tags.clone(),
        author: fm.author.clone(),
        author_url: fm.author_url.clone(),
        author_title: fm.author_title.clone(),
        truncated: frontmatter::is_truncated(parsed.body),
        prev_item: None,
        next_item: None,
    };
    tracing::debug!(permalink = %post.permalink, date = %post.date, "Resolved post");
    Ok((date, post))
}

fn nav_link(post: &BlogPost) -> NavLink {
    NavLink {
        title: post.title.clone(),
        permalink: post.permalink.clone(),
    }
}

/// Newest first; same-day posts by permalink. Links each post to its
/// neighbours: `prevItem` is newer, `nextItem` older.
fn order_posts(mut dated: Vec<(NaiveDate, BlogPost)>) -> Vec<BlogPost> {
    dated.sort_by(|(a_date, a), (b_date, b)| b_date.cmp(a_date).then_with(|| a.permalink.cmp(&b.permalink)));
    let mut posts: Vec<BlogPost> = dated.into_iter().map(|(_, post)| post).collect();
    let links: Vec<NavLink> = posts.iter().map(nav_link).collect();
    for (i, post) in posts.iter_mut().enumerate() {
        post.prev_item = i.checked_sub(1).map(|p| links[p].clone());
        post.next_item = links.get(i + 1).cloned();
    }
    posts
}

fn paginate(posts: &[BlogPost], base: &str, posts_per_page: usize) -> Vec<BlogListPage> {
    let total_pages = posts.len().div_ceil(posts_per_page).max(1);
    let page_permalink = |page: usize| {
        if page == 1 {
            base.to_string()
        } else {
            normalize_url(&[base, "page", &page.to_string()])
        }
    };
    (1..=total_pages)
        .map(|page| {
            let start = (page - 1) * posts_per_page;
            let items = posts
                .iter()
                .skip(start)
                .take(posts_per_page)
                .map(|p| p.permalink.clone())
                .collect();
            BlogListPage {
                permalink: page_permalink(page),
                page,
                posts_per_page,
                total_pages,
                total_count: posts.len(),
                previous_page: (page > 1).then(|| page_permalink(page - 1)),
                next_page: (page < total_pages).then(|| page_permalink(page + 1)),
                items,
            }
        })
        .collect()
}

fn collect_tags(posts: &[BlogPost], tags_base: &str) -> BTreeMap<String, BlogTag> {
    let mut tags: BTreeMap<String, BlogTag> = BTreeMap::new();
    for post in posts {
        for tag in &post.tags {
            let key = kebab_case(tag);
            if key.is_empty() {
                continue;
            }
            let entry = tags.entry(key.clone()).or_insert_with(|| BlogTag {
                name: tag.clone(),
                permalink: normalize_url(&[tags_base, &key]),
                items: Vec::new(),
            });
            if !entry.items.contains(&post.permalink) {
                entry.items.push(post.permalink.clone());
            }
        }
    }
    tags
}

/// Summary entry of the tags list page.
#[derive(Debug, Serialize)]
struct TagSummary<'a> {
    name: &'a str,
    permalink: &'a str,
    count: usize,
}

/// Inline metadata of a single-tag page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TagPageMetadata<'a> {
    tag: &'a str,
    permalink: &'a str,
    all_tags_path: &'a str,
    count: usize,
}

impl Plugin for BlogPlugin {
    type Content = BlogContent;

    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    fn id(&self) -> &str {
        &self.options.id
    }

    fn load_content(&self, ctx: &LoadContext) -> Result<Option<BlogContent>, PluginError> {
        let dir = ctx.site_dir.join(&self.options.path);
        let include = IncludeSet::new(&self.options.include)?;
        let Some(files) = scan_root(&dir, &include)? else {
            tracing::debug!(path = %dir.display(), "No blog directory");
            return Ok(None);
        };

        let dated = files
            .iter()
            .map(|relative| read_post(&dir, relative, ctx, &self.options))
            .collect::<Result<Vec<_>, _>>()?;
        let posts = order_posts(dated);

        let base = normalize_url(&[ctx.base_url(), &self.options.route_base_path]);
        let tags_permalink = normalize_url(&[&base, "tags"]);
        let list_pages = paginate(&posts, &base, self.options.posts_per_page);
        let tags = collect_tags(&posts, &tags_permalink);

        tracing::info!(posts = posts.len(), tags = tags.len(), "Loaded blog");
        Ok(Some(BlogContent {
            posts,
            list_pages,
            tags,
            tags_permalink,
        }))
    }

    fn content_loaded(
        &self,
        _ctx: &LoadContext,
        content: &BlogContent,
        actions: &mut Actions,
    ) -> Result<(), PluginError> {
        let options = &self.options;

        // permalink → list item module of that post
        let mut items: BTreeMap<&str, Module> = BTreeMap::new();
        for post in &content.posts {
            let metadata = actions.create_json(&format!("{}.json", docu_hash(&post.permalink)), post)?;
            actions.add_route(
                RouteConfig::leaf(&post.permalink, &options.blog_post_component)
                    .module("content", Module::path(&post.source))
                    .module("metadata", Module::path(&metadata)),
            );
            items.insert(
                &post.permalink,
                Module::Map(BTreeMap::from([
                    (
                        "content".to_string(),
                        Module::with_query(&post.source, &[("truncated", "true")]),
                    ),
                    ("metadata".to_string(), Module::path(metadata)),
                ])),
            );
        }
        let item_modules = |permalinks: &[String]| {
            Module::List(
                permalinks
                    .iter()
                    .filter_map(|p| items.get(p.as_str()).cloned())
                    .collect(),
            )
        };

        for page in &content.list_pages {
            let mut route = RouteConfig::leaf(&page.permalink, &options.blog_list_component)
                .module("items", item_modules(&page.items));
            route.metadata = Some(to_value(page)?);
            actions.add_route(route);
        }

        if content.tags.is_empty() {
            return Ok(());
        }

        let summaries: BTreeMap<&str, TagSummary> = content
            .tags
            .iter()
            .map(|(key, tag)| {
                (
                    key.as_str(),
                    TagSummary {
                        name: &tag.name,
                        permalink: &tag.permalink,
                        count: tag.items.len(),
                    },
                )
            })
            .collect();
        let tags_module = actions.create_json("tags.json", &summaries)?;
        actions.add_route(
            RouteConfig::leaf(&content.tags_permalink, &options.blog_tags_list_component)
                .module("tags", Module::path(tags_module)),
        );

        for tag in content.tags.values() {
            let mut route = RouteConfig::leaf(&tag.permalink, &options.blog_tags_posts_component)
                .module("items", item_modules(&tag.items));
            route.metadata = Some(to_value(&TagPageMetadata {
                tag: &tag.name,
                permalink: &tag.permalink,
                all_tags_path: &content.tags_permalink,
                count: tag.items.len(),
            })?);
            actions.add_route(route);
        }
        Ok(())
    }

    fn paths_to_watch(&self, ctx: &LoadContext) -> Vec<String> {
        super::watch_patterns(&ctx.site_dir.join(&self.options.path), &self.options.include)
    }

    fn summary(&self, content: &BlogContent) -> String {
        format!(
            "{} posts, {} list pages, {} tags",
            content.posts.len(),
            content.list_pages.len(),
            content.tags.len()
        )
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, PluginError> {
    serde_json::to_value(value).map_err(|source| PluginError::Json {
        name: "route metadata".to_string(),
        source,
    })
}
