//! Static HTML page generation for the archive.
//!
//! Pages are self-contained apart from CDN-hosted stylesheet/script
//! assets. The renderer consumes pre-resolved names from the wire form and
//! never recomputes disambiguation, so every `href`/`src` it emits matches
//! an archive entry the assembler writes.

use crate::naming::{encode_link, is_image};
use crate::wire::{WireArchive, WirePost};

/// Bootstrap stylesheet pinned by subresource integrity.
const BOOT_CSS_HREF: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.0.0-beta1/dist/css/bootstrap.min.css";
const BOOT_CSS_INTEGRITY: &str =
    "sha384-giJF6kkoqNQ00vy+HMDP7azOuL0xtbfIcaT9wjKHr8RbDVddVHyTfAAsrekwKmP1";

/// Bootstrap bundle script pinned by subresource integrity.
const BOOT_JS_SRC: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.0.0-beta1/dist/js/bootstrap.bundle.min.js";
const BOOT_JS_INTEGRITY: &str =
    "sha384-ygbV9kiqUc6oa4msXn9868pTtWMgiQaeYH7/t7LECLbyPA2x65Kgf80OJFdroafW";

/// Vue runtime powering the root page's client-side tag filter.
const VUE_JS_SRC: &str = "https://unpkg.com/vue@3.2.28/dist/vue.global.js";

/// Shared inline stylesheet for the root and post pages.
const PAGE_STYLE: &str = "div.main{width: 600px; float: none; margin: 0 auto}\
div.root{width: 400px}div.post{width: 600px}\
a.hl,a.hl:hover{color: inherit;text-decoration: none;}\
div.card{float: none; margin: 0 auto;}\
img.gray-card{height: 210px;background-color: gray;}\
div.gray-carousel{height: 210px; width: 400px;background-color: gray;}\
img.pd-carousel{height: 210px; padding: 15px;}";

/// Wraps a body fragment in the shared document shell.
#[must_use]
pub fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"ja\">\n<head>\n<meta charset=\"utf-8\" />\n\
         <title>{title}</title>\n\
         <link href=\"{BOOT_CSS_HREF}\" rel=\"stylesheet\" integrity=\"{BOOT_CSS_INTEGRITY}\" crossOrigin=\"anonymous\">\n\
         <style>{PAGE_STYLE}</style>\n\
         </head>\n<body>\n<div class=\"main\">\n{body}\n</div>\n\
         <script src=\"{BOOT_JS_SRC}\" integrity=\"{BOOT_JS_INTEGRITY}\" crossOrigin=\"anonymous\"></script>\n\
         </body></html>"
    )
}

/// Renders a post's self-contained page from its pre-rendered HTML body.
#[must_use]
pub fn post_page(post: &WirePost) -> String {
    document(&post.original_name, &post.html_text)
}

/// Quotes a value for embedding in an inline JavaScript array literal.
#[must_use]
pub fn to_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "\\'"))
}

/// Renders the root index page: navbar back to the source, a Vue-driven
/// tag filter over the archive tag union, and one card per post in wire
/// order.
#[must_use]
pub fn root_page(archive: &WireArchive) -> String {
    let tag_literals = archive
        .tags
        .iter()
        .map(|tag| to_quoted(tag))
        .collect::<Vec<_>>()
        .join(",");

    let navbar = format!(
        "<nav class=\"navbar navbar-expand-lg navbar-dark bg-dark fixed-top\"><div class=\"container-fluid\">\n\
         <a class=\"navbar-brand\" href=\"{url}\">{id}</a>\n\
         <button class=\"navbar-toggler\" type=\"button\" data-bs-toggle=\"collapse\" data-bs-target=\"#dd\" aria-controls=\"dd\" aria-expanded=\"false\" aria-label=\"Toggle navigation\">\n\
         <span class=\"navbar-toggler-icon\"></span>\n\
         </button>\n\
         <div class=\"collapse navbar-collapse\" id=\"dd\"><ul class=\"navbar-nav\">\n\
         <li class=\"nav-item dropdown\">\n\
         <a class=\"nav-link dropdown-toggle\" href=\"#\" id=\"navbarDarkDropdownMenuLink\" role=\"button\" data-bs-toggle=\"dropdown\" aria-expanded=\"false\">Tags</a>\n\
         <ul class=\"dropdown-menu dropdown-menu-dark\" aria-labelledby=\"dd\">\n\
         <li v-for=\"(tag,i) in [{tag_literals}]\">\n \
         <div class=\"form-check mx-1\">\n\
         <input class=\"form-check-input\" type=\"checkbox\" v-model=\"selected\" :value=\"tag\" :id=\"'box'+(i+1)\">\n\
         <label class=\"form-check-label\" :for=\"'box'+(i+1)\">{{{{tag}}}}</label>\n\
         </div>\n</li>\n\
         </ul>\n</li>\n</ul></div>\n</div></nav>\n\n",
        url = archive.url,
        id = archive.id,
    );

    let cards = archive
        .posts
        .iter()
        .map(post_card)
        .collect::<Vec<_>>()
        .join("\n");

    let filter_script = format!(
        "\n</div>\n\
         <script src=\"{VUE_JS_SRC}\"></script>\n\
         <script>\nVue.createApp({{\ndata() {{return {{ selected: [] }}}},\
         methods: {{\n isVisible(tags, selected) {{\n  if (!selected.length) return true\n  return selected.every(it => tags.includes(it))\n }}\n}}\n\
         }}).mount('#main')\n</script>\n\
         <script src=\"{BOOT_JS_SRC}\" integrity=\"{BOOT_JS_INTEGRITY}\" crossOrigin=\"anonymous\"></script>\n\
         </body></html>"
    );

    format!(
        "<!DOCTYPE html>\n<html lang=\"ja\">\n<head>\n<meta charset=\"utf-8\" />\n\
         <title>{id}</title>\n\
         <link href=\"{BOOT_CSS_HREF}\" rel=\"stylesheet\" integrity=\"{BOOT_CSS_INTEGRITY}\" crossOrigin=\"anonymous\">\n\
         <style>{PAGE_STYLE}</style>\n\
         </head>\n<body>\n<div class=\"main\" id=\"main\">\n{navbar}{cards}{filter_script}",
        id = archive.id,
    )
}

/// One root-page card: cover (or fallback), title, link to the post page,
/// wrapped in a `v-show` so the tag filter can hide it.
fn post_card(post: &WirePost) -> String {
    let post_tags = post
        .tags
        .iter()
        .map(|tag| to_quoted(tag))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "<div v-show=\"isVisible([{post_tags}], selected)\">\n\
         <a class=\"hl\" href=\"./{link}/index.html\"><div class=\"root card\">\n\
         {cover}\
         <div class=\"card-body\"><h5 class=\"card-title\">{title}</h5></div>\n</div></a><br>\n</div>\n",
        link = encode_link(&post.encoded_name),
        cover = cover_fragment(post),
        title = post.original_name,
    )
}

/// Cover image fragment for a root-page card.
///
/// Falls back to a carousel of the post's image files when no cover is
/// set, and to a gray placeholder when the post has no images at all.
fn cover_fragment(post: &WirePost) -> String {
    let post_uri = format!("./{}/", encode_link(&post.encoded_name));
    if let Some(cover) = &post.cover {
        return format!(
            "<img class=\"card-img-top gray-card\" src=\"{post_uri}{}\" alt=\"cover\"/>\n",
            encode_link(&cover.name)
        );
    }
    let images: Vec<&str> = post
        .files
        .iter()
        .filter(|file| is_image(&file.encoded_name))
        .map(|file| file.encoded_name.as_str())
        .collect();
    if images.is_empty() {
        return "<img class=\"card-img-top gray-card\"/>\n".to_string();
    }
    let slides = images
        .iter()
        .map(|name| {
            format!(
                "<div class=\"d-flex justify-content-center gray-carousel\">\
                 <img src=\"{post_uri}{}\" class=\"d-block pd-carousel\" height=\"180px\"/></div>",
                encode_link(name)
            )
        })
        .collect::<Vec<_>>()
        .join("</div>\n<div class=\"carousel-item\">");
    format!(
        "<div class=\"carousel slide\" data-bs-ride=\"carousel\" data-interval=\"1000\"><div class=\"carousel-inner\">\
         \n<div class=\"carousel-item active\">{slides}</div>\n</div></div>\n"
    )
}
