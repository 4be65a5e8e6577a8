//! HTML pages built from view models. No catalog access happens here.

use crate::present::{format_revenue, format_runtime, non_empty, resolve_image_path, resolve_year};
use crate::tmdb::{CastCredit, MovieDetails, PersonDetails};
use crate::view::{Graph, GraphKind, GraphNode, SearchResultRow, SubGraph};

pub const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="600" height="900" viewBox="0 0 600 900"><rect width="600" height="900" fill="#d9d9d9"/><circle cx="300" cy="330" r="110" fill="#bdbdbd"/><rect x="150" y="480" width="300" height="220" rx="110" fill="#bdbdbd"/></svg>"##;

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{}</title>
<script src="https://unpkg.com/htmx.org@1.9.12"></script>
</head>
<body>
<header><a href="/">blunt</a>{}</header>
<main>
{}
</main>
</body>
</html>
"#,
        escape(title),
        search_form(""),
        body
    )
}

fn search_form(query: &str) -> String {
    format!(
        r#"<form action="/search" method="get"><input type="search" name="search" value="{}" placeholder="Movies or people"><button type="submit">Search</button></form>"#,
        escape(query)
    )
}

fn field(label: &str, value: Option<&str>) -> String {
    match non_empty(value) {
        Some(v) => format!("<dt>{}</dt><dd>{}</dd>\n", escape(label), escape(v)),
        None => String::new(),
    }
}

pub fn index() -> String {
    layout("blunt", "<p>Search for a movie or a person.</p>")
}

pub fn search(query: &str, rows: &[SearchResultRow]) -> String {
    let mut body = format!("<h1>Results for &ldquo;{}&rdquo;</h1>\n", escape(query));
    if rows.is_empty() {
        body.push_str("<p>Nothing found.</p>\n");
    }
    body.push_str("<ul class=\"results\">\n");
    for row in rows {
        body.push_str(&format!(
            "<li><a href=\"{}\"><img src=\"{}\" alt=\"\" loading=\"lazy\"><span>{}</span> <small>{}</small></a></li>\n",
            escape(&row.href),
            escape(&row.image_path),
            escape(&row.name),
            escape(&row.year)
        ));
    }
    body.push_str("</ul>\n");
    layout(&format!("{query} - blunt"), &body)
}

pub fn movie(details: &MovieDetails, cast: &[CastCredit], empty_year_label: &str) -> String {
    let summary = &details.summary;
    let year = resolve_year(summary.release_date.as_deref(), empty_year_label);
    let mut body = format!(
        "<article class=\"movie\">\n<img src=\"{}\" alt=\"\">\n<h1>{} <small>{}</small></h1>\n",
        escape(&resolve_image_path(summary.poster_path.as_deref())),
        escape(summary.display_title()),
        escape(&year)
    );
    if let Some(tagline) = non_empty(details.tagline.as_deref()) {
        body.push_str(&format!("<p class=\"tagline\">{}</p>\n", escape(tagline)));
    }
    body.push_str("<dl>\n");
    body.push_str(&field("Runtime", Some(format_runtime(details.runtime).as_str())));
    body.push_str(&field("Language", details.original_language.as_deref()));
    body.push_str(&field("Revenue", Some(format_revenue(details.revenue).as_str())));
    body.push_str("</dl>\n");
    if let Some(overview) = non_empty(details.overview.as_deref()) {
        body.push_str(&format!("<p>{}</p>\n", escape(overview)));
    }
    body.push_str(&format!(
        "<a href=\"/movie/{}/graph\">Graph</a>\n<h2>Cast</h2>\n<ul class=\"cast\">\n",
        summary.id
    ));
    for member in cast {
        body.push_str(&format!(
            "<li><a href=\"/castMember/{}\"><img src=\"{}\" alt=\"\" loading=\"lazy\"><span>{}</span></a>{}</li>\n",
            member.id,
            escape(&resolve_image_path(member.image_path.as_deref())),
            escape(&member.name),
            character(member)
        ));
    }
    body.push_str("</ul>\n</article>\n");
    layout(summary.display_title(), &body)
}

pub fn person(details: &PersonDetails, filmography: &[CastCredit], empty_year_label: &str) -> String {
    let mut body = format!(
        "<article class=\"person\">\n<img src=\"{}\" alt=\"\">\n<h1>{}</h1>\n<dl>\n",
        escape(&resolve_image_path(details.profile_path.as_deref())),
        escape(&details.name)
    );
    body.push_str(&field("Known for", details.known_for_department.as_deref()));
    body.push_str(&field("Born", details.birthday.as_deref()));
    body.push_str(&field("Place of birth", details.place_of_birth.as_deref()));
    body.push_str(&field("Died", details.deathday.as_deref()));
    match non_empty(details.homepage.as_deref()) {
        Some(homepage) if is_web_url(homepage) => {
            let href = escape(homepage);
            body.push_str(&format!("<dt>Homepage</dt><dd><a href=\"{href}\">{href}</a></dd>\n"));
        }
        other => body.push_str(&field("Homepage", other)),
    }
    body.push_str("</dl>\n");
    if let Some(bio) = non_empty(details.biography.as_deref()) {
        for paragraph in bio.split("\n\n").filter(|p| !p.trim().is_empty()) {
            body.push_str(&format!("<p>{}</p>\n", escape(paragraph.trim())));
        }
    }
    body.push_str(&format!(
        "<a href=\"/castMember/{}/graph\">Graph</a>\n<h2>Movies</h2>\n<ul class=\"filmography\">\n",
        details.id
    ));
    for credit in filmography {
        body.push_str(&format!(
            "<li><a href=\"/movie/{}\"><img src=\"{}\" alt=\"\" loading=\"lazy\"><span>{}</span> <small>{}</small></a>{}</li>\n",
            credit.id,
            escape(&resolve_image_path(credit.image_path.as_deref())),
            escape(&credit.name),
            escape(&resolve_year(credit.release_date.as_deref(), empty_year_label)),
            character(credit)
        ));
    }
    body.push_str("</ul>\n</article>\n");
    layout(&details.name, &body)
}

/// Only http(s) homepages become links; anything else is shown as text.
fn is_web_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn character(credit: &CastCredit) -> String {
    match non_empty(credit.character.as_deref()) {
        Some(c) => format!(" <em>as {}</em>", escape(c)),
        None => String::new(),
    }
}

/// The same entity can appear under several expanded parents, so nodes carry
/// no ids: each one targets its own child list, which the swapped-in
/// fragment replaces.
fn node(node: &GraphNode, kind: GraphKind) -> String {
    format!(
        "<li class=\"node\"><img src=\"{img}\" alt=\"\" hx-post=\"/subGraph/{kind}/{id}\" hx-target=\"next ul\" hx-swap=\"outerHTML\"><ul class=\"children\"></ul></li>",
        kind = kind.as_str(),
        id = node.id,
        img = escape(&node.image_path)
    )
}

fn children(nodes: &[GraphNode], kind: GraphKind) -> String {
    nodes
        .iter()
        .map(|n| node(n, kind))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn graph(graph: &Graph) -> String {
    let body = format!(
        "<section class=\"graph\" data-kind=\"{kind}\">\n<div class=\"parent\"><a href=\"{href}\"><img src=\"{img}\" alt=\"\"></a></div>\n<ul class=\"children\">\n{children}\n</ul>\n</section>\n",
        kind = graph.kind.as_str(),
        href = match graph.kind {
            GraphKind::Movie => format!("/movie/{}", graph.parent.id),
            GraphKind::Person => format!("/castMember/{}", graph.parent.id),
        },
        img = escape(&graph.parent.image_path),
        children = children(&graph.children, graph.kind.other())
    );
    layout("Graph - blunt", &body)
}

/// Fragment swapped into an expanded node; not a full page.
pub fn sub_graph(sub: &SubGraph) -> String {
    format!(
        "<ul class=\"children\" data-parent=\"{}\">\n{}\n</ul>\n",
        sub.parent_id,
        children(&sub.children, sub.child_kind)
    )
}
