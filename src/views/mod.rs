mod compare;
mod detail;
mod list;

pub use compare::render_compare;
pub use detail::render_detail;
pub use list::{ListOutcome, ListView, render_list};

use crate::pokemon::TypeName;

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; background: #0f0f1e; color: #fff; }
a { color: inherit; text-decoration: none; }
header { position: sticky; top: 0; display: flex; gap: 1.5rem; align-items: center; padding: 0.75rem 2rem; background: #1a1a2e; border-bottom: 1px solid #ffffff1a; }
header .brand { font-weight: 700; font-size: 1.1rem; }
main { max-width: 80rem; margin: 0 auto; padding: 2rem; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(11rem, 1fr)); gap: 1rem; }
.card { display: flex; flex-direction: column; gap: 0.5rem; padding: 0.75rem; border-radius: 1rem; background: #1a1a2e; }
.card.selected { outline: 2px solid #3b82f6; }
.card img { width: 100%; aspect-ratio: 1; object-fit: contain; background: #13132b; border-radius: 0.75rem; }
.card .number { font-size: 0.7rem; color: #ffffff80; }
.badge { display: inline-block; padding: 0.1rem 0.5rem; border-radius: 0.25rem; font-size: 0.65rem; font-weight: 700; text-transform: uppercase; letter-spacing: 0.05em; }
.chips { display: flex; flex-wrap: wrap; gap: 0.4rem; margin: 0.75rem 0; }
.chip { padding: 0.2rem 0.6rem; border-radius: 999px; background: #ffffff10; font-size: 0.75rem; text-transform: capitalize; }
.chip.active { background: #2563eb; }
.notice { padding: 1rem; border-radius: 0.75rem; background: #7c1a1a55; }
.empty { padding: 3rem; text-align: center; color: #ffffff80; }
nav.pagination { display: flex; gap: 0.4rem; justify-content: center; margin: 2rem 0; }
nav.pagination a, nav.pagination span { padding: 0.3rem 0.7rem; border-radius: 0.4rem; background: #ffffff10; }
nav.pagination .current { background: #2563eb; }
nav.pagination .disabled { opacity: 0.4; }
.bar { height: 0.5rem; border-radius: 999px; background: #ffffff1a; overflow: hidden; }
.bar > div { height: 100%; border-radius: 999px; }
.stat-row { display: grid; grid-template-columns: 4rem 2.5rem 1fr 2.75rem; gap: 0.75rem; align-items: center; }
.panel { padding: 1rem; border-radius: 0.75rem; background: #ffffff0d; }
.columns { display: grid; grid-template-columns: repeat(auto-fit, minmax(14rem, 1fr)); gap: 1rem; }
.evolution { display: flex; flex-wrap: wrap; align-items: center; gap: 0.5rem; }
.stage { display: flex; flex-direction: column; gap: 0.5rem; }
.current-form { outline: 2px solid #fb923c; border-radius: 1rem; }
"#;

/// Escapes text for element content and quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<header>
  <a class="brand" href="/">Pokédex</a>
  <a href="/random">Random</a>
</header>
<main>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    )
}

pub fn type_badge(type_name: TypeName) -> String {
    format!(
        r#"<span class="badge" style="background-color:{color}">{name}</span>"#,
        color = type_name.color(),
        name = type_name,
    )
}

pub fn type_badges(types: impl IntoIterator<Item = TypeName>) -> String {
    types.into_iter().map(type_badge).collect::<Vec<_>>().join(" ")
}

pub fn render_not_found() -> String {
    layout(
        "Not found | Pokédex",
        r#"<div class="empty"><h1>404</h1><p>That Pokémon could not be found.</p><a href="/">Back to Pokédex</a></div>"#,
    )
}

pub fn render_unavailable() -> String {
    layout(
        "Unavailable | Pokédex",
        r#"<div class="notice"><h1>Upstream unavailable</h1><p>The Pokédex API could not be reached. Try again shortly.</p><a href="/">Back to Pokédex</a></div>"#,
    )
}
