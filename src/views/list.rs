use super::{escape, layout, type_badges};
use crate::list_state::{ListController, SortKey};
use crate::pagination::{PageMarker, page_range, total_pages};
use crate::pokemon::{CardData, TypeName, format_id};
use crate::query::ListPage;

pub enum ListOutcome {
    Loaded(ListPage),
    /// The upstream could not be queried.
    Unavailable,
}

pub struct ListView<'a> {
    pub controller: &'a ListController,
    pub outcome: ListOutcome,
    pub page_size: u32,
    pub debounce_ms: u64,
}

pub fn render_list(view: &ListView<'_>) -> String {
    let controller = view.controller;
    let mut body = String::new();

    body.push_str(&search_form(controller, view.debounce_ms));
    body.push_str(&type_filters(controller));
    body.push_str(&sort_links(controller));
    body.push_str(&compare_bar(controller));

    match &view.outcome {
        ListOutcome::Unavailable => {
            body.push_str(
                r#"<p class="notice">The Pokédex API could not be reached. Try again shortly.</p>"#,
            );
        }
        ListOutcome::Loaded(page) => {
            body.push_str(&format!(
                r#"<p class="count">{} results</p>"#,
                page.total_count
            ));
            if page.entries.is_empty() {
                body.push_str(r#"<p class="empty">No results</p>"#);
            } else {
                body.push_str(r#"<div class="grid">"#);
                for card in &page.entries {
                    body.push_str(&card_html(card, controller));
                }
                body.push_str("</div>");
            }
            let pages = total_pages(page.total_count, view.page_size);
            body.push_str(&pagination(controller, pages));
        }
    }

    layout("Pokédex", &body)
}

// Typing submits the form only after the input has been quiet for the
// configured delay; every new keystroke restarts the timer.
fn search_form(controller: &ListController, debounce_ms: u64) -> String {
    let state = controller.state();
    let mut hidden = String::new();
    if let Some(t) = state.selected_type() {
        hidden.push_str(&format!(r#"<input type="hidden" name="type" value="{t}">"#));
    }
    if state.sort() != SortKey::default() {
        hidden.push_str(&format!(
            r#"<input type="hidden" name="sort" value="{}">"#,
            state.sort()
        ));
    }
    if state.compare_mode() {
        hidden.push_str(r#"<input type="hidden" name="compare" value="1">"#);
        let ids = state.selected().ids();
        if !ids.is_empty() {
            let joined = ids.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
            hidden.push_str(&format!(
                r#"<input type="hidden" name="selected" value="{joined}">"#
            ));
        }
    }

    format!(
        r#"<form id="search" method="get" action="/">
  <input type="search" name="q" value="{value}" placeholder="Search Pokémon" autocomplete="off" data-debounce="{debounce_ms}">
  {hidden}
</form>
<script>
(function () {{
  var form = document.getElementById("search");
  var input = form.querySelector("input[name=q]");
  var delay = parseInt(input.dataset.debounce, 10);
  var timer = null;
  input.addEventListener("input", function () {{
    if (timer) clearTimeout(timer);
    timer = setTimeout(function () {{ form.submit(); }}, delay);
  }});
}})();
</script>"#,
        value = escape(controller.effective_search()),
    )
}

fn type_filters(controller: &ListController) -> String {
    let selected = controller.state().selected_type();
    let chips = TypeName::ALL
        .into_iter()
        .map(|t| {
            let href = controller.with(|c| c.set_type(t)).href();
            let class = if selected == Some(t) { "chip active" } else { "chip" };
            format!(r#"<a class="{class}" href="{}">{t}</a>"#, escape(&href))
        })
        .collect::<String>();
    format!(r#"<div class="chips types">{chips}</div>"#)
}

fn sort_links(controller: &ListController) -> String {
    let current = controller.state().sort();
    let links = SortKey::ALL
        .into_iter()
        .map(|key| {
            let href = controller.with(|c| c.set_sort(key)).href();
            let class = if key == current { "chip active" } else { "chip" };
            format!(
                r#"<a class="{class}" href="{}">{}</a>"#,
                escape(&href),
                key.label()
            )
        })
        .collect::<String>();
    format!(r#"<div class="chips sort">{links}</div>"#)
}

fn compare_bar(controller: &ListController) -> String {
    let state = controller.state();
    let toggle = controller.with(ListController::toggle_compare_mode).href();
    if !state.compare_mode() {
        return format!(
            r#"<div class="chips"><a class="chip" href="{}">Compare mode</a></div>"#,
            escape(&toggle)
        );
    }

    let action = match state.selected().pair() {
        Some((p1, p2)) => format!(r#"<a class="chip active" href="/compare?p1={p1}&amp;p2={p2}">Compare</a>"#),
        None => String::new(),
    };
    format!(
        r#"<div class="chips"><a class="chip active" href="{}">Exit compare mode</a><span class="chip">Selected {}/2</span>{action}</div>"#,
        escape(&toggle),
        state.selected().len(),
    )
}

fn card_html(card: &CardData, controller: &ListController) -> String {
    let state = controller.state();
    let (href, class) = if state.compare_mode() {
        let href = controller.with(|c| c.toggle_select(card.id)).href();
        let class = if state.selected().contains(card.id) {
            "card selected"
        } else {
            "card"
        };
        (href, class)
    } else {
        (format!("/pokemon/{}", card.id), "card")
    };

    format!(
        r#"<a class="{class}" href="{href}">
  <span class="number">{number}</span>
  <img src="{image}" alt="{name}" loading="lazy">
  <h3>{name}</h3>
  <div>{badges}</div>
</a>"#,
        href = escape(&href),
        number = format_id(card.id),
        image = escape(&card.image),
        name = escape(&card.name),
        badges = type_badges(card.types.iter().copied()),
    )
}

fn pagination(controller: &ListController, total: u32) -> String {
    if total <= 1 {
        return String::new();
    }
    let current = controller.state().page();
    let link = |page: u32| escape(&controller.with(|c| c.set_page(page)).href());

    let mut nav = String::from(r#"<nav class="pagination">"#);
    if current > 1 {
        nav.push_str(&format!(r#"<a href="{}">Previous</a>"#, link(current - 1)));
    } else {
        nav.push_str(r#"<span class="disabled">Previous</span>"#);
    }
    for marker in page_range(current, total) {
        match marker {
            PageMarker::Page(n) if n == current => {
                nav.push_str(&format!(r#"<span class="current">{n}</span>"#));
            }
            PageMarker::Page(n) => nav.push_str(&format!(r#"<a href="{}">{n}</a>"#, link(n))),
            PageMarker::Ellipsis => nav.push_str(r#"<span class="ellipsis">…</span>"#),
        }
    }
    if current < total {
        nav.push_str(&format!(r#"<a href="{}">Next</a>"#, link(current + 1)));
    } else {
        nav.push_str(r#"<span class="disabled">Next</span>"#);
    }
    nav.push_str("</nav>");
    nav
}
