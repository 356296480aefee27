use super::detail::stat_pct;
use super::{escape, layout, type_badges};
use crate::pokemon::{Entry, format_id};

const MUTED_BAR: &str = "#4a4a6a";

fn profile_card(entry: &Entry) -> String {
    let color = entry.typing.primary().color();
    format!(
        r#"<div class="panel profile">
  <a href="/pokemon/{id}" style="display:block;background: radial-gradient(ellipse at 50% 50%, {color}33 0%, transparent 70%)"><img src="{image}" alt="{name}" width="192" height="192"></a>
  <p class="number">{number}</p>
  <a href="/pokemon/{id}"><h2 style="text-transform: capitalize">{name}</h2></a>
  <div>{badges}</div>
</div>"#,
        id = entry.id,
        image = escape(&entry.image),
        name = escape(&entry.name),
        number = format_id(entry.id),
        badges = type_badges(entry.typing.iter()),
    )
}

fn bar(pct: f64, color: &str, leads: bool) -> String {
    let (color, opacity) = if leads { (color, "1") } else { (MUTED_BAR, "0.6") };
    format!(
        r#"<div class="bar"><div style="width:{pct:.1}%;background-color:{color};opacity:{opacity}"></div></div>"#
    )
}

/// Stats follow the left entry's order; a stat the right entry lacks counts as 0.
fn stat_rows(left: &Entry, right: &Entry) -> String {
    let left_color = left.typing.primary().color();
    let right_color = right.typing.primary().color();

    left.stats
        .iter()
        .map(|s| {
            let max = s.stat.display_max();
            let a = s.value;
            let b = right.stat(s.stat).unwrap_or(0);
            format!(
                r#"<div class="compare-row" style="display:grid;grid-template-columns:3rem 1fr 5rem 1fr 3rem;gap:0.5rem;align-items:center"><strong>{a}</strong>{}<span>{}</span>{}<strong>{b}</strong></div>"#,
                bar(stat_pct(a, max), left_color, a > b),
                s.stat.label(),
                bar(stat_pct(b, max), right_color, b > a),
            )
        })
        .collect()
}

pub fn render_compare(left: &Entry, right: &Entry) -> String {
    let body = format!(
        r#"<p><a href="/">← Back to Pokédex</a></p>
<h1>Head-to-Head Comparison</h1>
<div class="columns">{left_card}{right_card}</div>
<section class="panel">
  <h3>Physical Specs</h3>
  <div style="display:grid;grid-template-columns:1fr auto 1fr;gap:0.5rem;text-align:center">
    <div>{lh} m<br>{lw} kg</div>
    <div>Height<br>Weight</div>
    <div>{rh} m<br>{rw} kg</div>
  </div>
</section>
<section class="panel">
  <h3>Base Stats</h3>
  {rows}
</section>"#,
        left_card = profile_card(left),
        right_card = profile_card(right),
        lh = left.height_m(),
        lw = left.weight_kg(),
        rh = right.height_m(),
        rw = right.weight_kg(),
        rows = stat_rows(left, right),
    );
    let title = format!("Compare {} vs {} | Pokédex", format_id(left.id), format_id(right.id));
    layout(&title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pokemon::{BaseStat, StatName, TypeName, Typing};

    fn entry(id: u32, name: &str, typing: Typing, stats: &[(StatName, u32)]) -> Entry {
        Entry {
            id,
            name: name.to_string(),
            height_deci: 4,
            weight_deci: 60,
            typing,
            image: format!("{id}.png"),
            stats: stats
                .iter()
                .map(|&(stat, value)| BaseStat { stat, value })
                .collect(),
            abilities: Vec::new(),
            species: None,
        }
    }

    #[test]
    fn test_compare_page_highlights_leader() {
        let pikachu = entry(
            25,
            "pikachu",
            Typing::Single(TypeName::Electric),
            &[(StatName::Speed, 90), (StatName::Hp, 35)],
        );
        let snorlax = entry(
            143,
            "snorlax",
            Typing::Single(TypeName::Normal),
            &[(StatName::Hp, 160)],
        );
        let html = render_compare(&pikachu, &snorlax);

        assert!(html.contains("Compare #025 vs #143"));
        assert!(html.contains("Head-to-Head Comparison"));
        assert!(html.contains("0.4 m<br>6.0 kg"));
        // pikachu leads speed in its own colour; snorlax has no speed row and shows 0
        assert!(html.contains("background-color:#F8D030;opacity:1"));
        assert!(html.contains("<strong>0</strong></div>"));
        // snorlax leads hp
        assert!(html.contains("background-color:#A8A878;opacity:1"));
        let speed = html.find("SPD").unwrap();
        let hp = html.find("HP<").unwrap();
        assert!(speed < hp);
    }

    #[test]
    fn test_tied_stats_are_both_muted() {
        let a = entry(1, "a", Typing::Single(TypeName::Grass), &[(StatName::Attack, 50)]);
        let b = entry(2, "b", Typing::Single(TypeName::Fire), &[(StatName::Attack, 50)]);
        let html = render_compare(&a, &b);
        assert_eq!(html.matches("opacity:0.6").count(), 2);
    }
}
