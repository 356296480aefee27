use super::{escape, layout, type_badge, type_badges};
use crate::effectiveness::{EfficacyTable, Multiplier, TypeDefenses, resolve_effectiveness};
use crate::evolution::{self, EvolutionStage};
use crate::gql::artwork_fallback;
use crate::pokemon::{BaseStat, Entry, EvolutionNode, TypeName, format_id};
use crate::query::EntryDetail;

pub fn render_detail(detail: &EntryDetail) -> String {
    let entry = &detail.entry;
    let table = EfficacyTable::from_rows(&detail.efficacy);
    let defenses = resolve_effectiveness(&entry.typing, &table);
    let primary_color = entry.typing.primary().color();

    let mut body = String::new();
    body.push_str(r#"<p><a href="/">← Back to Pokédex</a></p>"#);
    body.push_str(&hero(entry, primary_color));
    body.push_str(&info_panel(entry));
    body.push_str(&stats_panel(&entry.stats));
    if let Some(species) = entry.species.as_ref().filter(|s| !s.evolution.is_empty()) {
        body.push_str(&format!(
            r#"<section class="panel"><h2>Evolution Chain</h2>{}</section>"#,
            evolution_chain(&evolution::stages(&species.evolution), entry.id)
        ));
    }
    body.push_str(&defenses_panel(&defenses));

    let title = format!("{} {} | Pokédex", entry.name, format_id(entry.id));
    layout(&title, &body)
}

fn hero(entry: &Entry, color: &str) -> String {
    let previous = if entry.id > 1 {
        format!(
            r#"<a href="/pokemon/{}" aria-label="Previous Pokémon">‹ {}</a>"#,
            entry.id - 1,
            format_id(entry.id - 1)
        )
    } else {
        String::new()
    };
    let next = format!(
        r#"<a href="/pokemon/{}" aria-label="Next Pokémon">{} ›</a>"#,
        entry.id + 1,
        format_id(entry.id + 1)
    );

    format!(
        r#"<section class="hero" style="background: radial-gradient(ellipse at 50% 30%, {color}22 0%, #1a1a2e 70%); border: 1px solid {color}30; border-radius: 1rem; padding: 1rem;">
  <div class="chips">{previous}{next}</div>
  <img src="{image}" alt="{name}" width="260" height="260">
  <p class="number">{number}</p>
  <h1 style="text-transform: capitalize">{name}</h1>
  <p>{genus}</p>
  <div>{badges}</div>
</section>"#,
        image = escape(&entry.image),
        name = escape(&entry.name),
        number = format_id(entry.id),
        genus = escape(entry.genus()),
        badges = type_badges(entry.typing.iter()),
    )
}

fn info_card(label: &str, value: &str) -> String {
    format!(
        r#"<div class="panel"><span class="label">{label}</span><p>{}</p></div>"#,
        escape(value)
    )
}

fn info_panel(entry: &Entry) -> String {
    let flavor = entry
        .species
        .as_ref()
        .map(|s| s.flavor_text.as_str())
        .filter(|text| !text.is_empty())
        .map(|text| format!(r#"<p class="flavor">{}</p>"#, escape(text)))
        .unwrap_or_default();
    let catch_rate = entry
        .species
        .as_ref()
        .map(|s| s.catch_rate_pct())
        .unwrap_or_else(|| "0.0".to_string());

    format!(
        r#"<section class="panel">{flavor}<div class="columns">{}{}{}{}</div></section>"#,
        info_card("Height", &format!("{} m", entry.height_m())),
        info_card("Weight", &format!("{} kg", entry.weight_kg())),
        info_card("Catch Rate", &format!("{catch_rate}%")),
        info_card("Abilities", &entry.ability_label()),
    )
}

/// Bar width as a percentage of the stat's display maximum, capped at 100.
pub(crate) fn stat_pct(value: u32, max: u32) -> f64 {
    (f64::from(value) / f64::from(max.max(1)) * 100.0).min(100.0)
}

fn stats_panel(stats: &[BaseStat]) -> String {
    let rows = stats
        .iter()
        .map(|s| {
            let max = s.stat.display_max();
            format!(
                r#"<div class="stat-row"><span>{label}</span><strong>{value}</strong><div class="bar"><div style="width:{pct:.1}%;background-color:{color}"></div></div><span>{max}</span></div>"#,
                label = s.stat.label(),
                value = s.value,
                pct = stat_pct(s.value, max),
                color = s.stat.bar_color(),
            )
        })
        .collect::<String>();
    format!(r#"<section class="panel"><h2>Base Stats</h2>{rows}</section>"#)
}

fn evolution_member(node: &EvolutionNode, current_id: u32) -> String {
    let class = if node.id == current_id {
        "card current-form"
    } else {
        "card"
    };
    format!(
        r#"<a class="{class}" href="/pokemon/{id}"><img src="{sprite}" alt="{name}" width="64" height="64"><span class="number">{number}</span><span style="text-transform: capitalize">{name}</span></a>"#,
        id = node.id,
        sprite = escape(&artwork_fallback(node.id)),
        name = escape(&node.name),
        number = format_id(node.id),
    )
}

fn evolution_chain(stages: &[EvolutionStage<'_>], current_id: u32) -> String {
    let mut html = String::from(r#"<div class="evolution">"#);
    for (idx, stage) in stages.iter().enumerate() {
        if idx > 0 {
            // a single next form shows its level on the arrow; branches label each member
            let label = match stage.members.as_slice() {
                [only] => only.min_level.map(|lvl| format!("Lvl {lvl}")),
                _ => None,
            };
            html.push_str(&format!(
                r#"<span class="arrow">{} →</span>"#,
                label.unwrap_or_default()
            ));
        }
        html.push_str(r#"<div class="stage">"#);
        for node in &stage.members {
            if stage.members.len() > 1 {
                if let Some(lvl) = node.min_level {
                    html.push_str(&format!(r#"<span class="level">Lvl {lvl}</span>"#));
                }
            }
            html.push_str(&evolution_member(node, current_id));
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}

fn defense_column(title: &str, types: &[(TypeName, Multiplier)], show_multiplier: bool) -> String {
    let content = if types.is_empty() {
        r#"<span class="none">None</span>"#.to_string()
    } else {
        types
            .iter()
            .map(|(t, m)| {
                if show_multiplier {
                    format!(r#"<span class="defense">{} <small>{m}</small></span>"#, type_badge(*t))
                } else {
                    format!(r#"<span class="defense">{}</span>"#, type_badge(*t))
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    };
    format!(r#"<div class="panel"><h3>{title}</h3><div class="chips">{content}</div></div>"#)
}

fn defenses_panel(defenses: &TypeDefenses) -> String {
    format!(
        r#"<section class="panel"><h2>Type Defenses</h2><div class="columns">{}{}{}</div></section>"#,
        defense_column("Weak To", &defenses.weak_to(), true),
        defense_column("Resistant", &defenses.resistant(), true),
        defense_column("Immune", &defenses.immune(), false),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pokemon::{Ability, EvolutionNode, SpeciesInfo, StatName, TypeEfficacyRow, Typing};

    fn charmander_line() -> Vec<EvolutionNode> {
        vec![
            EvolutionNode {
                id: 4,
                name: "charmander".to_string(),
                evolves_from_id: None,
                min_level: None,
            },
            EvolutionNode {
                id: 5,
                name: "charmeleon".to_string(),
                evolves_from_id: Some(4),
                min_level: Some(16),
            },
        ]
    }

    fn detail() -> EntryDetail {
        EntryDetail {
            entry: Entry {
                id: 5,
                name: "charmeleon".to_string(),
                height_deci: 11,
                weight_deci: 190,
                typing: Typing::Single(TypeName::Fire),
                image: "charmeleon.png".to_string(),
                stats: vec![
                    BaseStat {
                        stat: StatName::Hp,
                        value: 58,
                    },
                    BaseStat {
                        stat: StatName::Speed,
                        value: 400,
                    },
                ],
                abilities: vec![Ability {
                    name: "blaze".to_string(),
                    is_hidden: false,
                }],
                species: Some(SpeciesInfo {
                    capture_rate: 45,
                    flavor_text: "It has a barbaric nature.".to_string(),
                    genus: "Flame Pokémon".to_string(),
                    evolution: charmander_line(),
                }),
            },
            efficacy: vec![
                TypeEfficacyRow {
                    attacking: TypeName::Water,
                    defending: TypeName::Fire,
                    damage_factor: 200,
                },
                TypeEfficacyRow {
                    attacking: TypeName::Grass,
                    defending: TypeName::Fire,
                    damage_factor: 50,
                },
            ],
        }
    }

    #[test]
    fn test_detail_page_sections() {
        let html = render_detail(&detail());
        assert!(html.contains("charmeleon #005 | Pokédex"));
        assert!(html.contains("Flame Pokémon"));
        assert!(html.contains("1.1 m"));
        assert!(html.contains("19.0 kg"));
        assert!(html.contains("17.6%"));
        assert!(html.contains("Blaze"));
        assert!(html.contains(r#"href="/pokemon/4""#));
        assert!(html.contains(r#"href="/pokemon/6""#));
        assert!(html.contains("Lvl 16"));
    }

    #[test]
    fn test_detail_page_type_defenses() {
        let html = render_detail(&detail());
        assert!(html.contains("Weak To"));
        assert!(html.contains(">water</span> <small>2×</small>"));
        assert!(html.contains(">grass</span> <small>½×</small>"));
        // nothing is immune to anything in this table
        assert!(html.contains(r#"<h3>Immune</h3><div class="chips"><span class="none">None</span>"#));
    }

    #[test]
    fn test_first_entry_has_no_previous_link() {
        let mut first = detail();
        first.entry.id = 1;
        let html = render_detail(&first);
        assert!(!html.contains("Previous Pokémon"));
        assert!(html.contains(r#"href="/pokemon/2""#));
    }

    #[test]
    fn test_stat_bars_are_capped() {
        assert_eq!(stat_pct(400, StatName::Speed.display_max()), 100.0);
        assert!((stat_pct(58, 266) - 21.8).abs() < 0.1);
    }
}
