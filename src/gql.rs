use crate::list_state::{ListQuery, SortKey};
use crate::pokemon::{
    Ability, BaseStat, CardData, Entry, EvolutionNode, ModelError, SpeciesInfo, StatName,
    TypeEfficacyRow, TypeName, Typing,
};
use serde::Deserialize;
use serde_json::{Value, json};

pub const ARTWORK_FALLBACK_BASE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";

/// English in the PokeAPI language table.
const LANGUAGE_EN: u32 = 9;

pub const LIST_QUERY: &str = r#"
query GetPokemonList(
  $limit: Int = 10
  $offset: Int = 0
  $name: String = "%"
  $type: String = "%"
  $order_by: [pokemon_v2_pokemon_order_by!] = [{ id: asc }]
) {
  pokemon_v2_pokemon(
    limit: $limit
    offset: $offset
    order_by: $order_by
    where: {
      name: { _ilike: $name }
      pokemon_v2_pokemontypes: { pokemon_v2_type: { name: { _ilike: $type } } }
    }
  ) {
    id
    name
    pokemon_v2_pokemontypes { pokemon_v2_type { name } }
    pokemon_v2_pokemonsprites { sprites }
  }
  pokemon_v2_pokemon_aggregate(
    where: {
      name: { _ilike: $name }
      pokemon_v2_pokemontypes: { pokemon_v2_type: { name: { _ilike: $type } } }
    }
  ) {
    aggregate { count }
  }
}
"#;

pub const DETAIL_QUERY: &str = r#"
query GetPokemonDetail($id: Int!, $lang: Int!) {
  pokemon_v2_pokemon(where: { id: { _eq: $id } }) {
    id
    name
    height
    weight
    pokemon_v2_pokemontypes { pokemon_v2_type { name } }
    pokemon_v2_pokemonsprites { sprites }
    pokemon_v2_pokemonstats { base_stat pokemon_v2_stat { name } }
    pokemon_v2_pokemonabilities(order_by: { slot: asc }) {
      is_hidden
      pokemon_v2_ability { name }
    }
    pokemon_v2_pokemonspecy {
      capture_rate
      pokemon_v2_pokemonspeciesflavortexts(where: { language_id: { _eq: $lang } }, limit: 1) {
        flavor_text
      }
      pokemon_v2_pokemonspeciesnames(where: { language_id: { _eq: $lang } }) { genus }
      pokemon_v2_evolutionchain {
        pokemon_v2_pokemonspecies(order_by: { order: asc }) {
          id
          name
          evolves_from_species_id
          pokemon_v2_pokemonevolutions { min_level }
        }
      }
    }
  }
  pokemon_v2_typeefficacy {
    damage_factor
    pokemon_v2_type { name }
    pokemonV2TypeByTargetTypeId { name }
  }
}
"#;

#[derive(Debug, Deserialize)]
pub struct GqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GqlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GqlNamed {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GqlPokemonType {
    pub pokemon_v2_type: GqlNamed,
}

#[derive(Debug, Deserialize)]
pub struct GqlSprites {
    #[serde(default)]
    pub sprites: Value,
}

#[derive(Debug, Deserialize)]
pub struct GqlPokemon {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub pokemon_v2_pokemontypes: Vec<GqlPokemonType>,
    #[serde(default)]
    pub pokemon_v2_pokemonsprites: Vec<GqlSprites>,
}

#[derive(Debug, Deserialize)]
pub struct ListData {
    pub pokemon_v2_pokemon: Vec<GqlPokemon>,
    pub pokemon_v2_pokemon_aggregate: GqlAggregate,
}

#[derive(Debug, Deserialize)]
pub struct GqlAggregate {
    pub aggregate: GqlCount,
}

#[derive(Debug, Deserialize)]
pub struct GqlCount {
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub struct GqlStat {
    pub base_stat: u32,
    pub pokemon_v2_stat: GqlNamed,
}

#[derive(Debug, Deserialize)]
pub struct GqlAbility {
    pub is_hidden: bool,
    pub pokemon_v2_ability: GqlNamed,
}

#[derive(Debug, Deserialize)]
pub struct GqlFlavorText {
    pub flavor_text: String,
}

#[derive(Debug, Deserialize)]
pub struct GqlSpeciesName {
    #[serde(default)]
    pub genus: String,
}

#[derive(Debug, Deserialize)]
pub struct GqlEvolution {
    pub min_level: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct GqlEvolutionSpecies {
    pub id: u32,
    pub name: String,
    pub evolves_from_species_id: Option<u32>,
    #[serde(default)]
    pub pokemon_v2_pokemonevolutions: Vec<GqlEvolution>,
}

#[derive(Debug, Deserialize)]
pub struct GqlEvolutionChain {
    #[serde(default)]
    pub pokemon_v2_pokemonspecies: Vec<GqlEvolutionSpecies>,
}

#[derive(Debug, Deserialize)]
pub struct GqlSpecies {
    pub capture_rate: Option<u8>,
    #[serde(default)]
    pub pokemon_v2_pokemonspeciesflavortexts: Vec<GqlFlavorText>,
    #[serde(default)]
    pub pokemon_v2_pokemonspeciesnames: Vec<GqlSpeciesName>,
    pub pokemon_v2_evolutionchain: Option<GqlEvolutionChain>,
}

#[derive(Debug, Deserialize)]
pub struct GqlPokemonDetail {
    pub id: u32,
    pub name: String,
    pub height: u32,
    pub weight: u32,
    #[serde(default)]
    pub pokemon_v2_pokemontypes: Vec<GqlPokemonType>,
    #[serde(default)]
    pub pokemon_v2_pokemonsprites: Vec<GqlSprites>,
    #[serde(default)]
    pub pokemon_v2_pokemonstats: Vec<GqlStat>,
    #[serde(default)]
    pub pokemon_v2_pokemonabilities: Vec<GqlAbility>,
    pub pokemon_v2_pokemonspecy: Option<GqlSpecies>,
}

#[derive(Debug, Deserialize)]
pub struct GqlTypeEfficacy {
    pub damage_factor: u16,
    pub pokemon_v2_type: GqlNamed,
    #[serde(rename = "pokemonV2TypeByTargetTypeId")]
    pub target_type: GqlNamed,
}

#[derive(Debug, Deserialize)]
pub struct DetailData {
    pub pokemon_v2_pokemon: Vec<GqlPokemonDetail>,
    #[serde(default)]
    pub pokemon_v2_typeefficacy: Vec<GqlTypeEfficacy>,
}

fn order_by(sort: SortKey) -> Value {
    match sort {
        SortKey::IdAsc => json!([{ "id": "asc" }]),
        SortKey::IdDesc => json!([{ "id": "desc" }]),
        SortKey::NameAsc => json!([{ "name": "asc" }]),
        SortKey::NameDesc => json!([{ "name": "desc" }]),
    }
}

pub fn list_variables(query: &ListQuery) -> Value {
    json!({
        "limit": query.limit,
        "offset": query.offset,
        "name": query.name_pattern,
        "type": query.type_pattern,
        "order_by": order_by(query.sort),
    })
}

pub fn detail_variables(id: u32) -> Value {
    json!({ "id": id, "lang": LANGUAGE_EN })
}

// The sprites column is jsonb; some deployments hand it back as a
// JSON-encoded string instead of an object.
fn sprite_document(raw: &Value) -> Option<Value> {
    match raw {
        Value::Object(_) => Some(raw.clone()),
        Value::String(encoded) => serde_json::from_str(encoded).ok(),
        _ => None,
    }
}

pub fn artwork_fallback(id: u32) -> String {
    format!("{ARTWORK_FALLBACK_BASE}/{id}.png")
}

/// Official artwork, then the legacy front sprite, then the URL templated by id.
pub fn resolve_image(id: u32, sprites: &[GqlSprites]) -> String {
    let document = sprites.first().and_then(|s| sprite_document(&s.sprites));
    let pick = |pointer: &str| {
        document
            .as_ref()
            .and_then(|doc| doc.pointer(pointer))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    pick("/other/official-artwork/front_default")
        .or_else(|| pick("/front_default"))
        .unwrap_or_else(|| artwork_fallback(id))
}

fn type_names(types: &[GqlPokemonType]) -> Vec<TypeName> {
    types
        .iter()
        .filter_map(|t| match t.pokemon_v2_type.name.parse() {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::warn!("Skipping type on list entry: {}", e);
                None
            }
        })
        .collect()
}

pub fn to_card_data(pokemon: &GqlPokemon) -> CardData {
    CardData {
        id: pokemon.id,
        name: pokemon.name.clone(),
        image: resolve_image(pokemon.id, &pokemon.pokemon_v2_pokemonsprites),
        types: type_names(&pokemon.pokemon_v2_pokemontypes),
    }
}

fn clean_flavor_text(text: &str) -> String {
    text.replace(['\n', '\u{c}'], " ")
}

fn to_species(species: &GqlSpecies) -> SpeciesInfo {
    let evolution = species
        .pokemon_v2_evolutionchain
        .as_ref()
        .map(|chain| {
            chain
                .pokemon_v2_pokemonspecies
                .iter()
                .map(|s| EvolutionNode {
                    id: s.id,
                    name: s.name.clone(),
                    evolves_from_id: s.evolves_from_species_id,
                    min_level: s.pokemon_v2_pokemonevolutions.first().and_then(|e| e.min_level),
                })
                .collect()
        })
        .unwrap_or_default();

    SpeciesInfo {
        capture_rate: species.capture_rate.unwrap_or(0),
        flavor_text: species
            .pokemon_v2_pokemonspeciesflavortexts
            .first()
            .map(|f| clean_flavor_text(&f.flavor_text))
            .unwrap_or_default(),
        genus: species
            .pokemon_v2_pokemonspeciesnames
            .first()
            .map(|n| n.genus.clone())
            .unwrap_or_default(),
        evolution,
    }
}

pub fn to_entry(pokemon: &GqlPokemonDetail) -> Result<Entry, ModelError> {
    let types = pokemon
        .pokemon_v2_pokemontypes
        .iter()
        .map(|t| t.pokemon_v2_type.name.parse::<TypeName>())
        .collect::<Result<Vec<_>, _>>()?;

    let stats = pokemon
        .pokemon_v2_pokemonstats
        .iter()
        .filter_map(|s| match s.pokemon_v2_stat.name.parse::<StatName>() {
            Ok(stat) => Some(BaseStat {
                stat,
                value: s.base_stat,
            }),
            Err(e) => {
                tracing::debug!("Ignoring stat on entry {}: {}", pokemon.id, e);
                None
            }
        })
        .collect();

    Ok(Entry {
        id: pokemon.id,
        name: pokemon.name.clone(),
        height_deci: pokemon.height,
        weight_deci: pokemon.weight,
        typing: Typing::from_types(&types)?,
        image: resolve_image(pokemon.id, &pokemon.pokemon_v2_pokemonsprites),
        stats,
        abilities: pokemon
            .pokemon_v2_pokemonabilities
            .iter()
            .map(|a| Ability {
                name: a.pokemon_v2_ability.name.clone(),
                is_hidden: a.is_hidden,
            })
            .collect(),
        species: pokemon.pokemon_v2_pokemonspecy.as_ref().map(to_species),
    })
}

/// Rows naming a type outside the closed set are dropped.
pub fn to_efficacy_rows(rows: &[GqlTypeEfficacy]) -> Vec<TypeEfficacyRow> {
    rows.iter()
        .filter_map(|row| {
            let attacking = row.pokemon_v2_type.name.parse().ok()?;
            let defending = row.target_type.name.parse().ok()?;
            Some(TypeEfficacyRow {
                attacking,
                defending,
                damage_factor: row.damage_factor,
            })
        })
        .collect()
}
