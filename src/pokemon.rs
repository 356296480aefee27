use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while turning upstream names into model values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown type name: {0}")]
    UnknownTypeName(String),
    #[error("unknown stat name: {0}")]
    UnknownStatName(String),
    #[error("an entry must have one or two types, got {0}")]
    InvalidTyping(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeName {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl TypeName {
    /// Every type in canonical display order.
    pub const ALL: [TypeName; 18] = [
        TypeName::Normal,
        TypeName::Fire,
        TypeName::Water,
        TypeName::Electric,
        TypeName::Grass,
        TypeName::Ice,
        TypeName::Fighting,
        TypeName::Poison,
        TypeName::Ground,
        TypeName::Flying,
        TypeName::Psychic,
        TypeName::Bug,
        TypeName::Rock,
        TypeName::Ghost,
        TypeName::Dragon,
        TypeName::Dark,
        TypeName::Steel,
        TypeName::Fairy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TypeName::Normal => "normal",
            TypeName::Fire => "fire",
            TypeName::Water => "water",
            TypeName::Electric => "electric",
            TypeName::Grass => "grass",
            TypeName::Ice => "ice",
            TypeName::Fighting => "fighting",
            TypeName::Poison => "poison",
            TypeName::Ground => "ground",
            TypeName::Flying => "flying",
            TypeName::Psychic => "psychic",
            TypeName::Bug => "bug",
            TypeName::Rock => "rock",
            TypeName::Ghost => "ghost",
            TypeName::Dragon => "dragon",
            TypeName::Dark => "dark",
            TypeName::Steel => "steel",
            TypeName::Fairy => "fairy",
        }
    }

    /// Badge colour used by the detail and compare pages.
    pub fn color(self) -> &'static str {
        match self {
            TypeName::Normal => "#A8A878",
            TypeName::Fire => "#F08030",
            TypeName::Water => "#6890F0",
            TypeName::Electric => "#F8D030",
            TypeName::Grass => "#78C850",
            TypeName::Ice => "#98D8D8",
            TypeName::Fighting => "#C03028",
            TypeName::Poison => "#A040A0",
            TypeName::Ground => "#E0C068",
            TypeName::Flying => "#A890F0",
            TypeName::Psychic => "#F85888",
            TypeName::Bug => "#A8B820",
            TypeName::Rock => "#B8A038",
            TypeName::Ghost => "#705898",
            TypeName::Dragon => "#7038F8",
            TypeName::Dark => "#705848",
            TypeName::Steel => "#B8B8D0",
            TypeName::Fairy => "#EE99AC",
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeName::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownTypeName(s.to_string()))
    }
}

/// The defending types of an entry: one or two, in game order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Typing {
    Single(TypeName),
    Dual(TypeName, TypeName),
}

impl Typing {
    pub fn from_types(types: &[TypeName]) -> Result<Self, ModelError> {
        match *types {
            [only] => Ok(Typing::Single(only)),
            [first, second] if first == second => Ok(Typing::Single(first)),
            [first, second] => Ok(Typing::Dual(first, second)),
            _ => Err(ModelError::InvalidTyping(types.len())),
        }
    }

    pub fn primary(&self) -> TypeName {
        match *self {
            Typing::Single(t) | Typing::Dual(t, _) => t,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeName> {
        let (first, second) = match *self {
            Typing::Single(t) => (t, None),
            Typing::Dual(a, b) => (a, Some(b)),
        };
        std::iter::once(first).chain(second)
    }

    pub fn to_vec(&self) -> Vec<TypeName> {
        self.iter().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatName {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl StatName {
    pub fn as_str(self) -> &'static str {
        match self {
            StatName::Hp => "hp",
            StatName::Attack => "attack",
            StatName::Defense => "defense",
            StatName::SpecialAttack => "special-attack",
            StatName::SpecialDefense => "special-defense",
            StatName::Speed => "speed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatName::Hp => "HP",
            StatName::Attack => "ATK",
            StatName::Defense => "DEF",
            StatName::SpecialAttack => "SP. ATK",
            StatName::SpecialDefense => "SP. DEF",
            StatName::Speed => "SPD",
        }
    }

    /// Highest base value a stat bar is scaled against.
    pub fn display_max(self) -> u32 {
        match self {
            StatName::Hp => 266,
            StatName::Attack => 293,
            StatName::Defense => 280,
            StatName::SpecialAttack => 348,
            StatName::SpecialDefense => 295,
            StatName::Speed => 328,
        }
    }

    pub fn bar_color(self) -> &'static str {
        match self {
            StatName::Hp => "#EF4444",
            StatName::Attack => "#F97316",
            StatName::Defense => "#EAB308",
            StatName::SpecialAttack => "#22C55E",
            StatName::SpecialDefense => "#3B82F6",
            StatName::Speed => "#EC4899",
        }
    }
}

impl FromStr for StatName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hp" => Ok(StatName::Hp),
            "attack" => Ok(StatName::Attack),
            "defense" => Ok(StatName::Defense),
            "special-attack" => Ok(StatName::SpecialAttack),
            "special-defense" => Ok(StatName::SpecialDefense),
            "speed" => Ok(StatName::Speed),
            other => Err(ModelError::UnknownStatName(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseStat {
    pub stat: StatName,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ability {
    pub name: String,
    pub is_hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvolutionNode {
    pub id: u32,
    pub name: String,
    pub evolves_from_id: Option<u32>,
    pub min_level: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesInfo {
    pub capture_rate: u8,
    pub flavor_text: String,
    pub genus: String,
    pub evolution: Vec<EvolutionNode>,
}

impl SpeciesInfo {
    /// Capture rate as a percentage of the 255 maximum, one decimal.
    pub fn catch_rate_pct(&self) -> String {
        format!("{:.1}", f64::from(self.capture_rate) / 255.0 * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: u32,
    pub name: String,
    pub height_deci: u32,
    pub weight_deci: u32,
    pub typing: Typing,
    pub image: String,
    pub stats: Vec<BaseStat>,
    pub abilities: Vec<Ability>,
    pub species: Option<SpeciesInfo>,
}

impl Entry {
    pub fn stat(&self, name: StatName) -> Option<u32> {
        self.stats.iter().find(|s| s.stat == name).map(|s| s.value)
    }

    pub fn height_m(&self) -> String {
        format!("{:.1}", f64::from(self.height_deci) / 10.0)
    }

    pub fn weight_kg(&self) -> String {
        format!("{:.1}", f64::from(self.weight_deci) / 10.0)
    }

    /// Visible abilities first, then the hidden one.
    pub fn ability_label(&self) -> String {
        let visible = self.abilities.iter().filter(|a| !a.is_hidden);
        let hidden = self.abilities.iter().find(|a| a.is_hidden);
        visible
            .chain(hidden)
            .map(|a| title_case(&a.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn genus(&self) -> &str {
        self.species
            .as_ref()
            .map(|s| s.genus.as_str())
            .filter(|g| !g.is_empty())
            .unwrap_or("Pokémon")
    }
}

/// Minimal shape rendered by the list grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardData {
    pub id: u32,
    pub name: String,
    pub image: String,
    pub types: Vec<TypeName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeEfficacyRow {
    pub attacking: TypeName,
    pub defending: TypeName,
    pub damage_factor: u16,
}

/// `#025` style catalog number.
pub fn format_id(id: u32) -> String {
    format!("#{id:03}")
}

/// `solar-power` becomes `Solar Power`.
pub fn title_case(name: &str) -> String {
    name.split(['-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
