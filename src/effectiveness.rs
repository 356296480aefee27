use crate::pokemon::{TypeEfficacyRow, TypeName, Typing};
use std::collections::HashMap;
use std::fmt;

/// Percentage used when the table has no row for a pair.
const NEUTRAL_FACTOR: u16 = 100;

/// Attacking × defending damage factors, as percentages.
#[derive(Debug, Clone, Default)]
pub struct EfficacyTable {
    factors: HashMap<(TypeName, TypeName), u16>,
}

impl EfficacyTable {
    pub fn from_rows(rows: &[TypeEfficacyRow]) -> Self {
        let mut factors = HashMap::with_capacity(rows.len());
        for row in rows {
            // first row for a pair wins
            factors
                .entry((row.attacking, row.defending))
                .or_insert(row.damage_factor);
        }
        Self { factors }
    }

    pub fn factor(&self, attacking: TypeName, defending: TypeName) -> u16 {
        self.factors
            .get(&(attacking, defending))
            .copied()
            .unwrap_or(NEUTRAL_FACTOR)
    }
}

/// An exact damage multiplier kept as a reduced fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Multiplier {
    numerator: u32,
    denominator: u32,
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Multiplier {
    pub const NEUTRAL: Multiplier = Multiplier {
        numerator: 1,
        denominator: 1,
    };

    fn reduced(numerator: u32, denominator: u32) -> Self {
        if numerator == 0 {
            return Multiplier {
                numerator: 0,
                denominator: 1,
            };
        }
        let divisor = gcd(numerator, denominator);
        Multiplier {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        }
    }

    /// Scale by a percentage damage factor.
    pub fn apply(self, damage_factor: u16) -> Self {
        Self::reduced(
            self.numerator * u32::from(damage_factor),
            self.denominator * 100,
        )
    }

    pub fn from_factor(damage_factor: u16) -> Self {
        Self::NEUTRAL.apply(damage_factor)
    }

    pub fn effect(self) -> Effect {
        if self.numerator == 0 {
            Effect::Immune
        } else if self.numerator > self.denominator {
            Effect::Weak
        } else if self.numerator < self.denominator {
            Effect::Resistant
        } else {
            Effect::Neutral
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.numerator, self.denominator) {
            (0, _) => f.write_str("0×"),
            (1, 4) => f.write_str("¼×"),
            (1, 2) => f.write_str("½×"),
            (n, 1) => write!(f, "{n}×"),
            _ => {
                let text = format!("{:.2}", self.as_f64());
                let text = text.trim_end_matches('0').trim_end_matches('.');
                write!(f, "{text}×")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Weak,
    Resistant,
    Immune,
    Neutral,
}

/// Multiplier of every attacking type against one typing, in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefenses {
    multipliers: Vec<(TypeName, Multiplier)>,
}

impl TypeDefenses {
    pub fn multiplier(&self, attacking: TypeName) -> Multiplier {
        self.multipliers
            .iter()
            .find(|(t, _)| *t == attacking)
            .map(|(_, m)| *m)
            .unwrap_or(Multiplier::NEUTRAL)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeName, Multiplier)> + '_ {
        self.multipliers.iter().copied()
    }

    fn with_effect(&self, effect: Effect) -> Vec<(TypeName, Multiplier)> {
        self.iter().filter(|(_, m)| m.effect() == effect).collect()
    }

    pub fn weak_to(&self) -> Vec<(TypeName, Multiplier)> {
        self.with_effect(Effect::Weak)
    }

    pub fn resistant(&self) -> Vec<(TypeName, Multiplier)> {
        self.with_effect(Effect::Resistant)
    }

    pub fn immune(&self) -> Vec<(TypeName, Multiplier)> {
        self.with_effect(Effect::Immune)
    }
}

pub fn resolve_effectiveness(typing: &Typing, table: &EfficacyTable) -> TypeDefenses {
    let multipliers = TypeName::ALL
        .into_iter()
        .map(|attacking| {
            let multiplier = typing
                .iter()
                .fold(Multiplier::NEUTRAL, |acc, defending| {
                    acc.apply(table.factor(attacking, defending))
                });
            (attacking, multiplier)
        })
        .collect();
    TypeDefenses { multipliers }
}
