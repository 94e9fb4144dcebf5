//! Weight keys and integer percentage weight sets.
//!
//! A [`WeightSet`] always covers every key of its group and always sums to
//! exactly 100. The only ways to build one are validated constructors,
//! deserialization (which goes through the same validation) and the
//! redistribution engine.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::{Error as _, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::WeightError;

/// Total every weight group must add up to.
pub const WEIGHT_TOTAL: u32 = 100;

/// A closed set of keys forming one weight group.
///
/// `ALL` lists the keys in canonical order. That order drives iteration,
/// positional parsing and which key absorbs rounding remainders.
pub trait WeightKey: Copy + Eq + Ord + Hash + fmt::Debug + 'static {
    const ALL: &'static [Self];
    /// Built-in default percentages, aligned with `ALL`.
    const DEFAULTS: &'static [u8];
    /// Group name used in messages ("layer" / "metric").
    const GROUP: &'static str;

    fn as_str(self) -> &'static str;

    fn label(self) -> &'static str;

    fn parse(name: &str) -> Result<Self, WeightError> {
        let wanted = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| WeightError::UnknownKey(wanted.to_string()))
    }
}

/// The three scoring layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKey {
    PropertyFundamentals,
    MarketIntelligence,
    DealComps,
}

impl WeightKey for LayerKey {
    const ALL: &'static [Self] = &[
        LayerKey::PropertyFundamentals,
        LayerKey::MarketIntelligence,
        LayerKey::DealComps,
    ];
    const DEFAULTS: &'static [u8] = &[30, 20, 50];
    const GROUP: &'static str = "layer";

    fn as_str(self) -> &'static str {
        match self {
            LayerKey::PropertyFundamentals => "property_fundamentals",
            LayerKey::MarketIntelligence => "market_intelligence",
            LayerKey::DealComps => "deal_comps",
        }
    }

    fn label(self) -> &'static str {
        match self {
            LayerKey::PropertyFundamentals => "Property Fundamentals",
            LayerKey::MarketIntelligence => "Market Intelligence",
            LayerKey::DealComps => "Deal Comp Analysis",
        }
    }
}

/// Sub-metrics of the property fundamentals layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    CapRate,
    PricePerUnit,
    Occupancy,
}

impl WeightKey for MetricKey {
    const ALL: &'static [Self] = &[
        MetricKey::CapRate,
        MetricKey::PricePerUnit,
        MetricKey::Occupancy,
    ];
    const DEFAULTS: &'static [u8] = &[35, 30, 35];
    const GROUP: &'static str = "metric";

    fn as_str(self) -> &'static str {
        match self {
            MetricKey::CapRate => "cap_rate",
            MetricKey::PricePerUnit => "price_per_unit",
            MetricKey::Occupancy => "occupancy",
        }
    }

    fn label(self) -> &'static str {
        match self {
            MetricKey::CapRate => "Cap Rate",
            MetricKey::PricePerUnit => "Price per Unit",
            MetricKey::Occupancy => "Occupancy",
        }
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerKey {
    type Err = WeightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as WeightKey>::parse(s)
    }
}

impl FromStr for MetricKey {
    type Err = WeightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as WeightKey>::parse(s)
    }
}

/// Clamp an arbitrary caller value into a valid percentage.
///
/// The engine itself rejects out-of-range values; this is the caller-side
/// clamp that slider-style inputs go through first.
pub fn clamp_percent(value: i64) -> u8 {
    value.clamp(0, WEIGHT_TOTAL as i64) as u8
}

/// Integer percentages for every key of `K`, summing to exactly 100.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WeightSet<K: WeightKey> {
    values: BTreeMap<K, u8>,
}

impl<K: WeightKey> WeightSet<K> {
    /// Build a validated set. Every key must appear exactly once.
    pub fn new(entries: impl IntoIterator<Item = (K, u32)>) -> Result<Self, WeightError> {
        let mut values = BTreeMap::new();
        for (key, value) in entries {
            if value > WEIGHT_TOTAL {
                return Err(WeightError::OutOfRange {
                    key: key.as_str(),
                    value,
                });
            }
            if values.insert(key, value as u8).is_some() {
                return Err(WeightError::DuplicateKey(key.as_str()));
            }
        }
        Self::from_map(values)
    }

    /// Build from values listed in canonical key order.
    pub fn from_ordered(values: &[u32]) -> Result<Self, WeightError> {
        if values.len() != K::ALL.len() {
            return Err(WeightError::WrongLength {
                group: K::GROUP,
                expected: K::ALL.len(),
                got: values.len(),
            });
        }
        Self::new(K::ALL.iter().copied().zip(values.iter().copied()))
    }

    /// Build from name/value pairs, as received over the wire or from config.
    /// Names are matched case-insensitively, so `cap_rate` and `CAP_RATE`
    /// collide.
    pub fn from_named<S: AsRef<str>>(
        entries: impl IntoIterator<Item = (S, u32)>,
    ) -> Result<Self, WeightError> {
        let parsed = entries
            .into_iter()
            .map(|(name, value)| K::parse(name.as_ref()).map(|key| (key, value)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(parsed)
    }

    /// Convert preset fractions (0.0..=1.0) into percentages. Each fraction
    /// must be a whole percentage: 0.07 is accepted, 0.304 is not.
    pub fn from_fractions(fractions: &BTreeMap<K, f64>) -> Result<Self, WeightError> {
        let mut entries = Vec::with_capacity(fractions.len());
        for (&key, &fraction) in fractions {
            let scaled = fraction * WEIGHT_TOTAL as f64;
            if !(0.0..=WEIGHT_TOTAL as f64).contains(&scaled.round()) {
                return Err(WeightError::OutOfRange {
                    key: key.as_str(),
                    value: scaled.max(0.0) as u32,
                });
            }
            let pct = fraction_to_percent(fraction)
                .ok_or_else(|| WeightError::InvalidValue(format!("{}={fraction}", key.as_str())))?;
            entries.push((key, pct));
        }
        Self::new(entries)
    }

    fn from_map(values: BTreeMap<K, u8>) -> Result<Self, WeightError> {
        if let Some(missing) = K::ALL.iter().find(|k| !values.contains_key(k)) {
            return Err(WeightError::MissingKey(missing.as_str()));
        }
        let sum: u32 = values.values().map(|&v| v as u32).sum();
        if sum != WEIGHT_TOTAL {
            return Err(WeightError::BadSum(sum));
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: K) -> u8 {
        self.values.get(&key).copied().unwrap_or_default()
    }

    /// Keys and values in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (K, u8)> + '_ {
        self.values.iter().map(|(&k, &v)| (k, v))
    }

    pub fn sum(&self) -> u32 {
        self.values.values().map(|&v| v as u32).sum()
    }

    pub fn to_fractions(&self) -> BTreeMap<K, f64> {
        self.iter()
            .map(|(k, v)| (k, v as f64 / WEIGHT_TOTAL as f64))
            .collect()
    }

    /// Raw constructor for callers that have already enforced the sum.
    pub(crate) fn from_values_unchecked(values: BTreeMap<K, u8>) -> Self {
        debug_assert_eq!(
            values.values().map(|&v| v as u32).sum::<u32>(),
            WEIGHT_TOTAL
        );
        Self { values }
    }
}

/// Fractions closer than this to a whole percentage count as that percentage;
/// it only absorbs binary representation error (0.07 * 100 = 7.000000000000001).
const FRACTION_EPSILON: f64 = 1e-6;

/// The whole percentage a preset fraction stands for, or `None` when the
/// fraction is not one (0.304) or is outside 0.0..=1.0.
pub(crate) fn fraction_to_percent(fraction: f64) -> Option<u32> {
    let scaled = fraction * WEIGHT_TOTAL as f64;
    let pct = scaled.round();
    let whole = (scaled - pct).abs() <= FRACTION_EPSILON;
    (whole && (0.0..=WEIGHT_TOTAL as f64).contains(&pct)).then_some(pct as u32)
}

impl<K: WeightKey> Default for WeightSet<K> {
    fn default() -> Self {
        let values = K::ALL
            .iter()
            .copied()
            .zip(K::DEFAULTS.iter().copied())
            .collect();
        Self::from_values_unchecked(values)
    }
}

impl<K: WeightKey> fmt::Display for WeightSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", key.as_str(), value)?;
            first = false;
        }
        Ok(())
    }
}

/// Accepts either positional values (`30,20,50`) or named pairs
/// (`property_fundamentals=30,market_intelligence=20,deal_comps=50`).
impl<K: WeightKey> FromStr for WeightSet<K> {
    type Err = WeightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        let parse_value = |raw: &str| {
            raw.trim()
                .parse::<u32>()
                .map_err(|_| WeightError::InvalidValue(raw.trim().to_string()))
        };

        if parts.iter().any(|p| p.contains('=')) {
            let mut named = Vec::with_capacity(parts.len());
            for part in parts {
                let (name, raw) = part
                    .split_once('=')
                    .ok_or_else(|| WeightError::UnknownKey(part.to_string()))?;
                named.push((name.trim(), parse_value(raw)?));
            }
            Self::from_named(named)
        } else {
            let values = parts
                .into_iter()
                .map(parse_value)
                .collect::<Result<Vec<_>, _>>()?;
            Self::from_ordered(&values)
        }
    }
}

impl<K: WeightKey> Serialize for WeightSet<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key.as_str(), &value)?;
        }
        map.end()
    }
}

impl<'de, K: WeightKey> Deserialize<'de> for WeightSet<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(WeightSetVisitor(PhantomData))
    }
}

/// Keeps every entry in arrival order, so repeated names reach validation
/// instead of overwriting each other.
struct WeightSetVisitor<K>(PhantomData<K>);

impl<'de, K: WeightKey> Visitor<'de> for WeightSetVisitor<K> {
    type Value = WeightSet<K>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a map of {} weight names to percentages", K::GROUP)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries: Vec<(String, u32)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry()? {
            entries.push(entry);
        }
        WeightSet::from_named(entries).map_err(A::Error::custom)
    }
}

/// The layer/metric pair that is loaded, edited and saved as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightProfile {
    #[serde(default)]
    pub layers: WeightSet<LayerKey>,
    #[serde(default)]
    pub metrics: WeightSet<MetricKey>,
}

impl WeightProfile {
    pub fn new(layers: WeightSet<LayerKey>, metrics: WeightSet<MetricKey>) -> Self {
        Self { layers, metrics }
    }
}
