use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BandwidthUnit {
    Kb,
    #[default]
    Mb,
    Gb,
}

impl BandwidthUnit {
    pub const ALL: [BandwidthUnit; 3] = [Self::Kb, Self::Mb, Self::Gb];

    pub fn suffix(self) -> char {
        match self {
            Self::Kb => 'K',
            Self::Mb => 'M',
            Self::Gb => 'G',
        }
    }

    pub fn from_suffix(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'K' => Some(Self::Kb),
            'M' => Some(Self::Mb),
            'G' => Some(Self::Gb),
            _ => None,
        }
    }
}

impl fmt::Display for BandwidthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Kb => "Kb",
            Self::Mb => "Mb",
            Self::Gb => "Gb",
        })
    }
}

impl FromStr for BandwidthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kb" | "k" => Ok(Self::Kb),
            "mb" | "m" => Ok(Self::Mb),
            "gb" | "g" => Ok(Self::Gb),
            _ => Err(format!("unknown bandwidth unit {s:?}, expected Kb, Mb or Gb")),
        }
    }
}

/// `"24"` + `Mb` → `"24M"`. A blank value means no limit.
pub fn compose(raw: &str, unit: BandwidthUnit) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    Some(format!("{raw}{}", unit.suffix()))
}

/// Split a stored limit such as `"1.5g"` into its number and unit. Values
/// that are not `<decimal><K|M|G>` are not understood.
pub fn decompose(value: &str) -> Option<(String, BandwidthUnit)> {
    let (idx, suffix) = value.char_indices().last()?;
    let unit = BandwidthUnit::from_suffix(suffix)?;
    let number = &value[..idx];
    is_decimal(number).then(|| (number.to_string(), unit))
}

fn is_decimal(s: &str) -> bool {
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    match s.split_once('.') {
        Some((int, frac)) => digits(int) && digits(frac),
        None => digits(s),
    }
}

/// The raw number plus unit selector behind one bandwidth input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BandwidthField {
    pub raw: String,
    pub unit: BandwidthUnit,
}

impl BandwidthField {
    pub fn new(raw: impl Into<String>, unit: BandwidthUnit) -> Self {
        Self {
            raw: raw.into(),
            unit,
        }
    }

    /// Populate from a stored value, leaving defaults when it cannot be read.
    pub fn from_value(value: Option<&str>) -> Self {
        value
            .and_then(decompose)
            .map(|(raw, unit)| Self { raw, unit })
            .unwrap_or_default()
    }

    pub fn value(&self) -> Option<String> {
        compose(&self.raw, self.unit)
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("24", BandwidthUnit::Mb, Some("24M") ; "megabits")]
    #[test_case("512", BandwidthUnit::Kb, Some("512K") ; "kilobits")]
    #[test_case("1.5", BandwidthUnit::Gb, Some("1.5G") ; "fractional gigabits")]
    #[test_case("", BandwidthUnit::Gb, None ; "blank")]
    fn composes(raw: &str, unit: BandwidthUnit, expected: Option<&str>) {
        assert_eq!(compose(raw, unit).as_deref(), expected);
    }

    #[test_case("24M", Some(("24", BandwidthUnit::Mb)) ; "megabits")]
    #[test_case("10k", Some(("10", BandwidthUnit::Kb)) ; "lowercase suffix")]
    #[test_case("2.5G", Some(("2.5", BandwidthUnit::Gb)) ; "fractional")]
    #[test_case("24", None ; "missing unit")]
    #[test_case("M", None ; "missing number")]
    #[test_case("1.M", None ; "dangling point")]
    #[test_case("24T", None ; "unknown unit")]
    #[test_case("", None ; "empty")]
    fn decomposes(value: &str, expected: Option<(&str, BandwidthUnit)>) {
        let got = decompose(value);
        assert_eq!(got.as_ref().map(|(r, u)| (r.as_str(), *u)), expected);
    }

    #[test]
    fn unreadable_value_keeps_defaults() {
        let field = BandwidthField::from_value(Some("fast"));
        assert_eq!(field, BandwidthField::default());
        assert_eq!(field.unit, BandwidthUnit::Mb);
        assert_eq!(field.value(), None);
    }

    #[test]
    fn edit_then_recompose() {
        let mut field = BandwidthField::from_value(Some("24M"));
        field.unit = BandwidthUnit::Gb;
        assert_eq!(field.value().as_deref(), Some("24G"));
        field.clear();
        assert_eq!(field.value(), None);
    }
}
