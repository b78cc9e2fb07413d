use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// JSON field names of the design parameter set.
pub mod field {
    pub const BAND_RADIUS: &str = "bandRadius";
    pub const BAND_THICKNESS: &str = "bandThickness";
    pub const BAND_WIDTH: &str = "bandWidth";
    pub const GEM_COUNT: &str = "gemCount";
    pub const GEM_SIZE: &str = "gemSize";
    pub const GEM_HEIGHT: &str = "gemHeight";
    pub const FINISH: &str = "finish";
    pub const PROFILE: &str = "profile";
    pub const ENGRAVING: &str = "engraving";
    pub const GEM_SHAPE: &str = "gemShape";
    pub const TWIST: &str = "twist";
}

/// First schema violation found in a parameter payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{message}", field_prefix(.field))]
pub struct SchemaError {
    pub field: Option<String>,
    pub message: String,
}

impl SchemaError {
    fn at(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.to_string()),
            message: message.into(),
        }
    }

    fn root(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

fn field_prefix(field: &Option<String>) -> String {
    field
        .as_deref()
        .map(|name| format!("{name}: "))
        .unwrap_or_default()
}

/// Closed numeric interval for a single parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
    pub integer: bool,
}

impl NumericRange {
    const fn real(field: &'static str, min: f64, max: f64) -> Self {
        Self {
            field,
            min,
            max,
            integer: false,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite()
            && value >= self.min
            && value <= self.max
            && (!self.integer || value.fract() == 0.0)
    }

    fn check(&self, value: f64) -> Result<f64, SchemaError> {
        if !value.is_finite() {
            return Err(SchemaError::at(self.field, "expected a finite number"));
        }
        if self.integer && value.fract() != 0.0 {
            return Err(SchemaError::at(self.field, "expected an integer"));
        }
        if value < self.min {
            return Err(SchemaError::at(
                self.field,
                format!("must be greater than or equal to {}", self.min),
            ));
        }
        if value > self.max {
            return Err(SchemaError::at(
                self.field,
                format!("must be less than or equal to {}", self.max),
            ));
        }
        Ok(value)
    }
}

pub const BAND_RADIUS: NumericRange = NumericRange::real(field::BAND_RADIUS, 0.7, 1.6);
pub const BAND_THICKNESS: NumericRange = NumericRange::real(field::BAND_THICKNESS, 0.05, 0.22);
pub const BAND_WIDTH: NumericRange = NumericRange::real(field::BAND_WIDTH, 0.08, 0.45);
pub const GEM_COUNT: NumericRange = NumericRange {
    field: field::GEM_COUNT,
    min: 0.0,
    max: 7.0,
    integer: true,
};
pub const GEM_SIZE: NumericRange = NumericRange::real(field::GEM_SIZE, 0.05, 0.25);
pub const GEM_HEIGHT: NumericRange = NumericRange::real(field::GEM_HEIGHT, 0.0, 0.22);
pub const TWIST: NumericRange = NumericRange::real(field::TWIST, 0.0, 1.0);

/// Numeric ranges in schema order.
pub const NUMERIC_RANGES: [NumericRange; 7] = [
    BAND_RADIUS,
    BAND_THICKNESS,
    BAND_WIDTH,
    GEM_COUNT,
    GEM_SIZE,
    GEM_HEIGHT,
    TWIST,
];

macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];
            pub const NAMES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            pub fn parse(text: &str) -> Option<Self> {
                match text {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_enum! {
    /// Metal preset of the band.
    Finish {
        YellowGold => "yellow_gold",
        WhiteGold => "white_gold",
        RoseGold => "rose_gold",
        Silver => "silver",
        Platinum => "platinum",
    }
}

choice_enum! {
    /// Band cross-section class; drives tessellation density.
    Profile {
        Classic => "classic",
        Comfort => "comfort",
        Court => "court",
    }
}

choice_enum! {
    /// Decorative pattern applied to the band.
    Engraving {
        None => "none",
        Line => "line",
        Chevron => "chevron",
        Dots => "dots",
        Twist => "twist",
    }
}

choice_enum! {
    /// Gem silhouette.
    GemShape {
        Round => "round",
        Princess => "princess",
        Oval => "oval",
        Marquise => "marquise",
    }
}

/// Enumerated field name with its legal values, in schema order.
pub const CHOICE_FIELDS: [(&str, &[&str]); 4] = [
    (field::FINISH, Finish::NAMES),
    (field::PROFILE, Profile::NAMES),
    (field::ENGRAVING, Engraving::NAMES),
    (field::GEM_SHAPE, GemShape::NAMES),
];

/// Complete, always-valid ring geometry parameters.
///
/// Deserialization runs the full schema, so a `DesignParams` obtained from JSON
/// is guaranteed to be in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct DesignParams {
    pub band_radius: f64,
    pub band_thickness: f64,
    pub band_width: f64,
    pub gem_count: u32,
    pub gem_size: f64,
    pub gem_height: f64,
    pub finish: Finish,
    pub profile: Profile,
    pub engraving: Engraving,
    pub gem_shape: GemShape,
    pub twist: f64,
}

/// Fallback and seed for every parameter operation.
pub const DEFAULT_PARAMS: DesignParams = DesignParams {
    band_radius: 1.0,
    band_thickness: 0.1,
    band_width: 0.2,
    gem_count: 1,
    gem_size: 0.18,
    gem_height: 0.02,
    finish: Finish::YellowGold,
    profile: Profile::Comfort,
    engraving: Engraving::Line,
    gem_shape: GemShape::Round,
    twist: 0.35,
};

impl Default for DesignParams {
    fn default() -> Self {
        DEFAULT_PARAMS
    }
}

impl DesignParams {
    /// Re-validates the numeric fields of a typed instance.
    pub fn check(&self) -> Result<(), SchemaError> {
        BAND_RADIUS.check(self.band_radius)?;
        BAND_THICKNESS.check(self.band_thickness)?;
        BAND_WIDTH.check(self.band_width)?;
        GEM_COUNT.check(f64::from(self.gem_count))?;
        GEM_SIZE.check(self.gem_size)?;
        GEM_HEIGHT.check(self.gem_height)?;
        TWIST.check(self.twist)?;
        Ok(())
    }
}

impl TryFrom<Value> for DesignParams {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        validate_full(&value)
    }
}

/// Parameter payload in which every field is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PartialParams {
    pub band_radius: Option<f64>,
    pub band_thickness: Option<f64>,
    pub band_width: Option<f64>,
    pub gem_count: Option<u32>,
    pub gem_size: Option<f64>,
    pub gem_height: Option<f64>,
    pub finish: Option<Finish>,
    pub profile: Option<Profile>,
    pub engraving: Option<Engraving>,
    pub gem_shape: Option<GemShape>,
    pub twist: Option<f64>,
}

impl PartialParams {
    /// Shallow merge: present fields override `base`.
    pub fn merge_over(self, base: DesignParams) -> DesignParams {
        DesignParams {
            band_radius: self.band_radius.unwrap_or(base.band_radius),
            band_thickness: self.band_thickness.unwrap_or(base.band_thickness),
            band_width: self.band_width.unwrap_or(base.band_width),
            gem_count: self.gem_count.unwrap_or(base.gem_count),
            gem_size: self.gem_size.unwrap_or(base.gem_size),
            gem_height: self.gem_height.unwrap_or(base.gem_height),
            finish: self.finish.unwrap_or(base.finish),
            profile: self.profile.unwrap_or(base.profile),
            engraving: self.engraving.unwrap_or(base.engraving),
            gem_shape: self.gem_shape.unwrap_or(base.gem_shape),
            twist: self.twist.unwrap_or(base.twist),
        }
    }

    fn complete(self) -> Option<DesignParams> {
        Some(DesignParams {
            band_radius: self.band_radius?,
            band_thickness: self.band_thickness?,
            band_width: self.band_width?,
            gem_count: self.gem_count?,
            gem_size: self.gem_size?,
            gem_height: self.gem_height?,
            finish: self.finish?,
            profile: self.profile?,
            engraving: self.engraving?,
            gem_shape: self.gem_shape?,
            twist: self.twist?,
        })
    }
}

/// Validates a payload where every field is optional. Unknown keys are ignored.
pub fn validate_partial(value: &Value) -> Result<PartialParams, SchemaError> {
    read_fields(expect_object(value)?, false)
}

/// Validates a payload that must carry every field.
pub fn validate_full(value: &Value) -> Result<DesignParams, SchemaError> {
    read_fields(expect_object(value)?, true)?
        .complete()
        .ok_or_else(|| SchemaError::root("incomplete design parameters"))
}

fn expect_object(value: &Value) -> Result<&Map<String, Value>, SchemaError> {
    value
        .as_object()
        .ok_or_else(|| SchemaError::root(format!("expected object, received {}", kind_of(value))))
}

fn read_fields(object: &Map<String, Value>, required: bool) -> Result<PartialParams, SchemaError> {
    Ok(PartialParams {
        band_radius: read_number(object, &BAND_RADIUS, required)?,
        band_thickness: read_number(object, &BAND_THICKNESS, required)?,
        band_width: read_number(object, &BAND_WIDTH, required)?,
        // Range check guarantees an integer in [0, 7].
        gem_count: read_number(object, &GEM_COUNT, required)?.map(|count| count as u32),
        gem_size: read_number(object, &GEM_SIZE, required)?,
        gem_height: read_number(object, &GEM_HEIGHT, required)?,
        finish: read_choice(object, field::FINISH, Finish::parse, Finish::NAMES, required)?,
        profile: read_choice(object, field::PROFILE, Profile::parse, Profile::NAMES, required)?,
        engraving: read_choice(
            object,
            field::ENGRAVING,
            Engraving::parse,
            Engraving::NAMES,
            required,
        )?,
        gem_shape: read_choice(
            object,
            field::GEM_SHAPE,
            GemShape::parse,
            GemShape::NAMES,
            required,
        )?,
        twist: read_number(object, &TWIST, required)?,
    })
}

fn read_number(
    object: &Map<String, Value>,
    range: &NumericRange,
    required: bool,
) -> Result<Option<f64>, SchemaError> {
    let Some(raw) = object.get(range.field) else {
        return missing(range.field, required);
    };
    let value = coerce_number(raw).ok_or_else(|| {
        SchemaError::at(
            range.field,
            format!("expected number, received {}", kind_of(raw)),
        )
    })?;
    range.check(value).map(Some)
}

fn read_choice<T>(
    object: &Map<String, Value>,
    name: &str,
    parse: fn(&str) -> Option<T>,
    names: &[&str],
    required: bool,
) -> Result<Option<T>, SchemaError> {
    let Some(raw) = object.get(name) else {
        return missing(name, required);
    };
    raw.as_str()
        .and_then(parse)
        .map(Some)
        .ok_or_else(|| SchemaError::at(name, format!("expected one of: {}", names.join(", "))))
}

fn missing<T>(name: &str, required: bool) -> Result<Option<T>, SchemaError> {
    if required {
        Err(SchemaError::at(name, "Required"))
    } else {
        Ok(None)
    }
}

/// Converts numeric-like JSON into a number.
///
/// Strings are trimmed and parsed (blank strings read as zero), booleans map to
/// 1/0 and `null` reads as zero. Arrays and objects are never numeric.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
