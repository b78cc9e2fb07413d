pub mod normalize;
pub mod schema;
pub mod symbols;

pub use normalize::normalize;
pub use schema::{
    CHOICE_FIELDS, DEFAULT_PARAMS, DesignParams, Engraving, Finish, GemShape, NUMERIC_RANGES,
    NumericRange, PartialParams, Profile, SchemaError, coerce_number, field, validate_full,
    validate_partial,
};
pub use symbols::{MAX_SYMBOL_CHARS, MAX_SYMBOLS, clean_symbols};
