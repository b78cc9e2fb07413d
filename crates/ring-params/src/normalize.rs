use serde_json::Value;

use crate::schema::{DesignParams, validate_partial};

/// Turns arbitrary input into a complete, valid parameter set.
///
/// Any schema violation in the input discards the whole payload in favour of
/// the defaults; otherwise the accepted fields are merged over the defaults and
/// the merged set is checked again before it is returned.
pub fn normalize(raw: &Value) -> DesignParams {
    let Ok(partial) = validate_partial(raw) else {
        return DesignParams::default();
    };

    let merged = partial.merge_over(DesignParams::default());
    match merged.check() {
        Ok(()) => merged,
        Err(_) => DesignParams::default(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::{Map, Value, json};

    use super::normalize;
    use crate::schema::{DEFAULT_PARAMS, DesignParams, Engraving, Finish, GemShape, validate_full};

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-10.0f64..10.0).prop_map(|n| json!(n)),
            (0u32..10).prop_map(|n| json!(n)),
            prop_oneof![
                Just("yellow_gold".to_string()),
                Just("court".to_string()),
                Just("copper".to_string()),
                Just("0.5".to_string()),
                "[a-z ]{0,8}",
            ]
            .prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 6, |inner| {
            let keys = prop_oneof![
                Just("bandRadius".to_string()),
                Just("gemCount".to_string()),
                Just("finish".to_string()),
                Just("twist".to_string()),
                Just("gemHeight".to_string()),
                "[a-z]{1,6}",
            ];
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map(keys, inner, 0..5)
                    .prop_map(|map| Value::Object(map.into_iter().collect::<Map<_, _>>())),
            ]
        })
    }

    fn arb_valid_subset() -> impl Strategy<Value = Map<String, Value>> {
        (
            prop::option::of(0.7f64..=1.6),
            prop::option::of(0u32..=7),
            prop::option::of(prop::sample::select(Finish::NAMES.to_vec())),
            prop::option::of(prop::sample::select(GemShape::NAMES.to_vec())),
            prop::option::of(0.0f64..=1.0),
        )
            .prop_map(|(radius, count, finish, shape, twist)| {
                let mut map = Map::new();
                if let Some(radius) = radius {
                    map.insert("bandRadius".into(), json!(radius));
                }
                if let Some(count) = count {
                    map.insert("gemCount".into(), json!(count));
                }
                if let Some(finish) = finish {
                    map.insert("finish".into(), json!(finish));
                }
                if let Some(shape) = shape {
                    map.insert("gemShape".into(), json!(shape));
                }
                if let Some(twist) = twist {
                    map.insert("twist".into(), json!(twist));
                }
                map
            })
    }

    #[test]
    fn non_objects_fall_back_to_defaults() {
        for raw in [json!(null), json!([]), json!("ring"), json!(3.5), json!({})] {
            assert_eq!(normalize(&raw), DEFAULT_PARAMS, "input {raw}");
        }
    }

    #[test]
    fn out_of_range_field_discards_whole_payload() {
        assert_eq!(normalize(&json!({"bandRadius": 5})), DEFAULT_PARAMS);
        assert_eq!(
            normalize(&json!({"bandRadius": 5, "gemCount": 3, "finish": "silver"})),
            DEFAULT_PARAMS
        );
    }

    #[test]
    fn invalid_enum_discards_whole_payload() {
        assert_eq!(normalize(&json!({"finish": "copper"})), DEFAULT_PARAMS);
        assert_eq!(
            normalize(&json!({"finish": "copper", "twist": 0.9})),
            DEFAULT_PARAMS
        );
    }

    #[test]
    fn valid_subset_overrides_only_given_fields() {
        let params = normalize(&json!({
            "gemCount": 4,
            "engraving": "dots",
            "bandWidth": "0.3",
            "symbols": ["ignored"]
        }));

        assert_eq!(
            params,
            DesignParams {
                gem_count: 4,
                engraving: Engraving::Dots,
                band_width: 0.3,
                ..DEFAULT_PARAMS
            }
        );
    }

    #[test]
    fn fully_valid_object_is_kept_verbatim() {
        let full = DesignParams {
            band_radius: 1.4,
            band_thickness: 0.22,
            band_width: 0.08,
            gem_count: 0,
            gem_size: 0.05,
            gem_height: 0.0,
            finish: Finish::Platinum,
            profile: crate::schema::Profile::Court,
            engraving: Engraving::Chevron,
            gem_shape: GemShape::Princess,
            twist: 1.0,
        };
        let raw = serde_json::to_value(full).expect("params should serialize");
        assert_eq!(normalize(&raw), full);
    }

    proptest! {
        #[test]
        fn normalize_is_total_and_valid(raw in arb_json()) {
            let params = normalize(&raw);
            let reencoded = serde_json::to_value(params).expect("params should serialize");
            prop_assert!(validate_full(&reencoded).is_ok());
            prop_assert!(params.check().is_ok());
        }

        #[test]
        fn normalize_is_idempotent(raw in arb_json()) {
            let once = normalize(&raw);
            let reencoded = serde_json::to_value(once).expect("params should serialize");
            prop_assert_eq!(normalize(&reencoded), once);
        }

        #[test]
        fn subsets_override_defaults_field_by_field(subset in arb_valid_subset()) {
            let params = normalize(&Value::Object(subset.clone()));
            let encoded = serde_json::to_value(params).expect("params should serialize");
            let defaults = serde_json::to_value(DEFAULT_PARAMS).expect("defaults should serialize");
            let encoded = encoded.as_object().expect("object");
            let defaults = defaults.as_object().expect("object");

            for (key, value) in encoded {
                match subset.get(key) {
                    Some(given) => prop_assert!(same_json(given, value), "{}: {} vs {}", key, given, value),
                    None => prop_assert_eq!(value, &defaults[key]),
                }
            }
        }
    }

    fn same_json(left: &Value, right: &Value) -> bool {
        match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => (a - b).abs() < 1e-12,
            _ => left == right,
        }
    }
}
