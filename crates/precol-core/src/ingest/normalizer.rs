use serde_json::{Map, Value};
use tracing::debug;

use crate::record::SpeciesUse;

pub const SPECIES_KEY: &str = "especie_cientifica";
pub const COMMON_NAME_KEY: &str = "nombre_comun";
pub const USAGE_KEY: &str = "uso_precolombino";
pub const JUSTIFICATION_KEY: &str = "justificacion_del_uso";

const PLACEHOLDER_SPECIES: &str = "no especificado";

/// One decoded JSON object from a model response.
pub type RawObject = Map<String, Value>;

/// The response layouts the models are known to produce.
#[derive(Debug)]
pub enum RecordShape<'a> {
    /// One species per object, every field a string.
    Scalar {
        species: &'a str,
        common_name: Option<&'a Value>,
        usage: Option<&'a Value>,
    },
    /// One object holding position-aligned lists.
    Parallel {
        species: &'a [Value],
        common_names: Option<&'a [Value]>,
        usages: Option<&'a [Value]>,
    },
    Unsupported,
}

impl<'a> RecordShape<'a> {
    pub fn of(object: &'a RawObject) -> Self {
        match object.get(SPECIES_KEY) {
            Some(Value::String(species)) => Self::Scalar {
                species,
                common_name: object.get(COMMON_NAME_KEY),
                usage: object.get(USAGE_KEY),
            },
            Some(Value::Array(species)) => Self::Parallel {
                species,
                common_names: list_field(object, COMMON_NAME_KEY),
                usages: list_field(object, USAGE_KEY),
            },
            _ => Self::Unsupported,
        }
    }
}

fn list_field<'a>(object: &'a RawObject, key: &str) -> Option<&'a [Value]> {
    object.get(key).and_then(Value::as_array).map(Vec::as_slice)
}

fn text_at<'a>(values: Option<&'a [Value]>, i: usize) -> &'a str {
    values
        .and_then(|v| v.get(i))
        .and_then(Value::as_str)
        .unwrap_or("")
}

/// Flattens heterogeneous model objects into species/use pairs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordNormalizer;

impl RecordNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, objects: &[RawObject]) -> Vec<SpeciesUse> {
        let mut records = Vec::new();

        for object in objects {
            if let Some(quote) = object.get(JUSTIFICATION_KEY).and_then(Value::as_str) {
                debug!("   → inferred use, justified by: {quote}");
            }

            match RecordShape::of(object) {
                RecordShape::Scalar {
                    species,
                    common_name,
                    usage,
                } => records.extend(Self::scalar(species, common_name, usage)),
                RecordShape::Parallel {
                    species,
                    common_names,
                    usages,
                } => records.extend(Self::parallel(species, common_names, usages)),
                RecordShape::Unsupported => {
                    debug!("   → skipping object without a usable {SPECIES_KEY}");
                }
            }
        }

        records
    }

    fn scalar(
        species: &str,
        common_name: Option<&Value>,
        usage: Option<&Value>,
    ) -> Option<SpeciesUse> {
        let species = species.trim();
        let usage = usage.and_then(Value::as_str).unwrap_or("").trim();

        if species.is_empty()
            || usage.is_empty()
            || species.to_lowercase() == PLACEHOLDER_SPECIES
        {
            return None;
        }

        let common_name = common_name.and_then(Value::as_str).unwrap_or("");
        Some(SpeciesUse::new(species, common_name, usage))
    }

    fn parallel(
        species: &[Value],
        common_names: Option<&[Value]>,
        usages: Option<&[Value]>,
    ) -> Vec<SpeciesUse> {
        species
            .iter()
            .enumerate()
            .filter_map(|(i, name)| {
                let name = name.as_str().unwrap_or("").trim();
                let usage = text_at(usages, i).trim();
                if name.is_empty() || usage.is_empty() {
                    return None;
                }
                Some(SpeciesUse::new(name, text_at(common_names, i), usage))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn objects(value: Value) -> Vec<RawObject> {
        match value {
            Value::Object(o) => vec![o],
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::Object(o) => Some(o),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn normalize(value: Value) -> Vec<SpeciesUse> {
        RecordNormalizer::new().normalize(&objects(value))
    }

    #[test]
    fn test_scalar_object() {
        let out = normalize(json!({
            "especie_cientifica": " Zea mays ",
            "nombre_comun": "Maíz ",
            "uso_precolombino": "Alimentación"
        }));

        assert_eq!(out, vec![SpeciesUse::new("Zea mays", "Maíz", "Alimentación")]);
        assert_eq!(out[0].species, "Zea mays");
    }

    #[test]
    fn test_parallel_lists_align_by_position() {
        let out = normalize(json!({
            "especie_cientifica": ["Zea mays", "Persea americana"],
            "nombre_comun": ["Maíz"],
            "uso_precolombino": ["Alimentación", "Culinario"]
        }));

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], SpeciesUse::new("Zea mays", "Maíz", "Alimentación"));
        assert_eq!(out[1].species, "Persea americana");
        assert_eq!(out[1].common_name, "");
        assert_eq!(out[1].usage, "Culinario");
    }

    #[test]
    fn test_placeholder_species_is_rejected() {
        let out = normalize(json!({
            "especie_cientifica": "No Especificado",
            "nombre_comun": "Palma",
            "uso_precolombino": "Construcción"
        }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_scalar_requires_string_usage() {
        assert!(normalize(json!({"especie_cientifica": "Zea mays"})).is_empty());
        assert!(normalize(json!({
            "especie_cientifica": "Zea mays",
            "uso_precolombino": ["Alimentación"]
        }))
        .is_empty());
        assert!(normalize(json!({
            "especie_cientifica": "Zea mays",
            "uso_precolombino": "   "
        }))
        .is_empty());
    }

    #[test]
    fn test_scalar_non_string_common_name_is_empty() {
        let out = normalize(json!({
            "especie_cientifica": "Bixa orellana",
            "nombre_comun": ["Achiote", "Onoto"],
            "uso_precolombino": "Tinte"
        }));
        assert_eq!(out, vec![SpeciesUse::new("Bixa orellana", "", "Tinte")]);
    }

    #[test]
    fn test_parallel_skips_missing_and_empty_entries() {
        let out = normalize(json!({
            "especie_cientifica": ["  ", "Bixa orellana", 42, "Cedrela odorata"],
            "nombre_comun": "no es lista",
            "uso_precolombino": ["Tinte", "Tinte", "Madera"]
        }));

        assert_eq!(out, vec![SpeciesUse::new("Bixa orellana", "", "Tinte")]);
    }

    #[test]
    fn test_parallel_without_usage_list_yields_nothing() {
        let out = normalize(json!({
            "especie_cientifica": ["Zea mays"],
            "uso_precolombino": "Alimentación"
        }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_unsupported_shapes_are_skipped() {
        let out = normalize(json!([
            {"nombre_comun": "Maíz", "uso_precolombino": "Alimentación"},
            {"especie_cientifica": 7, "uso_precolombino": "Alimentación"},
            {"especie_cientifica": null},
            {"especie_cientifica": "Theobroma cacao", "uso_precolombino": "Ritual",
             "justificacion_del_uso": "El cacao se ofrecía en ceremonias."}
        ]));

        assert_eq!(out, vec![SpeciesUse::new("Theobroma cacao", "", "Ritual")]);
    }

    #[test]
    fn test_shape_detection() {
        let scalar = objects(json!({"especie_cientifica": "Zea mays"}));
        let parallel = objects(json!({"especie_cientifica": ["Zea mays"]}));
        let other = objects(json!({"especie_cientifica": {"nombre": "Zea mays"}}));

        assert!(matches!(RecordShape::of(&scalar[0]), RecordShape::Scalar { .. }));
        assert!(matches!(RecordShape::of(&parallel[0]), RecordShape::Parallel { .. }));
        assert!(matches!(RecordShape::of(&other[0]), RecordShape::Unsupported));
    }
}
