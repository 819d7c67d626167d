//! The indicator schema of the rural water and sanitation provider dashboards.

use std::collections::HashMap;

use crate::config::*;

/// First column of the indicator block in the source spreadsheet.
pub const FIRST_INDICATOR: &str = "Índice de servicios brindados";
/// Last column of the indicator block in the source spreadsheet.
pub const LAST_INDICATOR: &str = "Distancia a la EP";

const DEFAULT_WEIGHTS: [(&str, u32); 17] = [
    ("Índice de servicios brindados", 4),
    ("Conexiones totales de agua", 6),
    ("Conexiones totales de alcantarillado", 1),
    ("Población", 6),
    ("¿La OC cuenta con reconocimiento de la muni?", 1),
    ("¿Recibió asistencia técnica en los últimos 3 años?", 1),
    ("Ind cuota", 4),
    ("¿Cobra cuota?", 1),
    ("Porcentaje de usuarios no morosos", 1),
    ("¿La cuota cubre costos de O&M?", 2),
    ("Índice continuidad horas semana", 1),
    ("¿Realiza cloración?", 1),
    ("¿El sistema cuenta con equipo clorador?", 1),
    ("Estado operativo del reservorio", 1),
    ("Antigüedad promedio del sistema", 2),
    ("Antigüedad máxima del sistema", 2),
    ("Distancia a la EP", 9),
];

/// The indicators of the built-in schema, in spreadsheet order.
pub fn default_indicators() -> Vec<String> {
    DEFAULT_WEIGHTS.iter().map(|(n, _)| n.to_string()).collect()
}

pub fn default_weights() -> HashMap<String, u32> {
    DEFAULT_WEIGHTS
        .iter()
        .map(|(n, w)| (n.to_string(), *w))
        .collect()
}

/// The sections of the built-in schema.
///
/// "Formalidad" and "Asistencia técnica" both list the municipal recognition
/// indicator, as the dashboards do. Whether the technical assistance section
/// should point at the technical assistance indicator instead is still open;
/// until then the schema is only accepted under
/// [`SharedIndicatorPolicy::Allow`].
pub fn default_sections() -> Vec<Section> {
    vec![
        Section::new(
            "Índice de servicios brindados",
            &["Índice de servicios brindados"],
        ),
        Section::new(
            "Tamaño",
            &[
                "Conexiones totales de agua",
                "Conexiones totales de alcantarillado",
                "Población",
            ],
        ),
        Section::new(
            "Formalidad",
            &["¿La OC cuenta con reconocimiento de la muni?"],
        ),
        Section::new(
            "Asistencia técnica",
            &["¿La OC cuenta con reconocimiento de la muni?"],
        ),
        Section::new(
            "Cuota",
            &[
                "Ind cuota",
                "¿Cobra cuota?",
                "Porcentaje de usuarios no morosos",
                "¿La cuota cubre costos de O&M?",
            ],
        ),
        Section::new(
            "Calidad del servicio",
            &[
                "Índice continuidad horas semana",
                "¿Realiza cloración?",
                "¿El sistema cuenta con equipo clorador?",
            ],
        ),
        Section::new(
            "Estado del sistema",
            &[
                "Estado operativo del reservorio",
                "Antigüedad promedio del sistema",
                "Antigüedad máxima del sistema",
            ],
        ),
        Section::new("Distancia a la EP", &["Distancia a la EP"]),
    ]
}

pub fn default_schema(policy: SharedIndicatorPolicy) -> Result<SectionSchema, RankingErrors> {
    SectionSchema::new(default_sections(), policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_match_indicator_list() {
        let indicators = default_indicators();
        assert_eq!(indicators.first().map(|s| s.as_str()), Some(FIRST_INDICATOR));
        assert_eq!(indicators.last().map(|s| s.as_str()), Some(LAST_INDICATOR));
        assert_eq!(default_weights().len(), indicators.len());
    }

    #[test]
    fn every_section_indicator_is_known() {
        let indicators = default_indicators();
        for s in default_sections() {
            for i in s.indicators.iter() {
                assert!(indicators.contains(i), "{:?} in {:?}", i, s.name);
            }
        }
    }

    #[test]
    fn shared_indicator_depends_on_policy() {
        assert!(default_schema(SharedIndicatorPolicy::Allow).is_ok());
        let err = default_schema(SharedIndicatorPolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            RankingErrors::DuplicateSectionIndicator {
                indicator: "¿La OC cuenta con reconocimiento de la muni?".to_string(),
                first: "Formalidad".to_string(),
                second: "Asistencia técnica".to_string(),
            }
        );
    }
}
