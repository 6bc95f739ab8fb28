//! Fixed sentence tables rendered for each (dimension, tier) pair.
//!
//! The wording matches the labels already present in historical data files,
//! so these strings must not be reworded.

use crate::models::{Dimension, Tier};

/// Sentence used when there is nothing to report
pub const NO_RECOMMENDATION: &str = "Aucune recommandation spécifique.";

/// One-sentence status statement for a dimension at a tier
pub fn status_sentence(dimension: Dimension, tier: Tier) -> String {
    let column = dimension.column();
    match tier {
        Tier::Optimal => format!("{column} est dans la plage optimale."),
        Tier::Good => format!("{column} est dans la plage bonne, mais pourrait être amélioré."),
        Tier::Critical => format!("{column} est critique. Des ajustements sont nécessaires."),
        Tier::Dangerous => {
            format!("{column} est dangereux. Des mesures immédiates sont requises.")
        }
    }
}

/// One-sentence agronomic guidance for a dimension at a tier
pub fn guidance(dimension: Dimension, tier: Tier) -> &'static str {
    match (dimension, tier) {
        (Dimension::Temperature, Tier::Optimal) => {
            "La température est parfaite pour une croissance optimale des plantes."
        }
        (Dimension::Temperature, Tier::Good) => {
            "La température est adéquate, mais vous pourriez surveiller de près pour éviter des fluctuations."
        }
        (Dimension::Temperature, Tier::Critical) => {
            "La température devient critique. Ajustez l'irrigation ou l'ombrage pour éviter des dommages."
        }
        (Dimension::Temperature, Tier::Dangerous) => {
            "Les températures sont dangereuses. Prenez immédiatement des mesures pour protéger vos cultures."
        }

        (Dimension::Humidity, Tier::Optimal) => {
            "L'humidité est parfaite pour une bonne absorption de l'eau par les plantes."
        }
        (Dimension::Humidity, Tier::Good) => {
            "L'humidité est bonne, mais vérifiez l'irrigation pour maintenir ces niveaux."
        }
        (Dimension::Humidity, Tier::Critical) => {
            "L'humidité est critique. Vous devriez ajuster l'irrigation pour éviter un stress hydrique."
        }
        (Dimension::Humidity, Tier::Dangerous) => {
            "L'humidité est dangereusement élevée ou basse. Des actions immédiates sont nécessaires."
        }

        (Dimension::Nutrients, Tier::Optimal) => {
            "Les niveaux de nutriments sont parfaits, garantissant une croissance saine."
        }
        (Dimension::Nutrients, Tier::Good) => {
            "Les nutriments sont bons. Continuez à surveiller et ajuster si nécessaire."
        }
        (Dimension::Nutrients, Tier::Critical) => {
            "Les niveaux de nutriments sont critiques. Envisagez d'ajouter des engrais spécifiques."
        }
        (Dimension::Nutrients, Tier::Dangerous) => {
            "Les niveaux de nutriments sont trop bas ou trop élevés. Corrigez immédiatement pour éviter des pertes."
        }

        (Dimension::Ph, Tier::Optimal) => {
            "Le pH du sol est parfait pour une absorption optimale des nutriments."
        }
        (Dimension::Ph, Tier::Good) => {
            "Le pH est acceptable, mais surveillez-le pour maintenir cette bonne condition."
        }
        (Dimension::Ph, Tier::Critical) => {
            "Le pH est critique. Vous devriez envisager des amendements pour ajuster les niveaux."
        }
        (Dimension::Ph, Tier::Dangerous) => {
            "Le pH est dangereux. Corrigez immédiatement pour éviter des blocages de nutriments."
        }
    }
}

/// Space-join sentences, falling back to [`NO_RECOMMENDATION`] when empty
pub fn join_sentences<I, S>(sentences: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<S> = sentences.into_iter().collect();
    if parts.is_empty() {
        return NO_RECOMMENDATION.to_string();
    }

    parts
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<&str>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn test_status_sentences_use_column_labels() {
        assert_eq!(
            status_sentence(Dimension::Temperature, Tier::Optimal),
            "Temperature (°C) est dans la plage optimale."
        );
        assert_eq!(
            status_sentence(Dimension::Ph, Tier::Dangerous),
            "pH est dangereux. Des mesures immédiates sont requises."
        );
        assert_eq!(
            status_sentence(Dimension::Nutrients, Tier::Good),
            "Nutrients (g/L) est dans la plage bonne, mais pourrait être amélioré."
        );
    }

    #[test]
    fn test_sixteen_distinct_sentences_each() {
        let mut statuses = HashSet::new();
        let mut advice = HashSet::new();
        for dimension in Dimension::all() {
            for tier in Tier::iter() {
                statuses.insert(status_sentence(dimension, tier));
                advice.insert(guidance(dimension, tier));
            }
        }
        assert_eq!(statuses.len(), 16);
        assert_eq!(advice.len(), 16);
    }

    #[test]
    fn test_join_sentences() {
        assert_eq!(join_sentences(["a.", "b."]), "a. b.");
        assert_eq!(join_sentences(Vec::<String>::new()), NO_RECOMMENDATION);
    }
}
