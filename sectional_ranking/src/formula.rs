/*!
Rendering of the overall-score formula as LaTeX.

The formula is built from the same [`WeightSnapshot`] that is handed to
[`crate::run_ranking`], so the terms and the denominator always describe the
ranking that is displayed next to it.
*/

use crate::weights::WeightSnapshot;

/// Display wrapping of the numerator.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct FormulaLayout {
    /// Number of terms per line. Zero puts every term on one line.
    pub terms_per_line: usize,
}

impl Default for FormulaLayout {
    fn default() -> Self {
        FormulaLayout { terms_per_line: 3 }
    }
}

/// One `weight × indicator` term.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FormulaTerm {
    pub weight: u32,
    /// The indicator name, already sanitized.
    pub label: String,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Formula {
    pub terms: Vec<FormulaTerm>,
    pub denominator: u64,
}

impl Formula {
    pub fn from_weights(weights: &WeightSnapshot) -> Formula {
        Formula {
            terms: weights
                .iter()
                .map(|(name, w)| FormulaTerm {
                    weight: *w,
                    label: sanitize_name(name),
                })
                .collect(),
            denominator: weights.total(),
        }
    }

    pub fn to_latex(&self, layout: &FormulaLayout) -> String {
        let terms: Vec<String> = self
            .terms
            .iter()
            .map(|t| format!("{} \\times \\text{{{}}}", t.weight, t.label))
            .collect();
        let chunk = if layout.terms_per_line == 0 {
            terms.len().max(1)
        } else {
            layout.terms_per_line
        };
        let lines: Vec<String> = terms.chunks(chunk).map(|c| c.join(" + ")).collect();
        let numerator = lines.join(" \\\\\n    & ");

        let mut res = String::new();
        res.push_str("\\begin{equation*}\n");
        res.push_str("\\text{Ranking} =\n");
        res.push_str("\\frac{\n");
        res.push_str("    \\begin{aligned}\n");
        res.push_str(&format!("    & {}\n", numerator));
        res.push_str("    \\end{aligned}\n");
        res.push_str(&format!("}}{{{}}}\n", self.denominator));
        res.push_str("\\end{equation*}\n");
        res
    }
}

/// Renders the weighted-mean formula for a weight snapshot.
pub fn render_formula(weights: &WeightSnapshot, layout: &FormulaLayout) -> String {
    Formula::from_weights(weights).to_latex(layout)
}

/// Makes an indicator name safe to embed in `\text{...}`.
///
/// LaTeX specials are escaped, Spanish opening and closing punctuation is
/// dropped and accented vowels and `ñ` are reduced to ASCII. Nothing else is
/// touched.
pub fn sanitize_name(text: &str) -> String {
    let mut res = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '%' | '&' | '_' | '#' | '$' | '{' | '}' => {
                res.push('\\');
                res.push(c);
            }
            '^' => res.push_str("\\^{}"),
            '¿' | '?' | '¡' | '!' => {}
            'á' => res.push('a'),
            'é' => res.push('e'),
            'í' => res.push('i'),
            'ó' => res.push('o'),
            'ú' => res.push('u'),
            'ñ' => res.push('n'),
            'Á' => res.push('A'),
            'É' => res.push('E'),
            'Í' => res.push('I'),
            'Ó' => res.push('O'),
            'Ú' => res.push('U'),
            'Ñ' => res.push('N'),
            _ => res.push(c),
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::{WeightRange, WeightStore};
    use std::collections::HashMap;

    #[test]
    fn sanitize_special_characters() {
        assert_eq!(
            sanitize_name("¿La cuota cubre costos de O&M?"),
            "La cuota cubre costos de O\\&M"
        );
        assert_eq!(sanitize_name("Población"), "Poblacion");
        assert_eq!(sanitize_name("Índice 100%"), "Indice 100\\%");
        assert_eq!(sanitize_name("a_b#c$d{e}"), "a\\_b\\#c\\$d\\{e\\}");
        assert_eq!(sanitize_name("x^2 ¡ya!"), "x\\^{}2 ya");
        assert_eq!(sanitize_name("Antigüedad año"), "Antigüedad ano");
    }

    #[test]
    fn render_small_formula() {
        let w = WeightSnapshot::from_pairs(&[("A", 1), ("B", 3)]);
        let expected = "\\begin{equation*}\n\
                        \\text{Ranking} =\n\
                        \\frac{\n    \\begin{aligned}\n    \
                        & 1 \\times \\text{A} + 3 \\times \\text{B}\n    \
                        \\end{aligned}\n}{4}\n\
                        \\end{equation*}\n";
        assert_eq!(render_formula(&w, &FormulaLayout::default()), expected);
    }

    #[test]
    fn terms_are_wrapped_by_layout() {
        let w = WeightSnapshot::from_pairs(&[("A", 1), ("B", 2), ("C", 3), ("D", 4), ("E", 5)]);
        let two = render_formula(&w, &FormulaLayout { terms_per_line: 2 });
        assert_eq!(two.matches(" \\\\\n").count(), 2);
        let three = render_formula(&w, &FormulaLayout::default());
        assert_eq!(three.matches(" \\\\\n").count(), 1);
        let single = render_formula(&w, &FormulaLayout { terms_per_line: 0 });
        assert_eq!(single.matches(" \\\\\n").count(), 0);
        assert!(single.contains("}{15}"));
    }

    #[test]
    fn formula_tracks_weight_updates() {
        let names: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        let mut store = WeightStore::new(WeightRange::STANDARD);
        store.initialize(&names, &HashMap::new());
        let updates: [(&str, i64); 6] = [
            ("A", 10),
            ("C", 4),
            ("B", 0), // rejected
            ("D", 7),
            ("A", 2),
            ("Z", 3), // rejected
        ];
        for (name, value) in updates {
            let _ = store.set(name, value);
            let snapshot = store.snapshot();
            let formula = Formula::from_weights(&snapshot);
            assert_eq!(formula.terms.len(), snapshot.len());
            assert_eq!(formula.denominator, snapshot.total());
            let text = formula.to_latex(&FormulaLayout::default());
            assert_eq!(text.matches(" \\times ").count(), names.len());
            assert!(text.contains(&format!("}}{{{}}}", snapshot.total())));
        }
        assert_eq!(store.snapshot().total(), 2 + 1 + 4 + 7);
    }
}
