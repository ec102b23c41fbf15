use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::CarCatalog;
use crate::types::CarModelId;

static RE_NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("invalid regex: non-word"));

/// Canonical form shared by catalog keys and lookups: lowercased,
/// punctuation stripped, whitespace collapsed to single spaces, trimmed.
pub fn normalize_name(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let stripped = RE_NON_WORD.replace_all(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Maps free-text car names to catalog model ids, exact match first,
/// token-overlap fuzzy match second.
#[derive(Debug, Clone)]
pub struct CarNameResolver {
    catalog: CarCatalog,
}

impl CarNameResolver {
    pub fn new(catalog: CarCatalog) -> Self {
        CarNameResolver { catalog }
    }

    pub fn builtin() -> Self {
        Self::new(CarCatalog::builtin())
    }

    /// Resolves a free-text car name to its model id, `None` when no
    /// catalog entry qualifies. Callers drop the row on `None`; an
    /// unresolvable name is never a hard failure.
    pub fn resolve(&self, raw: &str) -> Option<CarModelId> {
        let name = normalize_name(raw);
        if let Some(id) = self.catalog.get(&name) {
            return Some(id);
        }
        self.fuzzy(&name)
    }

    /// First catalog entry, in definition order, whose key shares enough
    /// tokens with the input. A key token counts as shared when it
    /// contains an input token or an input token contains it. The
    /// required count is `min(3, key_tokens - 1)`; note a one-token key
    /// therefore requires zero shared tokens and matches any input — all
    /// shipped keys have at least two tokens.
    fn fuzzy(&self, name: &str) -> Option<CarModelId> {
        let input: Vec<&str> = name.split_whitespace().collect();

        for (key, id) in self.catalog.iter() {
            let tokens: Vec<&str> = key.split_whitespace().collect();
            let required = tokens.len().saturating_sub(1).min(3);
            let shared = tokens
                .iter()
                .filter(|kt| input.iter().any(|it| it.contains(*kt) || kt.contains(*it)))
                .count();
            if shared >= required {
                return Some(id);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_punctuation_and_whitespace() {
        assert_eq!(normalize_name("BMW M4 GT3"), "bmw m4 gt3");
        assert_eq!(normalize_name("  Mercedes-AMG   GT3! "), "mercedes amg gt3");
        assert_eq!(normalize_name("Porsche 992 GT3-R"), "porsche 992 gt3r");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn every_builtin_key_resolves_to_its_own_id() {
        let resolver = CarNameResolver::builtin();
        for (key, id) in CarCatalog::builtin().iter() {
            assert_eq!(resolver.resolve(key), Some(id), "key '{key}'");
        }
    }

    #[test]
    fn exact_match_ignores_input_formatting() {
        let resolver = CarNameResolver::builtin();
        assert_eq!(resolver.resolve("BMW M4 GT3"), Some(30));
        assert_eq!(resolver.resolve("Mercedes-AMG GT3"), Some(25));
        assert_eq!(resolver.resolve("  ferrari   296 gt3  "), Some(32));
    }

    #[test]
    fn fuzzy_match_tolerates_extra_tokens() {
        let resolver = CarNameResolver::builtin();
        // Not an exact key, but 3 of 3 key tokens overlap.
        assert_eq!(resolver.resolve("Ferrari 296 GT3 Evo"), Some(32));
        // "gt3r" contains both the "gt3" and "r" key tokens.
        assert_eq!(resolver.resolve("Porsche 992 GT3R"), Some(34));
    }

    #[test]
    fn fuzzy_match_is_deterministic_and_first_wins() {
        let catalog = CarCatalog::new([("alpha beta gamma", 1), ("alpha beta delta", 2)]);
        let resolver = CarNameResolver::new(catalog);
        for _ in 0..3 {
            // Both keys share two tokens; the first in definition order wins.
            assert_eq!(resolver.resolve("alpha beta x"), Some(1));
        }
    }

    #[test]
    fn unknown_name_resolves_to_none() {
        let resolver = CarNameResolver::builtin();
        assert_eq!(resolver.resolve("Toyota Supra"), None);
        assert_eq!(resolver.resolve("Formula Renault"), None);
    }

    #[test]
    fn single_token_key_matches_any_input() {
        // min(3, 1 - 1) = 0 required tokens: such a key accepts every
        // input. Shipped catalogs avoid one-token keys for this reason.
        let resolver = CarNameResolver::new(CarCatalog::new([("solo", 9)]));
        assert_eq!(resolver.resolve("completely unrelated words"), Some(9));
    }
}
