//! Load-time expansion of wildcard recipe templates.
//!
//! Every single-code ingredient whose path contains `*` defines a dimension:
//! the tokens the wildcard captures across the catalog. A template with
//! dimensions is cloned once per combination index and each clone has its
//! wildcards and `{key}` placeholders filled in.
//!
//! Dimensions are paired by index, not crossed: clone `i` takes token
//! `i % len` from every dimension. With two dimensions of sizes 2 and 3 this
//! yields six clones, but only pairs that line up under the modulus.

use crate::catalog::Catalog;
use crate::code::{fill_placeholder, has_placeholder};
use crate::ingredient::IngredientCodes;
use crate::recipe::RecipeTemplate;

/// One wildcard dimension and the tokens it captured, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub key: String,
    pub tokens: Vec<String>,
    /// Index of the ingredient that last defined this dimension.
    source: usize,
}

/// Result of expanding one template.
#[derive(Debug, Clone, PartialEq)]
pub enum Expansion {
    /// The template has no path wildcards and passes through unchanged.
    Unchanged(RecipeTemplate),
    /// Concrete clones, in index order.
    Variants(Vec<RecipeTemplate>),
    /// A dimension matched nothing in the catalog; the template is dropped.
    Discarded { dimension: String },
}

impl Expansion {
    /// The templates to resolve and register.
    pub fn into_templates(self) -> Vec<RecipeTemplate> {
        match self {
            Expansion::Unchanged(t) => vec![t],
            Expansion::Variants(ts) => ts,
            Expansion::Discarded { .. } => Vec::new(),
        }
    }
}

/// Collect the wildcard dimensions of `template` against `catalog`.
///
/// A dimension is keyed by the ingredient's name, or `wildcard<N>` where `N`
/// is the number of dimensions collected so far. A later ingredient reusing a
/// key replaces that dimension's tokens in place.
pub fn dimensions(template: &RecipeTemplate, catalog: &Catalog) -> Vec<Dimension> {
    let mut dims: Vec<Dimension> = Vec::new();

    for (index, ingredient) in template.ingredients.iter().enumerate() {
        let IngredientCodes::Single(code) = &ingredient.codes else {
            continue;
        };
        if !code.path_has_wildcard() {
            continue;
        }

        let pattern = code.to_pattern();
        let mut tokens: Vec<String> = Vec::new();
        for (_, def) in catalog.iter_class(ingredient.class) {
            let Some(token) = pattern.capture(&def.code) else {
                continue;
            };
            if let Some(allowed) = &ingredient.allowed_variants {
                if !allowed.contains(&token) {
                    continue;
                }
            }
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }

        let key = ingredient
            .name
            .clone()
            .unwrap_or_else(|| format!("wildcard{}", dims.len()));
        match dims.iter_mut().find(|d| d.key == key) {
            Some(existing) => {
                existing.tokens = tokens;
                existing.source = index;
            }
            None => dims.push(Dimension {
                key,
                tokens,
                source: index,
            }),
        }
    }

    dims
}

/// Expand one template into concrete templates.
pub fn expand(template: &RecipeTemplate, catalog: &Catalog) -> Expansion {
    let dims = dimensions(template, catalog);
    if dims.is_empty() {
        return Expansion::Unchanged(template.clone());
    }
    if let Some(empty) = dims.iter().find(|d| d.tokens.is_empty()) {
        tracing::warn!(
            recipe = %template.code,
            dimension = %empty.key,
            "recipe uses wildcards, but no blocks or items matching those wildcards were found"
        );
        return Expansion::Discarded {
            dimension: empty.key.clone(),
        };
    }

    let total: usize = dims.iter().map(|d| d.tokens.len()).product();
    let variants = (0..total)
        .map(|i| {
            let mut clone = template.clone();
            for dim in &dims {
                let token = &dim.tokens[i % dim.tokens.len()];
                apply_token(&mut clone, dim, token);
            }
            clone
        })
        .collect();

    Expansion::Variants(variants)
}

fn apply_token(clone: &mut RecipeTemplate, dim: &Dimension, token: &str) {
    for (index, ingredient) in clone.ingredients.iter_mut().enumerate() {
        let named = ingredient.name.as_deref() == Some(dim.key.as_str());
        if !named && index != dim.source {
            continue;
        }
        if let IngredientCodes::Single(code) = &mut ingredient.codes {
            *code = code.substitute_wildcard(token);
        }
    }

    clone.output.code = clone.output.code.fill_placeholder(&dim.key, token);

    if has_placeholder(&clone.code, &dim.key) {
        clone.code = fill_placeholder(&clone.code, &dim.key, token);
    } else {
        clone.code = format!("{}-{}", clone.code, token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogBuilder, ItemClass};
    use crate::ingredient::IngredientSpec;
    use crate::recipe::OutputSpec;
    use crate::test_utils::*;

    fn codes_of(expansion: Expansion) -> Vec<String> {
        expansion.into_templates().into_iter().map(|t| t.code).collect()
    }

    #[test]
    fn literal_template_passes_through() {
        let f = tea_fixture();
        let t = lily_tea_template();
        assert_eq!(expand(&t, &f.catalog), Expansion::Unchanged(t));
    }

    #[test]
    fn named_wildcard_expands_per_flower() {
        let f = tea_fixture();
        let variants = expand(&wildcard_tea_template(), &f.catalog).into_templates();
        assert_eq!(variants.len(), 2);

        let lily = &variants[0];
        assert_eq!(lily.code, "tea-lily");
        assert_eq!(
            lily.ingredients[0].codes,
            IngredientCodes::Single(code("flower-lily"))
        );
        assert_eq!(lily.output.code, code("maketea:teaportion-lily"));
        // Non-wildcard ingredients are untouched.
        assert_eq!(lily.ingredients[1], wildcard_tea_template().ingredients[1]);

        assert_eq!(variants[1].code, "tea-rose");
        assert_eq!(variants[1].output.code, code("maketea:teaportion-rose"));
    }

    #[test]
    fn every_clone_resolves() {
        let f = tea_fixture();
        for t in expand(&wildcard_tea_template(), &f.catalog).into_templates() {
            assert!(t.resolve(&f.catalog).is_ok(), "{} failed", t.code);
        }
    }

    #[test]
    fn allowed_variants_filter_tokens() {
        let f = tea_fixture();
        let mut t = wildcard_tea_template();
        t.ingredients[0] = t.ingredients[0]
            .clone()
            .with_allowed_variants(vec!["rose".to_string()]);
        assert_eq!(codes_of(expand(&t, &f.catalog)), vec!["tea-rose"]);
    }

    #[test]
    fn empty_dimension_discards_template() {
        let f = tea_fixture();
        let mut t = wildcard_tea_template();
        t.ingredients[0] =
            IngredientSpec::single(code("mushroom-*"), 1, ItemClass::Block).named("flower");
        assert_eq!(
            expand(&t, &f.catalog),
            Expansion::Discarded {
                dimension: "flower".to_string()
            }
        );
    }

    #[test]
    fn class_restricts_scan() {
        let f = tea_fixture();
        let mut t = wildcard_tea_template();
        // flower-dried is an item, flower-lily and flower-rose are blocks.
        t.ingredients[0] =
            IngredientSpec::single(code("flower-*"), 1, ItemClass::Item).named("flower");
        assert_eq!(codes_of(expand(&t, &f.catalog)), vec!["tea-dried"]);
    }

    #[test]
    fn unnamed_wildcard_gets_generated_key_and_suffix() {
        let f = tea_fixture();
        let mut t = lily_tea_template();
        t.ingredients[0] = IngredientSpec::single(code("flower-*"), 1, ItemClass::Block);
        let dims = dimensions(&t, &f.catalog);
        assert_eq!(dims.len(), 1);
        assert_eq!(dims[0].key, "wildcard0");

        let variants = expand(&t, &f.catalog).into_templates();
        let codes: Vec<&str> = variants.iter().map(|t| t.code.as_str()).collect();
        assert_eq!(codes, vec!["lily-tea-lily", "lily-tea-rose"]);
        assert_eq!(
            variants[1].ingredients[0].codes,
            IngredientCodes::Single(code("flower-rose"))
        );
    }

    #[test]
    fn domain_only_wildcard_is_not_a_dimension() {
        let f = tea_fixture();
        let mut t = lily_tea_template();
        t.ingredients[0] = IngredientSpec::single(code("*:flower-lily"), 1, ItemClass::Block);
        assert!(dimensions(&t, &f.catalog).is_empty());
        assert!(matches!(expand(&t, &f.catalog), Expansion::Unchanged(_)));
    }

    #[test]
    fn any_of_never_expands() {
        let f = tea_fixture();
        let mut t = lily_tea_template();
        t.ingredients[0] =
            IngredientSpec::any_of(vec![code("flower-*")], 1, ItemClass::Block).named("flower");
        assert!(dimensions(&t, &f.catalog).is_empty());
    }

    #[test]
    fn repeated_key_replaces_dimension_in_place() {
        let f = tea_fixture();
        let mut t = wildcard_tea_template();
        t.ingredients.push(
            IngredientSpec::single(code("flower-*"), 1, ItemClass::Block)
                .named("flower")
                .with_allowed_variants(vec!["lily".to_string()]),
        );
        let dims = dimensions(&t, &f.catalog);
        assert_eq!(dims.len(), 1);
        assert_eq!(dims[0].tokens, vec!["lily".to_string()]);
    }

    #[test]
    fn two_dimensions_pair_by_index() {
        let mut b = CatalogBuilder::new();
        for c in ["flower-lily", "flower-rose", "herb-mint", "herb-sage", "herb-thyme"] {
            b.register_block(code(c)).unwrap();
        }
        b.register_liquid(code("waterportion"), 100.0, None).unwrap();
        for flower in ["lily", "rose"] {
            for herb in ["mint", "sage", "thyme"] {
                b.register_liquid(code(&format!("maketea:tea-{flower}-{herb}")), 100.0, None)
                    .unwrap();
            }
        }
        let catalog = b.build();

        let t = RecipeTemplate {
            code: "blend-{flower}-{herb}".to_string(),
            enabled: true,
            ingredients: vec![
                IngredientSpec::single(code("flower-*"), 1, ItemClass::Block).named("flower"),
                IngredientSpec::single(code("herb-*"), 1, ItemClass::Block).named("herb"),
            ],
            output: OutputSpec::liquid(code("maketea:tea-{flower}-{herb}"), 1.0),
            duration: 1.0,
            min_temperature: 80.0,
            max_temperature: 100.0,
        };

        // 2 x 3 = 6 clones; clone i takes flowers[i % 2] and herbs[i % 3].
        assert_eq!(
            codes_of(expand(&t, &catalog)),
            vec![
                "blend-lily-mint",
                "blend-rose-sage",
                "blend-lily-thyme",
                "blend-rose-mint",
                "blend-lily-sage",
                "blend-rose-thyme",
            ]
        );
    }
}
