//! Registry of named transformations
//!
//! Provides [`TransformRegistry`] for looking up transformations by name,
//! so pipelines can be assembled from configuration rather than code.

use crate::error::{PipelineError, Result};
use ferry_contract::{DynFn, Signature};
use std::collections::BTreeMap;

/// Registry of named transformations
///
/// Names are unique; registering an existing name replaces it.
#[derive(Debug, Default, Clone)]
pub struct TransformRegistry {
    transforms: BTreeMap<String, DynFn>,
}

impl TransformRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            transforms: BTreeMap::new(),
        }
    }

    /// Create registry with built-in transformations
    ///
    /// # Built-ins
    /// - `i64` predicates: `even`, `odd`, `positive`, `negative`
    /// - `i64` maps: `double`, `square`, `negate`, `increment`, `to_string`
    /// - `i64` folds: `sum`, `product`, `max`, `min`
    /// - `f64`: `double_f`, `halve`, `positive_f`, `sum_f`, `product_f`
    /// - `String`: `nonempty`, `upper`, `lower`, `trim`, `len`, `parse_int`, `concat`
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register("even", DynFn::unary(|x: i64| x % 2 == 0));
        registry.register("odd", DynFn::unary(|x: i64| x % 2 != 0));
        registry.register("positive", DynFn::unary(|x: i64| x > 0));
        registry.register("negative", DynFn::unary(|x: i64| x < 0));

        registry.register("double", DynFn::unary(|x: i64| x.saturating_mul(2)));
        registry.register("square", DynFn::unary(|x: i64| x.saturating_mul(x)));
        registry.register("negate", DynFn::unary(|x: i64| x.saturating_neg()));
        registry.register("increment", DynFn::unary(|x: i64| x.saturating_add(1)));
        registry.register("to_string", DynFn::unary(|x: i64| x.to_string()));

        registry.register("sum", DynFn::binary(|acc: i64, x: i64| acc.saturating_add(x)));
        registry.register("product", DynFn::binary(|acc: i64, x: i64| acc.saturating_mul(x)));
        registry.register("max", DynFn::binary(|acc: i64, x: i64| acc.max(x)));
        registry.register("min", DynFn::binary(|acc: i64, x: i64| acc.min(x)));

        registry.register("double_f", DynFn::unary(|x: f64| x * 2.0));
        registry.register("halve", DynFn::unary(|x: f64| x / 2.0));
        registry.register("positive_f", DynFn::unary(|x: f64| x > 0.0));
        registry.register("sum_f", DynFn::binary(|acc: f64, x: f64| acc + x));
        registry.register("product_f", DynFn::binary(|acc: f64, x: f64| acc * x));

        registry.register("nonempty", DynFn::unary(|s: String| !s.is_empty()));
        registry.register("upper", DynFn::unary(|s: String| s.to_uppercase()));
        registry.register("lower", DynFn::unary(|s: String| s.to_lowercase()));
        registry.register("trim", DynFn::unary(|s: String| s.trim().to_string()));
        registry.register(
            "len",
            DynFn::unary(|s: String| i64::try_from(s.chars().count()).unwrap_or(i64::MAX)),
        );
        registry.register(
            "parse_int",
            DynFn::unary(|s: String| s.trim().parse::<i64>().unwrap_or(0)),
        );
        registry.register("concat", DynFn::binary(|acc: String, s: String| acc + &s));

        registry
    }

    /// Register a transformation under a name
    pub fn register(&mut self, name: &str, transform: DynFn) {
        self.transforms
            .insert(name.to_string(), transform.named(name));
    }

    /// Check if a name is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Look up a transformation
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DynFn> {
        self.transforms.get(name)
    }

    /// Look up a transformation, failing on unknown names
    ///
    /// # Errors
    /// Returns `UnknownTransform` if nothing is registered under `name`
    pub fn resolve(&self, name: &str) -> Result<DynFn> {
        self.get(name)
            .cloned()
            .ok_or_else(|| PipelineError::UnknownTransform(name.to_string()))
    }

    /// Signature of a registered transformation
    #[inline]
    #[must_use]
    pub fn signature_of(&self, name: &str) -> Option<&Signature> {
        self.get(name).map(DynFn::signature)
    }

    /// Remove a transformation
    #[inline]
    pub fn remove(&mut self, name: &str) -> bool {
        self.transforms.remove(name).is_some()
    }

    /// Registered names, sorted
    #[inline]
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.transforms.keys().map(String::as_str).collect()
    }

    /// Number of registered transformations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Iterate over name/transformation pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DynFn)> {
        self.transforms.iter().map(|(name, f)| (name.as_str(), f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_contract::{TypeTag, Value};

    #[test]
    fn defaults_are_registered() {
        let registry = TransformRegistry::with_defaults();
        for name in ["even", "double", "sum", "upper", "sum_f", "concat"] {
            assert!(registry.contains(name), "missing {name}");
        }
        assert!(!registry.is_empty());
    }

    #[test]
    fn registered_transforms_carry_their_name() {
        let registry = TransformRegistry::with_defaults();
        assert_eq!(registry.get("odd").unwrap().name(), Some("odd"));
    }

    #[test]
    fn signature_lookup() {
        let registry = TransformRegistry::with_defaults();
        let sig = registry.signature_of("sum").unwrap();
        assert_eq!(sig.inputs(), &[TypeTag::of::<i64>(), TypeTag::of::<i64>()]);
        assert_eq!(sig.outputs(), &[TypeTag::of::<i64>()]);
    }

    #[test]
    fn resolve_unknown_fails() {
        let registry = TransformRegistry::new();
        assert!(matches!(
            registry.resolve("nope"),
            Err(PipelineError::UnknownTransform(name)) if name == "nope"
        ));
    }

    #[test]
    fn register_replaces_and_remove_deletes() {
        let mut registry = TransformRegistry::new();
        registry.register("f", DynFn::unary(|x: i64| x));
        registry.register("f", DynFn::unary(|x: i64| x + 1));
        assert_eq!(registry.len(), 1);

        let out = registry
            .resolve("f")
            .unwrap()
            .call(vec![Value::new(1_i64)])
            .unwrap()
            .unwrap();
        assert_eq!(out.downcast::<i64>().unwrap(), 2);

        assert!(registry.remove("f"));
        assert!(!registry.remove("f"));
        assert!(registry.is_empty());
    }

    #[test]
    fn names_are_sorted() {
        let mut registry = TransformRegistry::new();
        registry.register("b", DynFn::nullary(|| 0_i64));
        registry.register("a", DynFn::nullary(|| 0_i64));
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.iter().count(), 2);
    }

    #[test]
    fn string_builtins() {
        let registry = TransformRegistry::with_defaults();
        let len = registry
            .resolve("len")
            .unwrap()
            .call(vec![Value::new("héllo".to_string())])
            .unwrap()
            .unwrap();
        assert_eq!(len.downcast::<i64>().unwrap(), 5);

        let parsed = registry
            .resolve("parse_int")
            .unwrap()
            .call(vec![Value::new(" 42 ".to_string())])
            .unwrap()
            .unwrap();
        assert_eq!(parsed.downcast::<i64>().unwrap(), 42);
    }
}
