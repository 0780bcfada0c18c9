//! Canonical field registry.
//!
//! A closed mapping from provider-agnostic field names to the raw field each
//! provider understands, plus the scale factor carried through to emitted
//! records for downstream unscaling. The registry is plain data, constructed
//! explicitly and passed into the puller so tests can substitute a smaller
//! table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ProviderId};

/// One canonical field and its provider-specific raw names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    name: String,
    lseg_field: String,
    yahoo_field: String,
    scale: f64,
}

impl FieldSpec {
    pub fn new(
        name: impl Into<String>,
        lseg_field: impl Into<String>,
        yahoo_field: impl Into<String>,
        scale: f64,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::InvalidScale { field: name });
        }
        Ok(Self {
            name,
            lseg_field: lseg_field.into(),
            yahoo_field: yahoo_field.into(),
            scale,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lseg_field(&self) -> &str {
        &self.lseg_field
    }

    pub fn yahoo_field(&self) -> &str {
        &self.yahoo_field
    }

    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Raw field name understood by the given provider.
    pub fn raw_field(&self, provider: ProviderId) -> &str {
        match provider {
            ProviderId::Lseg => &self.lseg_field,
            ProviderId::Yahoo => &self.yahoo_field,
        }
    }
}

/// Closed canonical-field table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRegistry {
    specs: BTreeMap<String, FieldSpec>,
}

impl FieldRegistry {
    pub fn new(specs: impl IntoIterator<Item = FieldSpec>) -> Self {
        Self {
            specs: specs
                .into_iter()
                .map(|spec| (spec.name.clone(), spec))
                .collect(),
        }
    }

    /// The fields every deployment carries: unadjusted close and total return.
    pub fn builtin() -> Self {
        let specs = [
            FieldSpec::new("close", "TR.CLOSEPRICE(Adjusted=0)", "raw_close", 1.0),
            FieldSpec::new("totret", "TR.TotalReturn", "totret", 0.01),
        ];
        Self::new(
            specs
                .into_iter()
                .map(|spec| spec.expect("builtin field specs are valid")),
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Result<&FieldSpec, ConfigError> {
        self.specs.get(name).ok_or_else(|| ConfigError::UnknownField {
            field: name.to_owned(),
        })
    }

    /// Resolve every requested field, atomically: the first unknown name
    /// fails the whole request before any network activity happens.
    pub fn validate_request<S: AsRef<str>>(
        &self,
        fields: &[S],
    ) -> Result<Vec<FieldSpec>, ConfigError> {
        fields
            .iter()
            .map(|name| self.lookup(name.as_ref()).cloned())
            .collect()
    }

    pub fn specs(&self) -> impl Iterator<Item = &FieldSpec> {
        self.specs.values()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_matches_field_table() {
        let registry = FieldRegistry::builtin();
        assert_eq!(registry.len(), 2);

        let close = registry.lookup("close").expect("close registered");
        assert_eq!(close.lseg_field(), "TR.CLOSEPRICE(Adjusted=0)");
        assert_eq!(close.yahoo_field(), "raw_close");
        assert_eq!(close.scale(), 1.0);

        let totret = registry.lookup("totret").expect("totret registered");
        assert_eq!(totret.raw_field(ProviderId::Lseg), "TR.TotalReturn");
        assert_eq!(totret.scale(), 0.01);
    }

    #[test]
    fn unknown_field_fails_lookup() {
        let registry = FieldRegistry::builtin();
        let err = registry.lookup("volume").expect_err("must fail");
        assert_eq!(
            err,
            ConfigError::UnknownField {
                field: String::from("volume")
            }
        );
    }

    #[test]
    fn request_validation_is_atomic() {
        let registry = FieldRegistry::builtin();
        let err = registry
            .validate_request(&["close", "volume", "totret"])
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::UnknownField { field } if field == "volume"));

        let resolved = registry
            .validate_request(&["totret", "close"])
            .expect("all known");
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].name(), "totret");
    }

    #[test]
    fn rejects_non_positive_scale() {
        for scale in [0.0, -1.0, f64::NAN] {
            let err = FieldSpec::new("x", "TR.X", "x", scale).expect_err("must fail");
            assert!(matches!(err, ConfigError::InvalidScale { .. }));
        }
    }
}
