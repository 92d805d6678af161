//! The type converter registry (component E): `type-tag → converter`.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::alias::PRwLock;
use crate::binding::ParamValue;

/// A typed parameter's value could not be converted from its raw string.
///
/// Per spec §7 this is not itself a top-level error: it is collected as one
/// of an endpoint's rejection reasons and only surfaces as a [`crate::NoMatch`]
/// if every candidate endpoint rejects for the same reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertError {
    pub raw: String,
    pub type_tag: String,
    pub message: String,
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot convert '{}' to {}: {}", self.raw, self.type_tag, self.message)
    }
}

impl std::error::Error for ConvertError {}

/// A parameter's type-tag has no registered converter. Raised at
/// registration time — an unknown type-tag is never silently treated as
/// `string`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTypeError {
    pub type_tag: String,
}

impl std::fmt::Display for UnknownTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown parameter type tag '{}'", self.type_tag)
    }
}

impl std::error::Error for UnknownTypeError {}

/// Converts a raw argv token into a typed [`ParamValue`] for one type-tag.
pub trait Converter: Send + Sync {
    fn convert(&self, raw: &str) -> Result<ParamValue, String>;

    /// The finite set of values this type enumerates, if any (e.g. `bool`
    /// enumerates `true`/`false`). Used by the completion engine (§4.G) to
    /// suggest values for a typed parameter slot.
    fn domain(&self) -> Option<Vec<&'static str>> {
        None
    }
}

struct IntConverter;
impl Converter for IntConverter {
    fn convert(&self, raw: &str) -> Result<ParamValue, String> {
        raw.parse::<i32>().map(|v| ParamValue::Int(v as i64)).map_err(|e| e.to_string())
    }
}

struct LongConverter;
impl Converter for LongConverter {
    fn convert(&self, raw: &str) -> Result<ParamValue, String> {
        raw.parse::<i64>().map(ParamValue::Int).map_err(|e| e.to_string())
    }
}

struct DoubleConverter;
impl Converter for DoubleConverter {
    fn convert(&self, raw: &str) -> Result<ParamValue, String> {
        raw.parse::<f64>().map(ParamValue::Double).map_err(|e| e.to_string())
    }
}

struct BoolConverter;
impl Converter for BoolConverter {
    fn convert(&self, raw: &str) -> Result<ParamValue, String> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(ParamValue::Bool(true)),
            "false" | "0" | "no" => Ok(ParamValue::Bool(false)),
            other => Err(format!("'{}' is not one of true/false/1/0/yes/no", other)),
        }
    }

    fn domain(&self) -> Option<Vec<&'static str>> {
        Some(vec!["true", "false"])
    }
}

struct StringConverter;
impl Converter for StringConverter {
    fn convert(&self, raw: &str) -> Result<ParamValue, String> {
        Ok(ParamValue::Str(raw.to_string()))
    }
}

/// Process-wide mapping from type-tag to converter. Registration is
/// mutable; lookup is the common, hot path.
pub struct TypeConverterRegistry {
    converters: PRwLock<HashMap<String, Arc<dyn Converter>>>,
}

impl TypeConverterRegistry {
    /// A registry pre-populated with the built-in tags: `int`, `long`,
    /// `double`, `bool`, `string`.
    pub fn with_builtins() -> Self {
        let registry = Self { converters: PRwLock::new(HashMap::new()) };
        registry.register("int", Arc::new(IntConverter));
        registry.register("long", Arc::new(LongConverter));
        registry.register("double", Arc::new(DoubleConverter));
        registry.register("bool", Arc::new(BoolConverter));
        registry.register("string", Arc::new(StringConverter));
        registry
    }

    /// Register (or replace) the converter for a type-tag.
    pub fn register(&self, type_tag: impl Into<String>, converter: Arc<dyn Converter>) {
        self.converters.write().insert(type_tag.into(), converter);
    }

    pub fn has(&self, type_tag: &str) -> bool {
        self.converters.read().contains_key(type_tag)
    }

    pub fn domain(&self, type_tag: &str) -> Option<Vec<&'static str>> {
        self.converters.read().get(type_tag).and_then(|c| c.domain())
    }

    /// Convert `raw` using the converter registered for `type_tag`.
    ///
    /// Panics if `type_tag` isn't registered — callers must have already
    /// validated type-tags at compile time via [`Self::has`]; by the time a
    /// `CompiledRoute` exists its type-tags are known-good.
    pub fn convert(&self, type_tag: &str, raw: &str) -> Result<ParamValue, ConvertError> {
        let converters = self.converters.read();
        let converter = converters
            .get(type_tag)
            .unwrap_or_else(|| panic!("type tag '{}' was not validated at compile time", type_tag));
        converter.convert(raw).map_err(|message| ConvertError {
            raw: raw.to_string(),
            type_tag: type_tag.to_string(),
            message,
        })
    }
}

impl Default for TypeConverterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// The default process-wide registry, pre-populated with the built-in
/// converters. Applications that need custom type-tags create their own
/// [`TypeConverterRegistry`] and pass it to [`crate::router::CliRouterBuilder`]
/// instead of mutating this one, since a shared global would make parallel
/// test suites interfere with each other's custom tags.
pub static GLOBAL_CONVERTERS: Lazy<TypeConverterRegistry> = Lazy::new(TypeConverterRegistry::with_builtins);
