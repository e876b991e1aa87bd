//! Data model for API descriptors, decoded straight from the JSON files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a parameter `default` that marks the parameter as optional
/// without printing a default.
pub const NIL_DEFAULT: &str = "nil";

/// Name suffix marking a variadic parameter.
pub const VARIADIC_SUFFIX: &str = "...";

/// Which side of the game a class or function is available on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Authority {
    ServerOnly,
    ClientOnly,
    AuthorityOnly,
    #[default]
    Both,
    /// Anything else found in a descriptor, kept verbatim for the error badge.
    Unknown(String),
}

impl From<String> for Authority {
    fn from(value: String) -> Self {
        match value.as_str() {
            "server" => Authority::ServerOnly,
            "client" => Authority::ClientOnly,
            "authority" => Authority::AuthorityOnly,
            "both" => Authority::Both,
            _ => Authority::Unknown(value),
        }
    }
}

impl From<Authority> for String {
    fn from(value: Authority) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authority::ServerOnly => f.write_str("server"),
            Authority::ClientOnly => f.write_str("client"),
            Authority::AuthorityOnly => f.write_str("authority"),
            Authority::Both => f.write_str("both"),
            Authority::Unknown(other) => f.write_str(other),
        }
    }
}

/// Short and long description shared by every documented entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_long: Option<String>,
}

impl Description {
    /// Long description, else the short one, else empty. Newlines become `<br>`.
    pub fn docstring(&self) -> String {
        self.description_long
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("")
            .replace('\n', "<br>")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// Literal default value. `"nil"` means optional with no default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(flatten)]
    pub doc: Description,
}

impl Parameter {
    /// Name as it appears in generated code: `args...` collapses to `...`.
    pub fn lua_name(&self) -> &str {
        if self.name.ends_with(VARIADIC_SUFFIX) {
            VARIADIC_SUFFIX
        } else {
            &self.name
        }
    }

    pub fn is_optional(&self) -> bool {
        self.default.as_deref() == Some(NIL_DEFAULT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Return {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(flatten)]
    pub doc: Description,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub authority: Authority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(rename = "return", default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<Return>,
    #[serde(flatten)]
    pub doc: Description,
}

impl Function {
    /// `Subscribe`/`Unsubscribe` are generated per class from its events.
    pub fn is_event_builtin(&self) -> bool {
        self.name == "Subscribe" || self.name == "Unsubscribe"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(flatten)]
    pub doc: Description,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<Parameter>,
    #[serde(flatten)]
    pub doc: Description,
}

/// A class, static class or struct descriptor.
///
/// Optional lists stay `Option` because presence matters: an empty
/// `constructor` still produces a zero-argument overload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub name: String,
    #[serde(default)]
    pub authority: Authority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inheritance: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constructor: Option<Vec<Parameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_functions: Option<Vec<Function>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<Function>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Event>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<Property>>,
    /// Set from the descriptor's location, never read from JSON.
    #[serde(skip_deserializing)]
    pub static_class: bool,
    #[serde(flatten)]
    pub doc: Description,
}

impl Class {
    pub fn parents(&self) -> &[String] {
        self.inheritance.as_deref().unwrap_or_default()
    }

    pub fn own_events(&self) -> &[Event] {
        self.events.as_deref().unwrap_or_default()
    }
}

/// One `{ "key": ..., "value": ... }` entry of an enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    pub key: String,
    pub value: serde_json::Value,
}

impl EnumValue {
    /// The value as a Lua literal: numbers as written, strings verbatim.
    pub fn literal(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Everything collected from the repository, in discovery order.
#[derive(Debug, Default)]
pub struct Docs {
    pub classes: Vec<Class>,
    pub enums: Vec<(String, Vec<EnumValue>)>,
}

impl Docs {
    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Insert a class, replacing one with the same name in place.
    /// Returns `true` when an earlier class was replaced.
    pub fn insert_class(&mut self, class: Class) -> bool {
        match self.classes.iter_mut().find(|c| c.name == class.name) {
            Some(existing) => {
                *existing = class;
                true
            }
            None => {
                self.classes.push(class);
                false
            }
        }
    }
}
