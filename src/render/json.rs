//! JSON renderer: the collected descriptors as one document.
//!
//! Shows exactly what the collector saw, including the derived static flag,
//! which helps when an annotation comes out wrong.

use crate::model::Docs;
use crate::render::{RenderError, Renderer};
use serde_json::{json, Map, Value};

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, docs: &Docs) -> Result<String, RenderError> {
        let mut enums = Map::new();
        for (name, values) in &docs.enums {
            enums.insert(name.clone(), serde_json::to_value(values)?);
        }

        let doc = json!({
            "classes": docs.classes,
            "enums": Value::Object(enums),
        });

        let mut out = serde_json::to_string_pretty(&doc)?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Class;

    #[test]
    fn keeps_enum_order_and_static_flag() {
        let mut class: Class = serde_json::from_str(r#"{"name": "Server"}"#).unwrap();
        class.static_class = true;
        let docs = Docs {
            classes: vec![class],
            enums: vec![
                ("Zeta".to_string(), Vec::new()),
                ("Alpha".to_string(), Vec::new()),
            ],
        };

        let out = JsonRenderer.render(&docs).unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(parsed["classes"][0]["name"], "Server");
        assert_eq!(parsed["classes"][0]["static_class"], true);
        assert_eq!(parsed["classes"][0]["authority"], "both");
        let keys: Vec<_> = parsed["enums"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["Zeta", "Alpha"]);
    }
}
