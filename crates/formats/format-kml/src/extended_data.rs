//! `ExtendedData` extraction.
//!
//! Both spellings are read: untyped `<Data name="..."><value>..</value></Data>` and
//! schema-typed `<SchemaData><SimpleData name="...">..</SimpleData></SchemaData>`.

use format_shared::{AttributeValue, infer_scalar};
use kml::types::Element;

/// Collects the named fields of every `ExtendedData` element among `children`.
///
/// Fields keep document order. A field without a value is kept as [`AttributeValue::Null`].
#[must_use]
pub fn extended_data_properties(children: &[Element]) -> Vec<(String, AttributeValue)> {
    let mut properties = Vec::new();
    for extended in children.iter().filter(|e| local_name(&e.name) == "ExtendedData") {
        for entry in &extended.children {
            match local_name(&entry.name) {
                "Data" => {
                    if let Some(name) = entry.attrs.get("name") {
                        let value = entry
                            .children
                            .iter()
                            .find(|c| local_name(&c.name) == "value")
                            .and_then(|c| c.content.as_deref());
                        properties.push((name.clone(), scalar(value)));
                    }
                },
                "SchemaData" => {
                    for simple in entry
                        .children
                        .iter()
                        .filter(|c| local_name(&c.name) == "SimpleData")
                    {
                        if let Some(name) = simple.attrs.get("name") {
                            properties.push((name.clone(), scalar(simple.content.as_deref())));
                        }
                    }
                },
                _ => {},
            }
        }
    }
    properties
}

fn scalar(raw: Option<&str>) -> AttributeValue {
    raw.map_or(AttributeValue::Null, infer_scalar)
}

pub(crate) fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn element(name: &str, attrs: &[(&str, &str)], content: Option<&str>, children: Vec<Element>) -> Element {
        Element {
            name: name.to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<HashMap<_, _>>(),
            content: content.map(str::to_string),
            children,
        }
    }

    #[test]
    fn reads_data_and_simple_data() {
        let extended = element(
            "ExtendedData",
            &[],
            None,
            vec![
                element(
                    "Data",
                    &[("name", "tues_nb")],
                    None,
                    vec![element("value", &[], Some("1"), vec![])],
                ),
                element(
                    "SchemaData",
                    &[("schemaUrl", "#accidents")],
                    None,
                    vec![element("SimpleData", &[("name", "commune")], Some("MERDRIGNAC"), vec![])],
                ),
            ],
        );

        let properties = extended_data_properties(&[extended]);
        assert_eq!(
            properties,
            vec![
                ("tues_nb".to_string(), AttributeValue::Integer(1)),
                (
                    "commune".to_string(),
                    AttributeValue::String("MERDRIGNAC".to_string())
                ),
            ]
        );
    }

    #[test]
    fn data_without_value_is_null() {
        let extended = element(
            "kml:ExtendedData",
            &[],
            None,
            vec![element("kml:Data", &[("name", "commentair")], None, vec![])],
        );
        assert_eq!(
            extended_data_properties(&[extended]),
            vec![("commentair".to_string(), AttributeValue::Null)]
        );
    }

    #[test]
    fn other_children_are_ignored() {
        let style = element("styleUrl", &[], Some("#red"), vec![]);
        assert!(extended_data_properties(&[style]).is_empty());
    }
}
