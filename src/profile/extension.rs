use std::fs;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use crate::error::{FoxtrapError, Result};

const EM_NAMESPACE: &[u8] = b"http://www.mozilla.org/2004/em-rdf#";

/// Read the extension id out of an install.rdf manifest.
///
/// The id is the text of the first `id` element in the add-on manifest
/// namespace, wherever it sits in the document.
pub fn extension_id(manifest: &Path) -> Result<String> {
    let xml = fs::read_to_string(manifest)
        .map_err(|e| FoxtrapError::Manifest(format!("{}: {}", manifest.display(), e)))?;
    parse_extension_id(&xml)
}

fn parse_extension_id(xml: &str) -> Result<String> {
    let mut reader = NsReader::from_str(xml);
    loop {
        let (resolve, event) = reader
            .read_resolved_event()
            .map_err(|e| FoxtrapError::Manifest(format!("malformed manifest: {}", e)))?;
        match (resolve, event) {
            (ResolveResult::Bound(Namespace(ns)), Event::Start(start))
                if ns == EM_NAMESPACE && start.local_name().as_ref() == b"id" =>
            {
                return id_text(&mut reader);
            }
            (_, Event::Eof) => {
                return Err(FoxtrapError::Manifest(
                    "manifest has no namespaced id element".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Collect the text content of the id element the reader is inside.
fn id_text(reader: &mut NsReader<&[u8]>) -> Result<String> {
    let mut id = String::new();
    loop {
        let (_, event) = reader
            .read_resolved_event()
            .map_err(|e| FoxtrapError::Manifest(format!("malformed manifest: {}", e)))?;
        match event {
            Event::Text(text) => {
                let chunk = text
                    .xml_content()
                    .map_err(|e| FoxtrapError::Manifest(format!("malformed manifest: {}", e)))?;
                id.push_str(&chunk);
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(FoxtrapError::Manifest(
                    "manifest id element is unterminated".to_string(),
                ));
            }
            _ => {}
        }
    }

    let id = id.trim();
    if id.is_empty() {
        return Err(FoxtrapError::Manifest(
            "manifest id element is empty".to_string(),
        ));
    }
    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTALL_RDF: &str = r#"<?xml version="1.0"?>
<RDF xmlns="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:em="http://www.mozilla.org/2004/em-rdf#">
  <Description about="urn:mozilla:install-manifest">
    <em:id>y-u-no-validate@example.org</em:id>
    <em:name>Y U No Validate</em:name>
    <em:version>1.0</em:version>
  </Description>
</RDF>
"#;

    #[test]
    fn reads_the_namespaced_id() {
        let id = parse_extension_id(INSTALL_RDF).unwrap();
        assert_eq!(id, "y-u-no-validate@example.org");
    }

    #[test]
    fn first_id_in_document_order_wins() {
        let xml = r#"<RDF xmlns:em="http://www.mozilla.org/2004/em-rdf#">
  <em:id>first@example.org</em:id>
  <em:id>second@example.org</em:id>
</RDF>"#;
        assert_eq!(parse_extension_id(xml).unwrap(), "first@example.org");
    }

    #[test]
    fn id_outside_the_namespace_does_not_count() {
        let xml = r#"<RDF xmlns:em="http://www.mozilla.org/2004/em-rdf#">
  <id>plain@example.org</id>
  <em:id>namespaced@example.org</em:id>
</RDF>"#;
        assert_eq!(parse_extension_id(xml).unwrap(), "namespaced@example.org");
    }

    #[test]
    fn missing_id_is_a_manifest_error() {
        let xml = r#"<RDF xmlns:em="http://www.mozilla.org/2004/em-rdf#">
  <em:name>No id here</em:name>
</RDF>"#;
        let err = parse_extension_id(xml).unwrap_err();
        assert!(matches!(err, FoxtrapError::Manifest(_)));
    }

    #[test]
    fn empty_id_is_a_manifest_error() {
        let xml = r#"<RDF xmlns:em="http://www.mozilla.org/2004/em-rdf#">
  <em:id>  </em:id>
</RDF>"#;
        let err = parse_extension_id(xml).unwrap_err();
        assert!(matches!(err, FoxtrapError::Manifest(_)));
    }

    #[test]
    fn truncated_xml_is_a_manifest_error() {
        let xml = r#"<RDF xmlns:em="http://www.mozilla.org/2004/em-rdf#">
  <em:id>cut-off@example"#;
        let err = parse_extension_id(xml).unwrap_err();
        assert!(matches!(err, FoxtrapError::Manifest(_)));
    }

    #[test]
    fn missing_file_is_a_manifest_error() {
        let err = extension_id(Path::new("/nonexistent/install.rdf")).unwrap_err();
        assert!(matches!(err, FoxtrapError::Manifest(_)));
    }
}
