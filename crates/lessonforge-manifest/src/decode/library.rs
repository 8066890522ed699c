//! `serde_yaml`-backed decoder.

use lessonforge_common::error::{ForgeError, Result};
use serde_json::Value;

use super::{ManifestDecoder, lexer};

/// Decoder delegating to `serde_yaml`, deserializing straight into a JSON
/// value tree so both decoders share one representation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibraryDecoder;

impl ManifestDecoder for LibraryDecoder {
    fn decode(&self, text: &str) -> Result<Value> {
        tracing::debug!("decoding manifest with serde_yaml");
        if lexer::significant_lines(text).is_empty() {
            return Ok(Value::Null);
        }
        serde_yaml::from_str::<Value>(text).map_err(|e| ForgeError::Decode {
            line: e.location().map_or(0, |loc| loc.line()),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::decode::FallbackDecoder;

    const MANIFEST: &str = r#"
# Lesson manifest
metadata:
  org: Acme Co
  course: Intro CS
  lesson: "Lesson 1!"
spec:
  base_preset: full
  image_tag_strategy: ubuntu-24.04
  emit_aggregate_compose: true
  vscode_extensions:
    - ms-python.python
    - MS-Python.Python
  settings:
    editor.tabSize: 4
  services:
    -
      name: redis
      vars:
        REDIS_PASSWORD: classroom
    - kafka
  secrets_placeholders:
    - OPENAI_API_KEY
  resources:
    cpu: 4.5
    memory: 8gb
  starter_repo:
    url: https://example.com/repo.git
    path: /workspace
"#;

    #[test]
    fn library_decodes_manifest() {
        let value = LibraryDecoder.decode(MANIFEST).expect("should decode");
        assert_eq!(value["metadata"]["lesson"], json!("Lesson 1!"));
        assert_eq!(value["spec"]["resources"]["cpu"], json!(4.5));
    }

    #[test]
    fn library_and_fallback_agree() {
        let library = LibraryDecoder.decode(MANIFEST).expect("library decode");
        let fallback = FallbackDecoder.decode(MANIFEST).expect("fallback decode");
        assert_eq!(library, fallback);
    }

    /// Documents inside the built-in subset, chosen around scalar resolution,
    /// quoting, and sequence-item mappings.
    const SHARED_DOCUMENTS: &[&str] = &[
        "lesson: 01\n",
        "mode: 0777\n",
        "hex: 0x1F\nneg_hex: -0x1F\noct: 0o17\n",
        "big: 18446744073709551615\nsmall: -9223372036854775808\n",
        "zero: 0\nnegzero: -0\nplus: +7\n",
        "ratio: 0.5\nversion: 1.10\nexp: 1e3\nleading: 01.5\n",
        "inf: .inf\nninf: -.Inf\nnan: .NaN\nword: nan\n",
        "flag: True\ndisabled: FALSE\nodd: tRuE\n",
        "n: NULL\nt: ~\nodd: nUlL\n",
        "quote: 'it''s'\n",
        "esc: \"a\\tb\"\nsay: \"a \\\" b\"\naccent: \"caf\\u00e9\"\n",
        "'it''s': 1\n\"x y\": 2\n",
        "title: \"C# basics # not a comment\"\nnote: don't # trimmed\n",
        "url: https://example.com/a#frag\ntag: ubuntu-24.04\n",
        "port:\n  8080: web\n",
        "services:\n  - name: redis\n    vars:\n      REDIS_PASSWORD: classroom\n  - kafka\n",
        "- extra:\n  enabled: true\n",
        "- extra:\n    enabled: true\n",
    ];

    /// Documents a YAML library reads but the built-in decoder must refuse.
    const LIBRARY_ONLY_DOCUMENTS: &[&str] = &[
        "list: [a, b]\n",
        "map: {a: 1}\n",
        "\tkey: v\n",
        "x: &anchor 1\n",
        "x: !!str 1\n",
        "text: |\n  line\n",
        "big: 18446744073709551616\n",
    ];

    #[test]
    fn fallback_matches_library_on_shared_documents() {
        for doc in SHARED_DOCUMENTS {
            let fallback = FallbackDecoder
                .decode(doc)
                .unwrap_or_else(|e| panic!("fallback rejected {doc:?}: {e}"));
            let library = LibraryDecoder
                .decode(doc)
                .unwrap_or_else(|e| panic!("library rejected {doc:?}: {e}"));
            assert_eq!(fallback, library, "decoders disagree on {doc:?}");
        }
    }

    #[test]
    fn fallback_rejects_what_it_cannot_mirror() {
        for doc in LIBRARY_ONLY_DOCUMENTS {
            assert!(
                FallbackDecoder.decode(doc).is_err(),
                "fallback accepted {doc:?}"
            );
        }
    }

    #[test]
    fn leading_zero_lesson_slugs_the_same_either_way() {
        let doc = "metadata:\n  org: acme\n  course: math\n  lesson: 01\n";
        let fallback = FallbackDecoder.decode(doc).expect("fallback");
        let library = LibraryDecoder.decode(doc).expect("library");
        assert_eq!(fallback["metadata"]["lesson"], json!("01"));
        assert_eq!(fallback, library);
    }

    #[test]
    fn library_and_fallback_agree_on_empty_document() {
        assert_eq!(
            LibraryDecoder.decode("").expect("library"),
            FallbackDecoder.decode("").expect("fallback")
        );
        assert_eq!(
            LibraryDecoder.decode("# nothing here\n").expect("library"),
            Value::Null
        );
    }

    #[test]
    fn library_reports_line_of_error() {
        let err = LibraryDecoder
            .decode("metadata:\n  org: acme\n bad: [\n")
            .unwrap_err();
        assert!(matches!(err, ForgeError::Decode { .. }), "got: {err}");
    }
}
