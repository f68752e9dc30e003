//! Release descriptor (Scoop app manifest) generation.
//!
//! The template is kept as an untyped JSON tree so fields this crate does not
//! know about (`homepage`, `bin`, `checkver`, `autoupdate`, ...) pass through
//! unchanged and in their original order. Numbers keep their literal text, so
//! integers beyond 64 bits and long decimals are not rounded. Only the
//! top-level `version` and the nested `architecture.64bit.hash` values are
//! rewritten.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use crate::digest::{DigestError, Sha256Digest};
use crate::error::BundleError;
use crate::version::ReleaseVersion;

/// Indentation used for the written descriptor.
const INDENT: &[u8] = b"    ";

/// Errors arising from descriptor parsing and structure checks.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The template is not well-formed JSON.
    #[error("malformed JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// A value that must be a JSON object is something else.
    #[error("expected an object at `{pointer}`")]
    NotAnObject {
        /// JSON pointer of the offending value.
        pointer: String,
    },

    /// A required field is absent.
    #[error("missing required field `{pointer}`")]
    MissingField {
        /// JSON pointer of the missing field.
        pointer: String,
    },

    /// Serializing the descriptor failed.
    #[error("serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The recorded hash is not a valid SHA-256 digest.
    #[error(transparent)]
    InvalidHash(#[from] DigestError),
}

/// A release descriptor held as a generic JSON tree.
///
/// # Examples
///
/// ```
/// use scoop_bundle::descriptor::ReleaseDescriptor;
/// use scoop_bundle::digest::Sha256Digest;
/// use scoop_bundle::version::ReleaseVersion;
///
/// let mut descriptor = ReleaseDescriptor::parse(
///     r#"{"version": "0.0.0", "architecture": {"64bit": {"hash": "OLD"}}}"#,
/// )
/// .expect("valid template");
/// let version = ReleaseVersion::try_from("2.1.0").expect("valid version");
/// let digest = Sha256Digest::of_bytes(b"archive");
/// descriptor.apply(&version, &digest).expect("fields present");
///
/// assert_eq!(descriptor.version(), Some("2.1.0"));
/// assert_eq!(descriptor.hash(), Some(digest.as_str()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseDescriptor {
    root: Value,
}

impl ReleaseDescriptor {
    /// Parse a descriptor from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Parse`] if `text` is not valid JSON.
    pub fn parse(text: &str) -> Result<Self, DescriptorError> {
        let root = serde_json::from_str(text).map_err(DescriptorError::Parse)?;
        Ok(Self { root })
    }

    /// Load a descriptor from a file.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::ReadInput`] if the file cannot be read and
    /// [`BundleError::Descriptor`] if it is not valid JSON.
    pub fn load(path: &Path) -> Result<Self, BundleError> {
        let text = fs::read_to_string(path).map_err(|source| BundleError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| BundleError::Descriptor {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Set the release version and archive hash.
    ///
    /// `version` is inserted at the top level if absent. `hash` is inserted
    /// into `architecture.64bit` if absent, but `architecture.64bit` itself
    /// must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::NotAnObject`] if the root,
    /// `architecture`, or `architecture.64bit` is not an object, and
    /// [`DescriptorError::MissingField`] if `architecture` or
    /// `architecture.64bit` is absent. The descriptor is left unchanged on
    /// error.
    pub fn apply(
        &mut self,
        version: &ReleaseVersion,
        digest: &Sha256Digest,
    ) -> Result<(), DescriptorError> {
        let root = as_object_mut(&mut self.root, "")?;
        let architecture = child_object_mut(root, "architecture", "")?;
        let bit64 = child_object_mut(architecture, "64bit", "/architecture")?;
        bit64.insert("hash".to_owned(), Value::String(digest.as_str().to_owned()));

        // Re-borrow the root: the nested borrows above have ended.
        as_object_mut(&mut self.root, "")?
            .insert("version".to_owned(), Value::String(version.as_str().to_owned()));
        Ok(())
    }

    /// The top-level `version` string, if present.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.root.get("version").and_then(Value::as_str)
    }

    /// The `architecture.64bit.hash` string, if present.
    #[must_use]
    pub fn hash(&self) -> Option<&str> {
        self.root
            .pointer("/architecture/64bit/hash")
            .and_then(Value::as_str)
    }

    /// The recorded archive hash as a validated digest.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::MissingField`] if no hash string is
    /// recorded and [`DescriptorError::InvalidHash`] if it is malformed.
    pub fn sha256(&self) -> Result<Sha256Digest, DescriptorError> {
        let hash = self.hash().ok_or_else(|| DescriptorError::MissingField {
            pointer: "/architecture/64bit/hash".to_owned(),
        })?;
        Ok(Sha256Digest::try_from(hash)?)
    }

    /// Borrow the underlying JSON tree.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.root
    }

    /// Serialize the descriptor with 4-space indentation to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Serialize`] if writing fails.
    pub fn write_pretty<W: Write>(&self, writer: W) -> Result<(), DescriptorError> {
        let mut serializer =
            serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(INDENT));
        self.root
            .serialize(&mut serializer)
            .map_err(DescriptorError::Serialize)
    }

    /// Serialize the descriptor with 4-space indentation and a trailing
    /// newline.
    ///
    /// Non-ASCII text is written as UTF-8 rather than `\uXXXX` escapes. Both
    /// forms parse to the same tree.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Serialize`] if serialization fails.
    pub fn to_pretty_string(&self) -> Result<String, DescriptorError> {
        let mut buffer = Vec::new();
        self.write_pretty(&mut buffer)?;
        buffer.push(b'\n');
        // serde_json only emits UTF-8.
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Write the descriptor to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Descriptor`] if serialization fails and
    /// [`BundleError::WriteOutput`] if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<(), BundleError> {
        let text = self
            .to_pretty_string()
            .map_err(|source| BundleError::Descriptor {
                path: path.to_path_buf(),
                source,
            })?;
        fs::write(path, text).map_err(|source| BundleError::WriteOutput {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Load `template`, apply `version` and `digest`, and write the result to
/// `output`.
///
/// # Errors
///
/// Propagates the errors of [`ReleaseDescriptor::load`],
/// [`ReleaseDescriptor::apply`] (as [`BundleError::Descriptor`] naming the
/// template), and [`ReleaseDescriptor::write`].
pub fn build_descriptor(
    template: &Path,
    output: &Path,
    version: &ReleaseVersion,
    digest: &Sha256Digest,
) -> Result<ReleaseDescriptor, BundleError> {
    let mut descriptor = ReleaseDescriptor::load(template)?;
    descriptor
        .apply(version, digest)
        .map_err(|source| BundleError::Descriptor {
            path: template.to_path_buf(),
            source,
        })?;
    descriptor.write(output)?;
    log::debug!(
        "wrote release descriptor {} for version {version}",
        output.display()
    );
    Ok(descriptor)
}

fn as_object_mut<'a>(
    value: &'a mut Value,
    pointer: &str,
) -> Result<&'a mut Map<String, Value>, DescriptorError> {
    value
        .as_object_mut()
        .ok_or_else(|| DescriptorError::NotAnObject {
            pointer: pointer.to_owned(),
        })
}

fn child_object_mut<'a>(
    parent: &'a mut Map<String, Value>,
    key: &str,
    parent_pointer: &str,
) -> Result<&'a mut Map<String, Value>, DescriptorError> {
    let pointer = format!("{parent_pointer}/{key}");
    match parent.get_mut(key) {
        Some(child) => as_object_mut(child, &pointer),
        None => Err(DescriptorError::MissingField { pointer }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn version() -> ReleaseVersion {
        ReleaseVersion::try_from("2.1.0").expect("valid version")
    }

    #[fixture]
    fn digest() -> Sha256Digest {
        Sha256Digest::of_bytes(b"archive bytes")
    }

    #[rstest]
    fn overwrites_version_and_hash(version: ReleaseVersion, digest: Sha256Digest) {
        let mut descriptor = ReleaseDescriptor::parse(
            r#"{"version": "0.0.0", "architecture": {"64bit": {"hash": "OLD"}}}"#,
        )
        .expect("valid template");

        descriptor.apply(&version, &digest).expect("apply");

        assert_eq!(
            descriptor.as_value(),
            &json!({"version": "2.1.0", "architecture": {"64bit": {"hash": digest.as_str()}}})
        );
    }

    #[rstest]
    fn preserves_unknown_fields_and_key_order(version: ReleaseVersion, digest: Sha256Digest) {
        let template = r#"{
            "homepage": "https://example.invalid",
            "version": "0.0.0",
            "license": "MIT",
            "architecture": {"64bit": {"url": "https://example.invalid/app.zip", "hash": "x"}},
            "bin": ["MagicUtil.exe"],
            "checkver": {"github": "https://example.invalid"}
        }"#;
        let mut descriptor = ReleaseDescriptor::parse(template).expect("valid template");

        descriptor.apply(&version, &digest).expect("apply");

        let keys: Vec<&str> = descriptor
            .as_value()
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            ["homepage", "version", "license", "architecture", "bin", "checkver"]
        );
        assert_eq!(descriptor.as_value()["bin"], json!(["MagicUtil.exe"]));
        assert_eq!(
            descriptor.as_value()["architecture"]["64bit"]["url"],
            json!("https://example.invalid/app.zip")
        );
    }

    #[rstest]
    fn inserts_absent_version_and_hash(version: ReleaseVersion, digest: Sha256Digest) {
        let mut descriptor =
            ReleaseDescriptor::parse(r#"{"architecture": {"64bit": {}}}"#).expect("valid");

        descriptor.apply(&version, &digest).expect("apply");

        assert_eq!(descriptor.version(), Some("2.1.0"));
        assert_eq!(descriptor.hash(), Some(digest.as_str()));
    }

    #[rstest]
    #[case::no_architecture(r#"{"version": "1"}"#, "/architecture")]
    #[case::no_64bit(r#"{"architecture": {"32bit": {}}}"#, "/architecture/64bit")]
    fn missing_nested_fields_are_structural_errors(
        version: ReleaseVersion,
        digest: Sha256Digest,
        #[case] template: &str,
        #[case] expected_pointer: &str,
    ) {
        let mut descriptor = ReleaseDescriptor::parse(template).expect("valid JSON");
        let before = descriptor.clone();

        let err = descriptor.apply(&version, &digest).expect_err("must fail");

        assert!(
            matches!(err, DescriptorError::MissingField { ref pointer } if pointer == expected_pointer),
            "unexpected error: {err}"
        );
        assert_eq!(descriptor, before, "failed apply must not mutate");
    }

    #[rstest]
    #[case::array_root("[]", "")]
    #[case::string_architecture(r#"{"architecture": "x64"}"#, "/architecture")]
    #[case::null_64bit(r#"{"architecture": {"64bit": null}}"#, "/architecture/64bit")]
    fn non_object_nodes_are_structural_errors(
        version: ReleaseVersion,
        digest: Sha256Digest,
        #[case] template: &str,
        #[case] expected_pointer: &str,
    ) {
        let mut descriptor = ReleaseDescriptor::parse(template).expect("valid JSON");

        let err = descriptor.apply(&version, &digest).expect_err("must fail");

        assert!(
            matches!(err, DescriptorError::NotAnObject { ref pointer } if pointer == expected_pointer),
            "unexpected error: {err}"
        );
    }

    #[rstest]
    fn malformed_template_is_a_parse_error() {
        let outcome = ReleaseDescriptor::parse("{\"version\": ");
        assert!(matches!(outcome, Err(DescriptorError::Parse(_))));
    }

    #[rstest]
    fn pretty_output_uses_four_space_indent() {
        let descriptor =
            ReleaseDescriptor::parse(r#"{"version":"1","architecture":{"64bit":{"hash":"h"}}}"#)
                .expect("valid");

        let text = descriptor.to_pretty_string().expect("serialize");

        assert_eq!(
            text,
            concat!(
                "{\n",
                "    \"version\": \"1\",\n",
                "    \"architecture\": {\n",
                "        \"64bit\": {\n",
                "            \"hash\": \"h\"\n",
                "        }\n",
                "    }\n",
                "}\n",
            )
        );
    }

    #[rstest]
    fn number_literals_survive_apply_and_write(version: ReleaseVersion, digest: Sha256Digest) {
        let mut descriptor = ReleaseDescriptor::parse(concat!(
            r#"{"build": 18446744073709551616, "ratio": 3.14159265358979323846264338327950288, "#,
            r#""size": 1.50, "architecture": {"64bit": {"hash": "x"}}}"#
        ))
        .expect("valid template");

        descriptor.apply(&version, &digest).expect("apply");
        let text = descriptor.to_pretty_string().expect("serialize");

        assert!(text.contains("\"build\": 18446744073709551616,"), "got: {text}");
        assert!(
            text.contains("\"ratio\": 3.14159265358979323846264338327950288,"),
            "got: {text}"
        );
        assert!(text.contains("\"size\": 1.50,"), "got: {text}");
    }

    #[rstest]
    fn non_ascii_text_is_written_as_utf8() {
        let descriptor = ReleaseDescriptor::parse(
            r#"{"description":"Outil \u00e9l\u00e9gant","architecture":{"64bit":{"hash":"h"}}}"#,
        )
        .expect("valid");

        let text = descriptor.to_pretty_string().expect("serialize");

        assert!(text.contains("\"description\": \"Outil élégant\""), "got: {text}");
        assert!(text.ends_with("}\n"));
        assert_eq!(
            ReleaseDescriptor::parse(&text).expect("reparse"),
            descriptor
        );
    }

    #[rstest]
    fn written_descriptor_round_trips(version: ReleaseVersion, digest: Sha256Digest) {
        let dir = tempfile::tempdir().expect("temp dir");
        let template = dir.path().join("base.json");
        let output = dir.path().join("out.json");
        fs::write(
            &template,
            r#"{"version":"x","description":"tool","architecture":{"64bit":{"hash":"x","url":"u"}},"n":[1,2.5,null,true]}"#,
        )
        .expect("write template");

        let built = build_descriptor(&template, &output, &version, &digest).expect("build");
        let reloaded = ReleaseDescriptor::load(&output).expect("reload");

        assert_eq!(reloaded, built);
        assert_eq!(reloaded.sha256().expect("valid hash"), digest);
    }

    #[rstest]
    fn build_descriptor_names_template_on_structure_error(
        version: ReleaseVersion,
        digest: Sha256Digest,
    ) {
        let dir = tempfile::tempdir().expect("temp dir");
        let template = dir.path().join("base.json");
        let output = dir.path().join("out.json");
        fs::write(&template, r#"{"version": "x"}"#).expect("write template");

        let err = build_descriptor(&template, &output, &version, &digest).expect_err("must fail");

        assert!(matches!(err, BundleError::Descriptor { ref path, .. } if *path == template));
        assert!(!output.exists(), "no output on structural failure");
    }

    #[rstest]
    fn sha256_rejects_placeholder_hash() {
        let descriptor =
            ReleaseDescriptor::parse(r#"{"architecture": {"64bit": {"hash": "OLD"}}}"#)
                .expect("valid");

        assert!(matches!(
            descriptor.sha256(),
            Err(DescriptorError::InvalidHash(_))
        ));
    }
}
