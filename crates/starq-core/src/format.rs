//! Document formats and the JSON/YAML bridge
//!
//! jq only speaks JSON. YAML input is converted to a stream of JSON values
//! before the engine runs, and the engine's JSON output is converted back to
//! YAML afterwards when the job's output format asks for it.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use crate::error::{Direction, Error, Result};

/// Document format of a transformer's input or output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// JSON documents
    Json,
    /// YAML documents
    Yaml,
    /// Not determined
    #[default]
    Unknown,
}

impl Format {
    /// Guess the format from a file name's extension
    pub fn from_file_ext(filename: &str) -> Format {
        if filename.ends_with(".json") {
            Format::Json
        } else if filename.ends_with(".yaml") || filename.ends_with(".yml") {
            Format::Yaml
        } else {
            Format::Unknown
        }
    }

    fn known(self) -> Option<Format> {
        match self {
            Format::Unknown => None,
            known => Some(known),
        }
    }
}

/// Pick a format: an explicit format wins, then the file extension, then `fallback`.
///
/// An explicit [`Format::Unknown`] counts as not set.
pub fn resolve_format(explicit: Option<Format>, filename: Option<&str>, fallback: Format) -> Format {
    explicit
        .and_then(Format::known)
        .or_else(|| filename.map(Format::from_file_ext).and_then(Format::known))
        .unwrap_or(fallback)
}

/// Formats of one job, resolved together because output mirrors input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedFormats {
    /// Format of the job's input
    pub input: Format,
    /// Format of the job's output
    pub output: Format,
}

impl ResolvedFormats {
    /// Resolve input first, falling back to YAML, then output, falling back to
    /// the resolved input.
    pub fn resolve(
        input_format: Option<Format>,
        input_file: Option<&str>,
        output_format: Option<Format>,
        output_file: Option<&str>,
    ) -> Self {
        let input = resolve_format(input_format, input_file, Format::Yaml);
        let output = resolve_format(output_format, output_file, input);
        Self { input, output }
    }
}

/// Convert a (possibly multi-document) YAML stream into newline separated JSON values.
///
/// Merge keys (`<<`) are applied. A stream with no content at all (only
/// whitespace, comments and document markers) converts to empty output.
pub fn yaml_to_json(yaml: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    if is_blank_yaml(yaml) {
        return Ok(out);
    }
    for document in serde_yaml::Deserializer::from_slice(yaml) {
        let mut value = YamlValue::deserialize(document)
            .map_err(|err| Error::conversion(Direction::Input, err))?;
        value
            .apply_merge()
            .map_err(|err| Error::conversion(Direction::Input, err))?;
        let json = yaml_value_to_json(value)?;
        serde_json::to_writer(&mut out, &json).map_err(|err| Error::conversion(Direction::Input, err))?;
        out.push(b'\n');
    }
    Ok(out)
}

/// Convert a stream of JSON values into YAML, one document per value.
pub fn json_to_yaml(json: &[u8]) -> Result<Vec<u8>> {
    let mut documents = Vec::new();
    for value in serde_json::Deserializer::from_slice(json).into_iter::<JsonValue>() {
        let value = value.map_err(|err| Error::conversion(Direction::Output, err))?;
        let yaml = serde_yaml::to_string(&value)
            .map_err(|err| Error::conversion(Direction::Output, err))?;
        documents.push(yaml);
    }
    Ok(documents.join("---\n").into_bytes())
}

fn is_blank_yaml(yaml: &[u8]) -> bool {
    yaml.split(|b| *b == b'\n').all(|line| {
        let line = line.trim_ascii();
        line.is_empty() || line.starts_with(b"#") || line == b"---" || line == b"..."
    })
}

fn yaml_value_to_json(value: YamlValue) -> Result<JsonValue> {
    Ok(match value {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::Bool(b),
        YamlValue::Number(n) => yaml_number_to_json(&n)?,
        YamlValue::String(s) => JsonValue::String(s),
        YamlValue::Sequence(items) => JsonValue::Array(
            items
                .into_iter()
                .map(yaml_value_to_json)
                .collect::<Result<_>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut object = serde_json::Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                object.insert(yaml_key_to_string(key)?, yaml_value_to_json(value)?);
            }
            JsonValue::Object(object)
        }
        YamlValue::Tagged(tagged) => yaml_value_to_json(tagged.value)?,
    })
}

fn yaml_number_to_json(n: &serde_yaml::Number) -> Result<JsonValue> {
    if let Some(i) = n.as_i64() {
        Ok(JsonValue::from(i))
    } else if let Some(u) = n.as_u64() {
        Ok(JsonValue::from(u))
    } else {
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(JsonValue::Number)
            .ok_or_else(|| Error::conversion(Direction::Input, format!("{n} is not a valid JSON number")))
    }
}

fn yaml_key_to_string(key: YamlValue) -> Result<String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Tagged(tagged) => yaml_key_to_string(tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => Err(Error::conversion(
            Direction::Input,
            "mapping keys must be scalars to convert to JSON",
        )),
    }
}
