//! Loading settings files by URI.
//!
//! The format is chosen by file extension, after stripping a trailing
//! `.gz` for compressed files. `http://` and `https://` URIs are fetched
//! with a blocking HTTP client; everything else is read from the local
//! filesystem (a `file://` prefix is accepted).

use std::io::Read;

use flate2::read::GzDecoder;
use indexmap::IndexMap;

use crate::error::SourceError;
use crate::value::{from_toml, from_yaml, Value};

/// Supported settings file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" | "js" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
        }
    }
}

/// Load the settings document at `uri` into an ordered map.
pub(crate) fn load_uri(uri: &str) -> Result<IndexMap<String, Value>, SourceError> {
    let bytes = fetch(uri)?;

    // Extension detection ignores any query or fragment.
    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    let (bytes, path) = if path.to_ascii_lowercase().ends_with(".gz") {
        (gunzip(uri, &bytes)?, &path[..path.len() - 3])
    } else {
        (bytes, path)
    };

    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let format = Format::from_extension(extension).ok_or_else(|| SourceError::UnknownFormat {
        uri: uri.to_string(),
        extension: extension.to_string(),
    })?;

    let text = String::from_utf8(bytes)
        .map_err(|e| SourceError::parse(uri, format.name(), e.to_string()))?;

    parse(uri, format, &text)
}

fn fetch(uri: &str) -> Result<Vec<u8>, SourceError> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        let response = reqwest::blocking::get(uri)
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| SourceError::fetch(uri, e.to_string()))?;
        let bytes = response
            .bytes()
            .map_err(|e| SourceError::fetch(uri, e.to_string()))?;
        Ok(bytes.to_vec())
    } else {
        let path = uri.strip_prefix("file://").unwrap_or(uri);
        std::fs::read(path).map_err(|e| SourceError::fetch(uri, e.to_string()))
    }
}

fn gunzip(uri: &str, bytes: &[u8]) -> Result<Vec<u8>, SourceError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| SourceError::parse(uri, "gzip", e.to_string()))?;
    Ok(out)
}

fn parse(uri: &str, format: Format, text: &str) -> Result<IndexMap<String, Value>, SourceError> {
    let value = match format {
        Format::Json => serde_json::from_str::<Value>(text)
            .map_err(|e| SourceError::parse(uri, format.name(), e.to_string()))?,
        Format::Yaml => serde_yaml::from_str::<serde_yaml::Value>(text)
            .map(from_yaml)
            .map_err(|e| SourceError::parse(uri, format.name(), e.to_string()))?,
        Format::Toml => toml::from_str::<toml::Value>(text)
            .map(from_toml)
            .map_err(|e| SourceError::parse(uri, format.name(), e.to_string()))?,
    };

    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(SourceError::NotAMapping {
            uri: uri.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_load_json_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, r#"{"port": 8080, "name": "app"}"#).unwrap();

        let values = load_uri(path.to_str().unwrap()).unwrap();
        assert_eq!(values.get("port"), Some(&Value::from(8080)));
        assert_eq!(values.get("name"), Some(&Value::String("app".to_string())));
    }

    #[test]
    fn test_load_yaml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.yaml");
        fs::write(&path, "port: 8080\nflags: [a, b]\n").unwrap();

        let values = load_uri(path.to_str().unwrap()).unwrap();
        assert_eq!(values.get("port"), Some(&Value::from(8080)));
        assert_eq!(values.get("flags").unwrap()[1], Value::String("b".to_string()));
    }

    #[test]
    fn test_load_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        fs::write(&path, "port = 8080\nname = \"app\"\n").unwrap();

        let values = load_uri(path.to_str().unwrap()).unwrap();
        assert_eq!(values.get("port"), Some(&Value::from(8080)));
    }

    #[test]
    fn test_load_gzipped_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(br#"{"port": 8080}"#).unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();

        let values = load_uri(path.to_str().unwrap()).unwrap();
        assert_eq!(values.get("port"), Some(&Value::from(8080)));
    }

    #[test]
    fn test_file_scheme_prefix() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, r#"{"a": 1}"#).unwrap();

        let uri = format!("file://{}", path.display());
        let values = load_uri(&uri).unwrap();
        assert_eq!(values.get("a"), Some(&Value::from(1)));
    }

    #[test]
    fn test_http_uri_fetch() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let body = r#"{"port": 8080}"#;

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let _ = Read::read(&mut stream, &mut buf);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            Write::write_all(&mut stream, response.as_bytes()).unwrap();
        });

        let uri = format!("http://{addr}/settings.json");
        let values = load_uri(&uri).unwrap();
        assert_eq!(values.get("port"), Some(&Value::from(8080)));
        handle.join().unwrap();
    }

    #[test]
    fn test_unknown_extension_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.xml");
        fs::write(&path, "<settings/>").unwrap();

        let err = load_uri(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, SourceError::UnknownFormat { .. }));
    }

    #[test]
    fn test_missing_file_is_fetch_error() {
        let err = load_uri("/nonexistent/settings.yaml").unwrap_err();
        assert!(matches!(err, SourceError::Fetch { .. }));
    }

    #[test]
    fn test_top_level_array_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = load_uri(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, SourceError::NotAMapping { .. }));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        let err = load_uri(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }
}
