use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use log::info;

pub const DEFAULT_SCHEMA: &str = r#"
{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "title": "Personal Details",
  "type": "object",
  "required": ["firstName", "lastName", "email", "age"],
  "properties": {
    "firstName": {
      "type": "string",
      "description": "The person's first name"
    },
    "lastName": {
      "type": "string",
      "description": "The person's last name"
    },
    "email": {
      "type": "string",
      "format": "email",
      "description": "The person's email address"
    },
    "age": {
      "type": "string",
      "minimum": 18,
      "description": "The person's age (must be 18+)"
    },
    "phone": {
      "type": "string",
      "description": "Phone number (optional)"
    },
    "address": {
      "type": "object",
      "properties": {
        "street": {
          "type": "string",
          "description": "Street address"
        },
        "city": {
          "type": "string",
          "description": "City"
        },
        "country": {
          "type": "string",
          "enum": ["USA", "Canada", "UK", "Australia", "India", "Others"],
          "description": "Country of residence"
        }
      }
    }
  }
}
"#;

#[derive(Debug)]
pub enum PromptError {
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::IoError(e) => write!(f, "Schema file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Schema JSON parsing error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

/// Reads the form schema from `path`, or falls back to the built-in
/// Personal Details schema. The text is kept verbatim so the LLM sees
/// exactly what the file contains.
pub fn load_schema(path: Option<&str>) -> Result<String, PromptError> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(Path::new(p))?;
            serde_json::from_str::<serde_json::Value>(&text)?;
            info!("Loaded form schema from {}", p);
            Ok(text)
        }
        None => {
            info!("Using built-in Personal Details schema");
            Ok(DEFAULT_SCHEMA.to_string())
        }
    }
}

pub fn build_system_prompt(schema: &str) -> String {
    format!(
        r#"
    You are a JSON form filling assistant. Your task is to:
    1. Analyze this JSON schema: {schema}
    2. Determine what information is needed to complete it
    3. Ask one clear question at a time to gather each required field
    4. Never ask for more than one piece of information at once
    5. Confirm when all required fields are collected
    6. Finally return the completed JSON

    Current rules:
    - Only ask about fields that are required in the schema
    - If a field has enum values, present them as options
    - For nested objects, ask questions progressively
    - Maintain context throughout the conversation
    "#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_schema_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(DEFAULT_SCHEMA).unwrap();
        assert_eq!(value["required"], serde_json::json!(["firstName", "lastName", "email", "age"]));
    }

    #[test]
    fn system_prompt_embeds_schema_verbatim() {
        let prompt = build_system_prompt(DEFAULT_SCHEMA);
        assert!(prompt.contains(DEFAULT_SCHEMA));
        assert!(prompt.contains("Ask one clear question at a time"));
        assert!(prompt.contains("present them as options"));
    }

    #[test]
    fn load_schema_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"type":"object","required":["name"]}}"#).unwrap();

        let schema = load_schema(file.path().to_str()).unwrap();
        assert_eq!(schema, r#"{"type":"object","required":["name"]}"#);
    }

    #[test]
    fn load_schema_rejects_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not a schema").unwrap();

        let err = load_schema(file.path().to_str()).unwrap_err();
        assert!(matches!(err, PromptError::JsonError(_)));
    }

    #[test]
    fn load_schema_reports_missing_file() {
        let err = load_schema(Some("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, PromptError::IoError(_)));
    }

    #[test]
    fn load_schema_defaults_to_builtin() {
        assert_eq!(load_schema(None).unwrap(), DEFAULT_SCHEMA);
    }
}
