pub mod chat;
use std::str::FromStr;
use std::fmt;

/// OpenAI-compatible chat completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmType {
    Together,
    OpenAI,
    Ollama,
}

impl LlmType {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmType::Together => "https://api.together.xyz/v1",
            LlmType::OpenAI => "https://api.openai.com/v1",
            LlmType::Ollama => "http://localhost:11434/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmType::Together => "meta-llama/Llama-3.3-70B-Instruct-Turbo",
            LlmType::OpenAI => "gpt-4o",
            LlmType::Ollama => "llama3",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LlmType::Ollama)
    }
}

impl fmt::Display for LlmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LlmType::Together => "together",
            LlmType::OpenAI => "openai",
            LlmType::Ollama => "ollama",
        };
        f.write_str(name)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseLlmTypeError {
    message: String,
}

impl fmt::Display for ParseLlmTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseLlmTypeError {}

impl FromStr for LlmType {
    type Err = ParseLlmTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "together" => Ok(LlmType::Together),
            "openai" => Ok(LlmType::OpenAI),
            "ollama" => Ok(LlmType::Ollama),
            _ =>
                Err(ParseLlmTypeError {
                    message: format!("Invalid LLM type: '{}'", s),
                }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub llm_type: LlmType,
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_type: LlmType::Together,
            api_key: None,
            completion_model: None,
            base_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_names_case_insensitively() {
        assert_eq!("Together".parse::<LlmType>(), Ok(LlmType::Together));
        assert_eq!("OPENAI".parse::<LlmType>(), Ok(LlmType::OpenAI));
        assert_eq!("ollama".parse::<LlmType>(), Ok(LlmType::Ollama));
        assert!("anthropic".parse::<LlmType>().is_err());
    }

    #[test]
    fn only_local_provider_runs_without_key() {
        assert!(LlmType::Together.requires_api_key());
        assert!(LlmType::OpenAI.requires_api_key());
        assert!(!LlmType::Ollama.requires_api_key());
    }
}
