#[cfg(test)]
mod tests {
    use crate::config::{Config, LLMProvider, WaitPolicy};

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.results_path, std::path::PathBuf::from("quest.answers.jsonl"));
        assert_eq!(config.retriever.chunk_size, 2048);
        assert_eq!(config.retriever.chunk_overlap, 512);
        assert_eq!(config.retriever.top_k, 15);
        assert_eq!(config.agents.orchestrator_max_steps, 15);
        assert_eq!(config.agents.assistant_max_steps, 7);
        assert_eq!(config.agents.websearch_max_steps, 3);
        assert!(!config.search.broaden_encyclopedia);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("gemini".parse::<LLMProvider>().unwrap(), LLMProvider::Gemini);
        assert_eq!("OpenAI".parse::<LLMProvider>().unwrap(), LLMProvider::OpenAI);
        assert!("unknown".parse::<LLMProvider>().is_err());
    }

    #[test]
    fn test_wait_policy_parse() {
        assert_eq!("dom-ready".parse::<WaitPolicy>().unwrap(), WaitPolicy::DomReady);
        assert_eq!("idle".parse::<WaitPolicy>().unwrap(), WaitPolicy::Idle);
        assert!("eventually".parse::<WaitPolicy>().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_overlap() {
        let mut config = Config::default();
        config.retriever.chunk_overlap = config.retriever.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        let mut config = Config::default();
        config.agents.websearch_max_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_content = r#"
task_api_base_url = "https://example.com"
workdir = ".quest/files"
results_path = "out.jsonl"
verbose = true

[llm]
provider = "gemini"
api_key = "test-key"
api_base_url = "https://generativelanguage.googleapis.com"
model_engine = "gemini-2.0-flash"
model_verifier = "gemini-2.5-flash"
max_tokens = 1024
verifier_max_tokens = 2048
temperature = 0.0
stop_sequences = ["END"]
retry_attempts = 3
retry_delay_floor_ms = 100
retry_delay_ceiling_ms = 1000
retry_backoff_multiplier = 2.0
timeout_seconds = 60

[retriever]
chunk_size = 256
chunk_overlap = 32
top_k = 5
embedding_model = "text-embedding-004"

[search]
max_results = 3
broaden_encyclopedia = true
wait_policy = "dom-ready"
page_timeout_seconds = 10

[agents]
orchestrator_max_steps = 9
orchestrator_planning_interval = 3
assistant_max_steps = 5
assistant_planning_interval = 5
websearch_max_steps = 2

[files]
poll_interval_seconds = 1
max_wait_seconds = 5
"#;
        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.llm.provider, LLMProvider::Gemini);
        assert_eq!(config.retriever.chunk_size, 256);
        assert_eq!(config.search.wait_policy, WaitPolicy::DomReady);
        assert!(config.search.broaden_encyclopedia);
        assert_eq!(config.agents.orchestrator_max_steps, 9);
        assert!(config.validate().is_ok());
    }
}
