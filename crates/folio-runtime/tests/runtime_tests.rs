#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use folio_config::{FolioConfig, RateLimitKey};
    use folio_core::*;
    use folio_runtime::*;
    use serde_json::{Value, json};

    // ── Test tools ─────────────────────────────────────────────

    /// Counts invocations; requires a `text` argument.
    struct Counter {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ToolHandler for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn description(&self) -> &str {
            "Counts calls"
        }

        fn parameters(&self) -> ParamSchema {
            ParamSchema::object().required("text", ParamSchema::string().length(Some(1), Some(20)))
        }

        async fn run(&self, args: &Value, _context: &ToolContext) -> Result<ToolResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ToolResult::success(json!({ "echo": args["text"] })))
        }
    }

    struct Slow;

    #[async_trait]
    impl ToolHandler for Slow {
        fn name(&self) -> &str {
            "slow"
        }

        fn description(&self) -> &str {
            "Takes five seconds"
        }

        fn parameters(&self) -> ParamSchema {
            ParamSchema::object()
        }

        async fn run(&self, _args: &Value, _context: &ToolContext) -> Result<ToolResult> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(ToolResult::success(json!("done")))
        }
    }

    /// Returns whatever string it is given, unsanitized.
    struct Html;

    #[async_trait]
    impl ToolHandler for Html {
        fn name(&self) -> &str {
            "html"
        }

        fn description(&self) -> &str {
            "Returns markup"
        }

        fn parameters(&self) -> ParamSchema {
            ParamSchema::object()
        }

        async fn run(&self, _args: &Value, _context: &ToolContext) -> Result<ToolResult> {
            Ok(ToolResult::success(json!({
                "body": "<script>alert(1)</script>Safe",
                "links": ["javascript:alert(1)", "javascript:void(0)", "/about"],
            })))
        }
    }

    /// A raw tool whose body errors, bypassing the base envelope.
    struct Broken {
        schema: ParamSchema,
    }

    #[async_trait]
    impl Tool for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn description(&self) -> &str {
            "Always errors"
        }

        fn parameters(&self) -> &ParamSchema {
            &self.schema
        }

        async fn execute(&self, _args: &Value, _context: &ToolContext, _config: &ExecutionConfig) -> Result<ToolResult> {
            Err(FolioError::execution("broken", "disk on fire"))
        }
    }

    fn ctx() -> ToolContext {
        ToolContext::new(Page::Home, "session-1").with_user_agent("test-agent")
    }

    fn roomy_config() -> FolioConfig {
        let mut config = FolioConfig::default();
        config.rate_limit.max_requests = 10_000;
        config
    }

    fn registry_with_counter(config: &FolioConfig) -> (ToolRegistry, Arc<AtomicUsize>) {
        let registry = ToolRegistry::new(config).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        registry
            .register(Arc::new(BaseTool::new(Counter { calls: calls.clone() })))
            .unwrap();
        (registry, calls)
    }

    // ── Registration ───────────────────────────────────────────

    #[test]
    fn test_duplicate_registration_fails() {
        let (registry, _) = registry_with_counter(&roomy_config());
        let calls = Arc::new(AtomicUsize::new(0));
        let err = registry
            .register(Arc::new(BaseTool::new(Counter { calls })))
            .unwrap_err();
        assert!(matches!(err, FolioError::DuplicateTool(name) if name == "counter"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_and_lookup() {
        let (registry, _) = registry_with_counter(&roomy_config());
        assert!(registry.has_tool("counter"));
        assert!(registry.get("counter").is_some());
        assert!(registry.unregister("counter").is_some());
        assert!(!registry.has_tool("counter"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_builtin_catalog() {
        let registry = ToolRegistry::with_builtin_tools(&FolioConfig::default()).unwrap();
        assert_eq!(
            registry.tool_names(),
            vec![
                "contact_action",
                "download_resume",
                "get_experience",
                "get_skills",
                "navigate_to_page",
                "scroll_to_section",
                "show_projects",
                "toggle_theme",
            ]
        );
        let defs = registry.function_definitions();
        assert_eq!(defs.len(), 8);
        assert_eq!(defs[0].name, "contact_action");
        assert_eq!(defs[0].parameters["required"], json!(["action"]));

        let schemas = registry.schemas();
        assert_eq!(schemas["navigate_to_page"]["properties"]["page"]["enum"][1], "about");
    }

    // ── Middleware gates ───────────────────────────────────────

    #[tokio::test]
    async fn test_invalid_arguments_skip_body() {
        let (registry, calls) = registry_with_counter(&roomy_config());
        let result = registry.execute_tool("counter", &json!({}), &ctx(), None).await;
        assert_eq!(result.error_code(), Some(ErrorCode::InvalidArguments));
        assert_eq!(
            result.error_detail().unwrap().suggestions,
            vec!["Missing required property: text".to_string()]
        );

        let result = registry
            .execute_tool("counter", &json!({"text": "x".repeat(30)}), &ctx(), None)
            .await;
        assert_eq!(result.error_code(), Some(ErrorCode::InvalidArguments));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let result = registry.execute_tool("counter", &json!({"text": "hi"}), &ctx(), None).await;
        assert!(result.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_admits_max_then_recovers() {
        let mut config = FolioConfig::default();
        config.rate_limit.max_requests = 3;
        config.rate_limit.window_ms = 1_000;
        let (registry, calls) = registry_with_counter(&config);
        let args = json!({"text": "hi"});

        for _ in 0..3 {
            assert!(registry.execute_tool("counter", &args, &ctx(), None).await.is_success());
        }
        let limited = registry.execute_tool("counter", &args, &ctx(), None).await;
        assert_eq!(limited.error_code(), Some(ErrorCode::RateLimitExceeded));
        assert!(limited.error_detail().unwrap().suggestions[0].contains("seconds"));

        // another session has its own window
        let other = ctx().with_user_agent("other-agent");
        assert!(registry.execute_tool("counter", &args, &other, None).await.is_success());

        tokio::time::advance(Duration::from_millis(1_001)).await;
        assert!(registry.execute_tool("counter", &args, &ctx(), None).await.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_custom_key_generator() {
        let mut config = FolioConfig::default();
        config.rate_limit.max_requests = 1;
        let middleware = ExecutionMiddleware::new(&config)
            .unwrap()
            .with_key_generator(|c: &ToolContext| c.current_page.to_string());
        assert_eq!(middleware.rate_limit_key(&ctx()), "home");

        let registry = ToolRegistry::with_middleware(middleware, ExecutionConfig::default(), 10);
        registry
            .register(Arc::new(BaseTool::new(Counter {
                calls: Arc::new(AtomicUsize::new(0)),
            })))
            .unwrap();
        let args = json!({"text": "hi"});
        let first = ToolContext::new(Page::About, "a");
        let second = ToolContext::new(Page::About, "b");
        assert!(registry.execute_tool("counter", &args, &first, None).await.is_success());
        let limited = registry.execute_tool("counter", &args, &second, None).await;
        assert_eq!(limited.error_code(), Some(ErrorCode::RateLimitExceeded));
    }

    #[test]
    fn test_rate_limit_key_strategies() {
        let mut config = FolioConfig::default();
        let context = ctx();
        assert_eq!(
            ExecutionMiddleware::new(&config).unwrap().rate_limit_key(&context),
            "session-1:test-agent"
        );
        config.rate_limit.key = RateLimitKey::Session;
        assert_eq!(ExecutionMiddleware::new(&config).unwrap().rate_limit_key(&context), "session-1");
        config.rate_limit.key = RateLimitKey::Global;
        assert_eq!(ExecutionMiddleware::new(&config).unwrap().rate_limit_key(&context), "global");
    }

    #[tokio::test]
    async fn test_security_violation() {
        let (registry, calls) = registry_with_counter(&roomy_config());
        let result = registry
            .execute_tool("counter", &json!({"text": "<script>x</script>"}), &ctx(), None)
            .await;
        assert_eq!(result.error_code(), Some(ErrorCode::SecurityViolation));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_require_auth() {
        let mut config = roomy_config();
        config.security.require_auth = true;
        let (registry, _) = registry_with_counter(&config);
        let anonymous = ToolContext::new(Page::Home, "anonymous");
        let result = registry.execute_tool("counter", &json!({"text": "hi"}), &anonymous, None).await;
        assert_eq!(result.error_code(), Some(ErrorCode::SecurityViolation));
        assert!(registry.execute_tool("counter", &json!({"text": "hi"}), &ctx(), None).await.is_success());
    }

    #[tokio::test]
    async fn test_result_sanitized_and_stamped() {
        let registry = ToolRegistry::new(&roomy_config()).unwrap();
        registry.register(Arc::new(BaseTool::new(Html))).unwrap();
        let result = registry.execute_tool("html", &json!({}), &ctx(), None).await;
        let data = result.data().unwrap();
        assert_eq!(data["body"], "Safe");
        assert_eq!(data["links"], json!(["", "", "/about"]));
        let meta = result.metadata().unwrap();
        assert_eq!(meta.tool_name, "html");
        assert_eq!(meta.processed_by, PROCESSED_BY);
    }

    #[tokio::test]
    async fn test_body_error_becomes_execution_error() {
        let registry = ToolRegistry::new(&roomy_config()).unwrap();
        registry
            .register(Arc::new(Broken {
                schema: ParamSchema::object(),
            }))
            .unwrap();
        let result = registry.execute_tool("broken", &json!({}), &ctx(), None).await;
        assert_eq!(result.error_code(), Some(ErrorCode::ExecutionError));
        assert!(result.error_detail().unwrap().message.contains("disk on fire"));
    }

    // ── Base tool envelope ─────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let registry = ToolRegistry::new(&roomy_config()).unwrap();
        registry.register(Arc::new(BaseTool::new(Slow))).unwrap();
        let config = ExecutionConfig {
            timeout_ms: 100,
            ..Default::default()
        };
        let result = registry.execute_tool("slow", &json!({}), &ctx(), Some(&config)).await;
        assert_eq!(result.error_code(), Some(ErrorCode::ExecutionTimeout));

        let stats = registry.get("slow").unwrap().stats().unwrap();
        assert_eq!(stats.executions, 1);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.last_error_code, Some(ErrorCode::ExecutionTimeout));
    }

    #[tokio::test]
    async fn test_invalid_context() {
        let tool = BaseTool::new(Counter {
            calls: Arc::new(AtomicUsize::new(0)),
        });
        let bad = ToolContext::new(Page::Home, "  ");
        let result = tool
            .execute(&json!({"text": "hi"}), &bad, &ExecutionConfig::default())
            .await
            .unwrap();
        assert_eq!(result.error_code(), Some(ErrorCode::InvalidContext));
    }

    #[tokio::test]
    async fn test_free_form_section_is_accepted() {
        let registry = builtins();
        let context = ToolContext::new(Page::About, "s1").with_section("Work Experience");
        let result = registry.execute_tool("get_skills", &json!({}), &context, None).await;
        assert!(result.is_success());

        let result = registry
            .execute_tool("scroll_to_section", &json!({"section": "skills"}), &context, None)
            .await;
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_base_tool_validation_message() {
        let tool = BaseTool::new(Counter {
            calls: Arc::new(AtomicUsize::new(0)),
        });
        let result = tool
            .execute(&json!({"text": 5}), &ctx(), &ExecutionConfig::default())
            .await
            .unwrap();
        let error = result.error_detail().unwrap();
        assert_eq!(error.code, ErrorCode::InvalidArguments);
        assert_eq!(error.suggestions, vec!["Check the tool parameters and try again".to_string()]);
        assert_eq!(tool.records().len(), 1);
    }

    // ── History and chains ─────────────────────────────────────

    #[tokio::test]
    async fn test_history_capped_fifo() {
        let (registry, _) = registry_with_counter(&roomy_config());
        for i in 0..1_001 {
            registry
                .execute_tool("counter", &json!({"text": format!("n{i}")}), &ctx(), None)
                .await;
        }
        let history = registry.history();
        assert_eq!(history.len(), 1_000);
        assert_eq!(history[0].arguments["text"], "n1");
        assert_eq!(history[999].arguments["text"], "n1000");

        let stats = registry.stats();
        assert_eq!(stats.total_executions, 1_001);
        assert_eq!(stats.successful, 1_001);
        assert_eq!(stats.history_size, 1_000);
        assert_eq!(stats.per_tool["counter"].executions, 100);

        registry.clear_history();
        assert!(registry.history().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stats_consistent_under_concurrency() {
        let (registry, _) = registry_with_counter(&roomy_config());
        let registry = Arc::new(registry);
        let mut handles = Vec::new();
        for t in 0..4 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..50 {
                    let text = if i % 2 == 0 { format!("t{t}-{i}") } else { String::new() };
                    registry.execute_tool("counter", &json!({"text": text}), &ctx(), None).await;
                }
            }));
        }
        for _ in 0..200 {
            let stats = registry.stats();
            assert!(stats.successful <= stats.total_executions);
            assert_eq!(stats.failed, stats.total_executions - stats.successful);
            tokio::task::yield_now().await;
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let stats = registry.stats();
        assert_eq!(stats.total_executions, 200);
        assert_eq!(stats.successful, 100);
        assert_eq!(stats.failed, 100);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::with_builtin_tools(&roomy_config()).unwrap();
        let result = registry.execute_tool("theme", &json!({}), &ctx(), None).await;
        let error = result.error_detail().unwrap();
        assert_eq!(error.code, ErrorCode::ToolNotFound);
        assert_eq!(error.suggestions[0], "Did you mean 'toggle_theme'?");
        assert!(error.suggestions[1].contains("navigate_to_page"));
        assert_eq!(registry.history().len(), 1);
    }

    #[tokio::test]
    async fn test_chain_stops_after_failure() {
        let registry = ToolRegistry::with_builtin_tools(&roomy_config()).unwrap();
        let steps = vec![
            ChainStep::new("navigate_to_page", json!({"page": "about"})),
            ChainStep::new("download_resume", json!({"format": "exe"})),
            ChainStep::new("get_skills", json!({})),
        ];
        let results = registry.execute_tool_chain(&steps, &ctx(), None).await;
        assert_eq!(results.len(), 2);
        assert!(results[0].is_success());
        assert_eq!(results[1].error_code(), Some(ErrorCode::UnsupportedFile));

        let retrying = ExecutionConfig {
            retry: true,
            retry_delay_ms: 1,
            ..Default::default()
        };
        let results = registry.execute_tool_chain(&steps, &ctx(), Some(&retrying)).await;
        assert_eq!(results.len(), 3);
        assert_eq!(registry.recent_tool_names(2), vec!["download_resume", "get_skills"]);
    }

    #[test]
    fn test_chain_step_deserializes_without_arguments() {
        let step: ChainStep = serde_json::from_value(json!({"tool": "get_skills"})).unwrap();
        assert_eq!(step.arguments, json!({}));
    }

    // ── Built-in tools ─────────────────────────────────────────

    fn builtins() -> ToolRegistry {
        ToolRegistry::with_builtin_tools(&roomy_config()).unwrap()
    }

    #[tokio::test]
    async fn test_navigate_to_page() {
        let registry = builtins();
        let result = registry
            .execute_tool("navigate_to_page", &json!({"page": "resume", "section": "skills"}), &ctx(), None)
            .await;
        assert_eq!(
            result.actions(),
            &[ToolAction::Navigate {
                target: "/resume".into(),
                section: Some("skills".into())
            }]
        );

        let result = registry
            .execute_tool("navigate_to_page", &json!({"page": "contact", "section": "skills"}), &ctx(), None)
            .await;
        assert_eq!(result.error_code(), Some(ErrorCode::InvalidSection));

        let result = registry
            .execute_tool("navigate_to_page", &json!({"page": "blog"}), &ctx(), None)
            .await;
        let error = result.error_detail().unwrap();
        assert_eq!(error.code, ErrorCode::InvalidArguments);
        assert!(error.suggestions[0].starts_with("Value must be one of: home, about"));
    }

    #[tokio::test]
    async fn test_scroll_to_section() {
        let registry = builtins();
        let on_about = ToolContext::new(Page::About, "s1");
        let result = registry
            .execute_tool("scroll_to_section", &json!({"section": "education"}), &on_about, None)
            .await;
        assert_eq!(result.actions()[0], ToolAction::Scroll { target: "education".into() });

        let result = registry
            .execute_tool("scroll_to_section", &json!({"section": "form"}), &on_about, None)
            .await;
        let error = result.error_detail().unwrap();
        assert_eq!(error.code, ErrorCode::InvalidSection);
        assert!(error.suggestions.iter().any(|s| s.contains("contact")));
    }

    #[tokio::test]
    async fn test_toggle_theme() {
        let registry = builtins();
        let result = registry.execute_tool("toggle_theme", &json!({}), &ctx(), None).await;
        assert_eq!(result.actions(), &[ToolAction::Theme { target: Theme::Dark }]);

        let result = registry
            .execute_tool("toggle_theme", &json!({"theme": "light"}), &ctx(), None)
            .await;
        assert_eq!(result.error_code(), Some(ErrorCode::InvalidTheme));
    }

    #[tokio::test]
    async fn test_download_resume() {
        let registry = builtins();
        let result = registry.execute_tool("download_resume", &json!({}), &ctx(), None).await;
        assert_eq!(
            result.actions(),
            &[ToolAction::Download {
                target: "/files/resume.pdf".into(),
                filename: "resume.pdf".into()
            }]
        );

        let result = registry
            .execute_tool("download_resume", &json!({"format": "txt"}), &ctx(), None)
            .await;
        let error = result.error_detail().unwrap();
        assert_eq!(error.code, ErrorCode::UnsupportedFile);
        assert_eq!(error.fallback.as_ref().unwrap()["format"], "pdf");
    }

    #[tokio::test]
    async fn test_content_tools() {
        let registry = builtins();
        let result = registry
            .execute_tool("show_projects", &json!({"technology": "rust", "limit": 1}), &ctx(), None)
            .await;
        assert_eq!(result.data().unwrap()["total"], 1);
        assert_eq!(result.actions().len(), 1);

        let result = registry
            .execute_tool("get_skills", &json!({"category": "databases"}), &ctx(), None)
            .await;
        assert_eq!(result.data().unwrap()["categories"][0]["category"], "databases");

        let result = registry
            .execute_tool("get_experience", &json!({"include_education": true}), &ctx(), None)
            .await;
        assert!(result.data().unwrap().get("education").is_some());
    }

    #[tokio::test]
    async fn test_contact_action() {
        let registry = builtins();
        let result = registry
            .execute_tool("contact_action", &json!({"action": "open_form"}), &ctx(), None)
            .await;
        assert_eq!(result.actions()[0].kind(), ActionKind::Modal);

        let result = registry
            .execute_tool("contact_action", &json!({"action": "fax"}), &ctx(), None)
            .await;
        assert_eq!(result.error_code(), Some(ErrorCode::InvalidAction));
    }

    #[tokio::test]
    async fn test_lenient_validation_coerces() {
        let mut config = roomy_config();
        config.validation.strict_mode = false;
        let registry = ToolRegistry::with_builtin_tools(&config).unwrap();
        let result = registry
            .execute_tool("show_projects", &json!({"limit": "2", "featured": "true"}), &ctx(), None)
            .await;
        assert_eq!(result.data().unwrap()["total"], 2);
    }

    // ── Suggestions ────────────────────────────────────────────

    #[tokio::test]
    async fn test_registry_suggestions_use_registered_tools() {
        let (registry, _) = registry_with_counter(&roomy_config());
        assert!(registry.contextual_suggestions(&ctx(), Some("show me projects")).is_empty());

        let registry = builtins();
        let suggestions = registry.contextual_suggestions(&ToolContext::new(Page::Resume, "s1"), None);
        assert_eq!(suggestions[0].relevance, 0.9);

        registry
            .execute_tool("get_experience", &json!({}), &ctx(), None)
            .await;
        let recs = registry.smart_recommendations(&ctx(), None);
        assert!(recs.len() <= 5);
        assert!(recs.iter().any(|s| s.tool == "download_resume"));
    }

    #[test]
    fn test_global_registry() {
        let global = ToolRegistry::global();
        assert_eq!(global.len(), 8);
        assert!(std::ptr::eq(global, ToolRegistry::global()));
    }
}
