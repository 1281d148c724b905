use anyhow::Result;
use httpmock::prelude::*;
use semp_assistant::{build_resolver, AssistantConfig, CsvAnswerLog, LocalStorage, SourceTag};
use serde_json::json;
use tempfile::TempDir;

const INDEX_BLOB: &str = r#"{
    "embedding_model": "text-embedding-ada-002",
    "documents": [
        {"id": "hall-1", "text": "The exhibit hall opens at 9am on Saturday.", "source": "sempa360_program.pdf", "embedding": [1.0, 0.0]},
        {"id": "board-1", "text": "Board elections close in October.", "source": "governance.pdf", "embedding": [0.0, 1.0]}
    ]
}"#;

struct Fixture {
    _temp_dir: TempDir,
    log_dir: String,
    config: AssistantConfig,
}

/// 建立 index、log 目錄與指向 mock server 的設定
fn fixture(server: &MockServer, with_index: bool) -> Fixture {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().to_string_lossy().replace('\\', "/");

    let index_path = format!("{}/sempa_index.json", base);
    if with_index {
        std::fs::write(&index_path, INDEX_BLOB).unwrap();
    }
    let log_dir = format!("{}/logs", base);

    let config = AssistantConfig::from_toml_str(&format!(
        r#"
[referral]
email = "help@sempa.org"

[retrieval]
index_path = "{index_path}"
min_score = 0.8

[llm]
endpoint = "{endpoint}"
api_key = "sk-integration"

[fallback]
message = "Sorry, please email help@sempa.org."

[log]
dir = "{log_dir}"
"#,
        index_path = index_path,
        endpoint = server.base_url(),
        log_dir = log_dir,
    ))
    .unwrap();

    Fixture {
        _temp_dir: temp_dir,
        log_dir,
        config,
    }
}

async fn mock_embeddings(server: &MockServer, vector: [f32; 2]) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings");
            then.status(200).json_body(json!({
                "data": [{"index": 0, "embedding": vector}]
            }));
        })
        .await
}

async fn mock_chat<'a>(server: &'a MockServer, marker: &str, reply: &str) -> httpmock::Mock<'a> {
    let marker = marker.to_string();
    let reply = reply.to_string();
    server
        .mock_async(move |when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", "Bearer sk-integration")
                .body_contains(marker.as_str());
            then.status(200).json_body(json!({
                "choices": [{"message": {"role": "assistant", "content": reply}}]
            }));
        })
        .await
}

#[tokio::test]
async fn test_full_chain_order() -> Result<()> {
    let server = MockServer::start_async().await;
    let fx = fixture(&server, true);
    let resolver = build_resolver(&fx.config).await?;

    assert_eq!(
        resolver.stage_names(),
        vec!["Email Referral", "FAQ", "RAG", "GPT"]
    );
    Ok(())
}

#[tokio::test]
async fn test_referral_and_faq_skip_the_model() -> Result<()> {
    let server = MockServer::start_async().await;
    let fx = fixture(&server, true);
    let embeddings = mock_embeddings(&server, [1.0, 0.0]).await;
    let resolver = build_resolver(&fx.config).await?;

    let answer = resolver.resolve("I want to speak to someone").await?;
    assert_eq!(answer.source, SourceTag::EmailReferral);
    assert!(answer.text.contains("help@sempa.org"));

    let answer = resolver.resolve("How do I renew my membership?").await?;
    assert_eq!(answer.source, SourceTag::Faq);

    assert_eq!(embeddings.hits_async().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_rag_answer_with_citations() -> Result<()> {
    let server = MockServer::start_async().await;
    let fx = fixture(&server, true);
    let embeddings = mock_embeddings(&server, [1.0, 0.0]).await;
    let rag_chat = mock_chat(&server, "Context:", "It opens at 9am on Saturday.").await;
    let resolver = build_resolver(&fx.config).await?;

    let answer = resolver
        .resolve("What time does the exhibit hall open on Saturday?")
        .await?;

    embeddings.assert_async().await;
    rag_chat.assert_async().await;
    assert_eq!(answer.source, SourceTag::Rag);
    assert_eq!(answer.text, "It opens at 9am on Saturday.");
    assert_eq!(answer.citations, vec!["sempa360_program.pdf".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_rag_without_answer_falls_back_to_gpt() -> Result<()> {
    let server = MockServer::start_async().await;
    let fx = fixture(&server, true);
    mock_embeddings(&server, [1.0, 0.0]).await;
    let rag_chat = mock_chat(&server, "Context:", "NO_ANSWER").await;
    let gpt_chat = mock_chat(&server, "helpful assistant", "Bring comfortable shoes!").await;
    let resolver = build_resolver(&fx.config).await?;

    let answer = resolver.resolve("What should I wear to the exhibit hall?").await?;

    rag_chat.assert_async().await;
    gpt_chat.assert_async().await;
    assert_eq!(answer.source, SourceTag::Gpt);
    assert_eq!(answer.text, "Bring comfortable shoes!");
    Ok(())
}

#[tokio::test]
async fn test_low_similarity_goes_straight_to_gpt() -> Result<()> {
    let server = MockServer::start_async().await;
    let fx = fixture(&server, true);
    // 與兩份文件的相似度都低於 min_score
    mock_embeddings(&server, [0.7, 0.7]).await;
    let rag_chat = mock_chat(&server, "Context:", "should not be used").await;
    let gpt_chat = mock_chat(&server, "helpful assistant", "General answer.").await;
    let resolver = build_resolver(&fx.config).await?;

    let answer = resolver.resolve("Tell me something interesting").await?;

    assert_eq!(rag_chat.hits_async().await, 0);
    gpt_chat.assert_async().await;
    assert_eq!(answer.source, SourceTag::Gpt);
    Ok(())
}

#[tokio::test]
async fn test_service_outage_uses_fallback_message() -> Result<()> {
    let server = MockServer::start_async().await;
    let fx = fixture(&server, true);
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(503).json_body(json!({"error": {"message": "overloaded"}}));
        })
        .await;
    let resolver = build_resolver(&fx.config).await?;

    let answer = resolver.resolve("Tell me something interesting").await?;

    assert_eq!(answer.source, SourceTag::Fallback);
    assert_eq!(answer.text, "Sorry, please email help@sempa.org.");
    Ok(())
}

#[tokio::test]
async fn test_missing_index_disables_rag_only() -> Result<()> {
    let server = MockServer::start_async().await;
    let fx = fixture(&server, false);
    let gpt_chat = mock_chat(&server, "helpful assistant", "Hello there.").await;
    let resolver = build_resolver(&fx.config).await?;

    assert_eq!(resolver.stage_names(), vec!["Email Referral", "FAQ", "GPT"]);

    let answer = resolver.resolve("Hello?").await?;
    gpt_chat.assert_async().await;
    assert_eq!(answer.source, SourceTag::Gpt);
    Ok(())
}

#[tokio::test]
async fn test_every_answer_is_logged_with_its_source() -> Result<()> {
    let server = MockServer::start_async().await;
    let fx = fixture(&server, true);
    mock_embeddings(&server, [1.0, 0.0]).await;
    mock_chat(&server, "Context:", "It opens at 9am on Saturday.").await;
    let resolver = build_resolver(&fx.config).await?;

    resolver.resolve("Can I talk to a real person?").await?;
    resolver.resolve("Where is the job board?").await?;
    resolver.resolve("When does the exhibit hall open?").await?;
    assert!(resolver.resolve("   ").await.is_err());

    let log = CsvAnswerLog::new(LocalStorage::new(fx.log_dir.clone()), "chat_log.csv");
    let records = log.read_records().await?;

    let sources: Vec<SourceTag> = records.iter().map(|r| r.source).collect();
    assert_eq!(
        sources,
        vec![SourceTag::EmailReferral, SourceTag::Faq, SourceTag::Rag]
    );
    assert_eq!(records[1].question, "Where is the job board?");

    let raw = std::fs::read_to_string(format!("{}/chat_log.csv", fx.log_dir))?;
    assert!(raw.starts_with("timestamp,question,answer,source\n"));
    assert!(raw.contains(",Email Referral\n"));
    Ok(())
}
